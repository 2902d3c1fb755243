use cosmwasm_std::{to_json_binary, Binary, Deps, Env, Order, StdError, StdResult};
use cw_storage_plus::Bound;

use crate::msg::{CheckUpkeepResponse, RoundHistoryResponse};
use crate::state::{CONFIG, LOTTERY_STATE, PLAYERS, ROUNDS};
use crate::upkeep::check_upkeep;

pub fn query_config(deps: Deps) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    to_json_binary(&config)
}

pub fn query_state(deps: Deps) -> StdResult<Binary> {
    let state = LOTTERY_STATE.load(deps.storage)?;
    to_json_binary(&state)
}

pub fn query_check_upkeep(deps: Deps, env: Env, check_data: Binary) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    let state = LOTTERY_STATE.load(deps.storage)?;
    let upkeep = check_upkeep(deps, &env, &config, &state)?;

    to_json_binary(&CheckUpkeepResponse {
        upkeep_needed: upkeep.needed(),
        perform_data: check_data,
        is_open: upkeep.is_open,
        time_passed: upkeep.time_passed,
        has_players: upkeep.has_players,
        has_balance: upkeep.has_balance,
    })
}

pub fn query_lottery_state(deps: Deps) -> StdResult<Binary> {
    let state = LOTTERY_STATE.load(deps.storage)?;
    to_json_binary(&state.status)
}

pub fn query_entrance_fee(deps: Deps) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    to_json_binary(&config.entrance_fee)
}

pub fn query_interval(deps: Deps) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    to_json_binary(&config.interval_seconds)
}

pub fn query_recent_winner(deps: Deps) -> StdResult<Binary> {
    let state = LOTTERY_STATE.load(deps.storage)?;
    to_json_binary(&state.recent_winner)
}

pub fn query_latest_timestamp(deps: Deps) -> StdResult<Binary> {
    let state = LOTTERY_STATE.load(deps.storage)?;
    to_json_binary(&state.last_draw_time)
}

/// Player at `index` in the current round. Errors past the end.
pub fn query_player(deps: Deps, index: u32) -> StdResult<Binary> {
    let state = LOTTERY_STATE.load(deps.storage)?;
    if index >= state.num_players {
        return Err(StdError::generic_err(format!(
            "no player at index {index} (round {} has {} players)",
            state.round, state.num_players
        )));
    }
    let player = PLAYERS.load(deps.storage, (state.round, index))?;
    to_json_binary(&player)
}

pub fn query_number_of_players(deps: Deps) -> StdResult<Binary> {
    let state = LOTTERY_STATE.load(deps.storage)?;
    to_json_binary(&state.num_players)
}

pub fn query_pending_request(deps: Deps) -> StdResult<Binary> {
    let state = LOTTERY_STATE.load(deps.storage)?;
    to_json_binary(&state.pending_request_id)
}

pub fn query_num_words(deps: Deps) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    to_json_binary(&config.num_words)
}

pub fn query_request_confirmations(deps: Deps) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    to_json_binary(&config.request_confirmations)
}

pub fn query_round(deps: Deps, round: u64) -> StdResult<Binary> {
    let result = ROUNDS.may_load(deps.storage, round)?;
    to_json_binary(&result)
}

pub fn query_round_history(
    deps: Deps,
    start_after: Option<u64>,
    limit: Option<u32>,
) -> StdResult<Binary> {
    let limit = limit.unwrap_or(20).min(100) as usize;
    let start = start_after.map(Bound::exclusive);

    let rounds: Vec<_> = ROUNDS
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .filter_map(|r| r.ok())
        .map(|(_, round)| round)
        .collect();

    to_json_binary(&RoundHistoryResponse { rounds })
}
