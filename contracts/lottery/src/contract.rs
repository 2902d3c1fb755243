use cosmwasm_std::{
    entry_point, Binary, Deps, DepsMut, Env, MessageInfo, Reply, Response, StdResult,
};
use cw2::{get_contract_version, set_contract_version};
use verilot_common::LotteryStatus;

use crate::error::ContractError;
use crate::execute;
use crate::msg::{ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg};
use crate::query;
use crate::state::{LotteryConfig, LotteryStateInfo, CONFIG, LOTTERY_STATE};

const CONTRACT_NAME: &str = "crates.io:verilot-lottery";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[entry_point]
pub fn instantiate(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let config = LotteryConfig {
        vrf_coordinator: deps.api.addr_validate(&msg.vrf_coordinator)?,
        denom: msg.denom,
        entrance_fee: msg.entrance_fee,
        interval_seconds: msg.interval_seconds,
        key_hash: msg.key_hash,
        subscription_id: msg.subscription_id,
        callback_gas_limit: msg.callback_gas_limit,
        request_confirmations: msg
            .request_confirmations
            .unwrap_or(execute::DEFAULT_REQUEST_CONFIRMATIONS),
        num_words: execute::NUM_WORDS,
        draw_timeout_seconds: msg.draw_timeout_seconds,
    };
    execute::validate_config(&config)?;
    CONFIG.save(deps.storage, &config)?;

    let state = LotteryStateInfo {
        status: LotteryStatus::Open,
        round: 1,
        num_players: 0,
        last_draw_time: env.block.time,
        pending_request_id: None,
        draw_requested_at: None,
        recent_winner: None,
    };
    LOTTERY_STATE.save(deps.storage, &state)?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("contract", "lottery")
        .add_attribute("creator", info.sender.to_string())
        .add_attribute("vrf_coordinator", config.vrf_coordinator.to_string())
        .add_attribute("entrance_fee", config.entrance_fee.to_string())
        .add_attribute("interval_seconds", config.interval_seconds.to_string()))
}

#[entry_point]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::EnterLottery {} => execute::enter_lottery(deps, env, info),
        ExecuteMsg::PerformUpkeep { perform_data } => {
            execute::perform_upkeep(deps, env, info, perform_data)
        }
        ExecuteMsg::RawFulfillRandomWords {
            request_id,
            random_words,
        } => execute::fulfill_random_words(deps, env, info, request_id, random_words),
        ExecuteMsg::ExpireDraw {} => execute::expire_draw(deps, env, info),
    }
}

#[entry_point]
pub fn reply(deps: DepsMut, env: Env, msg: Reply) -> Result<Response, ContractError> {
    match msg.id {
        execute::REQUEST_RANDOMNESS_REPLY_ID => execute::randomness_requested(deps, env, msg),
        id => Err(ContractError::UnknownReplyId { id }),
    }
}

#[entry_point]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => query::query_config(deps),
        QueryMsg::State {} => query::query_state(deps),
        QueryMsg::CheckUpkeep { check_data } => query::query_check_upkeep(deps, env, check_data),
        QueryMsg::LotteryState {} => query::query_lottery_state(deps),
        QueryMsg::EntranceFee {} => query::query_entrance_fee(deps),
        QueryMsg::Interval {} => query::query_interval(deps),
        QueryMsg::RecentWinner {} => query::query_recent_winner(deps),
        QueryMsg::LatestTimestamp {} => query::query_latest_timestamp(deps),
        QueryMsg::Player { index } => query::query_player(deps, index),
        QueryMsg::NumberOfPlayers {} => query::query_number_of_players(deps),
        QueryMsg::PendingRequest {} => query::query_pending_request(deps),
        QueryMsg::NumWords {} => query::query_num_words(deps),
        QueryMsg::RequestConfirmations {} => query::query_request_confirmations(deps),
        QueryMsg::Round { round } => query::query_round(deps, round),
        QueryMsg::RoundHistory { start_after, limit } => {
            query::query_round_history(deps, start_after, limit)
        }
    }
}

#[entry_point]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    let stored = get_contract_version(deps.storage)?;
    if stored.contract != CONTRACT_NAME {
        return Err(ContractError::Unauthorized {
            reason: "Cannot migrate from different contract type".to_string(),
        });
    }

    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    Ok(Response::new()
        .add_attribute("action", "migrate")
        .add_attribute("from_version", stored.version)
        .add_attribute("to_version", CONTRACT_VERSION))
}
