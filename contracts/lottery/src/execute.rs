use cosmwasm_std::{
    coins, to_json_binary, Addr, BankMsg, Binary, DepsMut, Env, Event, MessageInfo, Reply,
    Response, StdError, SubMsg, Uint128, Uint256, WasmMsg,
};
use verilot_common::vrf::{
    wasm_event_type, CONTRACT_ADDRESS_ATTRIBUTE, MAX_CALLBACK_GAS_LIMIT,
    RANDOM_WORDS_REQUESTED_EVENT, REQUEST_ID_ATTRIBUTE,
};
use verilot_common::{winner_index, LotteryStatus, VrfCoordinatorMsg};

use crate::error::ContractError;
use crate::state::{LotteryConfig, RoundResult, CONFIG, LOTTERY_STATE, PLAYERS, ROUNDS};
use crate::upkeep::check_upkeep;

pub const REQUEST_RANDOMNESS_REPLY_ID: u64 = 1;

pub const DEFAULT_REQUEST_CONFIRMATIONS: u16 = 3;
pub const MAX_REQUEST_CONFIRMATIONS: u16 = 200;
pub const NUM_WORDS: u32 = 1;

/// Validate config values at instantiation.
pub fn validate_config(config: &LotteryConfig) -> Result<(), ContractError> {
    if config.denom.is_empty() {
        return Err(ContractError::InvalidConfig {
            reason: "denom must not be empty".to_string(),
        });
    }
    if config.interval_seconds == 0 {
        return Err(ContractError::InvalidConfig {
            reason: "interval_seconds must be greater than zero".to_string(),
        });
    }
    if config.key_hash.is_empty() {
        return Err(ContractError::InvalidConfig {
            reason: "key_hash must not be empty".to_string(),
        });
    }
    if config.callback_gas_limit == 0 {
        return Err(ContractError::InvalidConfig {
            reason: "callback_gas_limit must be greater than zero".to_string(),
        });
    }
    if config.callback_gas_limit > MAX_CALLBACK_GAS_LIMIT {
        return Err(ContractError::InvalidConfig {
            reason: format!("callback_gas_limit must be at most {MAX_CALLBACK_GAS_LIMIT}"),
        });
    }
    if config.request_confirmations > MAX_REQUEST_CONFIRMATIONS {
        return Err(ContractError::InvalidConfig {
            reason: format!("request_confirmations must be at most {MAX_REQUEST_CONFIRMATIONS}"),
        });
    }
    if config.draw_timeout_seconds == Some(0) {
        return Err(ContractError::InvalidConfig {
            reason: "draw_timeout_seconds must be greater than zero when set".to_string(),
        });
    }
    Ok(())
}

/// Sum of the attached coins in `denom`. Any other denom is rejected.
fn paid_amount(info: &MessageInfo, denom: &str) -> Result<Uint128, ContractError> {
    let mut amount = Uint128::zero();
    for coin in &info.funds {
        if coin.denom != denom {
            return Err(ContractError::InvalidFunds {
                denom: denom.to_string(),
                got: coin.denom.clone(),
            });
        }
        amount += coin.amount;
    }
    Ok(amount)
}

/// Enter the current round with at least the entrance fee attached.
pub fn enter_lottery(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let mut state = LOTTERY_STATE.load(deps.storage)?;

    if state.status != LotteryStatus::Open {
        return Err(ContractError::NotOpen);
    }

    let payment = paid_amount(&info, &config.denom)?;
    if payment < config.entrance_fee {
        return Err(ContractError::InsufficientPayment {
            fee: config.entrance_fee,
            sent: payment,
            denom: config.denom,
        });
    }

    PLAYERS.save(deps.storage, (state.round, state.num_players), &info.sender)?;
    state.num_players += 1;
    LOTTERY_STATE.save(deps.storage, &state)?;

    Ok(Response::new()
        .add_attribute("action", "enter_lottery")
        .add_attribute("player", info.sender.to_string())
        .add_event(
            Event::new("lottery_entered")
                .add_attribute("player", info.sender.to_string())
                .add_attribute("round", state.round.to_string())
                .add_attribute("amount", payment.to_string())
                .add_attribute("num_players", state.num_players.to_string()),
        ))
}

/// Request a draw. Anyone can call; eligibility is checked again at
/// execution time.
///
/// The coordinator assigns the request id. It is read back from the
/// coordinator's event in the submessage reply (see [`randomness_requested`]),
/// so the pending id is stored in the same transaction.
pub fn perform_upkeep(
    deps: DepsMut,
    env: Env,
    _info: MessageInfo,
    _perform_data: Binary,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let mut state = LOTTERY_STATE.load(deps.storage)?;

    let upkeep = check_upkeep(deps.as_ref(), &env, &config, &state)?;
    if !upkeep.needed() {
        return Err(ContractError::DrawNotReady {
            status: state.status.as_str().to_string(),
            balance: upkeep.balance,
            num_players: state.num_players,
            seconds_since_last_draw: upkeep.seconds_since_last_draw,
        });
    }

    state.status = LotteryStatus::Calculating;
    state.pending_request_id = None;
    state.draw_requested_at = Some(env.block.time);
    LOTTERY_STATE.save(deps.storage, &state)?;

    let request_msg = WasmMsg::Execute {
        contract_addr: config.vrf_coordinator.to_string(),
        msg: to_json_binary(&VrfCoordinatorMsg::RequestRandomWords {
            key_hash: config.key_hash,
            sub_id: config.subscription_id,
            request_confirmations: config.request_confirmations,
            callback_gas_limit: config.callback_gas_limit,
            num_words: config.num_words,
        })?,
        funds: vec![],
    };

    Ok(Response::new()
        .add_submessage(SubMsg::reply_on_success(
            request_msg,
            REQUEST_RANDOMNESS_REPLY_ID,
        ))
        .add_attribute("action", "perform_upkeep")
        .add_attribute("round", state.round.to_string())
        .add_attribute("num_players", state.num_players.to_string())
        .add_attribute("prize", upkeep.balance.to_string()))
}

/// Find the request id in the coordinator's `vrf_random_words_requested`
/// event. Events from any other emitter are ignored.
fn find_request_id(events: &[Event], coordinator: &Addr) -> Option<u64> {
    let event_type = wasm_event_type(RANDOM_WORDS_REQUESTED_EVENT);
    events
        .iter()
        .filter(|e| e.ty == event_type)
        .filter(|e| {
            e.attributes
                .iter()
                .any(|a| a.key == CONTRACT_ADDRESS_ATTRIBUTE && a.value == coordinator.as_str())
        })
        .find_map(|e| {
            e.attributes
                .iter()
                .find(|a| a.key == REQUEST_ID_ATTRIBUTE)
                .and_then(|a| a.value.parse::<u64>().ok())
        })
}

/// Reply to the `RequestRandomWords` submessage: record the pending request.
pub fn randomness_requested(
    deps: DepsMut,
    _env: Env,
    reply: Reply,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let result = reply.result.into_result().map_err(StdError::generic_err)?;

    let request_id = find_request_id(&result.events, &config.vrf_coordinator)
        .ok_or(ContractError::MissingRequestId)?;

    let mut state = LOTTERY_STATE.load(deps.storage)?;
    if state.status != LotteryStatus::Calculating {
        return Err(ContractError::NoPendingDraw);
    }
    state.pending_request_id = Some(request_id);
    LOTTERY_STATE.save(deps.storage, &state)?;

    Ok(Response::new()
        .add_attribute("action", "randomness_requested")
        .add_attribute("request_id", request_id.to_string())
        .add_event(
            Event::new("lottery_draw_requested")
                .add_attribute("request_id", request_id.to_string())
                .add_attribute("round", state.round.to_string())
                .add_attribute("num_players", state.num_players.to_string()),
        ))
}

/// Randomness callback. Coordinator only.
///
/// 1. Check the id matches the outstanding request
/// 2. winner = players[random_words[0] % num_players]
/// 3. Send the whole balance to the winner
/// 4. Record the round, clear its entrants and open the next one
///
/// A failed payout reverts the transaction, leaving the round Calculating with
/// its players intact.
pub fn fulfill_random_words(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    request_id: u64,
    random_words: Vec<Uint256>,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.vrf_coordinator {
        return Err(ContractError::Unauthorized {
            reason: "only the vrf coordinator can fulfill randomness".to_string(),
        });
    }

    let mut state = LOTTERY_STATE.load(deps.storage)?;
    if state.status != LotteryStatus::Calculating
        || state.pending_request_id != Some(request_id)
    {
        return Err(ContractError::UnknownRequest { request_id });
    }

    let random_word = *random_words.first().ok_or(ContractError::NoRandomWords)?;
    let index = winner_index(random_word, state.num_players).ok_or(ContractError::NoPlayers)?;
    let winner = PLAYERS.load(deps.storage, (state.round, index))?;
    for position in 0..state.num_players {
        PLAYERS.remove(deps.storage, (state.round, position));
    }

    let prize = deps
        .querier
        .query_balance(&env.contract.address, &config.denom)?
        .amount;

    let round = RoundResult {
        round: state.round,
        request_id,
        winner: winner.clone(),
        prize,
        random_word,
        num_players: state.num_players,
        completed_at: env.block.time,
    };
    ROUNDS.save(deps.storage, state.round, &round)?;

    state.status = LotteryStatus::Open;
    state.round += 1;
    state.num_players = 0;
    state.last_draw_time = env.block.time;
    state.pending_request_id = None;
    state.draw_requested_at = None;
    state.recent_winner = Some(winner.clone());
    LOTTERY_STATE.save(deps.storage, &state)?;

    let mut response = Response::new();
    if !prize.is_zero() {
        response = response.add_message(BankMsg::Send {
            to_address: winner.to_string(),
            amount: coins(prize.u128(), &config.denom),
        });
    }

    Ok(response
        .add_attribute("action", "fulfill_random_words")
        .add_attribute("request_id", request_id.to_string())
        .add_attribute("winner", winner.to_string())
        .add_attribute("prize", prize.to_string())
        .add_event(
            Event::new("lottery_winner_picked")
                .add_attribute("winner", winner.to_string())
                .add_attribute("round", round.round.to_string())
                .add_attribute("request_id", request_id.to_string())
                .add_attribute("winner_index", index.to_string())
                .add_attribute("num_players", round.num_players.to_string())
                .add_attribute("prize", prize.to_string())
                .add_attribute("denom", config.denom)
                .add_attribute("random_word", random_word.to_string())
                .add_attribute("timestamp", env.block.time.seconds().to_string()),
        ))
}

/// Give up on a draw whose callback never arrived. Anyone can call once
/// `draw_timeout_seconds` have passed since the request.
/// Players and balance carry over; the next draw needs a fresh request.
pub fn expire_draw(
    deps: DepsMut,
    env: Env,
    _info: MessageInfo,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let timeout = config
        .draw_timeout_seconds
        .ok_or(ContractError::ExpiryDisabled)?;

    let mut state = LOTTERY_STATE.load(deps.storage)?;
    if state.status != LotteryStatus::Calculating {
        return Err(ContractError::NoPendingDraw);
    }

    let requested_at = state.draw_requested_at.unwrap_or(state.last_draw_time);
    let expires_at = requested_at.plus_seconds(timeout);
    if env.block.time < expires_at {
        return Err(ContractError::DrawNotExpired {
            expires_at: expires_at.seconds(),
        });
    }

    let expired_request = state.pending_request_id.take();
    state.status = LotteryStatus::Open;
    state.draw_requested_at = None;
    state.last_draw_time = env.block.time;
    LOTTERY_STATE.save(deps.storage, &state)?;

    let request_id = expired_request
        .map(|id| id.to_string())
        .unwrap_or_else(|| "none".to_string());

    Ok(Response::new()
        .add_attribute("action", "expire_draw")
        .add_attribute("request_id", request_id.clone())
        .add_event(
            Event::new("lottery_draw_expired")
                .add_attribute("request_id", request_id)
                .add_attribute("round", state.round.to_string())
                .add_attribute("num_players", state.num_players.to_string()),
        ))
}
