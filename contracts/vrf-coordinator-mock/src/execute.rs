use cosmwasm_std::{
    to_json_binary, Addr, DepsMut, Env, Event, MessageInfo, Response, Storage, Uint128, Uint256,
    WasmMsg,
};
use verilot_common::vrf::{
    MAX_CALLBACK_GAS_LIMIT, RANDOM_WORDS_REQUESTED_EVENT, REQUEST_ID_ATTRIBUTE,
};
use verilot_common::{derive_random_words, VrfConsumerMsg};

use crate::error::ContractError;
use crate::state::{
    RandomnessRequest, Subscription, CONFIG, NEXT_REQUEST_ID, NEXT_SUBSCRIPTION_ID, REQUESTS,
    SUBSCRIPTIONS,
};

pub const MAX_CONSUMERS: usize = 100;
pub const MAX_NUM_WORDS: u32 = 500;
pub const MAX_REQUEST_CONFIRMATIONS: u16 = 200;

/// Parameters for a randomness request.
pub struct RequestParams {
    pub key_hash: String,
    pub sub_id: u64,
    pub request_confirmations: u16,
    pub callback_gas_limit: u32,
    pub num_words: u32,
}

fn load_owned_subscription(
    storage: &dyn Storage,
    sub_id: u64,
    sender: &Addr,
) -> Result<Subscription, ContractError> {
    let subscription = SUBSCRIPTIONS
        .may_load(storage, sub_id)?
        .ok_or(ContractError::InvalidSubscription { sub_id })?;
    if subscription.owner != *sender {
        return Err(ContractError::Unauthorized {
            reason: "only the subscription owner can manage consumers".to_string(),
        });
    }
    Ok(subscription)
}

pub fn create_subscription(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    let sub_id = NEXT_SUBSCRIPTION_ID.load(deps.storage)?;
    NEXT_SUBSCRIPTION_ID.save(deps.storage, &(sub_id + 1))?;

    let subscription = Subscription {
        id: sub_id,
        owner: info.sender.clone(),
        balance: Uint128::zero(),
        consumers: vec![],
    };
    SUBSCRIPTIONS.save(deps.storage, sub_id, &subscription)?;

    Ok(Response::new()
        .add_attribute("action", "create_subscription")
        .add_attribute("sub_id", sub_id.to_string())
        .add_event(
            Event::new("vrf_subscription_created")
                .add_attribute("sub_id", sub_id.to_string())
                .add_attribute("owner", info.sender.to_string()),
        ))
}

pub fn fund_subscription(
    deps: DepsMut,
    _env: Env,
    _info: MessageInfo,
    sub_id: u64,
    amount: Uint128,
) -> Result<Response, ContractError> {
    let mut subscription = SUBSCRIPTIONS
        .may_load(deps.storage, sub_id)?
        .ok_or(ContractError::InvalidSubscription { sub_id })?;
    let old_balance = subscription.balance;
    subscription.balance = old_balance.checked_add(amount)?;
    SUBSCRIPTIONS.save(deps.storage, sub_id, &subscription)?;

    Ok(Response::new()
        .add_attribute("action", "fund_subscription")
        .add_event(
            Event::new("vrf_subscription_funded")
                .add_attribute("sub_id", sub_id.to_string())
                .add_attribute("old_balance", old_balance.to_string())
                .add_attribute("new_balance", subscription.balance.to_string()),
        ))
}

pub fn add_consumer(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    sub_id: u64,
    consumer: String,
) -> Result<Response, ContractError> {
    let consumer = deps.api.addr_validate(&consumer)?;
    let mut subscription = load_owned_subscription(deps.storage, sub_id, &info.sender)?;

    if subscription.consumers.contains(&consumer) {
        return Ok(Response::new()
            .add_attribute("action", "add_consumer")
            .add_attribute("consumer", consumer.to_string())
            .add_attribute("already_added", "true"));
    }
    if subscription.consumers.len() >= MAX_CONSUMERS {
        return Err(ContractError::TooManyConsumers {
            sub_id,
            max: MAX_CONSUMERS,
        });
    }

    subscription.consumers.push(consumer.clone());
    SUBSCRIPTIONS.save(deps.storage, sub_id, &subscription)?;

    Ok(Response::new()
        .add_attribute("action", "add_consumer")
        .add_attribute("consumer", consumer.to_string())
        .add_event(
            Event::new("vrf_consumer_added")
                .add_attribute("sub_id", sub_id.to_string())
                .add_attribute("consumer", consumer.to_string()),
        ))
}

pub fn remove_consumer(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    sub_id: u64,
    consumer: String,
) -> Result<Response, ContractError> {
    let consumer = deps.api.addr_validate(&consumer)?;
    let mut subscription = load_owned_subscription(deps.storage, sub_id, &info.sender)?;

    if !subscription.consumers.contains(&consumer) {
        return Err(ContractError::InvalidConsumer {
            sub_id,
            consumer: consumer.to_string(),
        });
    }
    subscription.consumers.retain(|c| *c != consumer);
    SUBSCRIPTIONS.save(deps.storage, sub_id, &subscription)?;

    Ok(Response::new()
        .add_attribute("action", "remove_consumer")
        .add_event(
            Event::new("vrf_consumer_removed")
                .add_attribute("sub_id", sub_id.to_string())
                .add_attribute("consumer", consumer.to_string()),
        ))
}

/// Register a randomness request from a subscription consumer and assign
/// it the next request id.
pub fn request_random_words(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    params: RequestParams,
) -> Result<Response, ContractError> {
    let subscription = SUBSCRIPTIONS
        .may_load(deps.storage, params.sub_id)?
        .ok_or(ContractError::InvalidSubscription {
            sub_id: params.sub_id,
        })?;
    if !subscription.consumers.contains(&info.sender) {
        return Err(ContractError::InvalidConsumer {
            sub_id: params.sub_id,
            consumer: info.sender.to_string(),
        });
    }
    if params.request_confirmations > MAX_REQUEST_CONFIRMATIONS {
        return Err(ContractError::InvalidRequestConfirmations {
            got: params.request_confirmations,
            max: MAX_REQUEST_CONFIRMATIONS,
        });
    }
    if params.callback_gas_limit > MAX_CALLBACK_GAS_LIMIT {
        return Err(ContractError::GasLimitTooBig {
            got: params.callback_gas_limit,
            max: MAX_CALLBACK_GAS_LIMIT,
        });
    }
    if params.num_words == 0 || params.num_words > MAX_NUM_WORDS {
        return Err(ContractError::InvalidNumWords {
            got: params.num_words,
            max: MAX_NUM_WORDS,
        });
    }

    let request_id = NEXT_REQUEST_ID.load(deps.storage)?;
    NEXT_REQUEST_ID.save(deps.storage, &(request_id + 1))?;

    let request = RandomnessRequest {
        request_id,
        sub_id: params.sub_id,
        consumer: info.sender.clone(),
        key_hash: params.key_hash,
        request_confirmations: params.request_confirmations,
        callback_gas_limit: params.callback_gas_limit,
        num_words: params.num_words,
        requested_at: env.block.time,
        requested_height: env.block.height,
    };
    REQUESTS.save(deps.storage, request_id, &request)?;

    Ok(Response::new()
        .add_attribute("action", "request_random_words")
        .add_attribute("request_id", request_id.to_string())
        .add_event(
            Event::new(RANDOM_WORDS_REQUESTED_EVENT)
                .add_attribute(REQUEST_ID_ATTRIBUTE, request_id.to_string())
                .add_attribute("sub_id", request.sub_id.to_string())
                .add_attribute("sender", info.sender.to_string())
                .add_attribute("key_hash", request.key_hash)
                .add_attribute(
                    "request_confirmations",
                    request.request_confirmations.to_string(),
                )
                .add_attribute("callback_gas_limit", request.callback_gas_limit.to_string())
                .add_attribute("num_words", request.num_words.to_string()),
        ))
}

/// Fulfill with words derived from the request id.
pub fn fulfill_random_words(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    request_id: u64,
    consumer: String,
) -> Result<Response, ContractError> {
    fulfill(deps, env, info, request_id, consumer, vec![])
}

/// Fulfill with caller-chosen words, for tests that need a specific outcome.
pub fn fulfill_random_words_with_override(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    request_id: u64,
    consumer: String,
    words: Vec<Uint256>,
) -> Result<Response, ContractError> {
    fulfill(deps, env, info, request_id, consumer, words)
}

/// Charge the subscription, drop the request and call back the consumer.
/// The callback runs as a plain message, so a consumer failure reverts the
/// fulfillment too.
fn fulfill(
    deps: DepsMut,
    _env: Env,
    _info: MessageInfo,
    request_id: u64,
    consumer: String,
    words: Vec<Uint256>,
) -> Result<Response, ContractError> {
    let consumer = deps.api.addr_validate(&consumer)?;
    let request = REQUESTS
        .may_load(deps.storage, request_id)?
        .ok_or(ContractError::NonexistentRequest { request_id })?;
    if request.consumer != consumer {
        return Err(ContractError::InvalidConsumer {
            sub_id: request.sub_id,
            consumer: consumer.to_string(),
        });
    }

    let random_words = if words.is_empty() {
        derive_random_words(request_id, request.num_words)
    } else {
        if words.len() != request.num_words as usize {
            return Err(ContractError::InvalidRandomWords {
                expected: request.num_words,
                got: words.len(),
            });
        }
        words
    };

    let config = CONFIG.load(deps.storage)?;
    let payment = config
        .gas_price
        .checked_mul(Uint128::from(request.callback_gas_limit))?
        .checked_add(config.base_fee)?;

    let mut subscription = SUBSCRIPTIONS
        .may_load(deps.storage, request.sub_id)?
        .ok_or(ContractError::InvalidSubscription {
            sub_id: request.sub_id,
        })?;
    if subscription.balance < payment {
        return Err(ContractError::InsufficientBalance {
            needed: payment,
            available: subscription.balance,
        });
    }
    subscription.balance -= payment;
    SUBSCRIPTIONS.save(deps.storage, request.sub_id, &subscription)?;
    REQUESTS.remove(deps.storage, request_id);

    let output_seed = random_words
        .first()
        .map(|w| hex::encode(w.to_be_bytes()))
        .unwrap_or_default();

    let callback = WasmMsg::Execute {
        contract_addr: consumer.to_string(),
        msg: to_json_binary(&VrfConsumerMsg::RawFulfillRandomWords {
            request_id,
            random_words,
        })?,
        funds: vec![],
    };

    Ok(Response::new()
        .add_message(callback)
        .add_attribute("action", "fulfill_random_words")
        .add_attribute("request_id", request_id.to_string())
        .add_event(
            Event::new("vrf_random_words_fulfilled")
                .add_attribute("request_id", request_id.to_string())
                .add_attribute("sub_id", request.sub_id.to_string())
                .add_attribute("consumer", consumer.to_string())
                .add_attribute("output_seed", output_seed)
                .add_attribute("payment", payment.to_string()),
        ))
}
