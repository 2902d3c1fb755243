use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Uint128, Uint256};

use crate::state::{CoordinatorConfig, RandomnessRequest, Subscription};

#[cw_serde]
pub struct InstantiateMsg {
    pub base_fee: Uint128,
    pub gas_price: Uint128,
}

#[cw_serde]
pub enum ExecuteMsg {
    CreateSubscription {},
    /// Credit a subscription. Bookkeeping only, no funds move.
    FundSubscription { sub_id: u64, amount: Uint128 },
    /// Subscription owner only.
    AddConsumer { sub_id: u64, consumer: String },
    /// Subscription owner only.
    RemoveConsumer { sub_id: u64, consumer: String },
    /// Same shape as the consumer-facing coordinator message.
    RequestRandomWords {
        key_hash: String,
        sub_id: u64,
        request_confirmations: u16,
        callback_gas_limit: u32,
        num_words: u32,
    },
    /// Answer a request with words derived from the request id.
    FulfillRandomWords { request_id: u64, consumer: String },
    /// Answer a request with the given words. Empty `words` derives them.
    FulfillRandomWordsWithOverride {
        request_id: u64,
        consumer: String,
        words: Vec<Uint256>,
    },
}

#[cw_serde]
pub struct MigrateMsg {}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(CoordinatorConfig)]
    Config {},

    #[returns(Option<Subscription>)]
    Subscription { sub_id: u64 },

    #[returns(Option<RandomnessRequest>)]
    Request { request_id: u64 },

    #[returns(bool)]
    ConsumerIsAdded { sub_id: u64, consumer: String },
}
