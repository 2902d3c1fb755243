use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Timestamp, Uint128};
use cw_storage_plus::{Item, Map};

pub const CONFIG: Item<CoordinatorConfig> = Item::new("config");
pub const NEXT_SUBSCRIPTION_ID: Item<u64> = Item::new("next_subscription_id");
pub const NEXT_REQUEST_ID: Item<u64> = Item::new("next_request_id");
pub const SUBSCRIPTIONS: Map<u64, Subscription> = Map::new("subscriptions");
/// Outstanding requests keyed by request id. Removed once fulfilled.
pub const REQUESTS: Map<u64, RandomnessRequest> = Map::new("requests");

#[cw_serde]
pub struct CoordinatorConfig {
    /// Flat fee charged per fulfillment
    pub base_fee: Uint128,
    /// Price per unit of callback gas
    pub gas_price: Uint128,
}

#[cw_serde]
pub struct Subscription {
    pub id: u64,
    pub owner: Addr,
    pub balance: Uint128,
    pub consumers: Vec<Addr>,
}

#[cw_serde]
pub struct RandomnessRequest {
    pub request_id: u64,
    pub sub_id: u64,
    pub consumer: Addr,
    pub key_hash: String,
    pub request_confirmations: u16,
    pub callback_gas_limit: u32,
    pub num_words: u32,
    pub requested_at: Timestamp,
    pub requested_height: u64,
}
