use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Timestamp, Uint128, Uint256};
use cw_storage_plus::{Item, Map};
use verilot_common::LotteryStatus;

pub const CONFIG: Item<LotteryConfig> = Item::new("config");
pub const LOTTERY_STATE: Item<LotteryStateInfo> = Item::new("lottery_state");
/// Entrants keyed by (round, position). A round's entries are removed once
/// its winner is paid.
pub const PLAYERS: Map<(u64, u32), Addr> = Map::new("players");
pub const ROUNDS: Map<u64, RoundResult> = Map::new("rounds");

/// Fixed at instantiate.
#[cw_serde]
pub struct LotteryConfig {
    pub vrf_coordinator: Addr,
    /// Denom entries are paid in and the prize is paid out in
    pub denom: String,
    pub entrance_fee: Uint128,
    /// Minimum seconds between the last draw and the next draw request
    pub interval_seconds: u64,
    /// Gas lane passed through to the coordinator
    pub key_hash: String,
    pub subscription_id: u64,
    pub callback_gas_limit: u32,
    pub request_confirmations: u16,
    pub num_words: u32,
    /// Seconds after which a pending draw may be expired. `None` disables expiry.
    pub draw_timeout_seconds: Option<u64>,
}

#[cw_serde]
pub struct LotteryStateInfo {
    pub status: LotteryStatus,
    /// Current round number, starting at 1
    pub round: u64,
    pub num_players: u32,
    pub last_draw_time: Timestamp,
    /// Set once the coordinator has acknowledged the request
    pub pending_request_id: Option<u64>,
    pub draw_requested_at: Option<Timestamp>,
    pub recent_winner: Option<Addr>,
}

#[cw_serde]
pub struct RoundResult {
    pub round: u64,
    pub request_id: u64,
    pub winner: Addr,
    pub prize: Uint128,
    pub random_word: Uint256,
    pub num_players: u32,
    pub completed_at: Timestamp,
}
