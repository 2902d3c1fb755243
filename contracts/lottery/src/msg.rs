use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Binary, Timestamp, Uint128, Uint256};
use verilot_common::LotteryStatus;

use crate::state::{LotteryConfig, LotteryStateInfo, RoundResult};

#[cw_serde]
pub struct InstantiateMsg {
    pub vrf_coordinator: String,
    pub denom: String,
    pub entrance_fee: Uint128,
    pub interval_seconds: u64,
    /// Gas lane (key hash) of the coordinator
    pub key_hash: String,
    pub subscription_id: u64,
    pub callback_gas_limit: u32,
    /// Defaults to 3
    pub request_confirmations: Option<u16>,
    /// Leave unset to keep a pending draw open until the coordinator answers.
    pub draw_timeout_seconds: Option<u64>,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Enter the current round. Attach at least the entrance fee.
    EnterLottery {},
    /// Request a draw. Normally sent by a keeper after `CheckUpkeep` says so.
    PerformUpkeep { perform_data: Binary },
    /// Randomness callback. Coordinator only.
    RawFulfillRandomWords {
        request_id: u64,
        random_words: Vec<Uint256>,
    },
    /// Return a draw that outlived `draw_timeout_seconds` to Open. Anyone can call.
    ExpireDraw {},
}

#[cw_serde]
pub struct MigrateMsg {}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(LotteryConfig)]
    Config {},
    #[returns(LotteryStateInfo)]
    State {},
    #[returns(CheckUpkeepResponse)]
    CheckUpkeep { check_data: Binary },
    #[returns(LotteryStatus)]
    LotteryState {},
    #[returns(Uint128)]
    EntranceFee {},
    #[returns(u64)]
    Interval {},
    #[returns(Option<Addr>)]
    RecentWinner {},
    #[returns(Timestamp)]
    LatestTimestamp {},
    #[returns(Addr)]
    Player { index: u32 },
    #[returns(u32)]
    NumberOfPlayers {},
    #[returns(Option<u64>)]
    PendingRequest {},
    #[returns(u32)]
    NumWords {},
    #[returns(u16)]
    RequestConfirmations {},
    #[returns(Option<RoundResult>)]
    Round { round: u64 },
    #[returns(RoundHistoryResponse)]
    RoundHistory {
        start_after: Option<u64>,
        limit: Option<u32>,
    },
}

#[cw_serde]
pub struct CheckUpkeepResponse {
    pub upkeep_needed: bool,
    pub perform_data: Binary,
    pub is_open: bool,
    pub time_passed: bool,
    pub has_players: bool,
    pub has_balance: bool,
}

#[cw_serde]
pub struct RoundHistoryResponse {
    pub rounds: Vec<RoundResult>,
}
