use cosmwasm_std::{Deps, Env, StdResult, Uint128};
use verilot_common::LotteryStatus;

use crate::state::{LotteryConfig, LotteryStateInfo};

/// Draw eligibility at the current block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upkeep {
    pub is_open: bool,
    pub time_passed: bool,
    pub has_players: bool,
    pub has_balance: bool,
    pub balance: Uint128,
    pub seconds_since_last_draw: u64,
}

impl Upkeep {
    pub fn needed(&self) -> bool {
        self.is_open && self.time_passed && self.has_players && self.has_balance
    }
}

/// Evaluate the four draw conditions. Reads only; safe to call from queries.
pub fn check_upkeep(
    deps: Deps,
    env: &Env,
    config: &LotteryConfig,
    state: &LotteryStateInfo,
) -> StdResult<Upkeep> {
    let balance = deps
        .querier
        .query_balance(&env.contract.address, &config.denom)?
        .amount;
    let seconds_since_last_draw = env
        .block
        .time
        .seconds()
        .saturating_sub(state.last_draw_time.seconds());

    Ok(Upkeep {
        is_open: state.status == LotteryStatus::Open,
        time_passed: seconds_since_last_draw >= config.interval_seconds,
        has_players: state.num_players > 0,
        has_balance: !balance.is_zero(),
        balance,
        seconds_since_last_draw,
    })
}
