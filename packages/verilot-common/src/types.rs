use cosmwasm_schema::cw_serde;

/// Where the current round is in its lifecycle.
#[cw_serde]
pub enum LotteryStatus {
    /// Accepting entries; a draw may be requested once eligible.
    Open,
    /// A randomness request is outstanding. Entries are rejected until the
    /// coordinator calls back.
    Calculating,
}

impl LotteryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LotteryStatus::Open => "open",
            LotteryStatus::Calculating => "calculating",
        }
    }
}
