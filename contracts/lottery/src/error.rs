use cosmwasm_std::{StdError, Uint128};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("lottery is not open")]
    NotOpen,

    #[error("insufficient payment: entrance fee is {fee}{denom}, sent {sent}{denom}")]
    InsufficientPayment {
        fee: Uint128,
        sent: Uint128,
        denom: String,
    },

    #[error("only {denom} is accepted, got {got}")]
    InvalidFunds { denom: String, got: String },

    #[error("draw not ready: status={status}, balance={balance}, players={num_players}, seconds_since_last_draw={seconds_since_last_draw}")]
    DrawNotReady {
        status: String,
        balance: Uint128,
        num_players: u32,
        seconds_since_last_draw: u64,
    },

    #[error("unknown randomness request {request_id}")]
    UnknownRequest { request_id: u64 },

    #[error("randomness callback carried no words")]
    NoRandomWords,

    #[error("round has no players")]
    NoPlayers,

    #[error("coordinator reply did not include a request id")]
    MissingRequestId,

    #[error("unknown reply id {id}")]
    UnknownReplyId { id: u64 },

    #[error("draw expiry is disabled")]
    ExpiryDisabled,

    #[error("no draw is in progress")]
    NoPendingDraw,

    #[error("pending draw cannot be expired before {expires_at}")]
    DrawNotExpired { expires_at: u64 },

    #[error("invalid config: {reason}")]
    InvalidConfig { reason: String },
}
