use cosmwasm_std::{OverflowError, StdError, Uint128};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{0}")]
    Overflow(#[from] OverflowError),

    #[error("unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("invalid subscription: {sub_id}")]
    InvalidSubscription { sub_id: u64 },

    #[error("{consumer} is not a consumer of subscription {sub_id}")]
    InvalidConsumer { sub_id: u64, consumer: String },

    #[error("subscription {sub_id} already has the maximum of {max} consumers")]
    TooManyConsumers { sub_id: u64, max: usize },

    #[error("nonexistent request")]
    NonexistentRequest { request_id: u64 },

    #[error("insufficient subscription balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Uint128, available: Uint128 },

    #[error("num_words must be between 1 and {max}, got {got}")]
    InvalidNumWords { got: u32, max: u32 },

    #[error("callback gas limit {got} exceeds maximum {max}")]
    GasLimitTooBig { got: u32, max: u32 },

    #[error("request confirmations {got} exceeds maximum {max}")]
    InvalidRequestConfirmations { got: u16, max: u16 },

    #[error("expected {expected} random words, got {got}")]
    InvalidRandomWords { expected: u32, got: usize },
}
