use cosmwasm_schema::cw_serde;
use cosmwasm_std::Uint256;

/// Event emitted by the coordinator when it accepts a randomness request.
pub const RANDOM_WORDS_REQUESTED_EVENT: &str = "vrf_random_words_requested";
/// Attribute on [`RANDOM_WORDS_REQUESTED_EVENT`] carrying the assigned id.
pub const REQUEST_ID_ATTRIBUTE: &str = "request_id";
/// Attribute wasmd adds to every contract event, naming the emitter.
pub const CONTRACT_ADDRESS_ATTRIBUTE: &str = "_contract_address";

/// Largest callback gas limit the coordinator accepts on a request.
pub const MAX_CALLBACK_GAS_LIMIT: u32 = 2_500_000;

/// Message a consumer sends to the coordinator.
#[cw_serde]
pub enum VrfCoordinatorMsg {
    RequestRandomWords {
        /// Gas lane identifying the price tier of the request.
        key_hash: String,
        sub_id: u64,
        request_confirmations: u16,
        callback_gas_limit: u32,
        num_words: u32,
    },
}

/// Callback the coordinator sends to the consumer that made a request.
#[cw_serde]
pub enum VrfConsumerMsg {
    RawFulfillRandomWords {
        request_id: u64,
        random_words: Vec<Uint256>,
    },
}

/// Event type of a custom contract event as seen from a submessage reply.
/// wasmd namespaces custom events with a `wasm-` prefix.
pub fn wasm_event_type(ty: &str) -> String {
    format!("wasm-{ty}")
}
