pub mod randomness;
pub mod types;
pub mod vrf;

pub use randomness::{derive_random_words, winner_index};
pub use types::LotteryStatus;
pub use vrf::{VrfConsumerMsg, VrfCoordinatorMsg};
