use cosmwasm_std::Uint256;
use sha2::{Digest, Sha256};

/// Derive `num_words` pseudo-random words for a request.
///
/// `word_i = uint256_be( sha256( request_id_u64_be || i_u32_be ) )`
///
/// Deterministic, so only suitable for development coordinators and tests.
pub fn derive_random_words(request_id: u64, num_words: u32) -> Vec<Uint256> {
    (0..num_words)
        .map(|i| {
            let mut hasher = Sha256::new();
            hasher.update(request_id.to_be_bytes());
            hasher.update(i.to_be_bytes());
            let digest: [u8; 32] = hasher.finalize().into();
            Uint256::from_be_bytes(digest)
        })
        .collect()
}

/// Pick the winning position: `word mod num_players`.
/// Returns `None` when there are no players.
pub fn winner_index(word: Uint256, num_players: u32) -> Option<u32> {
    if num_players == 0 {
        return None;
    }
    let index = word % Uint256::from(num_players as u128);
    // index < num_players, so only the low four bytes can be set
    let bytes = index.to_be_bytes();
    Some(u32::from_be_bytes([bytes[28], bytes[29], bytes[30], bytes[31]]))
}
