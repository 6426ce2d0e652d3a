//! Domain-separated random streams derived from one game seed.
//!
//! Deck shuffling and CPU decisions draw from independent ChaCha20
//! streams, so adding a CPU seat never changes the order of the cards.
use hmac::{Hmac, Mac};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use sha2::Sha256;

/// Stream used to mint relics and shuffle the deck every round.
pub const DECK_STREAM: &[u8] = b"deck";
/// Stream feeding the CPU borderline draws.
pub const CPU_STREAM: &[u8] = b"cpu";

/// Derive the seed of a named stream from the user-visible seed.
#[must_use]
pub fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()).map_or(user_seed, |mut mac| {
        mac.update(domain_tag);
        let digest = mac.finalize().into_bytes();
        let mut seed_bytes = [0u8; 8];
        seed_bytes.copy_from_slice(&digest[..8]);
        u64::from_le_bytes(seed_bytes)
    })
}

#[must_use]
pub fn stream_rng(user_seed: u64, domain_tag: &[u8]) -> ChaCha20Rng {
    ChaCha20Rng::seed_from_u64(derive_stream_seed(user_seed, domain_tag))
}
