//! Seeded random streams.
//!
//! Every chain and every operator receives its RNG by argument; there is no
//! process-wide generator.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// The random stream type used throughout the crate.
pub type LayoutRng = ChaCha8Rng;

/// Creates a deterministic RNG from a seed.
pub fn create_rng(seed: u64) -> LayoutRng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Derives an independent seed for stream `index` from a master seed.
///
/// SplitMix64 finalizer over `master + (index + 1) * golden_gamma`, so
/// neighbouring indices produce unrelated streams.
pub fn derive_seed(master: u64, index: u64) -> u64 {
    let mut z = master.wrapping_add(index.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
