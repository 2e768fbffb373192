// src/scheduler/shuffle.rs

//! Seeded inter-batch shuffling.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Returns a pseudo-random permutation of `micro_batches`.
///
/// The permutation is a Fisher–Yates shuffle driven by ChaCha8 seeded purely
/// from `seed` (the scheduler passes `epoch + seed`), so identical seeds on
/// identical inputs yield identical permutations on any platform.
pub fn shuffle<T>(mut micro_batches: Vec<T>, seed: u64) -> Vec<T> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    micro_batches.shuffle(&mut rng);
    micro_batches
}
