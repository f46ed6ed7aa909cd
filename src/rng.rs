//! Random number source for scenario generation.
//!
//! A configured seed makes every generated scenario reproducible; without one
//! the generator is seeded from the operating system.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub fn scenario_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}
