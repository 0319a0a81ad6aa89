//! Deterministic random number generation for deck preparation.
//!
//! `apply` never consumes randomness. The only random step in a game is the
//! initial deck order, which the caller produces once with a seeded
//! [`GameRng`] and passes into setup.
//!
//! ```
//! use oenology::core::GameRng;
//!
//! let mut a: Vec<u32> = (0..10).collect();
//! let mut b = a.clone();
//! GameRng::new(42).for_context("vine").shuffle(&mut a);
//! GameRng::new(42).for_context("vine").shuffle(&mut b);
//! assert_eq!(a, b);
//! ```

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Seeded ChaCha8 generator.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create an independent stream for a specific context.
    ///
    /// Each draw pile is shuffled from its own stream, so adding cards to
    /// one pile never changes the order of another. The context seed is an
    /// FNV-1a fold so it is stable across platforms and compiler versions.
    #[must_use]
    pub fn for_context(&self, context: &str) -> Self {
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in self.seed.to_le_bytes().iter().chain(context.as_bytes()) {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        Self::new(hash)
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        slice.shuffle(&mut self.inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shuffled(rng: &mut GameRng) -> Vec<u32> {
        let mut data: Vec<u32> = (0..52).collect();
        rng.shuffle(&mut data);
        data
    }

    #[test]
    fn test_determinism() {
        let mut rng1 = GameRng::new(42);
        let mut rng2 = GameRng::new(42);

        for _ in 0..5 {
            assert_eq!(shuffled(&mut rng1), shuffled(&mut rng2));
        }
    }

    #[test]
    fn test_context_produces_different_sequence() {
        let rng = GameRng::new(42);
        let vine = shuffled(&mut rng.for_context("vine"));
        let order = shuffled(&mut rng.for_context("order"));

        assert_ne!(vine, order);
        assert_eq!(vine, shuffled(&mut GameRng::new(42).for_context("vine")));
    }

    #[test]
    fn test_shuffle_keeps_elements() {
        let mut rng = GameRng::new(7);
        let mut data: Vec<u32> = (1..=20).collect();

        rng.shuffle(&mut data);
        assert_ne!(data, (1..=20).collect::<Vec<_>>());

        data.sort_unstable();
        assert_eq!(data, (1..=20).collect::<Vec<_>>());
    }
}
