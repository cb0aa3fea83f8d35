#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic SHA-256 backed luck used to generate the world.

use geocoin_core::Luck;
use sha2::{Digest, Sha256};

const UNIT_SCALE: f64 = 1.0 / ((1u64 << 53) as f64);

/// Maps string keys onto `[0, 1)` by hashing them with SHA-256.
///
/// The same key yields the same value on every platform and every run. An
/// optional seed is mixed in ahead of the key so that distinct worlds can be
/// generated from the same lattice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sha256Luck {
    seed: Option<u64>,
}

impl Sha256Luck {
    /// Creates an unseeded luck function.
    #[must_use]
    pub const fn new() -> Self {
        Self { seed: None }
    }

    /// Creates a luck function that mixes `seed` into every key.
    #[must_use]
    pub const fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }
}

impl Luck for Sha256Luck {
    fn luck(&self, key: &str) -> f64 {
        let mut hasher = Sha256::new();
        if let Some(seed) = self.seed {
            hasher.update(seed.to_le_bytes());
        }
        hasher.update(key.as_bytes());
        unit_from_digest(hasher)
    }
}

fn unit_from_digest(hasher: Sha256) -> f64 {
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[0..8]);
    let value = u64::from_le_bytes(bytes) >> 11;
    (value as f64) * UNIT_SCALE
}
