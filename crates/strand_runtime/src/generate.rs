//! Deterministic random bencode documents.
//!
//! The same seed and configuration always produce the same document, so
//! generated inputs can be used in tests and benchmarks and reproduced from
//! the command line.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::bencode::Bencode;

/// Shape limits for generated documents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerateConfig {
    /// Deepest nesting of lists and dictionaries.
    pub max_depth: usize,
    /// Most items in one list or dictionary.
    pub max_items: usize,
    /// Longest string.
    pub max_string_len: usize,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            max_depth: 4,
            max_items: 5,
            max_string_len: 12,
        }
    }
}

impl GenerateConfig {
    /// Creates a configuration with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the nesting limit.
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Builder method to set the container size limit.
    #[must_use]
    pub fn with_max_items(mut self, items: usize) -> Self {
        self.max_items = items;
        self
    }

    /// Builder method to set the string length limit.
    #[must_use]
    pub fn with_max_string_len(mut self, len: usize) -> Self {
        self.max_string_len = len;
        self
    }
}

/// Generates a value from a seed.
#[must_use]
pub fn generate(seed: u64, config: &GenerateConfig) -> Bencode {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    value(&mut rng, config, 0)
}

/// Generates a value from a seed and returns its encoding.
#[must_use]
pub fn generate_document(seed: u64, config: &GenerateConfig) -> Vec<u8> {
    generate(seed, config).encode()
}

fn value(rng: &mut ChaCha8Rng, config: &GenerateConfig, depth: usize) -> Bencode {
    let kinds = if depth < config.max_depth { 4 } else { 2 };
    match rng.gen_range(0..kinds) {
        0 => Bencode::Int(integer(rng)),
        1 => Bencode::Bytes(string(rng, config)),
        2 => {
            let count = rng.gen_range(0..=config.max_items);
            Bencode::List((0..count).map(|_| value(rng, config, depth + 1)).collect())
        }
        _ => {
            let count = rng.gen_range(0..=config.max_items);
            Bencode::Dict(
                (0..count)
                    .map(|_| (string(rng, config), value(rng, config, depth + 1)))
                    .collect(),
            )
        }
    }
}

fn integer(rng: &mut ChaCha8Rng) -> i64 {
    if rng.gen_bool(0.1) {
        rng.gen_range(i64::MIN..=i64::MAX)
    } else {
        rng.gen_range(-1000..=1000)
    }
}

/// Printable ASCII, so documents survive a terminal.
fn string(rng: &mut ChaCha8Rng, config: &GenerateConfig) -> Vec<u8> {
    let len = rng.gen_range(0..=config.max_string_len);
    (0..len).map(|_| rng.gen_range(b' '..=b'~')).collect()
}
