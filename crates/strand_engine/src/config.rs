//! Configuration for a parser.

use std::sync::Arc;

use crate::handle::{Allocator, SystemAllocator};

/// Default limit on nested node invocations.
///
/// Each invocation costs a few stack frames; this fits an unoptimized build
/// on a 2 MiB thread stack.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Configuration for a [`Parser`](crate::Parser).
///
/// Controls end-of-input strictness, the recursion guard, packrat
/// memoization, and where result handles get their backing allocation.
#[derive(Clone, Debug)]
pub struct ParserConfig {
    /// Fail with `trailing-input` unless the root consumes every byte.
    pub require_full_consumption: bool,

    /// Maximum nested node invocations before a fatal `recursion-limit`.
    pub max_depth: usize,

    /// Cache node results by `(node, position)`.
    pub memoize: bool,

    /// Backing allocator for [`ResultHandle`](crate::ResultHandle)s.
    pub allocator: Arc<dyn Allocator>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            require_full_consumption: false,
            max_depth: DEFAULT_MAX_DEPTH,
            memoize: false,
            allocator: Arc::new(SystemAllocator::new()),
        }
    }
}

impl ParserConfig {
    /// Creates a configuration that rejects trailing input.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            require_full_consumption: true,
            ..Self::default()
        }
    }

    /// Creates a configuration with packrat memoization enabled.
    #[must_use]
    pub fn packrat() -> Self {
        Self {
            memoize: true,
            ..Self::default()
        }
    }

    /// Builder method to require full consumption.
    #[must_use]
    pub fn with_full_consumption(mut self, required: bool) -> Self {
        self.require_full_consumption = required;
        self
    }

    /// Builder method to set the recursion limit.
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Builder method to enable/disable memoization.
    #[must_use]
    pub fn with_memoize(mut self, memoize: bool) -> Self {
        self.memoize = memoize;
        self
    }

    /// Builder method to set the result allocator.
    #[must_use]
    pub fn with_allocator(mut self, allocator: Arc<dyn Allocator>) -> Self {
        self.allocator = allocator;
        self
    }
}
