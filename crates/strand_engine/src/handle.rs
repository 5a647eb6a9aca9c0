//! Release-once ownership of parse outcomes.
//!
//! A [`ResultHandle`] is what application code holds: cheap to clone,
//! possibly empty. Every non-empty handle points at one [`ResultOwner`],
//! the unique owner of the outcome and of the allocation backing it. The
//! owner frees both exactly once: on the first explicit
//! [`ResultHandle::release`] from any copy, or when the last copy is
//! dropped. Every later release is a no-op.

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use strand_foundation::{Error, ErrorKind, Result, Token};

use crate::outcome::Parsed;

// =============================================================================
// Allocator
// =============================================================================

/// A backing allocation handed out by an [`Allocator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Allocation {
    /// Allocator-unique id.
    pub id: u64,
    /// Size charged for the allocation.
    pub bytes: usize,
}

/// Source of the resource that backs a parse result.
pub trait Allocator: Send + Sync + fmt::Debug {
    /// Reserves an allocation of `bytes`.
    fn allocate(&self, bytes: usize) -> Allocation;

    /// Returns an allocation. Called exactly once per allocation by
    /// [`ResultOwner`].
    fn release(&self, allocation: Allocation);
}

/// Allocator backed by the global heap; allocation is bookkeeping only.
#[derive(Debug, Default)]
pub struct SystemAllocator {
    next_id: AtomicU64,
}

impl SystemAllocator {
    /// Creates a new system allocator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Allocator for SystemAllocator {
    fn allocate(&self, bytes: usize) -> Allocation {
        Allocation {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            bytes,
        }
    }

    fn release(&self, _allocation: Allocation) {}
}

/// Allocator that counts live allocations and detects double release.
#[derive(Debug, Default)]
pub struct CountingAllocator {
    next_id: AtomicU64,
    live: Mutex<HashSet<u64>>,
    allocated: AtomicUsize,
    released: AtomicUsize,
    double_releases: AtomicUsize,
}

impl CountingAllocator {
    /// Creates a new counting allocator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn live_set(&self) -> MutexGuard<'_, HashSet<u64>> {
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the number of allocations not yet released.
    #[must_use]
    pub fn live(&self) -> usize {
        self.live_set().len()
    }

    /// Returns the total number of allocations made.
    #[must_use]
    pub fn allocated(&self) -> usize {
        self.allocated.load(Ordering::Acquire)
    }

    /// Returns the number of successful releases.
    #[must_use]
    pub fn released(&self) -> usize {
        self.released.load(Ordering::Acquire)
    }

    /// Returns the number of releases of an allocation that was not live.
    #[must_use]
    pub fn double_releases(&self) -> usize {
        self.double_releases.load(Ordering::Acquire)
    }
}

impl Allocator for CountingAllocator {
    fn allocate(&self, bytes: usize) -> Allocation {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.live_set().insert(id);
        self.allocated.fetch_add(1, Ordering::AcqRel);
        Allocation { id, bytes }
    }

    fn release(&self, allocation: Allocation) {
        if self.live_set().remove(&allocation.id) {
            self.released.fetch_add(1, Ordering::AcqRel);
        } else {
            self.double_releases.fetch_add(1, Ordering::AcqRel);
        }
    }
}

// =============================================================================
// Result Owner
// =============================================================================

/// The unique owner of one parse outcome and its allocation.
pub struct ResultOwner {
    released: AtomicBool,
    outcome: Mutex<Option<Result<Parsed>>>,
    allocation: Allocation,
    allocator: Arc<dyn Allocator>,
}

impl ResultOwner {
    fn new(outcome: Result<Parsed>, allocator: Arc<dyn Allocator>) -> Self {
        let bytes = match &outcome {
            Ok(parsed) => parsed.token.node_count() * std::mem::size_of::<Token>(),
            Err(_) => std::mem::size_of::<Error>(),
        };
        let allocation = allocator.allocate(bytes);
        Self {
            released: AtomicBool::new(false),
            outcome: Mutex::new(Some(outcome)),
            allocation,
            allocator,
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<Result<Parsed>>> {
        self.outcome.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Frees the outcome; returns false if it was already released.
    fn release(&self) -> bool {
        if self.released.swap(true, Ordering::AcqRel) {
            return false;
        }
        let outcome = self.slot().take();
        drop(outcome);
        self.allocator.release(self.allocation);
        true
    }

    fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    fn read<R>(&self, f: impl FnOnce(&Result<Parsed>) -> R) -> Result<R> {
        if self.is_released() {
            return Err(Error::new(ErrorKind::ResultReleased));
        }
        self.slot()
            .as_ref()
            .map(f)
            .ok_or_else(|| Error::new(ErrorKind::ResultReleased))
    }
}

impl Drop for ResultOwner {
    fn drop(&mut self) {
        if !*self.released.get_mut() {
            *self.released.get_mut() = true;
            self.allocator.release(self.allocation);
        }
    }
}

impl fmt::Debug for ResultOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultOwner")
            .field("released", &self.is_released())
            .field("allocation", &self.allocation)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Result Handle
// =============================================================================

/// A clonable handle to a parse outcome.
///
/// The default handle is empty. Releasing through any copy releases the
/// outcome for every copy; reading afterwards yields `result-released`.
#[derive(Clone, Debug, Default)]
pub struct ResultHandle(Option<Arc<ResultOwner>>);

impl ResultHandle {
    /// Wraps an outcome, charging its allocation to `allocator`.
    #[must_use]
    pub fn new(outcome: Result<Parsed>, allocator: Arc<dyn Allocator>) -> Self {
        Self(Some(Arc::new(ResultOwner::new(outcome, allocator))))
    }

    /// Creates an empty handle.
    #[must_use]
    pub fn empty() -> Self {
        Self(None)
    }

    /// Returns true if this handle never held an outcome.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// Returns true if the outcome has been released.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.0.as_ref().is_some_and(|owner| owner.is_released())
    }

    /// Releases the outcome. Safe to call repeatedly, from any copy, and on
    /// an empty handle; returns true only for the call that actually freed it.
    pub fn release(&self) -> bool {
        self.0.as_ref().is_some_and(|owner| owner.release())
    }

    /// Returns a copy of the outcome.
    ///
    /// # Errors
    ///
    /// Returns `empty-result` or `result-released` if there is nothing to
    /// read, otherwise the parse failure itself.
    pub fn outcome(&self) -> Result<Parsed> {
        self.owner()?.read(Clone::clone)?
    }

    /// Returns a copy of the root token.
    ///
    /// # Errors
    ///
    /// See [`outcome`](Self::outcome).
    pub fn token(&self) -> Result<Token> {
        self.outcome().map(Parsed::into_token)
    }

    /// Returns whether the parse succeeded.
    ///
    /// # Errors
    ///
    /// Returns `empty-result` or `result-released` if there is nothing to
    /// read.
    pub fn is_success(&self) -> Result<bool> {
        self.owner()?.read(Result::is_ok)
    }

    /// Returns the number of handles sharing this outcome.
    #[must_use]
    pub fn share_count(&self) -> usize {
        self.0.as_ref().map_or(0, Arc::strong_count)
    }

    fn owner(&self) -> Result<&ResultOwner> {
        self.0
            .as_deref()
            .ok_or_else(|| Error::new(ErrorKind::EmptyResult))
    }
}
