// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Memory-limited buffer pool for a single query.
//!
//! The [`LimitingPool`] hands out `Vec`s of five element kinds. For every
//! request it:
//!
//! 1. Rounds the requested length up to a power-of-two size class.
//! 2. Reserves `capacity × element size` estimated bytes against the
//!    query's ceiling, refusing the request if it would not fit.
//! 3. Serves a cached buffer of that exact capacity, or allocates one.
//!
//! Returning a buffer clears it, caches it and releases its bytes.
//!
//! # Thread Safety
//! `LimitingPool` is `Send + Sync`. The byte counters are atomics updated
//! with a compare-exchange loop and each free list sits behind a `Mutex`,
//! so sub-expressions of one query may share the pool through an `Arc`.

use crate::free_list::FreeList;
use crate::kinds::{FPoint, HPoint, Sample};
use crate::size_class::{is_size_class, size_class_for};
use crate::tracker::BudgetTracker;
use crate::{AllocationStats, ElementKind, MemoryLimit, PoolConfig, PoolError, RejectionCounter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// An element type the pool keeps a free list for.
pub(crate) trait Pooled: Sized {
    const KIND: ElementKind;
    const ELEMENT_SIZE: u64 = std::mem::size_of::<Self>() as u64;

    fn free_list(pool: &LimitingPool) -> &FreeList<Self>;
}

impl Pooled for FPoint {
    const KIND: ElementKind = ElementKind::FPoint;

    fn free_list(pool: &LimitingPool) -> &FreeList<Self> {
        &pool.fpoints
    }
}

impl Pooled for HPoint {
    const KIND: ElementKind = ElementKind::HPoint;

    fn free_list(pool: &LimitingPool) -> &FreeList<Self> {
        &pool.hpoints
    }
}

impl Pooled for Sample {
    const KIND: ElementKind = ElementKind::Vector;

    fn free_list(pool: &LimitingPool) -> &FreeList<Self> {
        &pool.vectors
    }
}

impl Pooled for f64 {
    const KIND: ElementKind = ElementKind::Float;

    fn free_list(pool: &LimitingPool) -> &FreeList<Self> {
        &pool.floats
    }
}

impl Pooled for bool {
    const KIND: ElementKind = ElementKind::Bool;

    fn free_list(pool: &LimitingPool) -> &FreeList<Self> {
        &pool.bools
    }
}

/// Buffer pool that enforces a per-query estimated memory ceiling.
///
/// Create one per query and drop it when the query finishes. Buffers that
/// are never put back are simply freed when the caller drops them; they
/// keep counting against the query until then.
///
/// # Example
/// ```
/// use query_pool::{Counter, LimitingPool, FLOAT64_SIZE};
/// use std::sync::Arc;
///
/// let rejected = Counter::rejected_queries();
/// let pool = LimitingPool::new(16 * FLOAT64_SIZE, Some(Arc::new(rejected.clone())));
///
/// let mut values = pool.get_float_slice(10).unwrap();
/// assert_eq!(values.capacity(), 16);
/// values.push(1.5);
///
/// // Over the limit: refused, and the query is counted as rejected once.
/// assert!(pool.get_float_slice(1).is_err());
/// assert_eq!(rejected.get(), 1);
///
/// pool.put_float_slice(values);
/// assert_eq!(pool.current_estimated_bytes(), 0);
/// assert_eq!(pool.peak_estimated_bytes(), 16 * FLOAT64_SIZE);
/// ```
pub struct LimitingPool {
    tracker: BudgetTracker,
    rejection_latched: AtomicBool,
    rejection_counter: Option<Arc<dyn RejectionCounter>>,
    fpoints: FreeList<FPoint>,
    hpoints: FreeList<HPoint>,
    vectors: FreeList<Sample>,
    floats: FreeList<f64>,
    bools: FreeList<bool>,
    stats: Mutex<AllocationStats>,
}

impl LimitingPool {
    /// Creates a pool with a ceiling of `max_estimated_bytes` (`0` for none).
    ///
    /// Without a counter, rejections still fail the request but are not
    /// recorded anywhere.
    pub fn new(
        max_estimated_bytes: u64,
        rejection_counter: Option<Arc<dyn RejectionCounter>>,
    ) -> Self {
        tracing::debug!(
            limit = %MemoryLimit::from_bytes(max_estimated_bytes),
            "query pool created"
        );
        Self {
            tracker: BudgetTracker::new(max_estimated_bytes),
            rejection_latched: AtomicBool::new(false),
            rejection_counter,
            fpoints: FreeList::new(),
            hpoints: FreeList::new(),
            vectors: FreeList::new(),
            floats: FreeList::new(),
            bools: FreeList::new(),
            stats: Mutex::new(AllocationStats::default()),
        }
    }

    /// Creates a pool from configuration. The counter is dropped when the
    /// config disables rejection recording.
    pub fn from_config(
        config: &PoolConfig,
        rejection_counter: Option<Arc<dyn RejectionCounter>>,
    ) -> Result<Self, PoolError> {
        let limit = config.parse_limit()?;
        let counter = rejection_counter.filter(|_| config.record_rejections);
        Ok(Self::new(limit.as_bytes(), counter))
    }

    pub fn get_fpoint_slice(&self, size: usize) -> Result<Vec<FPoint>, PoolError> {
        self.get_buffer(size)
    }

    pub fn put_fpoint_slice(&self, buffer: Vec<FPoint>) {
        self.put_buffer(buffer)
    }

    pub fn get_hpoint_slice(&self, size: usize) -> Result<Vec<HPoint>, PoolError> {
        self.get_buffer(size)
    }

    /// Returns histogram points. Histograms referenced by the points are
    /// released, not recycled.
    pub fn put_hpoint_slice(&self, buffer: Vec<HPoint>) {
        self.put_buffer(buffer)
    }

    pub fn get_vector(&self, size: usize) -> Result<Vec<Sample>, PoolError> {
        self.get_buffer(size)
    }

    pub fn put_vector(&self, buffer: Vec<Sample>) {
        self.put_buffer(buffer)
    }

    pub fn get_float_slice(&self, size: usize) -> Result<Vec<f64>, PoolError> {
        self.get_buffer(size)
    }

    pub fn put_float_slice(&self, buffer: Vec<f64>) {
        self.put_buffer(buffer)
    }

    pub fn get_bool_slice(&self, size: usize) -> Result<Vec<bool>, PoolError> {
        self.get_buffer(size)
    }

    pub fn put_bool_slice(&self, buffer: Vec<bool>) {
        self.put_buffer(buffer)
    }

    /// Estimated bytes held by buffers currently checked out.
    pub fn current_estimated_bytes(&self) -> u64 {
        self.tracker.current()
    }

    /// Highest value [`current_estimated_bytes`](Self::current_estimated_bytes)
    /// has reached.
    pub fn peak_estimated_bytes(&self) -> u64 {
        self.tracker.peak()
    }

    /// The configured ceiling, `0` when unlimited.
    pub fn max_estimated_bytes(&self) -> u64 {
        self.tracker.max()
    }

    /// Whether any request on this pool has been refused.
    pub fn rejected(&self) -> bool {
        self.rejection_latched.load(Ordering::Acquire)
    }

    /// Returns a snapshot of allocation statistics.
    pub fn stats(&self) -> AllocationStats {
        let mut stats = self
            .stats
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default();
        stats.peak_estimated_bytes = self.peak_estimated_bytes();
        stats
    }

    /// Number of released buffers cached across all kinds.
    pub fn cached_buffers(&self) -> usize {
        self.fpoints.cached_buffers()
            + self.hpoints.cached_buffers()
            + self.vectors.cached_buffers()
            + self.floats.cached_buffers()
            + self.bools.cached_buffers()
    }

    /// Drops all cached buffers. Checked-out buffers and the byte counters
    /// are unaffected, since cached buffers are not charged to the query.
    pub fn shrink(&self) {
        self.fpoints.clear();
        self.hpoints.clear();
        self.vectors.clear();
        self.floats.clear();
        self.bools.clear();
    }

    fn get_buffer<T: Pooled>(&self, size: usize) -> Result<Vec<T>, PoolError> {
        let capacity = size_class_for(size);
        let bytes = (capacity as u64).saturating_mul(T::ELEMENT_SIZE);

        if self.tracker.reserve(bytes).is_err() {
            self.record_rejection(T::KIND, size, bytes);
            return Err(PoolError::MemoryLimitExceeded {
                limit: self.tracker.max(),
            });
        }

        let (buffer, reused) = T::free_list(self).take(capacity);
        if reused {
            let kind = T::KIND;
            tracing::trace!(%kind, capacity, "reused pooled buffer");
        }
        if let Ok(mut stats) = self.stats.lock() {
            stats.record_get(reused);
        }
        Ok(buffer)
    }

    fn put_buffer<T: Pooled>(&self, buffer: Vec<T>) {
        let capacity = buffer.capacity();
        if capacity == 0 {
            return;
        }
        let bytes = (capacity as u64).saturating_mul(T::ELEMENT_SIZE);

        if is_size_class(capacity) {
            T::free_list(self).give(buffer);
        } else {
            // The caller grew the buffer past the capacity it was given.
            let kind = T::KIND;
            tracing::warn!(
                %kind,
                capacity,
                "returned buffer is not a pool size class, dropping it"
            );
            drop(buffer);
        }

        self.tracker.release(bytes);
        if let Ok(mut stats) = self.stats.lock() {
            stats.record_put();
        }
    }

    fn record_rejection(&self, kind: ElementKind, size: usize, bytes: u64) {
        if let Ok(mut stats) = self.stats.lock() {
            stats.record_rejection();
        }

        if self.rejection_latched.swap(true, Ordering::AcqRel) {
            tracing::debug!(%kind, size, bytes, "query pool request rejected again");
            return;
        }

        tracing::warn!(
            %kind,
            size,
            bytes,
            current = self.tracker.current(),
            limit = self.tracker.max(),
            "query exceeded its estimated memory limit"
        );
        if let Some(counter) = &self.rejection_counter {
            counter.inc();
        }
    }
}

impl std::fmt::Debug for LimitingPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LimitingPool")
            .field("max_estimated_bytes", &self.max_estimated_bytes())
            .field("current_estimated_bytes", &self.current_estimated_bytes())
            .field("peak_estimated_bytes", &self.peak_estimated_bytes())
            .field("rejected", &self.rejected())
            .finish()
    }
}
