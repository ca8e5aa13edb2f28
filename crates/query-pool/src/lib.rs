// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # query-pool
//!
//! A memory-limited buffer pool for evaluating a single streaming query.
//!
//! The evaluator asks the pool for sample buffers at every step and hands
//! them back when the step is done. The pool recycles those buffers and
//! keeps an estimate of how much memory the query holds, refusing requests
//! that would push it over a per-query ceiling.
//!
//! # Key Components
//!
//! - [`LimitingPool`] — one `get_*`/`put_*` pair per element kind, backed by
//!   a single generic engine.
//! - [`MemoryLimit`] — the ceiling, with human-readable parsing (`"512M"`).
//! - [`RejectionCounter`] / [`Counter`] — the `rejected_queries` metric,
//!   incremented at most once per pool.
//! - [`AllocationStats`] — reuse and rejection statistics.
//! - [`PoolConfig`] — TOML configuration.
//!
//! # Accounting
//!
//! ```text
//! get_float_slice(n)
//!       │  c = next power of two ≥ n
//!       │  reserve c × FLOAT64_SIZE ──► over limit? ──► MemoryLimitExceeded
//!       ▼
//!   free list[c] ──► Vec<f64> { len: 0, capacity: c }
//!       │
//!       │  put_float_slice(buf)
//!       ▼
//!   clear ──► free list[c] ──► release c × FLOAT64_SIZE
//! ```
//!
//! The estimate is `capacity × size_of::<T>()`. It is used for admission
//! control only and does not include heap data owned by elements.
//!
//! # Example
//! ```
//! use query_pool::{LimitingPool, FPOINT_SIZE};
//!
//! let pool = LimitingPool::new(0, None);
//! let points = pool.get_fpoint_slice(100).unwrap();
//! assert_eq!(points.capacity(), 128);
//! assert_eq!(pool.current_estimated_bytes(), 128 * FPOINT_SIZE);
//!
//! pool.put_fpoint_slice(points);
//! assert_eq!(pool.current_estimated_bytes(), 0);
//! ```

mod config;
mod counter;
mod error;
mod free_list;
mod kinds;
mod limit;
pub mod pool;
pub mod size_class;
mod stats;
mod tracker;

pub use config::PoolConfig;
pub use counter::{Counter, RejectionCounter, REJECTED_QUERIES_METRIC};
pub use error::PoolError;
pub use kinds::{
    ElementKind, FPoint, FloatHistogram, HPoint, Label, Labels, Sample, Timestamp, Vector,
    BOOL_SIZE, FLOAT64_SIZE, FPOINT_SIZE, HPOINT_SIZE, VECTOR_SAMPLE_SIZE,
};
pub use limit::MemoryLimit;
pub use pool::LimitingPool;
pub use stats::AllocationStats;
