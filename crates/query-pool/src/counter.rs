// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The rejection counter capability.
//!
//! The pool never owns metric registration. It is handed something that can
//! be incremented, and bumps it at most once per query. [`Counter`] is a
//! small in-process implementation for callers without their own metrics
//! stack, and for tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metric name under which rejected queries are reported.
pub const REJECTED_QUERIES_METRIC: &str = "rejected_queries";

/// Something the pool can increment when a query is first rejected.
///
/// Implementations are shared between many pools (one per query), so they
/// must be safe to increment concurrently.
pub trait RejectionCounter: Send + Sync {
    /// Adds one to the counter.
    fn inc(&self);
}

/// A monotonically increasing, cloneable atomic counter.
///
/// Clones share the same value.
#[derive(Debug, Clone)]
pub struct Counter {
    name: &'static str,
    value: Arc<AtomicU64>,
}

impl Counter {
    /// Creates a counter starting at zero.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            value: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Creates the `rejected_queries` counter.
    pub fn rejected_queries() -> Self {
        Self::new(REJECTED_QUERIES_METRIC)
    }

    /// Returns the metric name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the current value.
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    /// Renders the counter in the Prometheus text exposition format.
    pub fn render(&self) -> String {
        format!("# TYPE {0} counter\n{0} {1}\n", self.name, self.get())
    }
}

impl Default for Counter {
    fn default() -> Self {
        Self::rejected_queries()
    }
}

impl RejectionCounter for Counter {
    fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_value() {
        let a = Counter::rejected_queries();
        let b = a.clone();
        a.inc();
        b.inc();
        assert_eq!(a.get(), 2);
        assert_eq!(b.get(), 2);
    }

    #[test]
    fn test_render() {
        let c = Counter::default();
        c.inc();
        assert_eq!(c.render(), "# TYPE rejected_queries counter\nrejected_queries 1\n");
    }

    #[test]
    fn test_usable_as_trait_object() {
        let c = Counter::new("custom");
        let dynamic: Arc<dyn RejectionCounter> = Arc::new(c.clone());
        dynamic.inc();
        assert_eq!(c.get(), 1);
        assert_eq!(c.name(), "custom");
    }
}
