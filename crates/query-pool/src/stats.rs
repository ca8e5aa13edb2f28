// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Allocation statistics for profiling and diagnostics.
//!
//! [`AllocationStats`] tracks how a query used its pool: how often buffers
//! were recycled, how many requests were refused and the estimated peak.

/// Cumulative statistics for one pool.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct AllocationStats {
    /// Successful get calls.
    pub total_gets: u64,
    /// Gets served from a free list.
    pub reuse_hits: u64,
    /// Gets that needed a fresh allocation (including zero-capacity gets).
    pub fresh_allocations: u64,
    /// Gets refused by the memory limit. Unlike the rejection metric this
    /// counts every refusal, not just the first.
    pub rejections: u64,
    /// Non-empty buffers returned.
    pub total_puts: u64,
    /// Highest estimated bytes held at once.
    pub peak_estimated_bytes: u64,
}

impl AllocationStats {
    /// Fraction of successful gets served from a free list, in `[0.0, 1.0]`.
    pub fn reuse_ratio(&self) -> f64 {
        if self.total_gets == 0 {
            return 0.0;
        }
        self.reuse_hits as f64 / self.total_gets as f64
    }

    pub(crate) fn record_get(&mut self, reused: bool) {
        self.total_gets += 1;
        if reused {
            self.reuse_hits += 1;
        } else {
            self.fresh_allocations += 1;
        }
    }

    pub(crate) fn record_rejection(&mut self) {
        self.rejections += 1;
    }

    pub(crate) fn record_put(&mut self) {
        self.total_puts += 1;
    }

    /// Returns a human-readable summary.
    pub fn summary(&self) -> String {
        format!(
            "Gets: {} ({} reused, {} fresh, {:.0}% reuse), {} rejected, \
             {} puts, peak {} estimated bytes",
            self.total_gets,
            self.reuse_hits,
            self.fresh_allocations,
            self.reuse_ratio() * 100.0,
            self.rejections,
            self.total_puts,
            self.peak_estimated_bytes,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let s = AllocationStats::default();
        assert_eq!(s.total_gets, 0);
        assert_eq!(s.reuse_ratio(), 0.0);
    }

    #[test]
    fn test_reuse_ratio() {
        let mut s = AllocationStats::default();
        s.record_get(true);
        s.record_get(true);
        s.record_get(false);
        assert!((s.reuse_ratio() - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(s.fresh_allocations, 1);
    }

    #[test]
    fn test_rejections_do_not_count_as_gets() {
        let mut s = AllocationStats::default();
        s.record_rejection();
        s.record_rejection();
        assert_eq!(s.rejections, 2);
        assert_eq!(s.total_gets, 0);
    }

    #[test]
    fn test_summary() {
        let mut s = AllocationStats::default();
        s.record_get(false);
        s.record_get(true);
        s.record_put();
        s.peak_estimated_bytes = 128;
        let summary = s.summary();
        assert!(summary.contains("Gets: 2"));
        assert!(summary.contains("1 reused"));
        assert!(summary.contains("1 puts"));
        assert!(summary.contains("peak 128"));
    }

    #[test]
    fn test_serialize() {
        let s = AllocationStats {
            rejections: 3,
            ..Default::default()
        };
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["rejections"], 3);
    }
}
