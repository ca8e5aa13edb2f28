// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Estimated-byte accounting with check-then-commit reservation.

use std::sync::atomic::{AtomicU64, Ordering};

/// A reservation that would have crossed the ceiling. Nothing was committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Rejected;

/// Current and peak estimated bytes against a fixed ceiling (`0` = none).
///
/// `reserve` is a compare-exchange loop: the new total is only published if
/// it fits, so no thread ever observes `current` above `max`.
#[derive(Debug)]
pub(crate) struct BudgetTracker {
    max: u64,
    current: AtomicU64,
    peak: AtomicU64,
}

impl BudgetTracker {
    pub(crate) fn new(max: u64) -> Self {
        Self {
            max,
            current: AtomicU64::new(0),
            peak: AtomicU64::new(0),
        }
    }

    /// Commits `bytes` if the ceiling allows it and returns the new total.
    pub(crate) fn reserve(&self, bytes: u64) -> Result<u64, Rejected> {
        let mut current = self.current.load(Ordering::Acquire);
        loop {
            let next = current.saturating_add(bytes);
            if self.max > 0 && next > self.max {
                return Err(Rejected);
            }
            match self.current.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    self.peak.fetch_max(next, Ordering::AcqRel);
                    return Ok(next);
                }
                Err(actual) => current = actual,
            }
        }
    }

    /// Returns `bytes` to the budget. Peak is left alone.
    pub(crate) fn release(&self, bytes: u64) {
        // Only fails if the closure returns None, which it never does.
        let _ = self
            .current
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| {
                Some(c.saturating_sub(bytes))
            });
    }

    pub(crate) fn current(&self) -> u64 {
        self.current.load(Ordering::Acquire)
    }

    pub(crate) fn peak(&self) -> u64 {
        self.peak.load(Ordering::Acquire)
    }

    pub(crate) fn max(&self) -> u64 {
        self.max
    }
}
