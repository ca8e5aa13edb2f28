// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Capacity buckets for pooled buffers.
//!
//! Every request is rounded up to the next power of two, so the free lists
//! only ever hold a handful of distinct capacities. This trades up to 2×
//! over-allocation for a high reuse rate, and the budget is charged for the
//! rounded capacity rather than the requested length.

/// Returns the smallest power of two that is ≥ `len`.
///
/// `0` maps to `0` (no allocation). Requests above the largest power of two
/// that fits in `usize` saturate to `usize::MAX`.
pub fn size_class_for(len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    len.checked_next_power_of_two().unwrap_or(usize::MAX)
}

/// Returns `true` if `capacity` is something [`size_class_for`] can produce
/// for an allocatable request.
pub fn is_size_class(capacity: usize) -> bool {
    capacity == 0 || capacity.is_power_of_two()
}
