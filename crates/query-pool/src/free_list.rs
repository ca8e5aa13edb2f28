// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Per-kind cache of released buffers, keyed by exact capacity.

use std::collections::HashMap;
use std::sync::Mutex;

/// Released buffers of one element type, binned by capacity.
///
/// A poisoned lock is treated as an empty cache: `take` falls back to a
/// fresh allocation and `give` drops the buffer.
pub(crate) struct FreeList<T> {
    buckets: Mutex<HashMap<usize, Vec<Vec<T>>>>,
}

impl<T> FreeList<T> {
    pub(crate) fn new() -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Returns an empty buffer whose capacity is exactly `capacity`, and
    /// whether it came from the cache.
    pub(crate) fn take(&self, capacity: usize) -> (Vec<T>, bool) {
        if capacity == 0 {
            return (Vec::new(), false);
        }

        if let Ok(mut buckets) = self.buckets.lock() {
            if let Some(buf) = buckets.get_mut(&capacity).and_then(Vec::pop) {
                debug_assert!(buf.is_empty());
                return (buf, true);
            }
        }

        (Vec::with_capacity(capacity), false)
    }

    /// Clears `buffer` and caches it under its own capacity.
    ///
    /// Clearing drops every element, so label strings and histograms held
    /// by the previous user are released and the next user starts from an
    /// empty buffer.
    pub(crate) fn give(&self, mut buffer: Vec<T>) {
        let capacity = buffer.capacity();
        if capacity == 0 {
            return;
        }
        buffer.clear();

        if let Ok(mut buckets) = self.buckets.lock() {
            buckets.entry(capacity).or_default().push(buffer);
        }
    }

    /// Number of buffers currently held in the cache.
    pub(crate) fn cached_buffers(&self) -> usize {
        self.buckets
            .lock()
            .map(|b| b.values().map(Vec::len).sum())
            .unwrap_or(0)
    }

    /// Drops every cached buffer.
    pub(crate) fn clear(&self) {
        if let Ok(mut buckets) = self.buckets.lock() {
            buckets.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_fresh_has_exact_capacity() {
        let list: FreeList<f64> = FreeList::new();
        let (buf, reused) = list.take(8);
        assert!(!reused);
        assert_eq!(buf.capacity(), 8);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_take_zero_does_not_allocate() {
        let list: FreeList<f64> = FreeList::new();
        let (buf, reused) = list.take(0);
        assert!(!reused);
        assert_eq!(buf.capacity(), 0);
    }

    #[test]
    fn test_reuse_same_capacity() {
        let list: FreeList<f64> = FreeList::new();
        let (mut buf, _) = list.take(4);
        buf.extend_from_slice(&[1.0, 2.0, 3.0]);
        let ptr = buf.as_ptr();
        list.give(buf);
        assert_eq!(list.cached_buffers(), 1);

        let (again, reused) = list.take(4);
        assert!(reused);
        assert_eq!(again.as_ptr(), ptr);
        assert!(again.is_empty());
        assert_eq!(again.capacity(), 4);
        assert_eq!(list.cached_buffers(), 0);
    }

    #[test]
    fn test_no_reuse_across_capacities() {
        let list: FreeList<bool> = FreeList::new();
        let (buf, _) = list.take(4);
        list.give(buf);

        let (other, reused) = list.take(8);
        assert!(!reused);
        assert_eq!(other.capacity(), 8);
        assert_eq!(list.cached_buffers(), 1);
    }

    #[test]
    fn test_give_empty_is_noop() {
        let list: FreeList<String> = FreeList::new();
        list.give(Vec::new());
        assert_eq!(list.cached_buffers(), 0);
    }

    #[test]
    fn test_give_drops_elements() {
        use std::sync::Arc;

        let shared = Arc::new(());
        let list: FreeList<Arc<()>> = FreeList::new();
        let (mut buf, _) = list.take(2);
        buf.push(Arc::clone(&shared));
        buf.push(Arc::clone(&shared));
        assert_eq!(Arc::strong_count(&shared), 3);

        list.give(buf);
        assert_eq!(Arc::strong_count(&shared), 1);
    }

    #[test]
    fn test_clear() {
        let list: FreeList<u8> = FreeList::new();
        for cap in [1, 2, 4] {
            let (buf, _) = list.take(cap);
            list.give(buf);
        }
        assert_eq!(list.cached_buffers(), 3);
        list.clear();
        assert_eq!(list.cached_buffers(), 0);
    }
}
