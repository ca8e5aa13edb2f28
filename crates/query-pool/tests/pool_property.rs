// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Property tests for the accounting invariants under arbitrary get/put
//! sequences.

use proptest::prelude::*;
use query_pool::{Counter, LimitingPool, FLOAT64_SIZE, VECTOR_SAMPLE_SIZE};
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Op {
    GetFloat(usize),
    GetVector(usize),
    /// Put back the outstanding buffer at this index (modulo the count).
    Put(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..300).prop_map(Op::GetFloat),
        (0usize..40).prop_map(Op::GetVector),
        any::<usize>().prop_map(Op::Put),
    ]
}

enum Held {
    Floats(Vec<f64>),
    Vector(Vec<query_pool::Sample>),
}

impl Held {
    fn bytes(&self) -> u64 {
        match self {
            Held::Floats(b) => b.capacity() as u64 * FLOAT64_SIZE,
            Held::Vector(b) => b.capacity() as u64 * VECTOR_SAMPLE_SIZE,
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn current_matches_outstanding_and_respects_limit(
        limit in prop_oneof![Just(0u64), 1u64..8192],
        ops in proptest::collection::vec(op(), 1..60),
    ) {
        let counter = Counter::rejected_queries();
        let pool = LimitingPool::new(limit, Some(Arc::new(counter.clone())));
        let mut held: Vec<Held> = Vec::new();
        let mut running_peak = 0u64;
        let mut saw_rejection = false;

        for op in ops {
            let before = pool.current_estimated_bytes();
            match op {
                Op::GetFloat(n) => match pool.get_float_slice(n) {
                    Ok(b) => {
                        prop_assert!(b.is_empty());
                        prop_assert!(b.capacity() >= n);
                        held.push(Held::Floats(b));
                    }
                    Err(_) => {
                        saw_rejection = true;
                        prop_assert_eq!(pool.current_estimated_bytes(), before);
                    }
                },
                Op::GetVector(n) => match pool.get_vector(n) {
                    Ok(b) => {
                        prop_assert!(b.is_empty());
                        held.push(Held::Vector(b));
                    }
                    Err(_) => {
                        saw_rejection = true;
                        prop_assert_eq!(pool.current_estimated_bytes(), before);
                    }
                },
                Op::Put(i) if !held.is_empty() => {
                    match held.swap_remove(i % held.len()) {
                        Held::Floats(b) => pool.put_float_slice(b),
                        Held::Vector(b) => pool.put_vector(b),
                    }
                }
                Op::Put(_) => pool.put_float_slice(Vec::new()),
            }

            let outstanding: u64 = held.iter().map(Held::bytes).sum();
            running_peak = running_peak.max(outstanding);

            prop_assert_eq!(pool.current_estimated_bytes(), outstanding);
            prop_assert_eq!(pool.peak_estimated_bytes(), running_peak);
            if limit > 0 {
                prop_assert!(pool.current_estimated_bytes() <= limit);
            }
        }

        prop_assert_eq!(counter.get(), u64::from(saw_rejection));
        if limit == 0 {
            prop_assert!(!saw_rejection);
        }
    }
}
