// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the query buffer pool.

/// Errors produced by the pool and its configuration layer.
///
/// Only [`PoolError::MemoryLimitExceeded`] is ever returned by the pool
/// itself; the other variants come from parsing limits and config files.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// Reserving the rounded-up buffer would push the query over its
    /// estimated memory ceiling. The message text is matched downstream.
    #[error(
        "the query exceeded the maximum allowed estimated amount of memory consumed by a single query (limit: {limit} bytes) (err-mimir-max-estimated-memory-consumption-per-query)"
    )]
    MemoryLimitExceeded { limit: u64 },

    /// A human-readable memory limit string could not be parsed.
    #[error("invalid memory limit: {0}")]
    InvalidLimit(String),

    /// Configuration could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),
}
