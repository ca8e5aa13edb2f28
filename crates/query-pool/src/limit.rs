// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Per-query memory limit configuration and parsing.
//!
//! A [`MemoryLimit`] is the estimated-byte ceiling a single query may hold
//! in pooled buffers. Zero means unlimited.

use crate::PoolError;
use std::fmt;

const KB: u64 = 1024;
const MB: u64 = 1024 * KB;
const GB: u64 = 1024 * MB;

/// The estimated memory ceiling for one query.
///
/// # Parsing
/// Accepts human-readable strings with binary suffixes:
/// - `"512M"` or `"512MB"` → 512 × 1024² bytes
/// - `"1G"` or `"1GB"` → 1 × 1024³ bytes
/// - `"64K"` or `"64KB"` → 64 × 1024 bytes
/// - `"176"` → raw byte count
/// - `"0"` or `"unlimited"` → no limit
///
/// # Examples
/// ```
/// use query_pool::MemoryLimit;
///
/// let l = MemoryLimit::parse("1G").unwrap();
/// assert_eq!(l.as_bytes(), 1024 * 1024 * 1024);
///
/// assert!(MemoryLimit::parse("unlimited").unwrap().is_unlimited());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct MemoryLimit {
    /// Limit in bytes, `0` for none.
    bytes: u64,
}

impl MemoryLimit {
    /// No ceiling.
    pub const fn unlimited() -> Self {
        Self { bytes: 0 }
    }

    /// Creates a limit from a byte count. `0` means unlimited.
    pub const fn from_bytes(bytes: u64) -> Self {
        Self { bytes }
    }

    pub const fn from_mb(mb: u64) -> Self {
        Self { bytes: mb * MB }
    }

    pub const fn from_gb(gb: u64) -> Self {
        Self { bytes: gb * GB }
    }

    /// Returns the limit in bytes (`0` when unlimited).
    pub fn as_bytes(&self) -> u64 {
        self.bytes
    }

    pub fn is_unlimited(&self) -> bool {
        self.bytes == 0
    }

    /// Parses a human-readable limit string. Case-insensitive.
    pub fn parse(s: &str) -> Result<Self, PoolError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PoolError::InvalidLimit("empty limit string".into()));
        }
        if s.eq_ignore_ascii_case("unlimited") {
            return Ok(Self::unlimited());
        }

        let upper = s.to_ascii_uppercase();
        let (num_str, multiplier) = if let Some(n) = upper.strip_suffix("GB") {
            (n, GB)
        } else if let Some(n) = upper.strip_suffix('G') {
            (n, GB)
        } else if let Some(n) = upper.strip_suffix("MB") {
            (n, MB)
        } else if let Some(n) = upper.strip_suffix('M') {
            (n, MB)
        } else if let Some(n) = upper.strip_suffix("KB") {
            (n, KB)
        } else if let Some(n) = upper.strip_suffix('K') {
            (n, KB)
        } else if let Some(n) = upper.strip_suffix('B') {
            (n, 1)
        } else {
            (upper.as_str(), 1)
        };

        let value: u64 = num_str.trim().parse().map_err(|_| {
            PoolError::InvalidLimit(format!(
                "'{s}': expected a number followed by an optional suffix (K, M, G)"
            ))
        })?;

        let bytes = value
            .checked_mul(multiplier)
            .ok_or_else(|| PoolError::InvalidLimit(format!("'{s}' overflows u64")))?;

        Ok(Self { bytes })
    }
}

impl fmt::Display for MemoryLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.bytes;
        if b == 0 {
            write!(f, "unlimited")
        } else if b % GB == 0 {
            write!(f, "{} GB", b / GB)
        } else if b % MB == 0 {
            write!(f, "{} MB", b / MB)
        } else if b % KB == 0 {
            write!(f, "{} KB", b / KB)
        } else {
            write!(f, "{b} B")
        }
    }
}

impl From<u64> for MemoryLimit {
    fn from(bytes: u64) -> Self {
        Self::from_bytes(bytes)
    }
}
