// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Pool configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! max_estimated_memory = "512M"
//! record_rejections = true
//! ```

use crate::{MemoryLimit, PoolError};
use std::path::Path;

/// Configuration for the pools created for each query.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PoolConfig {
    /// Per-query estimated memory ceiling (human-readable, e.g. `"512M"`).
    /// `"0"` or `"unlimited"` disables the limit.
    #[serde(default = "default_limit")]
    pub max_estimated_memory: String,
    /// Whether rejected queries should be reported to the metric.
    #[serde(default = "default_true")]
    pub record_rejections: bool,
}

fn default_limit() -> String {
    "unlimited".to_string()
}

fn default_true() -> bool {
    true
}

impl PoolConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, PoolError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PoolError::Config(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, PoolError> {
        toml::from_str(toml_str).map_err(|e| PoolError::Config(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, PoolError> {
        toml::to_string_pretty(self)
            .map_err(|e| PoolError::Config(format!("TOML serialise error: {e}")))
    }

    /// Parses the limit string into a [`MemoryLimit`].
    pub fn parse_limit(&self) -> Result<MemoryLimit, PoolError> {
        MemoryLimit::parse(&self.max_estimated_memory)
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_estimated_memory: default_limit(),
            record_rejections: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let c = PoolConfig::default();
        assert!(c.parse_limit().unwrap().is_unlimited());
        assert!(c.record_rejections);
    }

    #[test]
    fn test_from_toml() {
        let c = PoolConfig::from_toml(
            r#"
max_estimated_memory = "1G"
record_rejections = false
"#,
        )
        .unwrap();
        assert_eq!(c.parse_limit().unwrap(), MemoryLimit::from_gb(1));
        assert!(!c.record_rejections);
    }

    #[test]
    fn test_from_empty_toml_uses_defaults() {
        let c = PoolConfig::from_toml("").unwrap();
        assert_eq!(c, PoolConfig::default());
    }

    #[test]
    fn test_to_toml_roundtrip() {
        let c = PoolConfig {
            max_estimated_memory: "64K".into(),
            record_rejections: false,
        };
        let back = PoolConfig::from_toml(&c.to_toml().unwrap()).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_bad_toml() {
        let err = PoolConfig::from_toml("max_estimated_memory = 5 = 6").unwrap_err();
        assert!(matches!(err, PoolError::Config(_)));
    }

    #[test]
    fn test_bad_limit() {
        let c = PoolConfig {
            max_estimated_memory: "lots".into(),
            ..Default::default()
        };
        assert!(matches!(c.parse_limit(), Err(PoolError::InvalidLimit(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = PoolConfig::from_file(Path::new("/nonexistent/pool.toml")).unwrap_err();
        assert!(err.to_string().contains("cannot read config"));
    }
}
