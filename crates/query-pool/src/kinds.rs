// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Element types handed out by the pool and their estimated sizes.
//!
//! The size constants are the in-memory footprint of one element as laid
//! out in a `Vec`. Heap data an element points at (label strings, histogram
//! buckets) is not counted; the estimate covers the buffer only.

use std::mem::size_of;
use std::sync::Arc;

/// Milliseconds since the Unix epoch.
pub type Timestamp = i64;

/// A float sample at a point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FPoint {
    pub t: Timestamp,
    pub f: f64,
}

/// A native histogram with float counts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FloatHistogram {
    pub schema: i32,
    pub zero_threshold: f64,
    pub zero_count: f64,
    pub count: f64,
    pub sum: f64,
    pub positive_buckets: Vec<f64>,
    pub negative_buckets: Vec<f64>,
}

/// A histogram sample at a point in time.
///
/// Histograms are shared rather than copied between evaluation steps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HPoint {
    pub t: Timestamp,
    pub h: Option<Arc<FloatHistogram>>,
}

/// A single name/value label pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Label {
    pub name: String,
    pub value: String,
}

/// A sorted set of labels identifying a series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Labels(Vec<Label>);

impl Labels {
    /// Builds a label set from name/value pairs, sorted by name.
    pub fn from_pairs<I, N, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<String>,
    {
        let mut labels: Vec<Label> = pairs
            .into_iter()
            .map(|(name, value)| Label {
                name: name.into(),
                value: value.into(),
            })
            .collect();
        labels.sort();
        Self(labels)
    }

    /// Returns the value of `name`, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|l| l.name == name)
            .map(|l| l.value.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.0.iter()
    }
}

/// One element of an instant vector: a labelled float or histogram sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sample {
    pub t: Timestamp,
    pub f: f64,
    pub h: Option<Arc<FloatHistogram>>,
    pub metric: Labels,
}

/// An instant vector.
pub type Vector = Vec<Sample>;

/// Estimated bytes per [`FPoint`].
pub const FPOINT_SIZE: u64 = size_of::<FPoint>() as u64;
/// Estimated bytes per [`HPoint`].
pub const HPOINT_SIZE: u64 = size_of::<HPoint>() as u64;
/// Estimated bytes per [`Sample`] in a [`Vector`].
pub const VECTOR_SAMPLE_SIZE: u64 = size_of::<Sample>() as u64;
/// Estimated bytes per `f64`.
pub const FLOAT64_SIZE: u64 = size_of::<f64>() as u64;
/// Estimated bytes per `bool`.
pub const BOOL_SIZE: u64 = size_of::<bool>() as u64;

/// Discriminates the pooled element kinds, mostly for logs and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    FPoint,
    HPoint,
    Vector,
    Float,
    Bool,
}

impl ElementKind {
    /// All kinds, in a stable order.
    pub const ALL: [ElementKind; 5] = [
        ElementKind::FPoint,
        ElementKind::HPoint,
        ElementKind::Vector,
        ElementKind::Float,
        ElementKind::Bool,
    ];

    /// Returns the estimated size of one element of this kind.
    pub fn element_size(self) -> u64 {
        match self {
            ElementKind::FPoint => FPOINT_SIZE,
            ElementKind::HPoint => HPOINT_SIZE,
            ElementKind::Vector => VECTOR_SAMPLE_SIZE,
            ElementKind::Float => FLOAT64_SIZE,
            ElementKind::Bool => BOOL_SIZE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::FPoint => "fpoint",
            ElementKind::HPoint => "hpoint",
            ElementKind::Vector => "vector",
            ElementKind::Float => "float",
            ElementKind::Bool => "bool",
        }
    }

    /// Parses a kind name as accepted by [`ElementKind::as_str`].
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes() {
        assert_eq!(FPOINT_SIZE, 16);
        // Option<Arc<_>> uses the null niche.
        assert_eq!(HPOINT_SIZE, 16);
        assert_eq!(FLOAT64_SIZE, 8);
        assert_eq!(BOOL_SIZE, 1);
        assert!(VECTOR_SAMPLE_SIZE >= 40);
    }

    #[test]
    fn test_kind_roundtrip() {
        for kind in ElementKind::ALL {
            assert_eq!(ElementKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ElementKind::parse(" Float "), Some(ElementKind::Float));
        assert_eq!(ElementKind::parse("string"), None);
    }

    #[test]
    fn test_kind_serde() {
        let json = serde_json::to_string(&ElementKind::HPoint).unwrap();
        assert_eq!(json, "\"hpoint\"");
        let back: ElementKind = serde_json::from_str("\"bool\"").unwrap();
        assert_eq!(back, ElementKind::Bool);
    }

    #[test]
    fn test_labels_sorted() {
        let labels = Labels::from_pairs([("job", "api"), ("__name__", "up")]);
        let names: Vec<_> = labels.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["__name__", "job"]);
        assert_eq!(labels.get("job"), Some("api"));
        assert_eq!(labels.get("instance"), None);
        assert_eq!(labels.len(), 2);
    }
}
