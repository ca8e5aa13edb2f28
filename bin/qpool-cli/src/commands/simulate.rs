// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `qpool simulate` command: replay a get/put script against one pool.
//!
//! Useful for checking what a given limit means for an evaluator's access
//! pattern: which requests would be refused and what the peak would be.

use anyhow::{anyhow, bail, Context};
use query_pool::{Counter, ElementKind, LimitingPool, MemoryLimit, PoolConfig, PoolError};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Get(usize),
    Put(usize),
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::Get(n) => write!(f, "get:{n}"),
            Step::Put(n) => write!(f, "put:{n}"),
        }
    }
}

#[derive(Debug)]
enum Outcome {
    /// Buffer handed out with this capacity.
    Granted(usize),
    Rejected,
    /// Buffer with this capacity returned.
    Returned(usize),
    /// No outstanding buffer was requested with that size.
    NothingToPut,
}

#[derive(Debug)]
struct StepReport {
    step: Step,
    outcome: Outcome,
    current: u64,
    peak: u64,
}

pub fn execute(
    config_path: Option<PathBuf>,
    limit: String,
    kind: String,
    script: String,
    json: bool,
) -> anyhow::Result<()> {
    let config = match config_path {
        Some(path) => PoolConfig::from_file(&path)?,
        None => PoolConfig {
            max_estimated_memory: limit,
            ..Default::default()
        },
    };
    let kind = ElementKind::parse(&kind).ok_or_else(|| {
        anyhow!("unknown kind '{kind}'; expected fpoint, hpoint, vector, float or bool")
    })?;
    let steps = parse_script(&script)?;

    let counter = Counter::rejected_queries();
    let pool = LimitingPool::from_config(&config, Some(Arc::new(counter.clone())))
        .context("cannot create pool")?;

    tracing::info!(
        %kind,
        limit = %MemoryLimit::from_bytes(pool.max_estimated_bytes()),
        steps = steps.len(),
        "replaying script"
    );

    let reports = replay_kind(&pool, kind, &steps);

    if json {
        let value = serde_json::json!({
            "kind": kind,
            "max_estimated_bytes": pool.max_estimated_bytes(),
            "current_estimated_bytes": pool.current_estimated_bytes(),
            "rejected_queries": counter.get(),
            "stats": pool.stats(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!(
        "  kind {kind} ({} B/element), limit {}",
        kind.element_size(),
        MemoryLimit::from_bytes(pool.max_estimated_bytes()),
    );
    println!();
    println!(
        "  {:<10} {:<16} {:>12} {:>12}",
        "Step", "Result", "Current B", "Peak B"
    );
    println!("  {}", "-".repeat(53));
    for r in &reports {
        let result = match r.outcome {
            Outcome::Granted(cap) => format!("ok, cap {cap}"),
            Outcome::Rejected => "REJECTED".to_string(),
            Outcome::Returned(cap) => format!("returned {cap}"),
            Outcome::NothingToPut => "nothing held".to_string(),
        };
        println!(
            "  {:<10} {:<16} {:>12} {:>12}",
            r.step.to_string(),
            result,
            r.current,
            r.peak
        );
    }
    println!();
    println!("  {}", counter.render().trim_end().replace('\n', "\n  "));
    println!("  {}", pool.stats().summary());

    Ok(())
}

fn replay_kind(pool: &LimitingPool, kind: ElementKind, steps: &[Step]) -> Vec<StepReport> {
    match kind {
        ElementKind::FPoint => replay(
            pool,
            steps,
            |n| pool.get_fpoint_slice(n),
            |b| pool.put_fpoint_slice(b),
        ),
        ElementKind::HPoint => replay(
            pool,
            steps,
            |n| pool.get_hpoint_slice(n),
            |b| pool.put_hpoint_slice(b),
        ),
        ElementKind::Vector => {
            replay(pool, steps, |n| pool.get_vector(n), |b| pool.put_vector(b))
        }
        ElementKind::Float => replay(
            pool,
            steps,
            |n| pool.get_float_slice(n),
            |b| pool.put_float_slice(b),
        ),
        ElementKind::Bool => replay(
            pool,
            steps,
            |n| pool.get_bool_slice(n),
            |b| pool.put_bool_slice(b),
        ),
    }
}

fn replay<T>(
    pool: &LimitingPool,
    steps: &[Step],
    get: impl Fn(usize) -> Result<Vec<T>, PoolError>,
    put: impl Fn(Vec<T>),
) -> Vec<StepReport> {
    // (requested size, buffer) for everything still checked out.
    let mut held: Vec<(usize, Vec<T>)> = Vec::new();
    let mut reports = Vec::with_capacity(steps.len());

    for &step in steps {
        let outcome = match step {
            Step::Get(n) => match get(n) {
                Ok(buf) => {
                    let cap = buf.capacity();
                    held.push((n, buf));
                    Outcome::Granted(cap)
                }
                Err(e) => {
                    tracing::debug!("{step}: {e}");
                    Outcome::Rejected
                }
            },
            Step::Put(n) => match held.iter().rposition(|(size, _)| *size == n) {
                Some(idx) => {
                    let (_, buf) = held.remove(idx);
                    let cap = buf.capacity();
                    put(buf);
                    Outcome::Returned(cap)
                }
                None => Outcome::NothingToPut,
            },
        };
        reports.push(StepReport {
            step,
            outcome,
            current: pool.current_estimated_bytes(),
            peak: pool.peak_estimated_bytes(),
        });
    }

    reports
}

fn parse_script(script: &str) -> anyhow::Result<Vec<Step>> {
    let mut steps = Vec::new();
    for raw in script.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (op, n) = raw
            .split_once(':')
            .ok_or_else(|| anyhow!("step '{raw}' must look like get:N or put:N"))?;
        let n: usize = n
            .trim()
            .parse()
            .with_context(|| format!("step '{raw}' has an invalid size"))?;
        match op.trim().to_ascii_lowercase().as_str() {
            "get" => steps.push(Step::Get(n)),
            "put" => steps.push(Step::Put(n)),
            other => bail!("unknown operation '{other}' in step '{raw}'"),
        }
    }
    if steps.is_empty() {
        bail!("script is empty");
    }
    Ok(steps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script() {
        let steps = parse_script("get:7, GET:1 ,put:1,").unwrap();
        assert_eq!(steps, [Step::Get(7), Step::Get(1), Step::Put(1)]);
    }

    #[test]
    fn test_parse_script_errors() {
        assert!(parse_script("").is_err());
        assert!(parse_script("get").is_err());
        assert!(parse_script("get:x").is_err());
        assert!(parse_script("take:1").is_err());
    }

    #[test]
    fn test_replay_limited_scenario() {
        let size = ElementKind::Float.element_size();
        let pool = LimitingPool::new(11 * size, None);
        let steps = parse_script("get:7,get:1,put:1,get:4,get:3,get:1,get:1,get:1,get:1").unwrap();

        let reports = replay_kind(&pool, ElementKind::Float, &steps);
        let current: Vec<u64> = reports.iter().map(|r| r.current / size).collect();
        assert_eq!(current, [8, 9, 8, 8, 8, 9, 10, 11, 11]);
        assert!(matches!(reports[3].outcome, Outcome::Rejected));
        assert!(matches!(reports[4].outcome, Outcome::Rejected));
        assert!(matches!(reports[8].outcome, Outcome::Rejected));
        assert_eq!(reports[2].peak, 9 * size);
    }

    #[test]
    fn test_replay_put_without_buffer() {
        let pool = LimitingPool::new(0, None);
        let reports = replay_kind(&pool, ElementKind::Bool, &[Step::Put(3)]);
        assert!(matches!(reports[0].outcome, Outcome::NothingToPut));
        assert_eq!(reports[0].current, 0);
    }
}
