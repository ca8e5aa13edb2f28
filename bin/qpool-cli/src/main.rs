// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # qpool
//!
//! Command-line interface for the query buffer pool.
//!
//! ## Usage
//! ```bash
//! # Replay an allocation script against an 11-element float budget
//! qpool simulate --limit 88 --kind float --script "get:7,get:1,put:1,get:4"
//!
//! # Same, with the limit taken from a TOML file
//! qpool --config pool.toml simulate --kind vector --script "get:100,put:100"
//!
//! # Show the estimated per-element sizes
//! qpool sizes
//! ```

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "qpool",
    about = "Memory-limited buffer pool for single-query evaluation",
    version,
    author
)]
struct Cli {
    /// Path to a TOML pool configuration file (overrides --limit).
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a get/put script against a fresh pool.
    Simulate {
        /// Per-query estimated memory limit (e.g. "176", "64K", "unlimited").
        #[arg(short, long, default_value = "unlimited")]
        limit: String,

        /// Element kind: fpoint, hpoint, vector, float, bool.
        #[arg(short, long, default_value = "float")]
        kind: String,

        /// Comma-separated steps, e.g. "get:7,get:1,put:1,get:4".
        /// `put:N` returns the latest outstanding buffer requested with N.
        #[arg(short, long)]
        script: String,

        /// Print the final statistics as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the estimated size of one element of each kind.
    Sizes,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);

    match cli.command {
        Commands::Simulate {
            limit,
            kind,
            script,
            json,
        } => commands::simulate::execute(cli.config, limit, kind, script, json),
        Commands::Sizes => commands::sizes::execute(),
    }
}
