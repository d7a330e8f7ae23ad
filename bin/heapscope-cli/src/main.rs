// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # heapscope
//!
//! Command-line workload driver for the heap-tracker diagnostic allocator.
//!
//! ## Usage
//! ```bash
//! # Run a randomized allocation workload and print the usage report
//! heapscope run --operations 20000 --quota 1M
//!
//! # Sweep the same workload across several quotas
//! heapscope sweep --quotas 64K,256K,1M
//!
//! # Deliberately leak a fraction of blocks and print the leak report
//! heapscope leaks --leak-ratio 0.25
//! ```

mod commands;
mod config;
mod workload;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "heapscope",
    about = "Randomized allocation workloads over a tracked heap",
    version,
    author
)]
struct Cli {
    /// Path to a TOML workload configuration file.
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
    /// Run one workload and print the usage and leak reports.
    Run {
        /// Number of workload operations to execute.
        #[arg(short, long)]
        operations: Option<usize>,

        /// Provider quota (e.g., "512K", "1M").
        #[arg(short, long)]
        quota: Option<String>,

        /// Seed for the workload RNG.
        #[arg(short, long)]
        seed: Option<u64>,

        /// Emit the full report as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Run the same workload across several quotas and compare outcomes.
    Sweep {
        /// Comma-separated quotas to sweep (e.g., "64K,256K,1M").
        #[arg(long, default_value = "64K,256K,1M")]
        quotas: String,

        /// Number of workload operations per run.
        #[arg(short, long)]
        operations: Option<usize>,

        /// Seed for the workload RNG.
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Leak a fraction of blocks on purpose and print the leak report.
    Leaks {
        /// Fraction of live blocks to abandon at the end of the run.
        #[arg(short, long, default_value_t = 0.25)]
        leak_ratio: f64,

        /// Number of workload operations to execute.
        #[arg(short, long)]
        operations: Option<usize>,

        /// Provider quota (e.g., "512K", "1M").
        #[arg(short, long)]
        quota: Option<String>,

        /// Emit the full report as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing/logging based on verbosity.
    commands::init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            operations,
            quota,
            seed,
            json,
        } => commands::run::execute(cli.config, operations, quota, seed, json),
        Commands::Sweep {
            quotas,
            operations,
            seed,
        } => commands::sweep::execute(cli.config, quotas, operations, seed),
        Commands::Leaks {
            leak_ratio,
            operations,
            quota,
            json,
        } => commands::leaks::execute(cli.config, leak_ratio, operations, quota, json),
    }
}
