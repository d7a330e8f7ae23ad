// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `heapscope leaks` command: abandon a fraction of blocks on purpose.
//!
//! Useful as a demonstration of the leak report and as a fixture while
//! eyeballing report output. The tracker reclaims the abandoned blocks on
//! teardown, so the process itself stays clean.

use std::path::PathBuf;

pub fn execute(
    config_path: Option<PathBuf>,
    leak_ratio: f64,
    operations: Option<usize>,
    quota: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let mut config = super::load_config(config_path)?;
    config.leak_ratio = leak_ratio;
    if let Some(operations) = operations {
        config.operations = operations;
    }
    if let Some(quota) = quota {
        config.quota = quota;
    }

    let report = crate::workload::run_workload(&config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("╔══════════════════════════════════════════════════════╗");
    println!("║              heapscope · Leak Hunt                  ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    println!("  Config:");
    println!("   Operations: {}", config.operations);
    println!("   Quota:      {}", report.quota);
    println!("   Leak ratio: {leak_ratio}");
    println!();

    super::run::print_report(&report);

    if !report.leaked.is_empty() {
        let leaked_bytes: u64 = report.leaked.iter().map(|leak| leak.size as u64).sum();
        println!(
            "  {} of {} lifetime blocks were abandoned ({leaked_bytes} bytes held at exit).",
            report.leaked.len(),
            report.stats.total_count,
        );
        println!();
    }

    Ok(())
}
