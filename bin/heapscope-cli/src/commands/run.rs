// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `heapscope run` command: execute one workload and print its reports.

use std::path::PathBuf;

use heap_tracker::leak_summary;

use crate::workload::{WorkloadReport, run_workload};

pub fn execute(
    config_path: Option<PathBuf>,
    operations: Option<usize>,
    quota: Option<String>,
    seed: Option<u64>,
    json: bool,
) -> anyhow::Result<()> {
    let mut config = super::load_config(config_path)?;
    if let Some(operations) = operations {
        config.operations = operations;
    }
    if let Some(quota) = quota {
        config.quota = quota;
    }
    if let Some(seed) = seed {
        config.seed = seed;
    }

    if json {
        let report = run_workload(&config)?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("╔══════════════════════════════════════════════════════╗");
    println!("║            heapscope · Workload Runner              ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    println!("  Config:");
    println!("   Operations: {}", config.operations);
    println!("   Quota:      {}", config.quota);
    println!("   Blocks:     {}..={} bytes", config.min_block, config.max_block);
    println!("   Seed:       {}", config.seed);
    println!();

    println!("  [1/2] Executing workload...");
    let report = run_workload(&config)?;
    println!("        {} operations done.", report.operations);
    println!();

    println!("  [2/2] Collecting reports...");
    println!();

    print_report(&report);
    Ok(())
}

/// Prints the human-readable report sections.
pub(crate) fn print_report(report: &WorkloadReport) {
    println!("  Operations:");
    println!("   Allocations:      {}", report.allocations);
    println!("   Zero allocations: {}", report.zero_allocations);
    println!("   Resizes:          {}", report.resizes);
    println!("   Releases:         {}", report.releases);
    println!("   Refused:          {}", report.refused);
    println!();

    println!("  Usage report:");
    println!();
    println!("{}", report.stats.summary());
    println!();

    if let (Some(low), Some(high)) = (report.stats.heap_min, report.stats.heap_max) {
        println!("  Heap envelope: {low:#x}..{high:#x} ({} bytes)", high - low);
        println!();
    }

    println!("  Leak report:");
    println!();
    println!("{}", leak_summary(&report.leaked));
    println!();
}
