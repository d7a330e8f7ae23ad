// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `heapscope sweep` command: replay one workload across several quotas.
//!
//! The seed is fixed across runs, so the request sequence is identical and
//! the only variable is how much of it each quota can serve. The printed
//! table makes the failure cliff visible at a glance.

use std::path::PathBuf;

use heap_tracker::Quota;

use crate::workload::{WorkloadReport, run_workload};

pub fn execute(
    config_path: Option<PathBuf>,
    quotas: String,
    operations: Option<usize>,
    seed: Option<u64>,
) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║             heapscope · Quota Sweep                 ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let mut config = super::load_config(config_path)?;
    if let Some(operations) = operations {
        config.operations = operations;
    }
    if let Some(seed) = seed {
        config.seed = seed;
    }

    // Parse comma-separated quotas up front so a typo fails the whole
    // sweep instead of one row.
    let quotas: Vec<Quota> = quotas
        .split(',')
        .map(|s| {
            Quota::parse(s.trim())
                .map_err(|e| anyhow::anyhow!("invalid quota '{}': {e}", s.trim()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    println!("  Operations: {} per run, seed {}", config.operations, config.seed);
    println!(
        "  Quotas:     {:?}",
        quotas.iter().map(|q| format!("{q}")).collect::<Vec<_>>(),
    );
    println!();

    // ── Results Table ──────────────────────────────────────────
    println!(
        "  {:<10} {:>10} {:>10} {:>10} {:>14} {:>14}",
        "Quota", "Served", "Refused", "Resizes", "Active bytes", "Envelope",
    );
    println!("  {}", "-".repeat(74));

    let mut results: Vec<WorkloadReport> = Vec::new();

    for quota in &quotas {
        let mut run_config = config.clone();
        run_config.quota = format!("{quota}");
        let report = run_workload(&run_config)?;

        println!(
            "  {:<10} {:>10} {:>10} {:>10} {:>14} {:>14}",
            report.quota,
            report.stats.total_count,
            report.refused,
            report.resizes,
            report.stats.active_bytes,
            envelope_label(&report),
        );
        results.push(report);
    }

    println!();

    // ── Summary ────────────────────────────────────────────────
    let smallest_clean = quotas
        .iter()
        .zip(&results)
        .filter(|(_, report)| report.refused == 0)
        .min_by_key(|(quota, _)| quota.as_bytes());
    match smallest_clean {
        Some((quota, _)) => {
            println!("  Smallest clean quota: {quota} (zero refused requests)");
        }
        None => {
            println!("  No quota served the full workload; every run saw refusals.");
        }
    }
    println!();

    Ok(())
}

/// Formats the payload address envelope, or a dash before any allocation
/// succeeded.
fn envelope_label(report: &WorkloadReport) -> String {
    match (report.stats.heap_min, report.stats.heap_max) {
        (Some(low), Some(high)) => format!("{} B", high - low),
        _ => "-".to_string(),
    }
}
