// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Randomized allocation workload driver.
//!
//! Replays a seeded mix of allocate, zero-allocate, resize, and release
//! operations against a quota-bounded tracker, then collects the usage
//! statistics and leak report. The same seed and config always produce
//! the same operation sequence, so runs can be compared across quotas.

use heap_tracker::{BlockAddr, HeapStatistics, HeapTracker, LeakRecord, QuotaProvider};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::WorkloadConfig;

/// Everything one workload run produced.
#[derive(Debug, serde::Serialize)]
pub struct WorkloadReport {
    /// Quota the run was bounded by.
    pub quota: String,
    /// Operations requested by the config.
    pub operations: usize,
    /// Successful plain allocations.
    pub allocations: u64,
    /// Successful zero-filled allocations.
    pub zero_allocations: u64,
    /// Blocks released during the run.
    pub releases: u64,
    /// Blocks moved by resize.
    pub resizes: u64,
    /// Requests the provider refused.
    pub refused: u64,
    /// Final statistics snapshot.
    pub stats: HeapStatistics,
    /// Blocks deliberately left live at the end of the run.
    pub leaked: Vec<LeakRecord>,
}

/// Runs one workload to completion and collects its report.
///
/// Blocks selected for leaking stay live only until the tracker goes out
/// of scope here; teardown returns them to the provider, so a leaky run
/// does not leak process memory.
pub fn run_workload(config: &WorkloadConfig) -> anyhow::Result<WorkloadReport> {
    config.validate()?;
    let quota = config.parse_quota()?;

    tracing::info!(
        operations = config.operations,
        quota = %quota,
        seed = config.seed,
        "starting workload"
    );
    let effective = config.to_toml()?;
    tracing::debug!("effective config:\n{effective}");

    let mut heap = HeapTracker::with_provider(QuotaProvider::new(quota));
    let mut rng = SmallRng::seed_from_u64(config.seed);
    let mut live: Vec<BlockAddr> = Vec::new();

    let mut allocations: u64 = 0;
    let mut zero_allocations: u64 = 0;
    let mut releases: u64 = 0;
    let mut resizes: u64 = 0;

    for _ in 0..config.operations {
        let roll: f64 = rng.gen_range(0.0..1.0);

        if roll < config.release_ratio && !live.is_empty() {
            let index = rng.gen_range(0..live.len());
            let addr = live.swap_remove(index);
            // SAFETY: every handle in `live` is a live block of this
            // tracker and is removed from the list before release.
            unsafe { heap.release(Some(addr)) };
            releases += 1;
        } else if roll < config.release_ratio + config.resize_ratio && !live.is_empty() {
            let index = rng.gen_range(0..live.len());
            let addr = live.swap_remove(index);
            let new_size = rng.gen_range(config.min_block..=config.max_block);
            // SAFETY: as above; on success the old handle is dead and the
            // moved block replaces it in the list.
            match unsafe { heap.resize(Some(addr), new_size) } {
                Ok(Some(moved)) => {
                    live.push(moved);
                    resizes += 1;
                }
                Ok(None) => resizes += 1,
                // The original block survives a refused resize.
                Err(_) => live.push(addr),
            }
        } else {
            let size = rng.gen_range(config.min_block..=config.max_block);
            if rng.gen_bool(config.zero_fill_ratio) {
                let unit = rng.gen_range(1..=8);
                if let Ok(addr) = heap.zero_allocate(size / unit, unit) {
                    live.push(addr);
                    zero_allocations += 1;
                }
            } else if let Ok(addr) = heap.allocate(size) {
                live.push(addr);
                allocations += 1;
            }
        }
    }

    // Abandon the configured fraction, release the rest.
    let leak_count = (live.len() as f64 * config.leak_ratio).round() as usize;
    for addr in live.drain(leak_count..) {
        // SAFETY: drained handles leave the list and are released once.
        unsafe { heap.release(Some(addr)) };
    }

    let stats = heap.snapshot();
    let leaked = heap.leak_report();
    tracing::debug!(
        live = leaked.len(),
        failed = stats.fail_count,
        "workload drained"
    );

    Ok(WorkloadReport {
        quota: format!("{quota}"),
        operations: config.operations,
        allocations,
        zero_allocations,
        releases,
        resizes,
        refused: stats.fail_count,
        stats,
        leaked,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> WorkloadConfig {
        WorkloadConfig {
            operations: 400,
            quota: "1M".into(),
            min_block: 16,
            max_block: 512,
            ..Default::default()
        }
    }

    #[test]
    fn test_workload_is_reproducible() {
        let config = small_config();
        let first = run_workload(&config).unwrap();
        let second = run_workload(&config).unwrap();

        assert_eq!(first.allocations, second.allocations);
        assert_eq!(first.zero_allocations, second.zero_allocations);
        assert_eq!(first.releases, second.releases);
        assert_eq!(first.resizes, second.resizes);
        assert_eq!(first.refused, second.refused);
        assert_eq!(first.stats.total_count, second.stats.total_count);
        assert_eq!(first.stats.total_bytes, second.stats.total_bytes);

        // Leaked addresses move between runs, and the report is ordered by
        // address, so only the size multiset is stable.
        let mut first_sizes: Vec<usize> = first.leaked.iter().map(|leak| leak.size).collect();
        let mut second_sizes: Vec<usize> = second.leaked.iter().map(|leak| leak.size).collect();
        first_sizes.sort_unstable();
        second_sizes.sort_unstable();
        assert_eq!(first_sizes, second_sizes);
    }

    #[test]
    fn test_zero_leak_ratio_drains_everything() {
        let report = run_workload(&small_config()).unwrap();
        assert!(report.leaked.is_empty());
        assert_eq!(report.stats.active_count, 0);
        assert_eq!(report.stats.active_bytes, 0);
    }

    #[test]
    fn test_leak_ratio_keeps_blocks_live() {
        let config = WorkloadConfig {
            leak_ratio: 0.5,
            ..small_config()
        };
        let report = run_workload(&config).unwrap();
        assert!(!report.leaked.is_empty());
        assert_eq!(report.stats.active_count, report.leaked.len() as u64);

        let leaked_bytes: u64 = report.leaked.iter().map(|leak| leak.size as u64).sum();
        assert_eq!(report.stats.active_bytes, leaked_bytes);
    }

    #[test]
    fn test_tight_quota_refuses_every_request() {
        let config = WorkloadConfig {
            operations: 50,
            quota: "1K".into(),
            min_block: 2048,
            max_block: 4096,
            ..Default::default()
        };
        let report = run_workload(&config).unwrap();
        assert_eq!(report.refused, 50);
        assert_eq!(report.stats.total_count, 0);
        assert!(report.leaked.is_empty());
    }

    #[test]
    fn test_counters_reconcile_with_stats() {
        let report = run_workload(&small_config()).unwrap();
        // Resizes allocate a fresh block unless they degenerate to a
        // release, so lifetime totals are at least the sum of the three
        // success counters.
        assert!(
            report.stats.total_count
                >= report.allocations + report.zero_allocations
        );
        assert_eq!(report.stats.fail_count, report.refused);
    }
}
