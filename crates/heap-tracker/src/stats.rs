// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Running heap statistics.
//!
//! [`HeapStatistics`] aggregates every allocation outcome a tracker
//! observes: live and lifetime counts, live and lifetime byte totals,
//! failed requests, and the address envelope of all payloads ever handed
//! out. Counters are 64-bit so lifetime totals survive long runs; the
//! address bounds are `usize` because they are real pointers.

use std::fmt;

/// Point-in-time view of a tracker's allocation activity.
///
/// Obtained from [`HeapTracker::snapshot`](crate::HeapTracker::snapshot).
/// All fields are plain data; a snapshot stays frozen while the tracker
/// moves on.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct HeapStatistics {
    /// Number of blocks currently allocated and not yet released.
    pub active_count: u64,
    /// Payload bytes across currently live blocks.
    pub active_bytes: u64,
    /// Lifetime number of successful allocations. Never decreases.
    pub total_count: u64,
    /// Lifetime payload bytes across all successful allocations.
    pub total_bytes: u64,
    /// Number of requests that failed.
    pub fail_count: u64,
    /// Sum of payload sizes requested by failed allocations. Saturates
    /// at `u64::MAX`.
    pub fail_bytes: u64,
    /// Lowest payload address ever handed out. `None` before the first
    /// successful allocation. Never rises once set.
    pub heap_min: Option<usize>,
    /// Highest payload end address (address plus size) ever handed out.
    /// `None` before the first successful allocation. Never falls once set.
    pub heap_max: Option<usize>,
}

impl HeapStatistics {
    /// Folds one successful allocation into the totals.
    pub(crate) fn record_allocation(&mut self, address: usize, size: usize) {
        self.active_count += 1;
        self.total_count += 1;
        self.active_bytes += size as u64;
        self.total_bytes += size as u64;

        let end = address + size;
        self.heap_min = Some(match self.heap_min {
            Some(low) => low.min(address),
            None => address,
        });
        self.heap_max = Some(match self.heap_max {
            Some(high) => high.max(end),
            None => end,
        });
    }

    /// Folds one failed request into the totals.
    pub(crate) fn record_failure(&mut self, requested: usize) {
        self.fail_count += 1;
        // Requests near usize::MAX can repeat; saturate instead of wrapping.
        self.fail_bytes = self.fail_bytes.saturating_add(requested as u64);
    }

    /// Folds one release into the totals. Lifetime counters and the
    /// address envelope are left untouched.
    pub(crate) fn record_release(&mut self, size: usize) {
        debug_assert!(self.active_count > 0, "release with no live blocks");
        self.active_count -= 1;
        self.active_bytes -= size as u64;
    }

    /// Renders the canonical two-line usage report.
    ///
    /// The first line carries counts, the second byte totals, each field
    /// right-aligned in a ten-character column. The layout is fixed so
    /// runs can be diffed textually.
    ///
    /// # Examples
    /// ```
    /// use heap_tracker::HeapStatistics;
    ///
    /// let text = HeapStatistics::default().summary();
    /// let lines: Vec<&str> = text.lines().collect();
    /// assert_eq!(lines.len(), 2);
    /// assert!(lines[0].starts_with("malloc count:"));
    /// assert!(lines[1].starts_with("malloc size:"));
    /// ```
    pub fn summary(&self) -> String {
        format!(
            "malloc count: active {:10}   total {:10}   fail {:10}\n\
             malloc size:  active {:10}   total {:10}   fail {:10}",
            self.active_count,
            self.total_count,
            self.fail_count,
            self.active_bytes,
            self.total_bytes,
            self.fail_bytes,
        )
    }
}

impl fmt::Display for HeapStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}
