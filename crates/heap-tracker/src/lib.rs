// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # heap-tracker
//!
//! A diagnostic allocation layer: every block is tagged with a size header,
//! every outcome is folded into running statistics, and anything still live
//! can be enumerated as a leak report.
//!
//! # Key Components
//!
//! - [`HeapTracker`] — the facade: services allocate, release, resize, and
//!   zero-allocate, and owns all accounting state.
//! - [`RawProvider`] — the raw memory seam. [`SystemProvider`] forwards to
//!   the process allocator; [`QuotaProvider`] caps outstanding bytes at a
//!   [`Quota`] so allocation failure is reproducible.
//! - [`HeapStatistics`] — the eight-field ledger: live and lifetime counts
//!   and byte totals, failure totals, and the payload address envelope.
//! - [`LeakRecord`] / [`leak_summary`] — still-live blocks in ascending
//!   address order, rendered one line per block.
//!
//! # Block Layout
//!
//! ```text
//! provider range:  [ BlockHeader | payload ............ ]
//!                  ▲             ▲
//!                  base          BlockAddr (what callers hold)
//! ```
//!
//! The header stores the payload size, so release and resize recover the
//! full block from the payload address in constant time. No table lookup
//! sits on the release path; the live-block registry exists only for leak
//! reporting and end-of-life reclamation.
//!
//! # Example
//! ```
//! use heap_tracker::HeapTracker;
//!
//! let mut heap = HeapTracker::new();
//! let block = heap.allocate(10).unwrap();
//!
//! let snap = heap.snapshot();
//! assert_eq!(snap.active_count, 1);
//! assert_eq!(snap.total_bytes, 10);
//!
//! // Blocks are released explicitly; the handle must not be reused.
//! unsafe { heap.release(Some(block)) };
//! assert_eq!(heap.snapshot().active_count, 0);
//! ```

mod error;
mod header;
mod provider;
mod quota;
mod registry;
mod report;
mod stats;
pub mod tracker;

pub use error::{AllocError, QuotaError};
pub use header::{HEADER_ALIGN, HEADER_SIZE};
pub use provider::{RawProvider, SystemProvider};
pub use quota::{Quota, QuotaProvider};
pub use report::{LeakRecord, leak_summary};
pub use stats::HeapStatistics;
pub use tracker::{BlockAddr, HeapTracker};
