// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The allocation tracker.
//!
//! [`HeapTracker`] is the facade over the whole crate: it services
//! allocation requests through a [`RawProvider`], tags every block with a
//! size header, folds each outcome into [`HeapStatistics`], and keeps a
//! registry of live blocks for leak reporting and end-of-life reclamation.
//!
//! # Design
//! - Every block is one raw range laid out as `[header | payload]`.
//!   Callers only ever see the payload address; release and resize walk
//!   back to the header in constant time.
//! - The tracker owns its statistics. There is no global state; two
//!   trackers account independently and tests run in isolation.
//! - Failures are recorded before they are returned, so the statistics
//!   never miss a failed request.

use std::ptr::{self, NonNull};

use crate::error::AllocError;
use crate::header::{self, HEADER_SIZE};
use crate::provider::{RawProvider, SystemProvider};
use crate::registry::BlockRegistry;
use crate::report::LeakRecord;
use crate::stats::HeapStatistics;

// ── Block handles ────────────────────────────────────────────────────────

/// Handle to a live tracked block.
///
/// Wraps the payload address. A `BlockAddr` is only ever produced by a
/// tracker, which keeps accidental tracking of foreign pointers out of
/// the API. The handle is `Copy`; liveness is the caller's obligation,
/// as with any raw allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockAddr(NonNull<u8>);

impl BlockAddr {
    pub(crate) fn from_payload(payload: NonNull<u8>) -> Self {
        Self(payload)
    }

    /// Raw payload pointer, valid for `size` bytes of reads and writes
    /// while the block is live.
    pub fn as_ptr(self) -> *mut u8 {
        self.0.as_ptr()
    }

    /// Payload pointer as [`NonNull`].
    pub fn as_non_null(self) -> NonNull<u8> {
        self.0
    }

    /// Integer value of the payload address.
    pub fn addr(self) -> usize {
        self.0.as_ptr() as usize
    }
}

// ── Tracker ──────────────────────────────────────────────────────────────

/// Diagnostic allocation layer over a raw memory provider.
///
/// The tracker services four primitives (allocate, release, resize,
/// zero-allocate) and answers two questions at any time: what is live
/// right now ([`leak_report`](Self::leak_report)) and what has happened
/// so far ([`snapshot`](Self::snapshot)).
///
/// Dropping a tracker returns every still-live block to the provider, so
/// a leaky workload cannot leak real memory past the tracker's lifetime.
///
/// # Examples
/// ```
/// use heap_tracker::HeapTracker;
///
/// let mut heap = HeapTracker::new();
/// let a = heap.allocate(10).unwrap();
/// let b = heap.allocate(20).unwrap();
///
/// let snap = heap.snapshot();
/// assert_eq!(snap.active_count, 2);
/// assert_eq!(snap.active_bytes, 30);
///
/// // SAFETY: `a` is live and released exactly once.
/// unsafe { heap.release(Some(a)) };
/// assert_eq!(heap.snapshot().active_bytes, 20);
/// # unsafe { heap.release(Some(b)) };
/// ```
pub struct HeapTracker<P: RawProvider = SystemProvider> {
    provider: P,
    stats: HeapStatistics,
    registry: BlockRegistry,
}

impl HeapTracker<SystemProvider> {
    /// Creates a tracker backed by the process allocator.
    pub fn new() -> Self {
        Self::with_provider(SystemProvider)
    }
}

impl Default for HeapTracker<SystemProvider> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: RawProvider> HeapTracker<P> {
    /// Creates a tracker over an explicit provider.
    ///
    /// The provider is owned for the tracker's lifetime; all raw ranges
    /// are acquired from and returned to it.
    pub fn with_provider(provider: P) -> Self {
        Self {
            provider,
            stats: HeapStatistics::default(),
            registry: BlockRegistry::default(),
        }
    }

    /// Read access to the underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Allocates a block with `size` bytes of payload.
    ///
    /// Zero-size requests succeed and hand out a distinct, dereferenceable
    /// address per block. On failure the request is folded into the
    /// failure statistics before the error is returned.
    pub fn allocate(&mut self, size: usize) -> Result<BlockAddr, AllocError> {
        // A request so large that the header cannot fit alongside it can
        // never be serviced; refuse before consulting the provider.
        let Some(raw_size) = size.checked_add(HEADER_SIZE) else {
            self.stats.record_failure(size);
            return Err(AllocError::Unserviceable { requested: size });
        };

        let Some(base) = self.provider.acquire(raw_size) else {
            self.stats.record_failure(size);
            return Err(AllocError::Exhausted { requested: size });
        };

        // SAFETY: the provider contract guarantees `base` is writable for
        // `raw_size` bytes and header-aligned.
        let payload = unsafe { header::write(base, size) };
        let addr = BlockAddr::from_payload(payload);

        self.stats.record_allocation(addr.addr(), size);
        self.registry.insert(addr.addr(), size);
        Ok(addr)
    }

    /// Releases a block. `None` is a defined no-op.
    ///
    /// The payload size is read back from the block header, so release
    /// needs no size argument and runs in constant time.
    ///
    /// # Safety
    ///
    /// A `Some` handle must have come from this tracker, must be live,
    /// and must not be used after this call.
    pub unsafe fn release(&mut self, addr: Option<BlockAddr>) {
        let Some(addr) = addr else { return };
        let payload = addr.as_non_null();

        // SAFETY: the caller guarantees the block is live, so its header
        // is intact.
        let size = unsafe { header::payload_size(payload) };
        let tracked = self.registry.remove(addr.addr());
        debug_assert_eq!(
            tracked,
            Some(size),
            "release of {:#x}: not a live block of this tracker",
            addr.addr()
        );

        self.stats.record_release(size);

        // SAFETY: the full range was acquired as one block of
        // `HEADER_SIZE + size` bytes.
        unsafe {
            let base = header::base_of(payload);
            self.provider.release(base, HEADER_SIZE + size);
        }
    }

    /// Moves a block to a new payload size, returning the new handle.
    ///
    /// Payload bytes are copied up to the smaller of the old and new
    /// sizes. A `None` handle behaves as a fresh allocation; a zero
    /// `new_size` behaves as a release and returns `Ok(None)`. If the new
    /// block cannot be allocated the original block is left untouched and
    /// still live.
    ///
    /// # Safety
    ///
    /// Same contract as [`release`](Self::release): a `Some` handle must
    /// be a live block of this tracker and must not be used after a
    /// successful call.
    pub unsafe fn resize(
        &mut self,
        addr: Option<BlockAddr>,
        new_size: usize,
    ) -> Result<Option<BlockAddr>, AllocError> {
        if new_size == 0 {
            // SAFETY: forwarded under this function's own contract.
            unsafe { self.release(addr) };
            return Ok(None);
        }

        // Allocate first so a failure leaves the original block intact.
        let fresh = self.allocate(new_size)?;

        if let Some(old) = addr {
            // SAFETY: `old` is live per the caller's contract; `fresh` was
            // just allocated with `new_size` writable payload bytes, and
            // the two blocks are distinct ranges.
            unsafe {
                let old_size = header::payload_size(old.as_non_null());
                let keep = old_size.min(new_size);
                ptr::copy_nonoverlapping(old.as_ptr(), fresh.as_ptr(), keep);
            }
        }

        // SAFETY: forwarded under this function's own contract.
        unsafe { self.release(addr) };
        Ok(Some(fresh))
    }

    /// Allocates a zero-filled block for `count` items of `unit_size`
    /// bytes each.
    ///
    /// The total payload is `count * unit_size`; if that product cannot
    /// be represented the request fails up front and is recorded at the
    /// saturated request size.
    pub fn zero_allocate(&mut self, count: usize, unit_size: usize) -> Result<BlockAddr, AllocError> {
        let Some(total) = count.checked_mul(unit_size) else {
            self.stats.record_failure(usize::MAX);
            return Err(AllocError::Unserviceable {
                requested: usize::MAX,
            });
        };

        let addr = self.allocate(total)?;
        // SAFETY: `addr` is a live block with exactly `total` payload bytes.
        unsafe { ptr::write_bytes(addr.as_ptr(), 0, total) };
        Ok(addr)
    }

    /// Returns a frozen copy of the running statistics.
    pub fn snapshot(&self) -> HeapStatistics {
        self.stats.clone()
    }

    /// Lists every block still live, in ascending address order.
    pub fn leak_report(&self) -> Vec<LeakRecord> {
        self.registry
            .iter()
            .map(|(address, size)| LeakRecord { address, size })
            .collect()
    }

    /// Renders the canonical two-line usage report for the current state.
    pub fn usage_report(&self) -> String {
        self.stats.summary()
    }
}

// ── Teardown ─────────────────────────────────────────────────────────────

impl<P: RawProvider> Drop for HeapTracker<P> {
    /// Returns every still-live block to the provider.
    ///
    /// Statistics are not rewritten: a snapshot taken before the drop
    /// still shows the blocks as active, which is exactly what a leak
    /// diagnosis needs.
    fn drop(&mut self) {
        for (address, size) in self.registry.drain_all() {
            // SAFETY: every registry entry is a live block allocated by
            // this tracker, so its base sits `HEADER_SIZE` bytes below
            // the payload and the full range is `HEADER_SIZE + size`.
            unsafe {
                let base = NonNull::new_unchecked((address - HEADER_SIZE) as *mut u8);
                self.provider.release(base, HEADER_SIZE + size);
            }
        }
    }
}
