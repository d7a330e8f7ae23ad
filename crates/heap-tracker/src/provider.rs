// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Raw memory providers.
//!
//! A [`HeapTracker`](crate::HeapTracker) never calls the global allocator
//! directly. It asks a [`RawProvider`] for whole raw ranges (header plus
//! payload) and returns those same ranges on release. Swapping the provider
//! swaps the memory source without touching accounting: [`SystemProvider`]
//! forwards to the process allocator, [`QuotaProvider`](crate::QuotaProvider)
//! wraps another provider with a byte ceiling, and tests plug in scripted
//! providers to force failures deterministically.

use std::alloc::{self, Layout};
use std::ptr::NonNull;

use crate::header::HEADER_ALIGN;

/// Source of raw memory ranges for a tracker.
///
/// Implementations decide where bytes come from and when to refuse a
/// request. They see full block sizes (header included), never payload
/// sizes, so a quota measured at this seam accounts for real consumption.
pub trait RawProvider {
    /// Attempts to reserve `size` bytes, returning the base of the range.
    ///
    /// A returned range must be valid for reads and writes of `size` bytes
    /// and aligned to at least [`HEADER_ALIGN`](crate::HEADER_ALIGN).
    /// Returning `None` signals refusal; the tracker records the failure
    /// and surfaces it to the caller.
    fn acquire(&mut self, size: usize) -> Option<NonNull<u8>>;

    /// Returns a previously acquired range to the provider.
    ///
    /// # Safety
    ///
    /// `base` must have come from [`acquire`](Self::acquire) on this same
    /// provider with this exact `size`, and must not be used afterwards.
    unsafe fn release(&mut self, base: NonNull<u8>, size: usize);
}

/// Provider backed by the process-global allocator.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProvider;

impl RawProvider for SystemProvider {
    fn acquire(&mut self, size: usize) -> Option<NonNull<u8>> {
        // Zero-size layouts are rejected by the global allocator contract.
        // Trackers always include the header, so size is never zero here,
        // but a guard keeps foreign callers sound.
        if size == 0 {
            return None;
        }
        let layout = Layout::from_size_align(size, HEADER_ALIGN).ok()?;
        // SAFETY: layout has nonzero size.
        NonNull::new(unsafe { alloc::alloc(layout) })
    }

    unsafe fn release(&mut self, base: NonNull<u8>, size: usize) {
        // SAFETY: acquire validated this exact (size, align) pair, and the
        // caller guarantees base came from acquire with this size.
        unsafe {
            let layout = Layout::from_size_align_unchecked(size, HEADER_ALIGN);
            alloc::dealloc(base.as_ptr(), layout);
        }
    }
}
