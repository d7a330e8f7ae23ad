// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Size-prefixed block headers.
//!
//! Every block handed out by a [`HeapTracker`](crate::HeapTracker) is laid
//! out as `[BlockHeader | payload]` inside one contiguous raw range. The
//! header records the payload size, so release and resize recover full
//! block metadata from the payload address alone with constant-time pointer
//! arithmetic. No lookup structure is consulted on the hot path.

use std::mem;
use std::ptr::NonNull;

/// Metadata stored immediately before each payload.
#[repr(C)]
pub(crate) struct BlockHeader {
    /// Size of the payload in bytes, excluding this header.
    pub(crate) payload_size: usize,
}

/// Bytes of bookkeeping prepended to every payload.
///
/// A raw range of `HEADER_SIZE + payload` bytes backs each block, so a
/// provider quota must cover this overhead on top of the payload sizes.
pub const HEADER_SIZE: usize = mem::size_of::<BlockHeader>();

/// Minimum alignment a [`RawProvider`](crate::RawProvider) must guarantee
/// for the ranges it hands out, so the header can be written at the base.
pub const HEADER_ALIGN: usize = mem::align_of::<BlockHeader>();

/// Writes a header at `base` and returns the payload address after it.
///
/// # Safety
///
/// `base` must point to a writable range of at least `HEADER_SIZE +
/// payload_size` bytes, aligned to [`HEADER_ALIGN`].
pub(crate) unsafe fn write(base: NonNull<u8>, payload_size: usize) -> NonNull<u8> {
    let header = base.as_ptr().cast::<BlockHeader>();
    unsafe {
        header.write(BlockHeader { payload_size });
        NonNull::new_unchecked(base.as_ptr().add(HEADER_SIZE))
    }
}

/// Reads the payload size tagged onto the block at `payload`.
///
/// # Safety
///
/// `payload` must be an address previously returned by [`write`] whose
/// block has not yet been released.
pub(crate) unsafe fn payload_size(payload: NonNull<u8>) -> usize {
    let header = unsafe { payload.as_ptr().sub(HEADER_SIZE) }.cast::<BlockHeader>();
    unsafe { (*header).payload_size }
}

/// Recovers the base of the raw range backing the block at `payload`.
///
/// # Safety
///
/// Same contract as [`payload_size`].
pub(crate) unsafe fn base_of(payload: NonNull<u8>) -> NonNull<u8> {
    unsafe { NonNull::new_unchecked(payload.as_ptr().sub(HEADER_SIZE)) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_size_is_one_word() {
        assert_eq!(HEADER_SIZE, mem::size_of::<usize>());
        assert_eq!(HEADER_ALIGN, mem::align_of::<usize>());
    }

    #[test]
    fn test_write_then_read_back() {
        // usize backing keeps the scratch range header-aligned.
        let mut backing = [0usize; 8];
        let base = NonNull::new(backing.as_mut_ptr().cast::<u8>()).unwrap();

        let payload = unsafe { write(base, 24) };
        assert_eq!(
            payload.as_ptr() as usize,
            base.as_ptr() as usize + HEADER_SIZE
        );
        assert_eq!(unsafe { payload_size(payload) }, 24);
        assert_eq!(unsafe { base_of(payload) }, base);
    }

    #[test]
    fn test_zero_payload_block() {
        let mut backing = [0usize; 2];
        let base = NonNull::new(backing.as_mut_ptr().cast::<u8>()).unwrap();

        let payload = unsafe { write(base, 0) };
        assert_eq!(unsafe { payload_size(payload) }, 0);
    }
}
