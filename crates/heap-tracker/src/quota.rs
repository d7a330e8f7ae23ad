// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Byte quotas and the quota-enforcing provider.
//!
//! A [`Quota`] is a hard ceiling on outstanding raw bytes. It parses
//! human-readable strings for CLI ergonomics. [`QuotaProvider`] wraps any
//! [`RawProvider`] and refuses requests that would push the outstanding
//! total past the quota, which makes allocation failure reproducible
//! without exhausting real machine memory.

use std::fmt;
use std::ptr::NonNull;

use crate::error::QuotaError;
use crate::provider::{RawProvider, SystemProvider};

const KIB: usize = 1024;
const MIB: usize = 1024 * 1024;
const GIB: usize = 1024 * 1024 * 1024;

/// A hard ceiling on outstanding raw bytes.
///
/// # Parsing
/// Supports human-readable strings with binary-scaled suffixes:
/// - `"512K"` or `"512KB"` → 512 × 1024 bytes
/// - `"64M"` or `"64MB"` → 64 × 1024² bytes
/// - `"1G"` or `"1GB"` → 1 × 1024³ bytes
/// - `"4096"` → raw byte count
///
/// # Examples
/// ```
/// use heap_tracker::Quota;
///
/// let q = Quota::from_kb(256);
/// assert_eq!(q.as_bytes(), 256 * 1024);
///
/// let q = Quota::parse("1M").unwrap();
/// assert_eq!(q.as_kb(), 1024);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Quota {
    /// Ceiling in bytes.
    bytes: usize,
}

impl Quota {
    /// Creates a quota from a byte count.
    pub fn from_bytes(bytes: usize) -> Self {
        Self { bytes }
    }

    /// Creates a quota from kibibytes.
    pub fn from_kb(kb: usize) -> Self {
        Self { bytes: kb * KIB }
    }

    /// Creates a quota from mebibytes.
    pub fn from_mb(mb: usize) -> Self {
        Self { bytes: mb * MIB }
    }

    /// Returns the ceiling in bytes.
    pub fn as_bytes(&self) -> usize {
        self.bytes
    }

    /// Returns the ceiling in kibibytes (truncated).
    pub fn as_kb(&self) -> usize {
        self.bytes / KIB
    }

    /// Parses a human-readable quota string.
    ///
    /// Accepted formats: `"512K"`, `"512KB"`, `"64M"`, `"64MB"`, `"1G"`,
    /// `"1GB"`, or a plain byte count like `"1048576"`. Case-insensitive.
    pub fn parse(s: &str) -> Result<Self, QuotaError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(QuotaError::Malformed {
                input: s.to_string(),
            });
        }

        const SUFFIXES: [(&str, usize); 7] = [
            ("GB", GIB),
            ("G", GIB),
            ("MB", MIB),
            ("M", MIB),
            ("KB", KIB),
            ("K", KIB),
            ("B", 1),
        ];

        // Suffixes are ASCII, so uppercasing leaves the digits untouched.
        let upper = trimmed.to_uppercase();
        let (digits, multiplier) = SUFFIXES
            .iter()
            .find_map(|(suffix, mult)| upper.strip_suffix(suffix).map(|rest| (rest, *mult)))
            .unwrap_or((upper.as_str(), 1));

        let value: usize = digits
            .trim()
            .parse()
            .map_err(|_| QuotaError::Malformed {
                input: s.to_string(),
            })?;

        let bytes = value
            .checked_mul(multiplier)
            .ok_or_else(|| QuotaError::Overflow {
                input: s.to_string(),
            })?;

        if bytes == 0 {
            return Err(QuotaError::Zero);
        }

        Ok(Self { bytes })
    }
}

impl fmt::Display for Quota {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bytes >= GIB && self.bytes % GIB == 0 {
            write!(f, "{} GB", self.bytes / GIB)
        } else if self.bytes >= MIB && self.bytes % MIB == 0 {
            write!(f, "{} MB", self.bytes / MIB)
        } else if self.bytes >= KIB && self.bytes % KIB == 0 {
            write!(f, "{} KB", self.bytes / KIB)
        } else {
            write!(f, "{} B", self.bytes)
        }
    }
}

/// A [`RawProvider`] that enforces a [`Quota`] over an inner provider.
///
/// Outstanding bytes are counted at acquire and returned at release. A
/// request is refused outright when it would exceed the quota; the inner
/// provider is not consulted, so refusals cost nothing.
///
/// # Examples
/// ```
/// use heap_tracker::{Quota, QuotaProvider, RawProvider};
///
/// let mut provider = QuotaProvider::new(Quota::from_bytes(64));
/// let base = provider.acquire(64).unwrap();
/// assert!(provider.acquire(1).is_none());
/// unsafe { provider.release(base, 64) };
/// assert_eq!(provider.outstanding_bytes(), 0);
/// ```
#[derive(Debug)]
pub struct QuotaProvider<P = SystemProvider> {
    inner: P,
    quota: Quota,
    outstanding: usize,
}

impl QuotaProvider<SystemProvider> {
    /// Creates a quota-limited provider over the system allocator.
    pub fn new(quota: Quota) -> Self {
        Self::with_inner(quota, SystemProvider)
    }
}

impl<P: RawProvider> QuotaProvider<P> {
    /// Wraps an arbitrary provider with a quota.
    pub fn with_inner(quota: Quota, inner: P) -> Self {
        Self {
            inner,
            quota,
            outstanding: 0,
        }
    }

    /// Returns the configured ceiling.
    pub fn quota(&self) -> Quota {
        self.quota
    }

    /// Returns the raw bytes currently out on loan.
    pub fn outstanding_bytes(&self) -> usize {
        self.outstanding
    }

    /// Returns the bytes still available under the quota.
    pub fn remaining_bytes(&self) -> usize {
        self.quota.as_bytes().saturating_sub(self.outstanding)
    }
}

impl<P: RawProvider> RawProvider for QuotaProvider<P> {
    fn acquire(&mut self, size: usize) -> Option<NonNull<u8>> {
        let projected = self.outstanding.checked_add(size)?;
        if projected > self.quota.as_bytes() {
            return None;
        }
        let base = self.inner.acquire(size)?;
        self.outstanding = projected;
        Some(base)
    }

    unsafe fn release(&mut self, base: NonNull<u8>, size: usize) {
        // SAFETY: forwarded under the same contract the caller upholds.
        unsafe { self.inner.release(base, size) };
        debug_assert!(self.outstanding >= size, "released more than acquired");
        self.outstanding -= size;
    }
}
