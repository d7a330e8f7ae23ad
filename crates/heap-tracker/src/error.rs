// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for allocation tracking and quota parsing.

/// Errors returned by the allocation primitives on [`HeapTracker`].
///
/// Both variants carry the requested payload size so callers can log or
/// surface the figure without re-deriving it. Every failure is also folded
/// into the tracker's [`HeapStatistics`] before the error is returned.
///
/// [`HeapTracker`]: crate::HeapTracker
/// [`HeapStatistics`]: crate::HeapStatistics
#[derive(Debug, thiserror::Error)]
pub enum AllocError {
    /// The request can never succeed on this platform: adding the block
    /// header to the payload size overflows the address space, so no
    /// provider could ever satisfy it.
    #[error("request for {requested} bytes cannot be serviced (header would overflow the address space)")]
    Unserviceable {
        /// Payload size the caller asked for.
        requested: usize,
    },

    /// The raw provider declined to hand out memory for this request.
    /// Smaller requests may still succeed.
    #[error("raw provider refused a request for {requested} bytes")]
    Exhausted {
        /// Payload size the caller asked for.
        requested: usize,
    },
}

/// Errors produced while parsing a [`Quota`] from text.
///
/// [`Quota`]: crate::Quota
#[derive(Debug, thiserror::Error)]
pub enum QuotaError {
    /// The input did not match `<number>[K|M|G][B]`.
    #[error("invalid quota '{input}': expected a number with an optional K, M, or G suffix")]
    Malformed {
        /// Original input string.
        input: String,
    },

    /// The number was valid but scaling it by the suffix overflowed `usize`.
    #[error("quota '{input}' does not fit in the addressable range")]
    Overflow {
        /// Original input string.
        input: String,
    },

    /// Zero-byte quotas are rejected at the parse boundary. A quota of zero
    /// would refuse every allocation, which is never what a config meant.
    #[error("quota must be greater than zero")]
    Zero,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_error_display() {
        let err = AllocError::Exhausted { requested: 4096 };
        assert!(err.to_string().contains("4096"));
        assert!(err.to_string().contains("refused"));

        let err = AllocError::Unserviceable {
            requested: usize::MAX,
        };
        assert!(err.to_string().contains("cannot be serviced"));
    }

    #[test]
    fn test_quota_error_display() {
        let err = QuotaError::Malformed {
            input: "12X".to_string(),
        };
        assert!(err.to_string().contains("12X"));

        let err = QuotaError::Zero;
        assert!(err.to_string().contains("greater than zero"));
    }
}
