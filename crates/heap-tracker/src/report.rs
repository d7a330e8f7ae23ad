// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Leak reporting.
//!
//! A leak is any block still live when the report is taken. Records come
//! out of the tracker's registry in ascending address order, so two runs
//! of the same workload produce byte-identical reports.

use std::fmt;

/// One block that was allocated and never released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct LeakRecord {
    /// Payload address of the live block.
    pub address: usize,
    /// Payload size in bytes.
    pub size: usize,
}

impl fmt::Display for LeakRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "allocated object {:#x} with size {}", self.address, self.size)
    }
}

/// Renders a leak report as one line per record plus a closing total.
///
/// # Examples
/// ```
/// use heap_tracker::{leak_summary, LeakRecord};
///
/// let records = [LeakRecord { address: 0x1000, size: 10 }];
/// let text = leak_summary(&records);
/// assert!(text.contains("0x1000"));
/// assert!(text.ends_with("1 leaked object totaling 10 bytes"));
/// ```
pub fn leak_summary(records: &[LeakRecord]) -> String {
    if records.is_empty() {
        return "no leaked objects".to_string();
    }

    let mut out = String::new();
    let mut leaked_bytes: u64 = 0;
    for record in records {
        out.push_str("LEAK CHECK: ");
        out.push_str(&record.to_string());
        out.push('\n');
        leaked_bytes += record.size as u64;
    }
    let noun = if records.len() == 1 { "object" } else { "objects" };
    out.push_str(&format!(
        "{} leaked {noun} totaling {} bytes",
        records.len(),
        leaked_bytes
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report() {
        assert_eq!(leak_summary(&[]), "no leaked objects");
    }

    #[test]
    fn test_single_record() {
        let records = [LeakRecord {
            address: 0x1000,
            size: 10,
        }];
        let text = leak_summary(&records);
        assert_eq!(
            text,
            "LEAK CHECK: allocated object 0x1000 with size 10\n\
             1 leaked object totaling 10 bytes"
        );
    }

    #[test]
    fn test_multiple_records_with_total() {
        let records = [
            LeakRecord {
                address: 0x1000,
                size: 10,
            },
            LeakRecord {
                address: 0x2000,
                size: 20,
            },
        ];
        let text = leak_summary(&records);
        assert!(text.contains("allocated object 0x1000 with size 10"));
        assert!(text.contains("allocated object 0x2000 with size 20"));
        assert!(text.ends_with("2 leaked objects totaling 30 bytes"));
    }

    #[test]
    fn test_record_serializes() {
        let record = LeakRecord {
            address: 0x2000,
            size: 64,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"address\":8192"));
        assert!(json.contains("\"size\":64"));
    }
}
