// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Workload configuration loaded from TOML files or constructed
//! programmatically.
//!
//! # TOML Format
//! ```toml
//! operations = 10000
//! quota = "1M"
//! min_block = 16
//! max_block = 4096
//! release_ratio = 0.35
//! resize_ratio = 0.15
//! zero_fill_ratio = 0.15
//! leak_ratio = 0.0
//! seed = 61
//! ```
//!
//! Every field is optional; omitted fields fall back to the defaults above.

use std::path::Path;

use anyhow::Context;
use heap_tracker::Quota;

/// Configuration for one randomized allocation workload.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct WorkloadConfig {
    /// Number of workload operations to execute.
    pub operations: usize,
    /// Provider quota (human-readable, e.g., `"512K"`, `"1M"`).
    pub quota: String,
    /// Smallest payload size drawn for an allocation.
    pub min_block: usize,
    /// Largest payload size drawn for an allocation.
    pub max_block: usize,
    /// Probability that an operation releases a live block.
    pub release_ratio: f64,
    /// Probability that an operation resizes a live block.
    pub resize_ratio: f64,
    /// Probability that an allocation goes through zero-allocate.
    pub zero_fill_ratio: f64,
    /// Fraction of live blocks abandoned at the end of the run.
    pub leak_ratio: f64,
    /// Seed for the workload RNG. Same seed, same operation sequence.
    pub seed: u64,
}

impl WorkloadConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config '{}'", path.display()))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> anyhow::Result<Self> {
        toml::from_str(toml_str).context("TOML parse error")
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> anyhow::Result<String> {
        toml::to_string_pretty(self).context("TOML serialise error")
    }

    /// Parses the quota string into a [`Quota`].
    pub fn parse_quota(&self) -> anyhow::Result<Quota> {
        Quota::parse(&self.quota).with_context(|| format!("invalid quota '{}'", self.quota))
    }

    /// Checks that the field values describe a runnable workload.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.operations == 0 {
            anyhow::bail!("operations must be greater than zero");
        }
        if self.min_block > self.max_block {
            anyhow::bail!(
                "min_block ({}) exceeds max_block ({})",
                self.min_block,
                self.max_block
            );
        }
        for (name, ratio) in [
            ("release_ratio", self.release_ratio),
            ("resize_ratio", self.resize_ratio),
            ("zero_fill_ratio", self.zero_fill_ratio),
            ("leak_ratio", self.leak_ratio),
        ] {
            if !(0.0..=1.0).contains(&ratio) {
                anyhow::bail!("{name} must lie in [0, 1], got {ratio}");
            }
        }
        if self.release_ratio + self.resize_ratio > 1.0 {
            anyhow::bail!("release_ratio + resize_ratio must not exceed 1.0");
        }
        self.parse_quota()?;
        Ok(())
    }
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            operations: 10_000,
            quota: "1M".to_string(),
            min_block: 16,
            max_block: 4096,
            release_ratio: 0.35,
            resize_ratio: 0.15,
            zero_fill_ratio: 0.15,
            leak_ratio: 0.0,
            seed: 61,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let c = WorkloadConfig::default();
        assert_eq!(c.operations, 10_000);
        assert_eq!(c.quota, "1M");
        assert_eq!(c.leak_ratio, 0.0);
        c.validate().unwrap();
    }

    #[test]
    fn test_parse_quota() {
        let c = WorkloadConfig {
            quota: "256K".into(),
            ..Default::default()
        };
        let q = c.parse_quota().unwrap();
        assert_eq!(q.as_kb(), 256);
    }

    #[test]
    fn test_from_toml_partial() {
        let toml = r#"
operations = 500
quota = "64K"
"#;
        let c = WorkloadConfig::from_toml(toml).unwrap();
        assert_eq!(c.operations, 500);
        assert_eq!(c.quota, "64K");
        // Omitted fields keep their defaults.
        assert_eq!(c.min_block, 16);
        assert_eq!(c.seed, 61);
    }

    #[test]
    fn test_to_toml_roundtrip() {
        let c = WorkloadConfig {
            operations: 2500,
            leak_ratio: 0.5,
            ..Default::default()
        };
        let toml = c.to_toml().unwrap();
        let back = WorkloadConfig::from_toml(&toml).unwrap();
        assert_eq!(back.operations, 2500);
        assert_eq!(back.leak_ratio, 0.5);
        assert_eq!(back.quota, c.quota);
    }

    #[test]
    fn test_validate_rejects_zero_operations() {
        let c = WorkloadConfig {
            operations: 0,
            ..Default::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_block_range() {
        let c = WorkloadConfig {
            min_block: 4096,
            max_block: 16,
            ..Default::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range_ratio() {
        let c = WorkloadConfig {
            leak_ratio: 1.5,
            ..Default::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversubscribed_mix() {
        let c = WorkloadConfig {
            release_ratio: 0.7,
            resize_ratio: 0.5,
            ..Default::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_quota() {
        let c = WorkloadConfig {
            quota: "lots".into(),
            ..Default::default()
        };
        assert!(c.validate().is_err());
    }
}
