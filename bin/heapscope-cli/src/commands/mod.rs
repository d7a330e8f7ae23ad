// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Subcommand implementations for the `heapscope` CLI.

pub mod leaks;
pub mod run;
pub mod sweep;

use std::path::PathBuf;

use crate::config::WorkloadConfig;

/// Initializes the tracing subscriber based on `-v` count.
///
/// `RUST_LOG` takes precedence over the verbosity flag when set.
pub fn init_tracing(verbosity: u8) {
    let default_filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Resolves the workload config: file if given, defaults otherwise.
pub(crate) fn load_config(config_path: Option<PathBuf>) -> anyhow::Result<WorkloadConfig> {
    match config_path {
        Some(path) => WorkloadConfig::from_file(&path),
        None => Ok(WorkloadConfig::default()),
    }
}
