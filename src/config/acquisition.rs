// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-air-quality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Dashboard acquisition configuration
//!
//! Timing of the background refresh loop feeding the dashboard snapshot, the
//! trend history and the reading cache.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration of the background dashboard refresh.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AcquisitionConfig {
    /// Poll the sensor in the background.
    ///
    /// When disabled, the dashboard only polls on demand.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Time in milliseconds between two dashboard refreshes.
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,

    /// Minimum time in milliseconds between two trend samples.
    #[serde(default = "default_history_interval_ms")]
    pub history_interval_ms: u64,

    /// Number of points kept per trend series.
    #[serde(default = "default_history_size")]
    pub history_size: usize,

    /// Age in milliseconds after which cached readings are no longer served.
    #[serde(default = "default_max_age_ms")]
    pub max_age_ms: u64,
}

impl AcquisitionConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn history_interval(&self) -> Duration {
        Duration::from_millis(self.history_interval_ms)
    }

    pub fn max_age(&self) -> Duration {
        Duration::from_millis(self.max_age_ms)
    }
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            refresh_interval_ms: default_refresh_interval_ms(),
            history_interval_ms: default_history_interval_ms(),
            history_size: default_history_size(),
            max_age_ms: default_max_age_ms(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_refresh_interval_ms() -> u64 {
    30_000
}

fn default_history_interval_ms() -> u64 {
    60_000
}

fn default_history_size() -> usize {
    15
}

fn default_max_age_ms() -> u64 {
    300_000
}
