// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-air-quality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Sensor simulator configuration

use serde::{Deserialize, Serialize};

/// Configuration of the built-in Modbus TCP sensor simulator.
///
/// The simulator exposes the sensor register map with slowly drifting
/// values, so the whole chain can run without hardware by pointing the `tcp`
/// transport at it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Disabled by default.
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_address")]
    pub address: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            address: default_address(),
            port: default_port(),
        }
    }
}

fn default_address() -> String {
    "127.0.0.1".to_string()
}

/// Unprivileged alternative to 502.
fn default_port() -> u16 {
    5020
}
