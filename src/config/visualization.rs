// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-air-quality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Web server configuration

use serde::{Deserialize, Serialize};

/// Configuration for the HTTP server exposing readings and the dashboard API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualizationConfig {
    /// Start the web server with the daemon.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// The TCP port the server will listen on.
    ///
    /// Valid range is 1-65534. Default value is 5500.
    #[serde(default = "default_port")]
    pub port: u16,

    /// The network address the server will bind to.
    ///
    /// Use "0.0.0.0" to bind to all IPv4 interfaces.
    #[serde(default = "default_address")]
    pub address: String,

    /// The server name reported in the `Server` HTTP header.
    #[serde(default = "default_name")]
    pub name: String,
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            port: default_port(),
            address: default_address(),
            name: default_name(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_port() -> u16 {
    5500
}

/// Loopback only; set "0.0.0.0" to serve a dashboard on another host.
fn default_address() -> String {
    "127.0.0.1".to_string()
}

fn default_name() -> String {
    format!("AirQualityApiServer/{}", env!("CARGO_PKG_VERSION"))
}
