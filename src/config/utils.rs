// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-air-quality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration utilities
//!
//! Schema output and the validation rules the JSON schema cannot express.

use anyhow::{Context, Result};
use log::{debug, warn};

use super::{Config, TransportKind, CONFIG_SCHEMA};

/// Output the embedded JSON schema to the console.
///
/// Called for the `--show-config-schema` flag.
///
/// ```bash
/// ./rust_air_quality --show-config-schema > config_schema.json
/// ```
pub fn output_config_schema() -> Result<()> {
    let schema: serde_json::Value =
        serde_json::from_str(CONFIG_SCHEMA).context("Failed to parse JSON schema")?;

    let formatted_schema =
        serde_json::to_string_pretty(&schema).context("Failed to format JSON schema")?;

    println!("{}", formatted_schema);

    Ok(())
}

/// Check if a string is a valid IP address
///
/// Accepts IPv4 and IPv6 literals and `localhost`.
pub fn is_valid_ip_address(addr: &str) -> bool {
    if addr.parse::<std::net::IpAddr>().is_ok() {
        return true;
    }

    matches!(addr, "localhost" | "::" | "::0" | "0.0.0.0")
}

/// Validates the configuration against rules that aren't covered by the JSON schema.
///
/// # Validation Rules
///
/// - **Bind addresses**: the web server and simulator addresses must be IP
///   addresses
/// - **Ports**: web, Modbus TCP and simulator ports must be in 1-65534
/// - **Timing**: intervals must be non-zero and a poll must time out before
///   the next refresh is due
/// - **History**: at least one point per trend series
/// - **Transport**: the serial port (RTU) or host (TCP) must not be empty
pub fn validate_specific_rules(config: &Config) -> Result<()> {
    debug!("Performing additional validation checks");

    check_port("visualization", config.visualization.port)?;
    if !is_valid_ip_address(&config.visualization.address) {
        anyhow::bail!(
            "Invalid web server address: {}",
            config.visualization.address
        );
    }

    let modbus = &config.modbus;
    match modbus.transport {
        TransportKind::Rtu => {
            if modbus.serial_port.trim().is_empty() {
                anyhow::bail!("The rtu transport requires a serial port");
            }
            if modbus.baud_rate == 0 {
                anyhow::bail!("Invalid baud rate: 0");
            }
        }
        TransportKind::Tcp => {
            if modbus.tcp_address.trim().is_empty() {
                anyhow::bail!("The tcp transport requires a host address");
            }
            check_port("modbus", modbus.tcp_port)?;
        }
        TransportKind::Mock => warn!("Using the mock transport, readings are not real"),
    }
    if !(5..=8).contains(&modbus.data_bits) {
        anyhow::bail!("Invalid data bits: {}", modbus.data_bits);
    }
    if !(1..=2).contains(&modbus.stop_bits) {
        anyhow::bail!("Invalid stop bits: {}", modbus.stop_bits);
    }

    let acquisition = &config.acquisition;
    if acquisition.refresh_interval_ms == 0 || acquisition.history_interval_ms == 0 {
        anyhow::bail!("Acquisition intervals must be greater than zero");
    }
    if modbus.timeout_ms == 0 || modbus.timeout_ms >= acquisition.refresh_interval_ms {
        anyhow::bail!(
            "Poll timeout ({} ms) must be non-zero and shorter than the refresh interval ({} ms)",
            modbus.timeout_ms,
            acquisition.refresh_interval_ms
        );
    }
    if acquisition.history_size == 0 {
        anyhow::bail!("History size must be at least 1");
    }

    if config.simulator.enabled {
        check_port("simulator", config.simulator.port)?;
        if !is_valid_ip_address(&config.simulator.address) {
            anyhow::bail!("Invalid simulator address: {}", config.simulator.address);
        }
    }

    Ok(())
}

fn check_port(section: &str, port: u16) -> Result<()> {
    if port < 1 || port > 65534 {
        anyhow::bail!("Invalid {} port number: {}", section, port);
    }
    Ok(())
}
