// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-air-quality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Modbus client configuration
//!
//! This module defines how the application reaches the air quality sensor:
//! over an RS-485 serial line (Modbus RTU), over Modbus TCP (gateway or the
//! built-in simulator), or through the in-memory mock device.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Link used to reach the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Modbus RTU over a serial line
    Rtu,
    /// Modbus TCP
    Tcp,
    /// In-memory device answering with nominal values
    Mock,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransportKind::Rtu => "rtu",
            TransportKind::Tcp => "tcp",
            TransportKind::Mock => "mock",
        };
        f.write_str(name)
    }
}

/// Parity of the serial line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SerialParity {
    None,
    Odd,
    Even,
}

/// Configuration of the Modbus client.
///
/// The serial fields are only used by the `rtu` transport and the TCP fields
/// only by the `tcp` transport; `slave_id` and `timeout_ms` apply to both.
///
/// # Example
///
/// ```
/// use rust_air_quality::config::{ModbusConfig, TransportKind};
///
/// let modbus_config = ModbusConfig {
///     transport: TransportKind::Tcp,
///     tcp_address: "192.168.1.50".to_string(),
///     ..ModbusConfig::default()
/// };
/// assert_eq!(modbus_config.tcp_port, 502);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModbusConfig {
    #[serde(default = "default_transport")]
    pub transport: TransportKind,

    /// Serial device of the RS-485 adapter.
    #[serde(default = "default_serial_port")]
    pub serial_port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// 5 to 8.
    #[serde(default = "default_data_bits")]
    pub data_bits: u8,

    /// 1 or 2.
    #[serde(default = "default_stop_bits")]
    pub stop_bits: u8,

    #[serde(default = "default_parity")]
    pub parity: SerialParity,

    /// Modbus unit identifier of the sensor.
    #[serde(default = "default_slave_id")]
    pub slave_id: u8,

    /// Host of the Modbus TCP device.
    #[serde(default = "default_tcp_address")]
    pub tcp_address: String,

    #[serde(default = "default_tcp_port")]
    pub tcp_port: u16,

    /// Upper bound for one complete poll of the eight registers.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ModbusConfig {
    fn default() -> Self {
        Self {
            transport: default_transport(),
            serial_port: default_serial_port(),
            baud_rate: default_baud_rate(),
            data_bits: default_data_bits(),
            stop_bits: default_stop_bits(),
            parity: default_parity(),
            slave_id: default_slave_id(),
            tcp_address: default_tcp_address(),
            tcp_port: default_tcp_port(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_transport() -> TransportKind {
    TransportKind::Rtu
}

/// UART of the Raspberry Pi the sensor was first deployed on.
fn default_serial_port() -> String {
    "/dev/ttyAMA3".to_string()
}

fn default_baud_rate() -> u32 {
    9600
}

fn default_data_bits() -> u8 {
    8
}

fn default_stop_bits() -> u8 {
    1
}

fn default_parity() -> SerialParity {
    SerialParity::None
}

fn default_slave_id() -> u8 {
    1
}

fn default_tcp_address() -> String {
    "127.0.0.1".to_string()
}

fn default_tcp_port() -> u16 {
    502 // Standard Modbus TCP port
}

fn default_timeout_ms() -> u64 {
    10_000
}
