// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-air-quality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Register transports for the air quality sensor
//!
//! This module provides the bus abstraction used by the register reader:
//! - Modbus RTU: the sensor on a serial line (reference deployment)
//! - Modbus TCP: the same protocol through a gateway or the built-in simulator
//! - Mock: in-memory registers for testing and dry runs

pub mod mock;
pub mod modbus;

use anyhow::{Context, Result};
use log::info;
use thiserror::Error;
use tokio_modbus::ExceptionCode;

use crate::config::{ModbusConfig, TransportKind};

pub use mock::MockRegisterTransport;
pub use modbus::ModbusRegisterTransport;

/// Failure of a single register transaction on the bus.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("I/O error on {endpoint}: {source}")]
    Io {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Modbus protocol error: {0}")]
    Protocol(#[from] tokio_modbus::Error),

    #[error("Device answered with exception: {0:?}")]
    Exception(ExceptionCode),

    #[error("Device did not answer register {address}")]
    NoResponse { address: u16 },

    #[error("Failed to close connection: {reason}")]
    Disconnect { reason: String },
}

/// Bus abstraction exposing single holding register reads.
///
/// A transport is owned by exactly one reader; transactions are issued one at
/// a time through `&mut self`.
#[async_trait::async_trait]
pub trait RegisterTransport: Send {
    /// Read one holding register.
    ///
    /// Returns `Ok(None)` when the device answered without a value.
    async fn read_holding_register(&mut self, address: u16) -> Result<Option<u16>, TransportError>;

    /// Close the underlying connection.
    async fn disconnect(&mut self) -> Result<(), TransportError> {
        Ok(())
    }

    /// Human readable endpoint, used in logs.
    fn endpoint(&self) -> String;
}

/// Open the transport selected in the configuration.
pub async fn connect(config: &ModbusConfig) -> Result<Box<dyn RegisterTransport>> {
    let transport: Box<dyn RegisterTransport> = match config.transport {
        TransportKind::Rtu => Box::new(
            ModbusRegisterTransport::connect_rtu(config)
                .with_context(|| format!("Failed to open serial port {}", config.serial_port))?,
        ),
        TransportKind::Tcp => Box::new(
            ModbusRegisterTransport::connect_tcp(config)
                .await
                .with_context(|| {
                    format!(
                        "Failed to connect to Modbus TCP device at {}:{}",
                        config.tcp_address, config.tcp_port
                    )
                })?,
        ),
        TransportKind::Mock => Box::new(MockRegisterTransport::nominal()),
    };
    info!("Connected to Modbus device via {}", transport.endpoint());
    Ok(transport)
}
