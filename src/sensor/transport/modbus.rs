// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-air-quality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Modbus client transport (RTU over serial, or TCP)
//!
//! Both flavours end up in a `tokio_modbus` client context bound to one slave
//! id; only the way the context is opened differs.

use log::debug;
use tokio_modbus::client::{rtu, tcp, Context};
use tokio_modbus::prelude::*;
use tokio_serial::SerialStream;

use super::{RegisterTransport, TransportError};
use crate::config::{ModbusConfig, SerialParity};

/// Modbus client context wrapped as a [`RegisterTransport`].
pub struct ModbusRegisterTransport {
    ctx: Context,
    endpoint: String,
}

impl ModbusRegisterTransport {
    /// Open the serial line and attach the configured slave.
    ///
    /// The framing (baud rate, data bits, stop bits, parity) comes from the
    /// configuration; the reference sensor uses 9600 8N1.
    pub fn connect_rtu(config: &ModbusConfig) -> Result<Self, TransportError> {
        let endpoint = format!(
            "rtu:{}@{} {}{}{} slave {}",
            config.serial_port,
            config.baud_rate,
            config.data_bits,
            parity_letter(config.parity),
            config.stop_bits,
            config.slave_id
        );

        let builder = tokio_serial::new(&config.serial_port, config.baud_rate)
            .data_bits(data_bits(config.data_bits))
            .stop_bits(stop_bits(config.stop_bits))
            .parity(parity(config.parity));

        let port = SerialStream::open(&builder).map_err(|err| TransportError::Io {
            endpoint: endpoint.clone(),
            source: err.into(),
        })?;

        let ctx = rtu::attach_slave(port, Slave(config.slave_id));
        Ok(Self { ctx, endpoint })
    }

    /// Connect to a Modbus TCP device (gateway or simulator).
    pub async fn connect_tcp(config: &ModbusConfig) -> Result<Self, TransportError> {
        let endpoint = format!(
            "tcp:{}:{} slave {}",
            config.tcp_address, config.tcp_port, config.slave_id
        );
        let io_error = |source| TransportError::Io {
            endpoint: endpoint.clone(),
            source,
        };

        let socket_addr = tokio::net::lookup_host((config.tcp_address.as_str(), config.tcp_port))
            .await
            .map_err(io_error)?
            .next()
            .ok_or_else(|| {
                io_error(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "address did not resolve",
                ))
            })?;

        let ctx = tcp::connect_slave(socket_addr, Slave(config.slave_id))
            .await
            .map_err(io_error)?;
        Ok(Self { ctx, endpoint })
    }
}

#[async_trait::async_trait]
impl RegisterTransport for ModbusRegisterTransport {
    async fn read_holding_register(&mut self, address: u16) -> Result<Option<u16>, TransportError> {
        debug!("Reading holding register {} on {}", address, self.endpoint);
        let values = self
            .ctx
            .read_holding_registers(address, 1)
            .await?
            .map_err(TransportError::Exception)?;
        Ok(values.first().copied())
    }

    async fn disconnect(&mut self) -> Result<(), TransportError> {
        debug!("Closing {}", self.endpoint);
        self.ctx
            .disconnect()
            .await
            .map_err(|err| TransportError::Disconnect {
                reason: err.to_string(),
            })
    }

    fn endpoint(&self) -> String {
        self.endpoint.clone()
    }
}

fn data_bits(bits: u8) -> tokio_serial::DataBits {
    match bits {
        5 => tokio_serial::DataBits::Five,
        6 => tokio_serial::DataBits::Six,
        7 => tokio_serial::DataBits::Seven,
        _ => tokio_serial::DataBits::Eight,
    }
}

fn stop_bits(bits: u8) -> tokio_serial::StopBits {
    match bits {
        2 => tokio_serial::StopBits::Two,
        _ => tokio_serial::StopBits::One,
    }
}

fn parity(parity: SerialParity) -> tokio_serial::Parity {
    match parity {
        SerialParity::None => tokio_serial::Parity::None,
        SerialParity::Odd => tokio_serial::Parity::Odd,
        SerialParity::Even => tokio_serial::Parity::Even,
    }
}

fn parity_letter(parity: SerialParity) -> char {
    match parity {
        SerialParity::None => 'N',
        SerialParity::Odd => 'O',
        SerialParity::Even => 'E',
    }
}
