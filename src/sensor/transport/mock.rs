// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-air-quality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Mock register transport
//!
//! Emulates the sensor's holding registers in memory. Registers can be set to
//! a value, made to answer without a value, or made to fail, which lets the
//! reader and the dashboard be exercised without hardware.

use log::debug;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{RegisterTransport, TransportError};
use crate::sensor::Parameter;

/// Engineering values of a sensor sitting in a clean, ventilated room.
pub const NOMINAL_VALUES: [(Parameter, f64); 8] = [
    (Parameter::Temperature, 22.5),
    (Parameter::Pm1_0, 4.0),
    (Parameter::Humidity, 45.0),
    (Parameter::Pm2_5, 6.0),
    (Parameter::Pm10, 20.0),
    (Parameter::O2, 20.9),
    (Parameter::Co2, 420.0),
    (Parameter::Tvoc, 150.0),
];

/// Raw register contents matching [`NOMINAL_VALUES`].
pub fn nominal_registers() -> HashMap<u16, u16> {
    NOMINAL_VALUES
        .iter()
        .map(|(parameter, value)| {
            let spec = parameter.spec();
            (spec.address, spec.scaling.encode(*value))
        })
        .collect()
}

/// Behaviour of one emulated register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockRegister {
    /// Answers with this raw value
    Value(u16),
    /// Answers without a value
    Empty,
    /// Fails the transaction as if the bus timed out
    Fail,
}

/// In-memory holding registers.
///
/// Clones share the same registers, so a test can keep a handle and change
/// the device behaviour after the transport has been handed to a reader.
#[derive(Debug, Clone, Default)]
pub struct MockRegisterTransport {
    registers: Arc<Mutex<HashMap<u16, MockRegister>>>,
    latency: Arc<Mutex<Duration>>,
    reads: Arc<AtomicUsize>,
}

impl MockRegisterTransport {
    /// Create a transport with no registers; every read fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport answering with [`NOMINAL_VALUES`].
    pub fn nominal() -> Self {
        Self::from_registers(nominal_registers())
    }

    /// Create a transport from raw register values.
    pub fn from_registers(registers: HashMap<u16, u16>) -> Self {
        let registers = registers
            .into_iter()
            .map(|(address, raw)| (address, MockRegister::Value(raw)))
            .collect();
        Self {
            registers: Arc::new(Mutex::new(registers)),
            ..Self::default()
        }
    }

    /// Delay every transaction by `latency`.
    pub fn with_latency(self, latency: Duration) -> Self {
        self.set_latency(latency);
        self
    }

    /// Change the delay of the transactions issued from now on.
    pub fn set_latency(&self, latency: Duration) {
        if let Ok(mut current) = self.latency.lock() {
            *current = latency;
        }
    }

    /// Set the behaviour of a register.
    pub fn set(&self, address: u16, register: MockRegister) {
        if let Ok(mut registers) = self.registers.lock() {
            registers.insert(address, register);
        }
    }

    /// Set the raw value behind a parameter.
    pub fn set_raw(&self, parameter: Parameter, raw: u16) {
        self.set(parameter.address(), MockRegister::Value(raw));
    }

    /// Set a parameter from an engineering value.
    pub fn set_value(&self, parameter: Parameter, value: f64) {
        let spec = parameter.spec();
        self.set(spec.address, MockRegister::Value(spec.scaling.encode(value)));
    }

    /// Number of register transactions issued so far.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl RegisterTransport for MockRegisterTransport {
    async fn read_holding_register(&mut self, address: u16) -> Result<Option<u16>, TransportError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let latency = self.latency.lock().map(|l| *l).unwrap_or_default();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let register = self
            .registers
            .lock()
            .map(|registers| registers.get(&address).copied())
            .unwrap_or(None);

        debug!("Mock read of register {}: {:?}", address, register);
        match register {
            Some(MockRegister::Value(raw)) => Ok(Some(raw)),
            Some(MockRegister::Empty) => Ok(None),
            Some(MockRegister::Fail) | None => Err(TransportError::NoResponse { address }),
        }
    }

    fn endpoint(&self) -> String {
        "mock".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn nominal_registers_decode_to_nominal_values() {
        let mut transport = MockRegisterTransport::nominal();
        let raw = transport
            .read_holding_register(Parameter::Temperature.address())
            .await
            .unwrap();
        assert_eq!(raw, Some(725));

        let raw = transport
            .read_holding_register(Parameter::O2.address())
            .await
            .unwrap();
        assert_eq!(raw, Some(209));
        assert_eq!(transport.read_count(), 2);
    }

    #[tokio::test]
    async fn register_behaviour_can_change_through_a_clone() {
        let mut transport = MockRegisterTransport::nominal();
        let handle = transport.clone();

        handle.set(1, MockRegister::Empty);
        assert_eq!(transport.read_holding_register(1).await.unwrap(), None);

        handle.set(1, MockRegister::Fail);
        assert!(matches!(
            transport.read_holding_register(1).await,
            Err(TransportError::NoResponse { address: 1 })
        ));
    }

    #[tokio::test]
    async fn unknown_register_fails() {
        let mut transport = MockRegisterTransport::new();
        assert!(transport.read_holding_register(42).await.is_err());
    }
}
