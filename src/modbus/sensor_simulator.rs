// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-air-quality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Simulated air quality sensor
//!
//! The simulator plays the Modbus server (slave) role: it answers the reader,
//! which is the client (master).

use std::{
    collections::HashMap,
    future::Future,
    io,
    pin::Pin,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard,
    },
    time::Duration,
};

use log::{debug, error};
use tokio::net::TcpListener;
use tokio_modbus::{
    prelude::*,
    server::tcp::{accept_tcp_connection, Server},
};

use crate::sensor::transport::mock::nominal_registers;
use crate::sensor::Parameter;

/// Modbus service exposing the sensor register map.
///
/// Clones share the same registers, so the drift task and every client
/// connection see the same values.
#[derive(Debug, Clone)]
pub struct SimulatedAirQualitySensor {
    holding_registers: Arc<Mutex<HashMap<u16, u16>>>,
    /// Delay before each response, in milliseconds
    response_delay_ms: Arc<AtomicU64>,
}

impl tokio_modbus::server::Service for SimulatedAirQualitySensor {
    type Request = Request<'static>;
    type Response = Response;
    type Exception = ExceptionCode;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Exception>> + Send>>;

    /// Process a Modbus request and provide a response
    ///
    /// - 0x03: Read Holding Registers
    /// - 0x04: Read Input Registers (same values)
    /// - 0x06: Write Single Register
    /// - 0x10: Write Multiple Registers
    ///
    /// Any other function code will return an IllegalFunction exception.
    fn call(&self, req: Self::Request) -> Self::Future {
        debug!("Simulator received Modbus request: {:?}", req);

        let res = match req {
            Request::ReadHoldingRegisters(addr, cnt) => self
                .registers()
                .and_then(|registers| register_read(&registers, addr, cnt))
                .map(Response::ReadHoldingRegisters),
            Request::ReadInputRegisters(addr, cnt) => self
                .registers()
                .and_then(|registers| register_read(&registers, addr, cnt))
                .map(Response::ReadInputRegisters),
            Request::WriteMultipleRegisters(addr, values) => self
                .registers()
                .and_then(|mut registers| register_write(&mut registers, addr, &values))
                .map(|_| Response::WriteMultipleRegisters(addr, values.len() as u16)),
            Request::WriteSingleRegister(addr, value) => self
                .registers()
                .and_then(|mut registers| {
                    register_write(&mut registers, addr, std::slice::from_ref(&value))
                })
                .map(|_| Response::WriteSingleRegister(addr, value)),
            _ => {
                error!("Exception::IllegalFunction - Unimplemented function code in request: {req:?}");
                Err(ExceptionCode::IllegalFunction)
            }
        };

        if let Err(e) = &res {
            error!("Simulator request error: {:?}", e);
        }

        let delay = self.response_delay();
        Box::pin(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            res
        })
    }
}

impl Default for SimulatedAirQualitySensor {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedAirQualitySensor {
    /// Create a simulator holding the nominal clean-room values.
    pub fn new() -> Self {
        Self::from_registers(nominal_registers())
    }

    /// Create a simulator from raw register values.
    pub fn from_registers(registers: HashMap<u16, u16>) -> Self {
        Self {
            holding_registers: Arc::new(Mutex::new(registers)),
            response_delay_ms: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Answer every request after `delay`, emulating a slow field device.
    ///
    /// A request already being served keeps the delay it started with.
    pub fn set_response_delay(&self, delay: Duration) {
        let millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.response_delay_ms.store(millis, Ordering::SeqCst);
    }

    pub fn response_delay(&self) -> Duration {
        Duration::from_millis(self.response_delay_ms.load(Ordering::SeqCst))
    }

    fn registers(&self) -> Result<MutexGuard<'_, HashMap<u16, u16>>, ExceptionCode> {
        self.holding_registers
            .lock()
            .map_err(|_| ExceptionCode::ServerDeviceFailure)
    }

    /// Encode engineering values into their registers.
    pub fn update_measurements(&self, values: &[(Parameter, f64)]) {
        if let Ok(mut registers) = self.holding_registers.lock() {
            for (parameter, value) in values {
                let spec = parameter.spec();
                registers.insert(spec.address, spec.scaling.encode(*value));
            }
        }
    }

    /// Set a raw register value.
    pub fn set_raw(&self, address: u16, raw: u16) {
        if let Ok(mut registers) = self.holding_registers.lock() {
            registers.insert(address, raw);
        }
    }

    /// Remove a register; reads covering it fail with `IllegalDataAddress`.
    pub fn remove_register(&self, address: u16) {
        if let Ok(mut registers) = self.holding_registers.lock() {
            registers.remove(&address);
        }
    }

    pub fn raw(&self, address: u16) -> Option<u16> {
        self.holding_registers
            .lock()
            .ok()
            .and_then(|registers| registers.get(&address).copied())
    }

    /// Move every measurement along its drift curve at `elapsed`.
    pub fn drift(&self, elapsed: Duration) {
        self.update_measurements(&drifting_values(elapsed));
    }

    /// Accept Modbus TCP clients on `listener` until the task is aborted.
    pub async fn serve(self, listener: TcpListener) -> io::Result<()> {
        let server = Server::new(listener);

        let on_connected = move |stream, socket_addr| {
            let sensor = self.clone();
            async move {
                debug!("Simulator accepted connection from {}", socket_addr);
                accept_tcp_connection(stream, socket_addr, move |_socket_addr| {
                    Ok(Some(sensor.clone()))
                })
            }
        };

        let on_process_error = |err| {
            error!("Simulator error: {err}");
        };

        server.serve(&on_connected, on_process_error).await?;
        Ok(())
    }
}

/// Plausible indoor values at `elapsed` since the simulator started.
///
/// Each parameter follows a slow sine around its nominal value; the particle
/// sizes move together so that PM1.0 ≤ PM2.5 ≤ PM10 holds.
pub fn drifting_values(elapsed: Duration) -> [(Parameter, f64); 8] {
    let t = elapsed.as_secs_f64();
    let wave = |period_s: f64| (t * std::f64::consts::TAU / period_s).sin();

    let pm25 = 8.0 + 4.0 * wave(1800.0);
    [
        (Parameter::Temperature, 22.5 + 1.5 * wave(3600.0)),
        (Parameter::Pm1_0, (pm25 * 0.7).round()),
        (Parameter::Humidity, 45.0 + 5.0 * wave(5400.0)),
        (Parameter::Pm2_5, pm25.round()),
        (Parameter::Pm10, (pm25 * 2.5).round()),
        (Parameter::O2, 20.9 + 0.1 * wave(7200.0)),
        (Parameter::Co2, (450.0 + 80.0 * wave(2700.0)).round()),
        (Parameter::Tvoc, (150.0 + 50.0 * wave(2400.0)).round()),
    ]
}

/// Helper function implementing reading registers from a HashMap.
fn register_read(
    registers: &HashMap<u16, u16>,
    addr: u16,
    cnt: u16,
) -> Result<Vec<u16>, ExceptionCode> {
    (0..cnt)
        .map(|i| {
            addr.checked_add(i)
                .and_then(|reg_addr| registers.get(&reg_addr).copied())
                .ok_or(ExceptionCode::IllegalDataAddress)
        })
        .collect()
}

/// Write existing holding registers. Used by both the write single register
/// and write multiple registers requests.
fn register_write(
    registers: &mut HashMap<u16, u16>,
    addr: u16,
    values: &[u16],
) -> Result<(), ExceptionCode> {
    for (i, value) in values.iter().enumerate() {
        let slot = u16::try_from(i)
            .ok()
            .and_then(|i| addr.checked_add(i))
            .and_then(|reg_addr| registers.get_mut(&reg_addr))
            .ok_or(ExceptionCode::IllegalDataAddress)?;
        *slot = *value;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_modbus::server::Service;

    #[tokio::test]
    async fn serves_nominal_holding_registers() {
        let sensor = SimulatedAirQualitySensor::new();
        let response = sensor
            .call(Request::ReadHoldingRegisters(4, 1))
            .await
            .unwrap();
        assert_eq!(response, Response::ReadHoldingRegisters(vec![725]));
    }

    #[tokio::test]
    async fn unknown_address_is_rejected() {
        let sensor = SimulatedAirQualitySensor::new();
        let result = sensor.call(Request::ReadHoldingRegisters(8, 1)).await;
        assert_eq!(result, Err(ExceptionCode::IllegalDataAddress));
    }

    #[tokio::test]
    async fn writes_only_touch_existing_registers() {
        let sensor = SimulatedAirQualitySensor::new();
        sensor
            .call(Request::WriteSingleRegister(1, 40))
            .await
            .unwrap();
        assert_eq!(sensor.raw(1), Some(40));

        let result = sensor.call(Request::WriteSingleRegister(42, 1)).await;
        assert_eq!(result, Err(ExceptionCode::IllegalDataAddress));
    }

    #[tokio::test]
    async fn responses_wait_for_the_configured_delay() {
        let sensor = SimulatedAirQualitySensor::new();
        sensor.set_response_delay(Duration::from_millis(50));

        let started = std::time::Instant::now();
        let response = sensor
            .call(Request::ReadHoldingRegisters(1, 1))
            .await
            .unwrap();
        assert_eq!(response, Response::ReadHoldingRegisters(vec![6]));
        assert!(started.elapsed() >= Duration::from_millis(50));

        sensor.set_response_delay(Duration::ZERO);
        assert_eq!(sensor.response_delay(), Duration::ZERO);
    }

    #[test]
    fn drift_keeps_values_plausible() {
        for minutes in [0u64, 7, 15, 45, 90, 240] {
            let values = drifting_values(Duration::from_secs(minutes * 60));
            let get = |p: Parameter| values.iter().find(|(q, _)| *q == p).map(|(_, v)| *v).unwrap();

            assert!(get(Parameter::Pm1_0) <= get(Parameter::Pm2_5));
            assert!(get(Parameter::Pm2_5) <= get(Parameter::Pm10));
            assert!((19.0..=23.0).contains(&get(Parameter::O2)));
            assert!((20.0..=25.0).contains(&get(Parameter::Temperature)));
        }
    }

    #[test]
    fn drift_updates_the_registers() {
        let sensor = SimulatedAirQualitySensor::new();
        sensor.drift(Duration::from_secs(450));
        let expected = drifting_values(Duration::from_secs(450));
        let (_, co2) = expected[6];
        assert_eq!(sensor.raw(Parameter::Co2.address()), Some(co2 as u16));
    }
}
