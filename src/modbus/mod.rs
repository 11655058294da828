// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-air-quality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Modbus TCP sensor simulator
//!
//! Serves the air quality sensor register map over Modbus TCP so that the
//! reader, the dashboard and the web API can run without the RS-485 device.
//! Point the `tcp` transport at the simulator address to use it.
//!
//! ## Register Map
//!
//! Holding registers (function 0x03), mirrored as input registers (0x04):
//!
//! - Register 1: PM2.5 (µg/m³)
//! - Register 2: TVOC (ppb)
//! - Register 3: CO2 (ppm)
//! - Register 4: Temperature ((°C × 10) + 500)
//! - Register 5: Humidity (%RH × 10)
//! - Register 6: PM1.0 (µg/m³)
//! - Register 7: PM10 (µg/m³)
//! - Register 10: O2 (% × 10)
//!
//! Other addresses answer with `IllegalDataAddress`.

pub mod sensor_simulator;
pub use sensor_simulator::{drifting_values, SimulatedAirQualitySensor};
