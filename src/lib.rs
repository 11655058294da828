// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-air-quality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Rust Air Quality library
//!
//! Reads an eight-parameter air quality sensor over Modbus (RTU or TCP),
//! scales the registers into engineering units, estimates an Air Quality
//! Index from PM2.5, PM10 and O2, and serves readings and dashboard data
//! over HTTP.
//!
//! ```no_run
//! use rust_air_quality::aqi::estimate_aqi;
//! use rust_air_quality::sensor::{transport::MockRegisterTransport, Parameter, RegisterReader};
//! use rust_air_quality::sensor::value_of;
//!
//! async fn example() -> anyhow::Result<()> {
//!     let reader = RegisterReader::new(Box::new(MockRegisterTransport::nominal()));
//!     let readings = reader.read_all().await?;
//!     let aqi = estimate_aqi(
//!         value_of(&readings, Parameter::Pm2_5),
//!         value_of(&readings, Parameter::Pm10),
//!         value_of(&readings, Parameter::O2),
//!     );
//!     println!("AQI: {:?} ({})", aqi.value(), aqi.health());
//!     Ok(())
//! }
//! ```

pub mod aqi;
pub mod config;
pub mod daemon;
pub mod dashboard;
pub mod modbus;
pub mod sensor;
pub mod visualization;
