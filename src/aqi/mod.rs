// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-air-quality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Air Quality Index
//!
//! Piecewise-linear sub-indices for PM2.5 and PM10, combined and corrected for
//! the oxygen level, then classified into health bands for display.

pub mod breakpoints;
pub mod estimator;
pub mod health;

pub use breakpoints::{Breakpoint, OutOfRangePolicy, PM10_BREAKPOINTS, PM25_BREAKPOINTS};
pub use estimator::{estimate_aqi, estimate_aqi_with, AqiResult, AQI_MAX};
pub use health::{background_color, HealthBand};

use crate::sensor::GaugeRange;

/// Gauge range of the AQI dial.
pub const AQI_GAUGE: GaugeRange = GaugeRange {
    min: 0.0,
    max: AQI_MAX,
    good: 50.0,
    moderate: 100.0,
};
