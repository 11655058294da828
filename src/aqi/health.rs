// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-air-quality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use serde::Serialize;
use std::fmt;

use super::estimator::AqiResult;

/// Dashboard background while the index is at most 150.
pub const COLOR_GOOD: &str = "#17B169";
/// Dashboard background while the index is at most 240.
pub const COLOR_MODERATE: &str = "#c4cd04";
pub const COLOR_POOR: &str = "#f14e4e";
pub const COLOR_UNKNOWN: &str = "#ffffff";

/// Qualitative band of an AQI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealthBand {
    Healthy,
    Clean,
    Good,
    Moderate,
    Unhealthy,
    Hazardous,
    Unknown,
}

impl HealthBand {
    pub fn from_aqi(aqi: f64) -> Self {
        if aqi.is_nan() {
            HealthBand::Unknown
        } else if aqi <= 50.0 {
            HealthBand::Healthy
        } else if aqi <= 100.0 {
            HealthBand::Clean
        } else if aqi <= 150.0 {
            HealthBand::Good
        } else if aqi <= 200.0 {
            HealthBand::Moderate
        } else if aqi <= 300.0 {
            HealthBand::Unhealthy
        } else {
            HealthBand::Hazardous
        }
    }

    pub fn classify(result: AqiResult) -> Self {
        result.value().map_or(HealthBand::Unknown, Self::from_aqi)
    }

    pub const fn label(self) -> &'static str {
        match self {
            HealthBand::Healthy => "Healthy",
            HealthBand::Clean => "Clean",
            HealthBand::Good => "Good",
            HealthBand::Moderate => "Moderate",
            HealthBand::Unhealthy => "Unhealthy",
            HealthBand::Hazardous => "Hazardous",
            HealthBand::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for HealthBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Dashboard background color for an AQI result.
///
/// The color thresholds do not follow the band boundaries.
pub fn background_color(result: AqiResult) -> &'static str {
    match result.value() {
        None => COLOR_UNKNOWN,
        Some(aqi) if aqi <= 150.0 => COLOR_GOOD,
        Some(aqi) if aqi <= 240.0 => COLOR_MODERATE,
        Some(_) => COLOR_POOR,
    }
}
