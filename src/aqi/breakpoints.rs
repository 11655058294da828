// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-air-quality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Breakpoint tables mapping pollutant concentrations to AQI sub-ranges

use serde::{Deserialize, Serialize};

/// Linear mapping from a concentration range to an AQI range.
///
/// Both ends of `[low, high]` are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Breakpoint {
    pub low: f64,
    pub high: f64,
    pub aqi_low: f64,
    pub aqi_high: f64,
}

impl Breakpoint {
    const fn new(low: f64, high: f64, aqi_low: f64, aqi_high: f64) -> Self {
        Self {
            low,
            high,
            aqi_low,
            aqi_high,
        }
    }

    pub fn contains(&self, concentration: f64) -> bool {
        concentration >= self.low && concentration <= self.high
    }

    pub fn interpolate(&self, concentration: f64) -> f64 {
        (self.aqi_high - self.aqi_low) / (self.high - self.low) * (concentration - self.low)
            + self.aqi_low
    }
}

/// PM2.5 breakpoints in µg/m³.
pub const PM25_BREAKPOINTS: [Breakpoint; 6] = [
    Breakpoint::new(0.0, 12.0, 0.0, 50.0),
    Breakpoint::new(12.1, 35.4, 51.0, 100.0),
    Breakpoint::new(35.5, 55.4, 101.0, 150.0),
    Breakpoint::new(55.5, 150.4, 151.0, 200.0),
    Breakpoint::new(150.5, 250.4, 201.0, 300.0),
    Breakpoint::new(250.5, 500.4, 301.0, 500.0),
];

/// PM10 breakpoints in µg/m³.
pub const PM10_BREAKPOINTS: [Breakpoint; 6] = [
    Breakpoint::new(0.0, 54.0, 0.0, 50.0),
    Breakpoint::new(55.0, 154.0, 51.0, 100.0),
    Breakpoint::new(155.0, 254.0, 101.0, 150.0),
    Breakpoint::new(255.0, 354.0, 151.0, 200.0),
    Breakpoint::new(355.0, 424.0, 201.0, 300.0),
    Breakpoint::new(425.0, 604.0, 301.0, 500.0),
];

/// Handling of concentrations no breakpoint contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutOfRangePolicy {
    /// Sub-index is 0, as the original dashboard did
    #[default]
    Zero,
    /// Below the table: first `aqi_low`; above: last `aqi_high`;
    /// between two entries: the lower entry's `aqi_high`
    Clamp,
}

/// Sub-index of `concentration` against `table`.
///
/// The table is scanned in ascending order and the first entry containing the
/// value wins, so a value on a shared boundary belongs to the lower entry.
pub fn sub_index(table: &[Breakpoint], concentration: f64, policy: OutOfRangePolicy) -> f64 {
    if let Some(breakpoint) = table.iter().find(|bp| bp.contains(concentration)) {
        return breakpoint.interpolate(concentration);
    }

    match policy {
        OutOfRangePolicy::Zero => 0.0,
        OutOfRangePolicy::Clamp => {
            let (Some(first), Some(last)) = (table.first(), table.last()) else {
                return 0.0;
            };
            if concentration < first.low {
                first.aqi_low
            } else if concentration > last.high {
                last.aqi_high
            } else {
                table
                    .iter()
                    .rev()
                    .find(|bp| bp.high < concentration)
                    .map_or(first.aqi_low, |bp| bp.aqi_high)
            }
        }
    }
}
