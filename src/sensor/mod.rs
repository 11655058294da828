// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-air-quality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Air quality sensor register map and readings
//!
//! The field device exposes one holding register per measured parameter.
//! Each register carries an unsigned 16-bit raw value that is converted into
//! an engineering unit with a per-parameter scaling rule.
//!
//! ## Register Map
//!
//! | Parameter   | Holding Register | Scaling            | Unit  |
//! |-------------|------------------|--------------------|-------|
//! | Temperature | 4                | (raw - 500) / 10   | °C    |
//! | PM1.0       | 6                | raw                | µg/m³ |
//! | Humidity    | 5                | raw / 10           | %RH   |
//! | PM2.5       | 1                | raw                | µg/m³ |
//! | PM10        | 7                | raw                | µg/m³ |
//! | O2          | 10               | raw / 10           | %     |
//! | CO2         | 3                | raw                | ppm   |
//! | TVOC        | 2                | raw                | ppb   |
//!
//! The order of [`Parameter::ALL`] is the polling order.

pub mod reader;
pub mod transport;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use reader::{ReadError, RegisterReader};
pub use transport::{RegisterTransport, TransportError};

/// Measured parameter of the air quality sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Parameter {
    #[serde(rename = "Temperature")]
    Temperature,
    #[serde(rename = "PM1.0")]
    Pm1_0,
    #[serde(rename = "Humidity")]
    Humidity,
    #[serde(rename = "PM2.5")]
    Pm2_5,
    #[serde(rename = "PM10")]
    Pm10,
    #[serde(rename = "O2")]
    O2,
    #[serde(rename = "CO2")]
    Co2,
    #[serde(rename = "TVOC")]
    Tvoc,
}

/// Rule converting a raw register value into an engineering unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scaling {
    /// `raw / divisor`
    Divide { divisor: f64 },
    /// `(raw - offset) / divisor`
    OffsetDivide { offset: f64, divisor: f64 },
}

impl Scaling {
    /// Convert a raw register value.
    pub fn apply(self, raw: u16) -> f64 {
        match self {
            Scaling::Divide { divisor } => f64::from(raw) / divisor,
            Scaling::OffsetDivide { offset, divisor } => (f64::from(raw) - offset) / divisor,
        }
    }

    /// Convert an engineering value back into the closest raw register value.
    ///
    /// Values outside the register range saturate at `0` and `u16::MAX`.
    pub fn encode(self, value: f64) -> u16 {
        let raw = match self {
            Scaling::Divide { divisor } => value * divisor,
            Scaling::OffsetDivide { offset, divisor } => value * divisor + offset,
        };
        raw.round().clamp(0.0, f64::from(u16::MAX)) as u16
    }
}

/// Display range of a dashboard gauge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GaugeRange {
    pub min: f64,
    pub max: f64,
    /// Upper bound of the "good" zone
    pub good: f64,
    /// Upper bound of the "moderate" zone
    pub moderate: f64,
}

/// Static description of one parameter: where it lives and how to read it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterSpec {
    #[serde(rename = "title")]
    pub parameter: Parameter,
    pub address: u16,
    pub scaling: Scaling,
    pub unit: &'static str,
    pub description: &'static str,
    pub gauge: GaugeRange,
}

const fn divide(divisor: f64) -> Scaling {
    Scaling::Divide { divisor }
}

const fn gauge(min: f64, max: f64, good: f64, moderate: f64) -> GaugeRange {
    GaugeRange {
        min,
        max,
        good,
        moderate,
    }
}

impl Parameter {
    /// All parameters in polling order.
    pub const ALL: [Parameter; 8] = [
        Parameter::Temperature,
        Parameter::Pm1_0,
        Parameter::Humidity,
        Parameter::Pm2_5,
        Parameter::Pm10,
        Parameter::O2,
        Parameter::Co2,
        Parameter::Tvoc,
    ];

    /// Parameters kept in the dashboard trend charts.
    pub const TRENDED: [Parameter; 4] = [
        Parameter::Temperature,
        Parameter::Humidity,
        Parameter::Pm2_5,
        Parameter::Pm10,
    ];

    /// Name used on the wire and in the dashboard.
    pub const fn title(self) -> &'static str {
        match self {
            Parameter::Temperature => "Temperature",
            Parameter::Pm1_0 => "PM1.0",
            Parameter::Humidity => "Humidity",
            Parameter::Pm2_5 => "PM2.5",
            Parameter::Pm10 => "PM10",
            Parameter::O2 => "O2",
            Parameter::Co2 => "CO2",
            Parameter::Tvoc => "TVOC",
        }
    }

    /// Register address, scaling rule and display metadata of this parameter.
    pub const fn spec(self) -> ParameterSpec {
        let (address, scaling, unit, description, gauge_range) = match self {
            Parameter::Temperature => (
                4,
                Scaling::OffsetDivide {
                    offset: 500.0,
                    divisor: 10.0,
                },
                "°C",
                "Ambient temperature in degrees Celsius.",
                gauge(0.0, 104.0, 68.0, 77.0),
            ),
            Parameter::Pm1_0 => (
                6,
                divide(1.0),
                "µg/m³",
                "Particulate matter (1.0 micrometers) in µg/m³.",
                gauge(0.0, 110.0, 90.0, 101.0),
            ),
            Parameter::Humidity => (
                5,
                divide(10.0),
                "%RH",
                "Relative humidity in percentage (%RH).",
                gauge(0.0, 100.0, 30.0, 60.0),
            ),
            Parameter::Pm2_5 => (
                1,
                divide(1.0),
                "µg/m³",
                "Particulate matter (2.5 micrometers) in µg/m³.",
                gauge(0.0, 100.0, 12.0, 35.0),
            ),
            Parameter::Pm10 => (
                7,
                divide(1.0),
                "µg/m³",
                "Particulate matter (10 micrometers) in µg/m³.",
                gauge(0.0, 100.0, 20.0, 50.0),
            ),
            Parameter::O2 => (
                10,
                divide(10.0),
                "%",
                "Oxygen concentration in percentage (%Vol).",
                gauge(0.0, 100.0, 19.0, 23.0),
            ),
            Parameter::Co2 => (
                3,
                divide(1.0),
                "ppm",
                "Carbon dioxide concentration in parts per million (ppm).",
                gauge(0.0, 2000.0, 250.0, 1000.0),
            ),
            Parameter::Tvoc => (
                2,
                divide(1.0),
                "ppb",
                "Total volatile organic compounds in parts per billion (ppb).",
                gauge(0.0, 2000.0, 450.0, 1000.0),
            ),
        };
        ParameterSpec {
            parameter: self,
            address,
            scaling,
            unit,
            description,
            gauge: gauge_range,
        }
    }

    /// Holding register address of this parameter.
    pub const fn address(self) -> u16 {
        self.spec().address
    }

    /// Look a parameter up by its wire title (`"PM2.5"`, `"O2"`, ...).
    pub fn from_title(title: &str) -> Option<Parameter> {
        Parameter::ALL.into_iter().find(|p| p.title() == title)
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// One polled parameter.
///
/// Serialized as `{"title": "PM2.5", "value": 25.0}`; `value` is `null` when
/// the register returned nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    #[serde(rename = "title")]
    pub parameter: Parameter,
    #[serde(skip)]
    pub raw: Option<u16>,
    pub value: Option<f64>,
}

impl Reading {
    /// Build a reading from the raw register content, scaling it if present.
    pub fn from_raw(parameter: Parameter, raw: Option<u16>) -> Self {
        let value = raw.map(|raw| parameter.spec().scaling.apply(raw));
        Self {
            parameter,
            raw,
            value,
        }
    }

    /// A reading with no value, used for the "no data" dashboard state.
    pub fn missing(parameter: Parameter) -> Self {
        Self {
            parameter,
            raw: None,
            value: None,
        }
    }

    /// Same parameter with its value dropped.
    pub fn without_value(&self) -> Self {
        Self::missing(self.parameter)
    }
}

/// Find the scaled value of `parameter` in a list of readings.
pub fn value_of(readings: &[Reading], parameter: Parameter) -> Option<f64> {
    readings
        .iter()
        .find(|r| r.parameter == parameter)
        .and_then(|r| r.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn temperature_uses_offset_then_divide() {
        let reading = Reading::from_raw(Parameter::Temperature, Some(725));
        assert_relative_eq!(reading.value.unwrap(), 22.5);

        let reading = Reading::from_raw(Parameter::Temperature, Some(500));
        assert_relative_eq!(reading.value.unwrap(), 0.0);

        // Below the offset the temperature goes negative
        let reading = Reading::from_raw(Parameter::Temperature, Some(400));
        assert_relative_eq!(reading.value.unwrap(), -10.0);
    }

    #[test]
    fn other_parameters_divide_only() {
        let reading = Reading::from_raw(Parameter::Pm2_5, Some(25));
        assert_relative_eq!(reading.value.unwrap(), 25.0);

        let reading = Reading::from_raw(Parameter::O2, Some(210));
        assert_relative_eq!(reading.value.unwrap(), 21.0);

        let reading = Reading::from_raw(Parameter::Humidity, Some(453));
        assert_relative_eq!(reading.value.unwrap(), 45.3);
    }

    #[test]
    fn absent_raw_value_gives_absent_reading() {
        let reading = Reading::from_raw(Parameter::Co2, None);
        assert_eq!(reading.raw, None);
        assert_eq!(reading.value, None);
    }

    #[test]
    fn register_map_matches_the_device() {
        let addresses: Vec<u16> = Parameter::ALL.iter().map(|p| p.address()).collect();
        assert_eq!(addresses, vec![4, 6, 5, 1, 7, 10, 3, 2]);
    }

    #[test]
    fn encode_inverts_scaling() {
        let temperature = Parameter::Temperature.spec().scaling;
        assert_eq!(temperature.encode(22.5), 725);
        assert_eq!(temperature.encode(-60.0), 0);

        let o2 = Parameter::O2.spec().scaling;
        assert_eq!(o2.encode(20.9), 209);
    }

    #[test]
    fn reading_serializes_as_title_and_value() {
        let readings = vec![
            Reading::from_raw(Parameter::Pm2_5, Some(25)),
            Reading::from_raw(Parameter::Tvoc, None),
        ];
        let json = serde_json::to_value(&readings).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"title": "PM2.5", "value": 25.0},
                {"title": "TVOC", "value": null}
            ])
        );
    }

    #[test]
    fn titles_round_trip_through_lookup() {
        for parameter in Parameter::ALL {
            assert_eq!(Parameter::from_title(parameter.title()), Some(parameter));
        }
        assert_eq!(Parameter::from_title("Pressure"), None);
    }
}
