// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-air-quality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! AQI estimator
//!
//! The index is the larger of the PM2.5 and PM10 sub-indices, corrected by
//! the oxygen level and capped at 500.

use serde::{Serialize, Serializer};

use super::breakpoints::{sub_index, OutOfRangePolicy, PM10_BREAKPOINTS, PM25_BREAKPOINTS};
use super::health::HealthBand;

/// Upper bound of the index.
pub const AQI_MAX: f64 = 500.0;

/// Oxygen below this percentage raises the index.
pub const O2_LOW_THRESHOLD: f64 = 19.0;
/// Oxygen above this percentage lowers the index.
pub const O2_HIGH_THRESHOLD: f64 = 23.0;

/// Outcome of an estimation.
///
/// Serializes as a number, or `null` when undetermined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AqiResult {
    /// Index in `[0, 500]`, rounded to 2 decimals
    Value(f64),
    /// At least one input was missing or not a number
    Undetermined,
}

impl AqiResult {
    pub fn value(self) -> Option<f64> {
        match self {
            AqiResult::Value(value) => Some(value),
            AqiResult::Undetermined => None,
        }
    }

    pub fn is_undetermined(self) -> bool {
        matches!(self, AqiResult::Undetermined)
    }

    /// Health band of this result.
    pub fn health(self) -> HealthBand {
        HealthBand::classify(self)
    }
}

impl Serialize for AqiResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value().serialize(serializer)
    }
}

/// Correction applied for the measured oxygen percentage.
pub fn o2_factor(o2: f64) -> f64 {
    if o2 < O2_LOW_THRESHOLD {
        1.2
    } else if o2 > O2_HIGH_THRESHOLD {
        0.9
    } else {
        1.0
    }
}

/// Estimate the index with the default out-of-range policy.
pub fn estimate_aqi(pm25: Option<f64>, pm10: Option<f64>, o2: Option<f64>) -> AqiResult {
    estimate_aqi_with(pm25, pm10, o2, OutOfRangePolicy::default())
}

/// Estimate the index from PM2.5 (µg/m³), PM10 (µg/m³) and O2 (%).
pub fn estimate_aqi_with(
    pm25: Option<f64>,
    pm10: Option<f64>,
    o2: Option<f64>,
    policy: OutOfRangePolicy,
) -> AqiResult {
    let (Some(pm25), Some(pm10), Some(o2)) = (
        pm25.filter(|v| v.is_finite()),
        pm10.filter(|v| v.is_finite()),
        o2.filter(|v| v.is_finite()),
    ) else {
        return AqiResult::Undetermined;
    };

    let aqi_pm25 = sub_index(&PM25_BREAKPOINTS, pm25, policy);
    let aqi_pm10 = sub_index(&PM10_BREAKPOINTS, pm10, policy);
    let aqi = (aqi_pm25.max(aqi_pm10) * o2_factor(o2)).min(AQI_MAX);

    AqiResult::Value(round2(aqi))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn value(result: AqiResult) -> f64 {
        result.value().expect("determined AQI")
    }

    #[test]
    fn reference_case() {
        // pm25 in [0,12] gives 25, pm10 in [0,54] gives ~18.52, O2 is neutral
        let result = estimate_aqi(Some(6.0), Some(20.0), Some(21.0));
        assert_relative_eq!(value(result), 25.0);
    }

    #[test]
    fn missing_or_non_numeric_input_is_undetermined() {
        assert_eq!(
            estimate_aqi(None, Some(20.0), Some(21.0)),
            AqiResult::Undetermined
        );
        assert_eq!(
            estimate_aqi(Some(6.0), None, Some(21.0)),
            AqiResult::Undetermined
        );
        assert_eq!(
            estimate_aqi(Some(6.0), Some(20.0), None),
            AqiResult::Undetermined
        );
        assert_eq!(
            estimate_aqi(Some(f64::NAN), Some(20.0), Some(21.0)),
            AqiResult::Undetermined
        );
    }

    #[test]
    fn oxygen_correction_scales_the_index() {
        let neutral = value(estimate_aqi(Some(6.0), Some(20.0), Some(21.0)));
        let low_o2 = value(estimate_aqi(Some(6.0), Some(20.0), Some(15.0)));
        let high_o2 = value(estimate_aqi(Some(6.0), Some(20.0), Some(25.0)));

        assert_relative_eq!(low_o2, neutral * 1.2);
        assert_relative_eq!(high_o2, neutral * 0.9);
    }

    #[test]
    fn oxygen_thresholds_are_exclusive() {
        assert_relative_eq!(o2_factor(19.0), 1.0);
        assert_relative_eq!(o2_factor(23.0), 1.0);
        assert_relative_eq!(o2_factor(18.9), 1.2);
        assert_relative_eq!(o2_factor(23.1), 0.9);
    }

    #[test]
    fn index_never_exceeds_500() {
        let result = value(estimate_aqi(Some(500.0), Some(600.0), Some(10.0)));
        assert_relative_eq!(result, 500.0);

        for pm25 in [0.0, 40.0, 200.0, 400.0, 500.4] {
            for o2 in [10.0, 21.0, 30.0] {
                let result = value(estimate_aqi(Some(pm25), Some(pm25), Some(o2)));
                assert!((0.0..=AQI_MAX).contains(&result));
            }
        }
    }

    #[test]
    fn larger_sub_index_wins() {
        // pm10 = 154 gives 100, pm25 = 6 gives 25
        let result = value(estimate_aqi(Some(6.0), Some(154.0), Some(21.0)));
        assert_relative_eq!(result, 100.0);
    }

    #[test]
    fn result_is_rounded_to_two_decimals() {
        // pm10 = 20 alone gives 18.5185...
        let result = value(estimate_aqi(Some(0.0), Some(20.0), Some(21.0)));
        assert_relative_eq!(result, 18.52);
    }

    #[test]
    fn out_of_table_concentration_depends_on_policy() {
        let zero = estimate_aqi_with(Some(700.0), Some(0.0), Some(21.0), OutOfRangePolicy::Zero);
        assert_relative_eq!(value(zero), 0.0);

        let clamp = estimate_aqi_with(Some(700.0), Some(0.0), Some(21.0), OutOfRangePolicy::Clamp);
        assert_relative_eq!(value(clamp), 500.0);
    }

    #[test]
    fn serializes_as_number_or_null() {
        assert_eq!(
            serde_json::to_value(AqiResult::Value(25.0)).unwrap(),
            serde_json::json!(25.0)
        );
        assert_eq!(
            serde_json::to_value(AqiResult::Undetermined).unwrap(),
            serde_json::Value::Null
        );
    }
}
