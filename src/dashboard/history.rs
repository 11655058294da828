// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-air-quality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Trend history for the dashboard charts
//!
//! Keeps a bounded, time-ordered series for each trended parameter. Samples
//! are throttled to one per interval regardless of how often the dashboard
//! refreshes.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::time::Duration;

use crate::sensor::{value_of, Parameter, Reading};

/// One point of a trend series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub time: DateTime<Utc>,
    /// `HH:MM` label for the chart axis
    pub label: String,
    pub value: f64,
}

/// Vertical axis bounds of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

/// Series as exposed to the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSeries {
    pub title: Parameter,
    pub unit: &'static str,
    pub points: Vec<TrendPoint>,
    pub axis: AxisRange,
}

#[derive(Debug, Clone)]
pub struct TrendHistory {
    capacity: usize,
    min_interval: Duration,
    last_sample: Option<DateTime<Utc>>,
    series: Vec<(Parameter, VecDeque<TrendPoint>)>,
}

impl TrendHistory {
    /// Create an empty history for [`Parameter::TRENDED`].
    ///
    /// A capacity of 0 is raised to 1.
    pub fn new(capacity: usize, min_interval: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            min_interval,
            last_sample: None,
            series: Parameter::TRENDED
                .iter()
                .map(|p| (*p, VecDeque::with_capacity(capacity)))
                .collect(),
        }
    }

    /// Record one sample from a successful poll.
    ///
    /// Returns `false` when the previous sample is younger than the minimum
    /// interval, or when no trended value was usable. Absent and non-finite
    /// values are skipped per series; a sample that stored nothing does not
    /// restart the interval.
    pub fn record(&mut self, readings: &[Reading], now: DateTime<Utc>) -> bool {
        if let Some(last) = self.last_sample {
            let elapsed = (now - last).to_std().unwrap_or(Duration::ZERO);
            if elapsed < self.min_interval {
                return false;
            }
        }

        let label = now.format("%H:%M").to_string();
        let mut saved = false;
        for (parameter, points) in &mut self.series {
            let Some(value) = value_of(readings, *parameter).filter(|v| v.is_finite()) else {
                continue;
            };
            if points.len() == self.capacity {
                points.pop_front();
            }
            points.push_back(TrendPoint {
                time: now,
                label: label.clone(),
                value,
            });
            saved = true;
        }

        if saved {
            self.last_sample = Some(now);
        }
        saved
    }

    /// Points of one series, oldest first.
    pub fn points(&self, parameter: Parameter) -> Option<&VecDeque<TrendPoint>> {
        self.series
            .iter()
            .find(|(p, _)| *p == parameter)
            .map(|(_, points)| points)
    }

    /// All series with their axis ranges.
    pub fn series(&self) -> Vec<TrendSeries> {
        self.series
            .iter()
            .map(|(parameter, points)| {
                let values: Vec<f64> = points.iter().map(|p| p.value).collect();
                TrendSeries {
                    title: *parameter,
                    unit: parameter.spec().unit,
                    points: points.iter().cloned().collect(),
                    axis: axis_range(&values),
                }
            })
            .collect()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Chart bounds for a set of values.
///
/// Empty: `[0, 100]`. Constant `v`: `[max(0, v - 10), v + 10]`. Otherwise
/// both ends are pushed out by 30% of the span, the lower one floored at 0.
pub fn axis_range(values: &[f64]) -> AxisRange {
    let mut finite = values.iter().copied().filter(|v| v.is_finite());
    let Some(first) = finite.next() else {
        return AxisRange {
            min: 0.0,
            max: 100.0,
        };
    };
    let (min, max) = finite.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));

    if min == max {
        return AxisRange {
            min: (min - 10.0).max(0.0),
            max: max + 10.0,
        };
    }

    let margin = (max - min) * 0.3;
    AxisRange {
        min: (min - margin).max(0.0),
        max: max + margin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{TimeDelta, TimeZone};

    fn readings(pm25: Option<f64>) -> Vec<Reading> {
        vec![
            Reading::from_raw(Parameter::Temperature, Some(725)),
            Reading::from_raw(Parameter::Humidity, Some(450)),
            Reading {
                parameter: Parameter::Pm2_5,
                raw: None,
                value: pm25,
            },
            Reading::from_raw(Parameter::Pm10, Some(20)),
        ]
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 8, 30, 0).unwrap()
    }

    #[test]
    fn first_usable_sample_records_immediately() {
        let mut history = TrendHistory::new(15, Duration::from_secs(60));
        assert!(history.record(&readings(Some(6.0)), start()));

        let points = history.points(Parameter::Temperature).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].label, "08:30");
        assert_relative_eq!(points[0].value, 22.5);
    }

    #[test]
    fn samples_are_throttled_to_the_interval() {
        let mut history = TrendHistory::new(15, Duration::from_secs(60));
        let t0 = start();
        assert!(history.record(&readings(Some(6.0)), t0));
        assert!(!history.record(&readings(Some(7.0)), t0 + TimeDelta::seconds(30)));
        assert!(history.record(&readings(Some(8.0)), t0 + TimeDelta::seconds(60)));

        let values: Vec<f64> = history
            .points(Parameter::Pm2_5)
            .unwrap()
            .iter()
            .map(|p| p.value)
            .collect();
        assert_eq!(values, vec![6.0, 8.0]);
    }

    #[test]
    fn oldest_point_is_dropped_at_capacity() {
        let mut history = TrendHistory::new(3, Duration::ZERO);
        let t0 = start();
        for i in 0..5 {
            history.record(
                &readings(Some(f64::from(i))),
                t0 + TimeDelta::minutes(i64::from(i)),
            );
        }

        let points = history.points(Parameter::Pm2_5).unwrap();
        let values: Vec<f64> = points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![2.0, 3.0, 4.0]);
        assert!(points.iter().zip(points.iter().skip(1)).all(|(a, b)| a.time < b.time));
    }

    #[test]
    fn non_finite_and_absent_values_are_skipped() {
        let mut history = TrendHistory::new(15, Duration::ZERO);
        history.record(&readings(None), start());
        history.record(&readings(Some(f64::NAN)), start() + TimeDelta::minutes(1));

        assert!(history.points(Parameter::Pm2_5).unwrap().is_empty());
        assert_eq!(history.points(Parameter::Pm10).unwrap().len(), 2);
    }

    #[test]
    fn empty_sample_does_not_restart_the_interval() {
        let mut history = TrendHistory::new(15, Duration::from_secs(60));
        let t0 = start();
        let absent: Vec<Reading> = Parameter::TRENDED
            .into_iter()
            .map(Reading::missing)
            .collect();

        assert!(!history.record(&absent, t0));
        assert!(history.record(&readings(Some(6.0)), t0 + TimeDelta::seconds(10)));
        assert_eq!(history.points(Parameter::Temperature).unwrap().len(), 1);
        assert_eq!(
            history.points(Parameter::Temperature).unwrap()[0].time,
            t0 + TimeDelta::seconds(10)
        );
    }

    #[test]
    fn untrended_parameters_have_no_series() {
        let history = TrendHistory::new(15, Duration::ZERO);
        assert!(history.points(Parameter::Co2).is_none());
        assert_eq!(history.series().len(), 4);
    }

    #[test]
    fn axis_range_rules() {
        assert_eq!(axis_range(&[]), AxisRange { min: 0.0, max: 100.0 });
        assert_eq!(axis_range(&[5.0, 5.0]), AxisRange { min: 0.0, max: 15.0 });
        assert_eq!(axis_range(&[40.0]), AxisRange { min: 30.0, max: 50.0 });

        let range = axis_range(&[20.0, 30.0]);
        assert_relative_eq!(range.min, 17.0);
        assert_relative_eq!(range.max, 33.0);

        let range = axis_range(&[1.0, 11.0]);
        assert_relative_eq!(range.min, 0.0);
        assert_relative_eq!(range.max, 14.0);
    }
}
