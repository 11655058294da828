// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-air-quality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Dashboard state
//!
//! Turns polls of the [`RegisterReader`] into dashboard snapshots: readings,
//! AQI, health band and background color, plus a freshness status. A failed
//! poll falls back on the [`ReadingCache`] while it is fresh. Successful polls
//! feed the [`TrendHistory`].
//!
//! The state is shared between the background refresher and the web
//! handlers through an `Arc<Dashboard>`.

pub mod cache;
pub mod history;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::aqi::{background_color, estimate_aqi_with, AqiResult, HealthBand, OutOfRangePolicy};
use crate::config::Config;
use crate::sensor::{value_of, Parameter, ReadError, Reading, RegisterReader};

pub use cache::{CachedReadings, ReadingCache};
pub use history::{axis_range, AxisRange, TrendHistory, TrendPoint, TrendSeries};

/// Where the readings of a snapshot come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FreshnessStatus {
    /// From the poll that produced the snapshot
    Live,
    /// From the cache after a failed poll
    Stale,
    /// The poll failed and nothing fresh enough was cached
    NoData,
}

/// Everything the dashboard shows at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub readings: Vec<Reading>,
    pub aqi: AqiResult,
    pub health: HealthBand,
    pub background: &'static str,
    pub status: FreshnessStatus,
    /// When the readings were polled
    pub taken_at: Option<DateTime<Utc>>,
    pub refreshed_at: DateTime<Utc>,
    /// Failure of the poll behind a `stale` or `no_data` snapshot
    pub error: Option<String>,
}

impl DashboardSnapshot {
    /// Derive AQI, band and color from `readings`.
    pub fn from_readings(
        readings: Vec<Reading>,
        status: FreshnessStatus,
        taken_at: Option<DateTime<Utc>>,
        refreshed_at: DateTime<Utc>,
        policy: OutOfRangePolicy,
    ) -> Self {
        let aqi = estimate_aqi_with(
            value_of(&readings, Parameter::Pm2_5),
            value_of(&readings, Parameter::Pm10),
            value_of(&readings, Parameter::O2),
            policy,
        );
        Self {
            readings,
            aqi,
            health: aqi.health(),
            background: background_color(aqi),
            status,
            taken_at,
            refreshed_at,
            error: None,
        }
    }

    /// Snapshot with every parameter absent.
    pub fn no_data(refreshed_at: DateTime<Utc>, error: String) -> Self {
        let readings = Parameter::ALL.into_iter().map(Reading::missing).collect();
        Self {
            error: Some(error),
            ..Self::from_readings(
                readings,
                FreshnessStatus::NoData,
                None,
                refreshed_at,
                OutOfRangePolicy::default(),
            )
        }
    }
}

#[derive(Debug)]
struct DashboardState {
    cache: ReadingCache,
    history: TrendHistory,
    latest: Option<DashboardSnapshot>,
}

pub struct Dashboard {
    reader: Arc<RegisterReader>,
    state: RwLock<DashboardState>,
    poll_timeout: Duration,
    policy: OutOfRangePolicy,
}

impl Dashboard {
    pub fn new(
        reader: Arc<RegisterReader>,
        poll_timeout: Duration,
        max_age: Duration,
        history: TrendHistory,
        policy: OutOfRangePolicy,
    ) -> Self {
        Self {
            reader,
            state: RwLock::new(DashboardState {
                cache: ReadingCache::new(max_age),
                history,
                latest: None,
            }),
            poll_timeout,
            policy,
        }
    }

    pub fn from_config(reader: Arc<RegisterReader>, config: &Config) -> Self {
        let acquisition = &config.acquisition;
        Self::new(
            reader,
            Duration::from_millis(config.modbus.timeout_ms),
            acquisition.max_age(),
            TrendHistory::new(acquisition.history_size, acquisition.history_interval()),
            config.aqi.out_of_range,
        )
    }

    pub fn reader(&self) -> &Arc<RegisterReader> {
        &self.reader
    }

    pub fn policy(&self) -> OutOfRangePolicy {
        self.policy
    }

    /// One poll of the sensor, bounded by the poll timeout.
    ///
    /// A timed-out pass still completes in the background before the next
    /// poll gets the bus.
    pub async fn poll(&self) -> Result<Vec<Reading>, ReadError> {
        self.reader.read_all_within(self.poll_timeout).await
    }

    /// Poll the sensor and publish a new snapshot.
    pub async fn refresh(&self) -> DashboardSnapshot {
        let result = self.poll().await;
        self.apply(result, Utc::now()).await
    }

    /// Publish the snapshot for a poll outcome observed at `now`.
    pub async fn apply(
        &self,
        result: Result<Vec<Reading>, ReadError>,
        now: DateTime<Utc>,
    ) -> DashboardSnapshot {
        let mut state = self.state.write().await;

        let snapshot = match result {
            Ok(readings) => {
                if state.history.record(&readings, now) {
                    debug!("Trend sample recorded at {}", now);
                }
                state.cache.store(readings.clone(), now);
                DashboardSnapshot::from_readings(
                    readings,
                    FreshnessStatus::Live,
                    Some(now),
                    now,
                    self.policy,
                )
            }
            Err(err) => {
                warn!("Dashboard refresh failed: {}", err);
                match state.cache.lookup(now) {
                    Some(cached) => DashboardSnapshot {
                        error: Some(err.to_string()),
                        ..DashboardSnapshot::from_readings(
                            cached.readings.clone(),
                            FreshnessStatus::Stale,
                            Some(cached.taken_at),
                            now,
                            self.policy,
                        )
                    },
                    None => DashboardSnapshot::no_data(now, err.to_string()),
                }
            }
        };

        state.latest = Some(snapshot.clone());
        snapshot
    }

    /// Most recent snapshot, if any refresh happened.
    pub async fn latest(&self) -> Option<DashboardSnapshot> {
        self.state.read().await.latest.clone()
    }

    /// Most recent snapshot, refreshing first when there is none.
    pub async fn current(&self) -> DashboardSnapshot {
        match self.latest().await {
            Some(snapshot) => snapshot,
            None => self.refresh().await,
        }
    }

    /// Trend series with their axis ranges.
    pub async fn history(&self) -> Vec<TrendSeries> {
        self.state.read().await.history.series()
    }
}
