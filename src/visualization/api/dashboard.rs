// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-air-quality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Dashboard API

use rocket::get;
use rocket::serde::json::Json;
use rocket::State;
use serde::Serialize;
use std::sync::Arc;

use crate::aqi::{background_color, estimate_aqi_with, AqiResult, HealthBand};
use crate::dashboard::{Dashboard, DashboardSnapshot, TrendSeries};

/// Latest snapshot; the first call polls the sensor.
#[get("/api/dashboard")]
pub async fn get_dashboard(dashboard: &State<Arc<Dashboard>>) -> Json<DashboardSnapshot> {
    Json(dashboard.current().await)
}

#[derive(Debug, Serialize)]
pub struct AqiResponse {
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
    pub o2: Option<f64>,
    pub aqi: AqiResult,
    pub health: HealthBand,
    pub background: &'static str,
}

/// AQI of arbitrary inputs.
///
/// Missing or non-numeric parameters make the result `null` and the band
/// `Unknown`.
#[get("/api/aqi?<pm25>&<pm10>&<o2>")]
pub async fn get_aqi(
    dashboard: &State<Arc<Dashboard>>,
    pm25: Option<f64>,
    pm10: Option<f64>,
    o2: Option<f64>,
) -> Json<AqiResponse> {
    let aqi = estimate_aqi_with(pm25, pm10, o2, dashboard.policy());
    Json(AqiResponse {
        pm25,
        pm10,
        o2,
        aqi,
        health: aqi.health(),
        background: background_color(aqi),
    })
}

#[get("/api/history")]
pub async fn get_history(dashboard: &State<Arc<Dashboard>>) -> Json<Vec<TrendSeries>> {
    Json(dashboard.history().await)
}
