// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-air-quality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Sensor readings API

use log::error;
use rocket::get;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::State;
use serde::Serialize;
use std::sync::Arc;

use super::ApiError;
use crate::aqi::AQI_GAUGE;
use crate::dashboard::Dashboard;
use crate::sensor::{GaugeRange, Parameter, ParameterSpec, Reading};

/// Poll the sensor now.
///
/// Returns the eight readings in polling order, or a 500 with the failure.
#[get("/api/modbus-data")]
pub async fn get_modbus_data(
    dashboard: &State<Arc<Dashboard>>,
) -> Result<Json<Vec<Reading>>, Custom<Json<ApiError>>> {
    dashboard.poll().await.map(Json).map_err(|err| {
        error!("Error reading Modbus data: {}", err);
        ApiError::response(Status::InternalServerError, err)
    })
}

#[derive(Debug, Serialize)]
pub struct ParameterTable {
    pub parameters: Vec<ParameterSpec>,
    pub aqi_gauge: GaugeRange,
}

#[get("/api/parameters")]
pub async fn get_parameters() -> Json<ParameterTable> {
    Json(ParameterTable {
        parameters: Parameter::ALL.iter().map(|p| p.spec()).collect(),
        aqi_gauge: AQI_GAUGE,
    })
}
