// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-air-quality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! JSON API
//!
//! | Route                           | Content                                  |
//! |---------------------------------|------------------------------------------|
//! | `GET /api/modbus-data`          | fresh poll of the eight registers        |
//! | `GET /api/parameters`           | register map, units and gauge ranges     |
//! | `GET /api/dashboard`            | latest dashboard snapshot                |
//! | `GET /api/aqi?pm25=&pm10=&o2=`  | AQI and health band of arbitrary inputs  |
//! | `GET /api/history`              | trend series with their axis ranges      |
//!
//! Errors are returned as `{"error": "..."}`.

pub mod dashboard;
pub mod readings;

use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::{routes, Route};
use serde::{Deserialize, Serialize};

/// Body of an error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    pub fn response(status: Status, error: impl ToString) -> Custom<Json<ApiError>> {
        Custom(
            status,
            Json(ApiError {
                error: error.to_string(),
            }),
        )
    }
}

/// All API routes.
pub fn get_api_routes() -> Vec<Route> {
    routes![
        readings::get_modbus_data,
        readings::get_parameters,
        dashboard::get_dashboard,
        dashboard::get_aqi,
        dashboard::get_history,
    ]
}
