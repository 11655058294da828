// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-air-quality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Rocket server builder

use log::debug;
use rocket::figment::Figment;
use rocket::{routes, Build, Rocket};
use std::sync::Arc;

use super::cors::CORS;
use super::handlers::{health, options};
use crate::dashboard::Dashboard;
use crate::visualization::api::get_api_routes;

/// Build a configured Rocket server instance
///
/// ### Parameters
///
/// * `figment` - The Rocket configuration figment containing server settings
/// * `dashboard` - Shared dashboard state, managed as `Arc<Dashboard>`
///
/// ### Example
///
/// ```no_run
/// use std::sync::Arc;
/// use rust_air_quality::config::Config;
/// use rust_air_quality::dashboard::Dashboard;
/// use rust_air_quality::sensor::{transport::MockRegisterTransport, RegisterReader};
/// use rust_air_quality::visualization::server::build_rocket;
///
/// async fn example() {
///     let reader = Arc::new(RegisterReader::new(Box::new(MockRegisterTransport::nominal())));
///     let dashboard = Arc::new(Dashboard::from_config(reader, &Config::default()));
///     let rocket = build_rocket(rocket::Config::figment(), dashboard);
///     rocket.launch().await.expect("Failed to launch");
/// }
/// ```
pub fn build_rocket(figment: Figment, dashboard: Arc<Dashboard>) -> Rocket<Build> {
    debug!("Building Rocket instance");
    rocket::custom(figment)
        .attach(CORS)
        .mount("/", routes![options, health])
        .mount("/", get_api_routes())
        .manage(dashboard)
}
