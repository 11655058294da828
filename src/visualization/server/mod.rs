// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-air-quality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Web server for the air quality API
//!
//! - **API Endpoints**: fresh readings, dashboard snapshot, AQI, trends and
//!   the parameter table (see [`crate::visualization::api`])
//! - **CORS Support**: permissive headers plus an OPTIONS catch-all for
//!   preflight requests
//!
//! The server address, port and ident come from the Rocket `figment`.

pub mod builder;
pub mod cors;
pub mod handlers;

pub use builder::build_rocket;
