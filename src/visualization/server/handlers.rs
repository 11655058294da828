// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-air-quality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use rocket::{get, options};
use std::path::PathBuf;

/// Answer CORS preflight requests for every path.
#[options("/<_path..>")]
pub async fn options(_path: PathBuf) -> Result<(), std::io::Error> {
    Ok(())
}

/// Liveness probe.
#[get("/health")]
pub async fn health() -> &'static str {
    "OK"
}
