// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-air-quality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use serde::{Deserialize, Serialize};

use crate::aqi::OutOfRangePolicy;

/// AQI estimation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AqiConfig {
    /// Sub-index of a concentration outside every breakpoint (`zero` or `clamp`).
    #[serde(default)]
    pub out_of_range: OutOfRangePolicy,
}
