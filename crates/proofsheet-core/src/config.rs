// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.
//
// Layered: built-in defaults, then an optional `proofsheet.toml`, then the
// environment (`PROOFSHEET_CONVERSION_BASE_URL`).

use std::collections::HashMap;
use std::path::Path;

use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::PaperSize;

/// Client-side settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the upload/convert endpoint, without a trailing slash.
    pub conversion_base_url: String,
    /// Physical page geometry for generated documents.
    pub page: PageSetup,
    /// Output of the crop step.
    pub crop: CropSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            conversion_base_url: "http://127.0.0.1:8787".into(),
            page: PageSetup::default(),
            crop: CropSettings::default(),
        }
    }
}

/// Page geometry used by the assembler.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSetup {
    pub paper: PaperSize,
    /// Margin on every side of the page.
    pub margin_mm: f32,
    /// Gap between the last header line and the image area.
    pub header_gap_mm: f32,
}

impl Default for PageSetup {
    fn default() -> Self {
        Self {
            paper: PaperSize::Letter,
            margin_mm: 10.0,
            header_gap_mm: 4.0,
        }
    }
}

/// Resolution and quality of cropped rasters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropSettings {
    /// Longest edge of the cropped raster, in pixels.
    pub max_dimension: u32,
    /// JPEG quality (1-100) for opaque sources.
    pub quality: u8,
}

impl Default for CropSettings {
    fn default() -> Self {
        Self {
            max_dimension: 3000,
            quality: 90,
        }
    }
}

impl AppConfig {
    /// Load from `proofsheet.toml` in the working directory (if present) and
    /// the process environment.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("proofsheet"), None)
    }

    /// Load from a config file stem and an explicit environment map.
    /// `env: None` reads the process environment.
    pub fn load_from(file: &Path, env: Option<HashMap<String, String>>) -> Result<Self> {
        let config: AppConfig = Config::builder()
            .add_source(File::with_name(&file.to_string_lossy()).required(false))
            .add_source(
                Environment::with_prefix("PROOFSHEET")
                    .separator("__")
                    .source(env),
            )
            .build()?
            .try_deserialize()?;

        Ok(config.normalised())
    }

    fn normalised(mut self) -> Self {
        let trimmed = self.conversion_base_url.trim().trim_end_matches('/');
        self.conversion_base_url = trimmed.to_string();
        self
    }
}
