// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Server configuration: defaults, then `proofsheet-server.toml`, then
// `PROOFSHEET_SERVER_*` environment variables.

use std::collections::HashMap;
use std::path::Path;

use ::config::{Config, ConfigError, Environment, File};
use proofsheet_document::ConversionOptions;
use proofsheet_document::convert::{DEFAULT_FALLBACK_PROGRAM, DEFAULT_MAX_PIXELS};
use proofsheet_core::Background;
use serde::{Deserialize, Serialize};

/// 200 MB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Request bodies above this are rejected with 413.
    pub max_upload_bytes: usize,
    /// Converted images are downscaled to at most this many pixels.
    pub max_pixels: u64,
    /// External converter used when the built-in decoder fails.
    pub fallback_program: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8787,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_pixels: DEFAULT_MAX_PIXELS,
            fallback_program: DEFAULT_FALLBACK_PROGRAM.into(),
        }
    }
}

impl ServerConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("proofsheet-server"), None)
    }

    /// `env: None` reads the process environment.
    pub fn load_from(
        file: &Path,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(&file.to_string_lossy()).required(false))
            .add_source(
                Environment::with_prefix("PROOFSHEET_SERVER")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?
            .try_deserialize()
    }

    pub fn conversion_options(&self, background: Background) -> ConversionOptions {
        ConversionOptions {
            background,
            max_pixels: self.max_pixels,
            fallback_program: self.fallback_program.clone(),
        }
    }
}
