// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// proofsheet-server — HTTP front for raster conversion.

pub mod api;
pub mod config;
pub mod error;

pub use api::router;
pub use config::ServerConfig;
pub use error::ApiError;
