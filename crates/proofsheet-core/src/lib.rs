// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Proofsheet — Core types and error definitions shared across all crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod raster;
pub mod types;
pub mod wire;

pub use config::AppConfig;
pub use error::{ProofsheetError, Result};
pub use raster::{Ownership, RasterHandle, RasterId};
pub use types::*;
