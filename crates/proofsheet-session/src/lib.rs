// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// proofsheet-session — the single controller that owns a proof job's
// entries, the crop in progress, temporary rasters, and the export flag.

pub mod crop;
pub mod entries;
pub mod export;
pub mod session;
pub mod store;
pub mod upload;

pub use crop::CropState;
pub use entries::{EntryList, EntryUpdate};
pub use export::{ExportFlag, ExportGuard};
pub use session::Session;
pub use store::RasterStore;
pub use upload::{ConversionClient, HttpConversionClient};
