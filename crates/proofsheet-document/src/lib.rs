// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// proofsheet-document — the layout and rasterization pipeline.
//
// Orientation selection, page-aware pixel rotation, containment/inset layout,
// and page assembly into PDF, plus raster conversion for uploads and PDF
// inspection.

pub mod convert;
pub mod image;
pub mod layout;
pub mod orientation;
pub mod pdf;

pub use convert::{ConversionOptions, Converted, RasterConverter};
pub use image::processor::ImageProcessor;
pub use layout::Rect;
pub use pdf::assembler::{ExportedDocument, PageAssembler};
pub use pdf::reader::PdfReader;
