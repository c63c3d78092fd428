// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — assembling proof documents and inspecting the result.

pub mod assembler;
mod jpeg;
pub mod reader;

pub use assembler::{ExportedDocument, PageAssembler, document_filename};
pub use reader::PdfReader;
