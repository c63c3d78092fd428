// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — inspect generated documents in memory (page count, page
// sizes) using the `lopdf` crate.

use lopdf::{Document, Object};
use proofsheet_core::PageOrientation;
use proofsheet_core::error::ProofsheetError;
use tracing::{debug, instrument};

/// Read-only view of an existing PDF.
pub struct PdfReader {
    document: Document,
}

impl PdfReader {
    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, ProofsheetError> {
        let document = Document::load_mem(data).map_err(|err| {
            ProofsheetError::PdfError(format!("failed to load PDF from memory: {}", err))
        })?;
        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");
        Ok(Self { document })
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// `(width, height)` of every page in points, in page order, read from
    /// each page's MediaBox.
    pub fn page_sizes_pt(&self) -> Result<Vec<(f32, f32)>, ProofsheetError> {
        self.document
            .get_pages()
            .into_iter()
            .map(|(number, object_id)| {
                let page = self
                    .document
                    .get_object(object_id)
                    .and_then(Object::as_dict)
                    .map_err(|err| {
                        ProofsheetError::PdfError(format!("page {number} is unreadable: {err}"))
                    })?;
                let media_box = page
                    .get(b"MediaBox")
                    .and_then(Object::as_array)
                    .map_err(|err| {
                        ProofsheetError::PdfError(format!("page {number} has no MediaBox: {err}"))
                    })?;
                let coords = media_box
                    .iter()
                    .map(Object::as_float)
                    .collect::<Result<Vec<f32>, _>>()
                    .map_err(|err| {
                        ProofsheetError::PdfError(format!("page {number} MediaBox: {err}"))
                    })?;
                match coords.as_slice() {
                    [x0, y0, x1, y1] => Ok(((x1 - x0).abs(), (y1 - y0).abs())),
                    _ => Err(ProofsheetError::PdfError(format!(
                        "page {number} MediaBox has {} entries",
                        coords.len()
                    ))),
                }
            })
            .collect()
    }

    /// Orientation of every page, in page order.
    pub fn page_orientations(&self) -> Result<Vec<PageOrientation>, ProofsheetError> {
        Ok(self
            .page_sizes_pt()?
            .into_iter()
            .map(|(w, h)| {
                if w > h {
                    PageOrientation::Landscape
                } else {
                    PageOrientation::Portrait
                }
            })
            .collect())
    }
}
