// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pixel rotator — re-rasterize an entry's image so its pixel shape matches the
// page it will be drawn on.

use proofsheet_core::error::ProofsheetError;
use proofsheet_core::{PageOrientation, Rotation};
use tracing::{debug, instrument};

use super::processor::{ImageProcessor, JPEG_QUALITY, RasterEncoding};

/// An encoded raster ready to be placed on a page.
#[derive(Debug, Clone)]
pub struct RotatedRaster {
    pub bytes: Vec<u8>,
    pub encoding: RasterEncoding,
    pub width: u32,
    pub height: u32,
    /// The rotation actually applied (user rotation plus correction).
    pub applied: Rotation,
}

impl RotatedRaster {
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            return 1.0;
        }
        self.width as f32 / self.height as f32
    }
}

/// Final rotation for a `(base_w, base_h)` image: the user's rotation plus a
/// quarter turn when the rotated pixel shape works against the page shape.
pub fn corrected_rotation(
    base_w: u32,
    base_h: u32,
    user: Rotation,
    page: PageOrientation,
) -> Rotation {
    let base_ratio = if base_h == 0 {
        1.0
    } else {
        base_w as f32 / base_h as f32
    };
    let effective = if user.swaps_axes() {
        1.0 / base_ratio
    } else {
        base_ratio
    };

    let needs_turn = match page {
        PageOrientation::Landscape => effective < 1.0,
        PageOrientation::Portrait => effective > 1.0,
    };

    if needs_turn {
        user.plus(Rotation::Deg90)
    } else {
        user
    }
}

/// Rotate `source` by the user's rotation plus any correction needed for
/// `page`, and re-encode it.
///
/// The output encoding is decided from the source bytes: transparency-capable
/// sources stay PNG, everything else becomes JPEG at quality 90.
#[instrument(skip(source), fields(source_len = source.len(), user = user.degrees(), %page))]
pub fn rotate_for_page(
    source: &[u8],
    user: Rotation,
    page: PageOrientation,
) -> Result<RotatedRaster, ProofsheetError> {
    let encoding = RasterEncoding::for_source(source, JPEG_QUALITY);
    let processor = ImageProcessor::from_bytes(source)?;
    let (base_w, base_h) = (processor.width(), processor.height());

    let applied = corrected_rotation(base_w, base_h, user, page);
    let rotated = processor.rotate(applied);
    let (width, height) = (rotated.width(), rotated.height());
    let bytes = rotated.encode(encoding)?;

    debug!(
        base_w,
        base_h,
        applied = applied.degrees(),
        width,
        height,
        ?encoding,
        "Raster rotated for page"
    );

    Ok(RotatedRaster {
        bytes,
        encoding,
        width,
        height,
        applied,
    })
}
