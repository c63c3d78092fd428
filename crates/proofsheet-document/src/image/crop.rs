// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Crop step — cut the region chosen in the crop dialog out of the converted
// source and encode it at the caller's resolution and quality.

use proofsheet_core::error::ProofsheetError;
use tracing::{info, instrument};

use super::processor::{ImageProcessor, RasterEncoding};

/// Pixel rectangle in source-image coordinates, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The whole image.
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }
}

/// Crop `source` to `region`, downscale to fit `max_dimension`, and encode.
///
/// Transparency-capable sources come back as PNG; others as JPEG at `quality`.
#[instrument(skip(source), fields(source_len = source.len(), ?region, max_dimension, quality))]
pub fn crop_to_raster(
    source: &[u8],
    region: CropRegion,
    max_dimension: u32,
    quality: u8,
) -> Result<Vec<u8>, ProofsheetError> {
    let encoding = RasterEncoding::for_source(source, quality);
    let cropped = ImageProcessor::from_bytes(source)?
        .crop(region.x, region.y, region.width, region.height)
        .resize_to_fit(max_dimension);

    info!(
        width = cropped.width(),
        height = cropped.height(),
        mime = encoding.mime_type(),
        "Crop applied"
    );

    cropped.encode(encoding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage};

    fn jpeg(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([120, 120, 120]));
        ImageProcessor::from_dynamic(DynamicImage::ImageRgb8(img))
            .to_jpeg_bytes(95)
            .unwrap()
    }

    #[test]
    fn crop_then_bound_resolution() {
        let out = crop_to_raster(&jpeg(400, 300), CropRegion::new(0, 0, 400, 100), 200, 80)
            .unwrap();
        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (200, 50));
        assert_eq!(image::guess_format(&out).unwrap(), image::ImageFormat::Jpeg);
    }

    #[test]
    fn full_region_keeps_small_images_intact() {
        let out = crop_to_raster(&jpeg(64, 48), CropRegion::full(64, 48), 3000, 90).unwrap();
        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 48));
    }

    #[test]
    fn garbage_source_fails_to_decode() {
        assert!(matches!(
            crop_to_raster(b"nope", CropRegion::full(1, 1), 100, 90),
            Err(ProofsheetError::Decode(_))
        ));
    }
}
