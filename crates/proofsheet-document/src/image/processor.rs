// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — decode, crop, bound, rotate, flatten, and re-encode
// in-memory rasters using the `image` crate.

use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageFormat, ImageReader, Rgb, RgbImage};
use proofsheet_core::Rotation;
use proofsheet_core::error::ProofsheetError;
use tracing::{debug, instrument};

/// Lossy quality used whenever an opaque raster is re-encoded.
pub const JPEG_QUALITY: u8 = 90;

/// Output encoding of a processed raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterEncoding {
    /// Lossless, keeps alpha.
    Png,
    /// Lossy, opaque.
    Jpeg { quality: u8 },
}

impl RasterEncoding {
    /// Pick the encoding for rasters derived from `source`.
    ///
    /// Transparency-capable sources (PNG, WebP, GIF) stay PNG; everything
    /// else becomes JPEG at `quality`.
    pub fn for_source(source: &[u8], quality: u8) -> Self {
        match image::guess_format(source) {
            Ok(ImageFormat::Png | ImageFormat::WebP | ImageFormat::Gif) => Self::Png,
            _ => Self::Jpeg { quality },
        }
    }

    pub fn has_alpha(&self) -> bool {
        matches!(self, Self::Png)
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg { .. } => "image/jpeg",
        }
    }
}

/// Read only the image header and return the displayed `(width, height)`,
/// with EXIF orientation taken into account.
pub fn probe_dimensions(data: &[u8]) -> Result<(u32, u32), ProofsheetError> {
    let mut decoder = open_decoder(data)?;
    let (width, height) = decoder.dimensions();
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    Ok(if swaps_axes(orientation) {
        (height, width)
    } else {
        (width, height)
    })
}

fn open_decoder(data: &[u8]) -> Result<impl ImageDecoder + '_, ProofsheetError> {
    ImageReader::new(std::io::Cursor::new(data))
        .with_guessed_format()
        .map_err(|err| ProofsheetError::Decode(format!("failed to read image header: {err}")))?
        .into_decoder()
        .map_err(|err| ProofsheetError::Decode(format!("failed to decode image: {err}")))
}

fn swaps_axes(orientation: Orientation) -> bool {
    matches!(
        orientation,
        Orientation::Rotate90
            | Orientation::Rotate270
            | Orientation::Rotate90FlipH
            | Orientation::Rotate270FlipH
    )
}

/// Image processing pipeline operating on a single in-memory image.
///
/// Each transformation consumes `self` and returns a new `ImageProcessor`,
/// enabling method chaining.
///
/// ```ignore
/// let jpeg = ImageProcessor::from_bytes(&bytes)?
///     .crop(10, 10, 400, 300)
///     .resize_to_fit(1200)
///     .rotate(Rotation::Deg90)
///     .to_jpeg_bytes(90)?;
/// ```
pub struct ImageProcessor {
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Decode raw encoded bytes (JPEG, PNG, ...) and apply any EXIF
    /// orientation so the pixels are upright.
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, ProofsheetError> {
        let mut decoder = open_decoder(data)?;
        let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
        let mut img = DynamicImage::from_decoder(decoder)
            .map_err(|err| ProofsheetError::Decode(format!("failed to decode image: {err}")))?;
        img.apply_orientation(orientation);
        debug!(
            width = img.width(),
            height = img.height(),
            ?orientation,
            "Image decoded from bytes"
        );
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Width divided by height. Degenerate images report 1.0.
    pub fn aspect_ratio(&self) -> f32 {
        if self.image.height() == 0 {
            return 1.0;
        }
        self.image.width() as f32 / self.image.height() as f32
    }

    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Transformations ------------------------------------------------------

    /// Downscale so the longest edge is at most `max_dimension`, preserving
    /// aspect ratio. Never upscales.
    pub fn resize_to_fit(self, max_dimension: u32) -> Self {
        let max_dimension = max_dimension.max(1);
        if self.image.width() <= max_dimension && self.image.height() <= max_dimension {
            return self;
        }
        let resized = self
            .image
            .resize(max_dimension, max_dimension, FilterType::Lanczos3);
        debug!(
            new_w = resized.width(),
            new_h = resized.height(),
            "Resize complete"
        );
        Self { image: resized }
    }

    /// Downscale so that `width * height <= max_pixels`, preserving aspect
    /// ratio. Never upscales.
    #[instrument(skip(self), fields(max_pixels))]
    pub fn bound_pixels(self, max_pixels: u64) -> Self {
        let (w, h) = (self.image.width() as u64, self.image.height() as u64);
        if w * h <= max_pixels || max_pixels == 0 {
            return self;
        }
        let factor = (max_pixels as f64 / (w * h) as f64).sqrt();
        let new_w = ((w as f64 * factor).floor() as u32).max(1);
        let new_h = ((h as f64 * factor).floor() as u32).max(1);
        debug!(from_w = w, from_h = h, new_w, new_h, "Bounding pixel count");
        Self {
            image: self.image.resize_exact(new_w, new_h, FilterType::Lanczos3),
        }
    }

    /// Rotate clockwise about the centre by a quarter-turn multiple.
    /// 90 and 270 swap the output dimensions.
    pub fn rotate(self, rotation: Rotation) -> Self {
        let image = match rotation {
            Rotation::Deg0 => self.image,
            Rotation::Deg90 => self.image.rotate90(),
            Rotation::Deg180 => self.image.rotate180(),
            Rotation::Deg270 => self.image.rotate270(),
        };
        Self { image }
    }

    /// Crop a rectangular region. Values are clamped to image bounds and the
    /// result is at least 1x1.
    #[instrument(skip(self), fields(x, y, width, height))]
    pub fn crop(self, x: u32, y: u32, width: u32, height: u32) -> Self {
        let img_w = self.image.width();
        let img_h = self.image.height();

        let safe_x = x.min(img_w.saturating_sub(1));
        let safe_y = y.min(img_h.saturating_sub(1));
        let safe_w = width.min(img_w - safe_x).max(1);
        let safe_h = height.min(img_h - safe_y).max(1);

        debug!(safe_x, safe_y, safe_w, safe_h, "Cropping image");

        Self {
            image: self.image.crop_imm(safe_x, safe_y, safe_w, safe_h),
        }
    }

    /// Composite onto an opaque white background, dropping alpha.
    pub fn flatten_onto_white(self) -> Self {
        if !self.image.color().has_alpha() {
            return Self {
                image: DynamicImage::ImageRgb8(self.image.to_rgb8()),
            };
        }

        let rgba = self.image.to_rgba8();
        let flattened = RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
            let image::Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
            let alpha = a as u32;
            let blend = |channel: u8| -> u8 {
                ((channel as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8
            };
            Rgb([blend(r), blend(g), blend(b)])
        });
        Self {
            image: DynamicImage::ImageRgb8(flattened),
        }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current image as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, ProofsheetError> {
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);
        self.image
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|err| ProofsheetError::ImageError(format!("PNG encoding failed: {err}")))?;
        Ok(buffer)
    }

    /// Encode the current image as JPEG bytes with the given quality (1-100).
    pub fn to_jpeg_bytes(&self, quality: u8) -> Result<Vec<u8>, ProofsheetError> {
        let mut buffer = Vec::new();
        let rgb = self.image.to_rgb8();
        let encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
        rgb.write_with_encoder(encoder)
            .map_err(|err| ProofsheetError::ImageError(format!("JPEG encoding failed: {err}")))?;
        Ok(buffer)
    }

    pub fn encode(&self, encoding: RasterEncoding) -> Result<Vec<u8>, ProofsheetError> {
        match encoding {
            RasterEncoding::Png => self.to_png_bytes(),
            RasterEncoding::Jpeg { quality } => self.to_jpeg_bytes(quality),
        }
    }
}
