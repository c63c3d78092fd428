// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster normalization for uploaded still images.
//
// Conversion chain: the `image` crate first (primary), then an external
// command-line tool (ImageMagick by default) as the fallback. Either path
// produces an sRGB PNG, flattened onto white unless transparency was asked
// for, with the pixel count bounded to keep memory in check.

use std::io::Write;
use std::process::Command;

use proofsheet_core::error::{ProofsheetError, Result};
use proofsheet_core::{Background, ConversionPath};
use tracing::{debug, info, instrument, warn};

use crate::image::ImageProcessor;

/// Largest pixel count kept without downscaling (about 40 megapixels).
pub const DEFAULT_MAX_PIXELS: u64 = 40_000_000;
/// Fallback converter program.
pub const DEFAULT_FALLBACK_PROGRAM: &str = "magick";

/// Options for one conversion.
#[derive(Debug, Clone)]
pub struct ConversionOptions {
    pub background: Background,
    pub max_pixels: u64,
    /// Program invoked for the fallback path.
    pub fallback_program: String,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            background: Background::White,
            max_pixels: DEFAULT_MAX_PIXELS,
            fallback_program: DEFAULT_FALLBACK_PROGRAM.to_string(),
        }
    }
}

/// A normalized PNG and the path that produced it.
#[derive(Debug, Clone)]
pub struct Converted {
    pub png: Vec<u8>,
    pub via: ConversionPath,
}

/// Normalizes arbitrary still images into PNG.
pub struct RasterConverter {
    options: ConversionOptions,
}

impl RasterConverter {
    pub fn new(options: ConversionOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// Convert `input`, trying the primary path and then the fallback.
    ///
    /// Fails with `ConversionFallbackExhausted` only when both paths fail.
    #[instrument(
        skip(self, input),
        fields(input_len = input.len(), bg = self.options.background.query_value())
    )]
    pub fn convert(&self, input: &[u8]) -> Result<Converted> {
        let primary_err = match convert_primary(input, &self.options) {
            Ok(png) => {
                info!(bytes = png.len(), "Converted via primary path");
                return Ok(Converted {
                    png,
                    via: ConversionPath::Primary,
                });
            }
            Err(err) => err,
        };

        warn!(error = %primary_err, "Primary conversion failed; trying fallback");

        match convert_fallback(input, &self.options) {
            Ok(png) => {
                info!(bytes = png.len(), "Converted via fallback path");
                Ok(Converted {
                    png,
                    via: ConversionPath::Fallback,
                })
            }
            Err(fallback_err) => {
                warn!(error = %fallback_err, "Fallback conversion failed");
                Err(ProofsheetError::ConversionFallbackExhausted {
                    primary: primary_err.to_string(),
                    fallback: fallback_err.to_string(),
                })
            }
        }
    }
}

/// Decode with the `image` crate (first frame only), bound the pixel count,
/// apply the background, and encode PNG.
fn convert_primary(input: &[u8], options: &ConversionOptions) -> Result<Vec<u8>> {
    let processor = ImageProcessor::from_bytes(input)?.bound_pixels(options.max_pixels);
    let processor = match options.background {
        Background::Transparent => processor,
        Background::White => processor.flatten_onto_white(),
    };
    processor.to_png_bytes()
}

/// Hand the input to the external converter and read a PNG from its stdout.
fn convert_fallback(input: &[u8], options: &ConversionOptions) -> Result<Vec<u8>> {
    let mut source = tempfile::NamedTempFile::new()?;
    source.write_all(input)?;
    source.flush()?;

    // `[0]` selects the first frame of multi-frame inputs.
    let source_arg = format!("{}[0]", source.path().display());
    let mut command = Command::new(&options.fallback_program);
    command
        .arg(&source_arg)
        .args(["-auto-orient", "-colorspace", "sRGB"]);
    if options.background == Background::White {
        command.args(["-background", "white", "-alpha", "remove", "-alpha", "off"]);
    }
    command
        .arg("-resize")
        .arg(format!("{}@>", options.max_pixels))
        .arg("png:-");

    debug!(program = %options.fallback_program, "Running fallback converter");

    let output = command.output().map_err(|err| {
        ProofsheetError::ImageError(format!(
            "failed to run {}: {err}",
            options.fallback_program
        ))
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ProofsheetError::ImageError(format!(
            "{} exited with {}: {}",
            options.fallback_program,
            output.status,
            stderr.trim()
        )));
    }
    if output.stdout.is_empty() {
        return Err(ProofsheetError::ImageError(format!(
            "{} produced no output",
            options.fallback_program
        )));
    }

    Ok(output.stdout)
}
