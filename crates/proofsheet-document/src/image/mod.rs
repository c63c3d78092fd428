// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — decode/encode processing, page-aware rotation, and cropping.

pub mod crop;
pub mod processor;
pub mod rotator;

pub use crop::{CropRegion, crop_to_raster};
pub use processor::{ImageProcessor, JPEG_QUALITY, RasterEncoding, probe_dimensions};
pub use rotator::{RotatedRaster, corrected_rotation, rotate_for_page};
