// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Orientation selector — decide whether an entry's page is portrait or
// landscape.

use proofsheet_core::error::ProofsheetError;
use proofsheet_core::{Entry, OrientationPreference, PANORAMA_THRESHOLD, PageOrientation};

use crate::image::probe_dimensions;

/// Resolve a page orientation from the user's preference and, for `Auto`,
/// the image's aspect ratio (width / height).
///
/// An explicit preference always wins. `Auto` without an image is portrait;
/// otherwise only panoramas (ratio >= 2.6) get a landscape page.
pub fn select(preference: OrientationPreference, aspect_ratio: Option<f32>) -> PageOrientation {
    match preference {
        OrientationPreference::Portrait => PageOrientation::Portrait,
        OrientationPreference::Landscape => PageOrientation::Landscape,
        OrientationPreference::Auto => match aspect_ratio {
            Some(ratio) if ratio >= PANORAMA_THRESHOLD => PageOrientation::Landscape,
            _ => PageOrientation::Portrait,
        },
    }
}

/// Resolve an entry's page orientation, probing its image header when the
/// preference is `Auto`.
pub fn resolve_entry(entry: &Entry) -> Result<PageOrientation, ProofsheetError> {
    if entry.orientation != OrientationPreference::Auto {
        return Ok(select(entry.orientation, None));
    }

    let ratio = match &entry.image {
        Some(image) => {
            let (w, h) = probe_dimensions(image.bytes())?;
            Some(if h == 0 { 1.0 } else { w as f32 / h as f32 })
        }
        None => None,
    };

    Ok(select(OrientationPreference::Auto, ratio))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageProcessor;
    use image::{DynamicImage, Rgb, RgbImage};
    use proofsheet_core::RasterHandle;

    #[test]
    fn auto_is_landscape_only_for_panoramas() {
        let mut ratio = 0.1_f32;
        while ratio < 6.0 {
            let expected = if ratio >= 2.6 {
                PageOrientation::Landscape
            } else {
                PageOrientation::Portrait
            };
            assert_eq!(select(OrientationPreference::Auto, Some(ratio)), expected, "ratio {ratio}");
            ratio += 0.05;
        }
        assert_eq!(
            select(OrientationPreference::Auto, Some(PANORAMA_THRESHOLD)),
            PageOrientation::Landscape
        );
    }

    #[test]
    fn explicit_preference_short_circuits_ratio() {
        for ratio in [None, Some(0.2), Some(1.0), Some(9.0)] {
            assert_eq!(
                select(OrientationPreference::Portrait, ratio),
                PageOrientation::Portrait
            );
            assert_eq!(
                select(OrientationPreference::Landscape, ratio),
                PageOrientation::Landscape
            );
        }
    }

    #[test]
    fn auto_without_image_is_portrait() {
        assert_eq!(select(OrientationPreference::Auto, None), PageOrientation::Portrait);
        assert_eq!(resolve_entry(&Entry::new()).unwrap(), PageOrientation::Portrait);
    }

    #[test]
    fn resolve_entry_reads_image_ratio() {
        let img = RgbImage::from_pixel(300, 100, Rgb([0, 0, 0]));
        let bytes = ImageProcessor::from_dynamic(DynamicImage::ImageRgb8(img))
            .to_png_bytes()
            .unwrap();
        let entry = Entry {
            image: Some(RasterHandle::external(bytes)),
            ..Entry::new()
        };
        assert_eq!(resolve_entry(&entry).unwrap(), PageOrientation::Landscape);
    }

    #[test]
    fn resolve_entry_reports_unreadable_image() {
        let entry = Entry {
            image: Some(RasterHandle::external(b"garbage".to_vec())),
            ..Entry::new()
        };
        assert!(matches!(resolve_entry(&entry), Err(ProofsheetError::Decode(_))));
    }
}
