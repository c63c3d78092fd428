// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Containment and inset layout — where an image lands inside a page's content
// rectangle.
//
// All coordinates are millimetres with a top-left origin.

use proofsheet_core::{Offset, PANORAMA_THRESHOLD, Scale};
use tracing::debug;

/// Inset per side for panoramas.
pub const PANORAMA_INSET: f32 = 0.04;
/// Inset per side for everything else.
pub const STANDARD_INSET: f32 = 0.10;

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Whether `other` lies within `self`, allowing `tolerance` of overflow.
    pub fn contains(&self, other: &Rect, tolerance: f32) -> bool {
        other.x >= self.x - tolerance
            && other.y >= self.y - tolerance
            && other.right() <= self.right() + tolerance
            && other.bottom() <= self.bottom() + tolerance
    }
}

/// Inset fraction per side for an image of the given aspect ratio.
pub fn inset_fraction(aspect_ratio: f32) -> f32 {
    if aspect_ratio >= PANORAMA_THRESHOLD {
        PANORAMA_INSET
    } else {
        STANDARD_INSET
    }
}

/// The content rectangle shrunk symmetrically by the inset for `aspect_ratio`.
pub fn inset_box(content: Rect, aspect_ratio: f32) -> Rect {
    let inset = inset_fraction(aspect_ratio);
    Rect {
        x: content.x + content.width * inset,
        y: content.y + content.height * inset,
        width: content.width * (1.0 - 2.0 * inset),
        height: content.height * (1.0 - 2.0 * inset),
    }
}

/// Size of the largest `aspect_ratio` rectangle that fits in `width x height`.
pub fn contain_fit(width: f32, height: f32, aspect_ratio: f32) -> (f32, f32) {
    let mut draw_w = width;
    let mut draw_h = draw_w / aspect_ratio;
    if draw_h > height {
        draw_h = height;
        draw_w = draw_h * aspect_ratio;
    }
    (draw_w, draw_h)
}

/// Place an image of `aspect_ratio` inside `content`.
///
/// The image is contain-fitted into the inset box, shrunk by `scale` about
/// its centre, then displaced from centre by `offset` percent of half the
/// remaining slack in each axis. The result never leaves the inset box.
pub fn place(
    content: Rect,
    aspect_ratio: f32,
    scale: Scale,
    offset_x: Offset,
    offset_y: Offset,
) -> Rect {
    let ratio = if aspect_ratio.is_finite() && aspect_ratio > 0.0 {
        aspect_ratio
    } else {
        1.0
    };

    let bx = inset_box(content, ratio);
    let (fit_w, fit_h) = contain_fit(bx.width.max(0.0), bx.height.max(0.0), ratio);

    let draw_w = fit_w * scale.factor();
    let draw_h = fit_h * scale.factor();

    let slack_x = (bx.width - draw_w).max(0.0);
    let slack_y = (bx.height - draw_h).max(0.0);

    let dx = offset_x.factor() * (slack_x / 2.0);
    let dy = offset_y.factor() * (slack_y / 2.0);

    let placed = Rect {
        x: bx.x + slack_x / 2.0 + dx,
        y: bx.y + slack_y / 2.0 + dy,
        width: draw_w,
        height: draw_h,
    };

    debug!(
        ratio,
        inset = inset_fraction(ratio),
        slack_x,
        slack_y,
        x = placed.x,
        y = placed.y,
        w = placed.width,
        h = placed.height,
        "Image placed"
    );

    placed
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-3;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < EPS
    }

    #[test]
    fn placement_stays_inside_content_and_keeps_ratio() {
        let content = Rect::new(10.0, 42.0, 196.0, 227.0);
        let ratios = [0.2, 0.5, 0.667, 1.0, 1.5, 2.59, 2.6, 3.0, 8.0];
        let scales = [50, 67, 100];
        let offsets = [-100, -40, 0, 55, 100];

        for ratio in ratios {
            for scale in scales {
                for ox in offsets {
                    for oy in offsets {
                        let placed = place(
                            content,
                            ratio,
                            Scale::new(scale),
                            Offset::new(ox),
                            Offset::new(oy),
                        );
                        assert!(
                            content.contains(&placed, EPS),
                            "ratio {ratio} scale {scale} offset ({ox},{oy}) overflowed: {placed:?}"
                        );
                        let placed_ratio = placed.width / placed.height;
                        assert!(
                            (placed_ratio - ratio).abs() / ratio < 1e-4,
                            "ratio drifted to {placed_ratio} from {ratio}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn layout_is_deterministic() {
        let content = Rect::new(0.0, 30.0, 259.0, 176.0);
        let a = place(content, 1.3, Scale::new(80), Offset::new(25), Offset::new(-60));
        let b = place(content, 1.3, Scale::new(80), Offset::new(25), Offset::new(-60));
        assert_eq!(a, b);
    }

    #[test]
    fn panoramas_get_the_narrow_inset() {
        assert_eq!(inset_fraction(3.0), PANORAMA_INSET);
        assert_eq!(inset_fraction(2.6), PANORAMA_INSET);
        assert_eq!(inset_fraction(0.667), STANDARD_INSET);
    }

    #[test]
    fn panorama_is_centred_horizontally_with_no_offset() {
        let content = Rect::new(10.0, 30.0, 259.0, 176.0);
        let placed = place(content, 3.0, Scale::new(100), Offset::new(0), Offset::new(0));
        let bx = inset_box(content, 3.0);
        assert!(approx(bx.x - content.x, content.width * 0.04));
        assert!(approx(placed.x - bx.x, bx.right() - placed.right()));
        assert!(approx(placed.width, bx.width));
    }

    #[test]
    fn half_scale_full_right_offset_shifts_by_half_slack() {
        // Box is 80x80 after the 10% inset; a 2:1 image fits at 80x40, then
        // halves to 40x20, leaving 40mm of horizontal slack.
        let content = Rect::new(0.0, 0.0, 100.0, 100.0);
        let centred = place(content, 2.0, Scale::new(50), Offset::new(0), Offset::new(0));
        let shifted = place(content, 2.0, Scale::new(50), Offset::new(100), Offset::new(0));

        assert!(approx(centred.width, 40.0));
        assert!(approx(centred.height, 20.0));
        assert!(approx(shifted.x - centred.x, 20.0));
        assert!(approx(shifted.y, centred.y));
        assert!(approx(shifted.right(), 90.0));
    }

    #[test]
    fn full_left_offset_touches_box_edge() {
        let content = Rect::new(0.0, 0.0, 100.0, 100.0);
        let placed = place(content, 0.5, Scale::new(60), Offset::new(-100), Offset::new(-100));
        let bx = inset_box(content, 0.5);
        assert!(approx(placed.x, bx.x));
        assert!(approx(placed.y, bx.y));
    }

    #[test]
    fn contain_fit_switches_to_height_limited() {
        let (w, h) = contain_fit(100.0, 50.0, 1.0);
        assert!(approx(w, 50.0) && approx(h, 50.0));
        let (w, h) = contain_fit(100.0, 50.0, 4.0);
        assert!(approx(w, 100.0) && approx(h, 25.0));
    }

    #[test]
    fn degenerate_ratio_is_treated_as_square() {
        let content = Rect::new(0.0, 0.0, 100.0, 50.0);
        let placed = place(
            content,
            f32::NAN,
            Scale::default(),
            Offset::default(),
            Offset::default(),
        );
        assert!(approx(placed.width, placed.height));
        assert!(content.contains(&placed, EPS));
    }
}
