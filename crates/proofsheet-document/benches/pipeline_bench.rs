// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the layout and rotation pipeline.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, Rgb, RgbImage};

use proofsheet_core::{Offset, PageOrientation, Rotation, Scale};
use proofsheet_document::ImageProcessor;
use proofsheet_document::image::rotate_for_page;
use proofsheet_document::layout::{Rect, place};

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Placement is pure arithmetic; this guards against accidental allocation
/// or logging in the hot path.
fn bench_layout(c: &mut Criterion) {
    let content = Rect::new(10.0, 40.0, 259.0, 166.0);
    c.bench_function("layout place", |b| {
        b.iter(|| {
            black_box(place(
                black_box(content),
                black_box(3.0),
                Scale::new(80),
                Offset::new(40),
                Offset::new(-20),
            ))
        });
    });
}

/// Rotate a 600x200 JPEG onto a portrait page (decode, quarter turn,
/// re-encode at quality 90).
fn bench_rotate(c: &mut Criterion) {
    let img = RgbImage::from_fn(600, 200, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 90]));
    let jpeg = ImageProcessor::from_dynamic(DynamicImage::ImageRgb8(img))
        .to_jpeg_bytes(90)
        .expect("encode fixture");

    c.bench_function("rotate_for_page (600x200 jpeg)", |b| {
        b.iter(|| {
            let rotated = rotate_for_page(
                black_box(&jpeg),
                Rotation::Deg0,
                PageOrientation::Portrait,
            )
            .expect("rotate");
            black_box(rotated.bytes.len());
        });
    });
}

criterion_group!(benches, bench_layout, bench_rotate);
criterion_main!(benches);
