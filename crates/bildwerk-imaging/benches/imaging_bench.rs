// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the bildwerk-imaging crate. Covers the two
// operations with the most per-pixel work: adaptive thresholding (both
// neighbourhood methods) and Canny edge detection.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, Rgb, RgbImage};

use bildwerk_core::types::{AdaptiveMethod, AdaptiveThresholdParams, CannyParams};
use bildwerk_imaging::ImageProcessor;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// 256x256 colour image: a light page with dark horizontal "text" bars and a
/// left-to-right illumination gradient, so thresholding has real work to do.
fn synthetic_page() -> DynamicImage {
    let img = RgbImage::from_fn(256, 256, |x, y| {
        let shade = 140 + (x / 3) as u8;
        if y % 16 < 4 && x % 32 < 24 {
            Rgb([shade / 4, shade / 4, shade / 4])
        } else {
            Rgb([shade, shade, shade.saturating_sub(10)])
        }
    });
    DynamicImage::ImageRgb8(img)
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_adaptive_threshold(c: &mut Criterion) {
    let page = synthetic_page();

    for method in [AdaptiveMethod::Gaussian, AdaptiveMethod::Mean] {
        let params = AdaptiveThresholdParams {
            block_size: 11,
            c: 2,
            method,
        };
        c.bench_function(&format!("adaptive_threshold {method:?} (256x256)"), |b| {
            b.iter(|| {
                let processor = ImageProcessor::from_dynamic(black_box(page.clone()));
                black_box(processor.adaptive_threshold(params).into_dynamic());
            });
        });
    }
}

fn bench_canny(c: &mut Criterion) {
    let page = synthetic_page();
    let params = CannyParams {
        low: 50.0,
        high: 150.0,
    };

    c.bench_function("canny_edges (256x256)", |b| {
        b.iter(|| {
            let processor = ImageProcessor::from_dynamic(black_box(page.clone()));
            black_box(processor.canny_edges(params).into_dynamic());
        });
    });
}

criterion_group!(benches, bench_adaptive_threshold, bench_canny);
criterion_main!(benches);
