// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Adaptive thresholding — binarizes a grayscale image against the mean of each
// pixel's neighbourhood, either Gaussian-weighted or a plain box mean.

use bildwerk_core::types::{AdaptiveMethod, AdaptiveThresholdParams};
use image::{GrayImage, Luma};
use imageproc::filter::{box_filter, separable_filter_equal};
use tracing::debug;

/// Binarize `gray` against its local mean.
///
/// For each pixel, the local mean is taken over a `block_size x block_size`
/// neighbourhood. A pixel becomes white (255) when it is brighter than
/// `mean - c`, and black (0) otherwise. Both methods replicate edge pixels
/// where the neighbourhood leaves the image.
pub fn adaptive_threshold(gray: &GrayImage, params: &AdaptiveThresholdParams) -> GrayImage {
    let means = local_means(gray, params);

    let mut output = GrayImage::new(gray.width(), gray.height());
    for (x, y, pixel) in gray.enumerate_pixels() {
        let mean = means.get_pixel(x, y).0[0] as i32;
        let value = if pixel.0[0] as i32 - mean > -params.c {
            255u8
        } else {
            0u8
        };
        output.put_pixel(x, y, Luma([value]));
    }

    debug!(
        block_size = params.block_size,
        c = params.c,
        "Adaptive threshold complete"
    );
    output
}

/// Per-pixel neighbourhood mean.
fn local_means(gray: &GrayImage, params: &AdaptiveThresholdParams) -> GrayImage {
    match params.method {
        AdaptiveMethod::Gaussian => {
            separable_filter_equal(gray, &gaussian_kernel(params.block_size))
        }
        AdaptiveMethod::Mean => {
            let radius = params.block_size / 2;
            box_filter(gray, radius, radius)
        }
    }
}

/// Normalized 1-D Gaussian kernel of `size` taps. Sigma follows the
/// OpenCV rule for an unspecified sigma: `0.3 * ((size - 1) * 0.5 - 1) + 0.8`.
fn gaussian_kernel(size: u32) -> Vec<f32> {
    let sigma = 0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let half = (size / 2) as i64;
    let mut kernel: Vec<f32> = (-half..=half)
        .map(|i| {
            let d = i as f32;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    for weight in &mut kernel {
        *weight /= sum;
    }
    kernel
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(block_size: u32, c: i32, method: AdaptiveMethod) -> AdaptiveThresholdParams {
        AdaptiveThresholdParams {
            block_size,
            c,
            method,
        }
    }

    #[test]
    fn gaussian_kernel_is_normalized_and_symmetric() {
        for size in [3, 5, 11, 31] {
            let kernel = gaussian_kernel(size);
            assert_eq!(kernel.len(), size as usize);
            let sum: f32 = kernel.iter().sum();
            assert!((sum - 1.0).abs() < 1e-5);
            for i in 0..kernel.len() / 2 {
                assert!((kernel[i] - kernel[kernel.len() - 1 - i]).abs() < 1e-6);
            }
            assert!(kernel[kernel.len() / 2] >= kernel[0]);
        }
    }

    #[test]
    fn wide_gaussian_kernel_stays_finite() {
        // Squared offsets past i32 range must not overflow.
        let kernel = gaussian_kernel(100_001);
        assert_eq!(kernel.len(), 100_001);
        assert!(kernel.iter().all(|w| w.is_finite() && *w >= 0.0));
        let sum: f32 = kernel.iter().sum();
        assert!((sum - 1.0).abs() < 1e-3);
    }

    #[test]
    fn block_larger_than_image_is_handled() {
        let gray = GrayImage::from_fn(4, 4, |x, _| Luma([if x < 2 { 10 } else { 240 }]));
        for method in [AdaptiveMethod::Gaussian, AdaptiveMethod::Mean] {
            let out = adaptive_threshold(&gray, &params(255, 2, method));
            assert_eq!(out.dimensions(), (4, 4));
            assert!(out.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
        }
    }

    #[test]
    fn uniform_image_is_all_white_with_positive_c() {
        let gray = GrayImage::from_pixel(20, 20, Luma([90]));
        for method in [AdaptiveMethod::Gaussian, AdaptiveMethod::Mean] {
            let out = adaptive_threshold(&gray, &params(11, 2, method));
            assert!(out.pixels().all(|p| p.0[0] == 255), "{method:?}");
        }
    }

    #[test]
    fn uniform_image_is_all_black_with_negative_c() {
        // src - mean is at most 1 (kernel rounding), never greater than 2.
        let gray = GrayImage::from_pixel(20, 20, Luma([90]));
        for method in [AdaptiveMethod::Gaussian, AdaptiveMethod::Mean] {
            let out = adaptive_threshold(&gray, &params(5, -2, method));
            assert!(out.pixels().all(|p| p.0[0] == 0), "{method:?}");
        }
    }

    #[test]
    fn dark_text_on_light_background_goes_black() {
        let mut gray = GrayImage::from_pixel(30, 30, Luma([230]));
        for y in 12..18 {
            for x in 5..25 {
                gray.put_pixel(x, y, Luma([20]));
            }
        }
        for method in [AdaptiveMethod::Gaussian, AdaptiveMethod::Mean] {
            let out = adaptive_threshold(&gray, &params(11, 2, method));
            assert_eq!(out.get_pixel(15, 15).0[0], 0, "{method:?}");
            assert_eq!(out.get_pixel(15, 2).0[0], 255, "{method:?}");
        }
    }

    #[test]
    fn mean_method_replicates_border_pixels() {
        // Column 0 is 100, the rest 130. With a 3-wide block and replicated
        // borders the mean at x = 0 is (100 + 100 + 130) / 3 = 110, so
        // 100 - 110 = -10 > -12 and the pixel stays white. Averaging only the
        // in-bounds pixels would give 115 and a black pixel.
        let gray = GrayImage::from_fn(8, 8, |x, _| Luma([if x == 0 { 100 } else { 130 }]));
        let out = adaptive_threshold(&gray, &params(3, 12, AdaptiveMethod::Mean));
        for y in 0..8 {
            assert_eq!(out.get_pixel(0, y).0[0], 255, "row {y}");
        }
    }
}
