// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — Gaussian blur, Sobel and Canny edge detection, luma
// histogram equalization, and adaptive thresholding. Operates on in-memory
// images using the `image` and `imageproc` crates.

use std::path::Path;

use bildwerk_core::error::{BildwerkError, Result};
use bildwerk_core::types::{AdaptiveThresholdParams, BlurParams, CannyParams};
use image::{DynamicImage, GrayImage, ImageReader, Luma, Rgb, RgbImage};
use imageproc::contrast::equalize_histogram;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::gradients::sobel_gradients;
use tracing::{debug, info, instrument};

use super::threshold;

/// Image processing pipeline operating on a single in-memory image.
///
/// Every image is normalized to 8-bit RGB on load, so operations always start
/// from three colour channels regardless of the source encoding. Each method
/// consumes `self` and returns a new `ImageProcessor` wrapping the transformed
/// image, enabling method chaining.
///
/// ```ignore
/// ImageProcessor::open("upload.jpg")?
///     .canny_edges(CannyParams { low: 50.0, high: 150.0 })
///     .save("processed/upload.jpg")?;
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Load an image from a file path.
    ///
    /// The format is sniffed from the file contents, so a mislabelled
    /// extension still decodes.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let load_error = |err: &dyn std::fmt::Display| {
            BildwerkError::ImageLoad(format!("{}: {}", path.display(), err))
        };

        let img = ImageReader::open(path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|err| load_error(&err))?
            .decode()
            .map_err(|err| load_error(&err))?;
        info!(
            width = img.width(),
            height = img.height(),
            color = ?img.color(),
            "Image loaded"
        );
        Ok(Self::from_dynamic(img))
    }

    /// Wrap an already-decoded `DynamicImage`, converting it to 8-bit RGB.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        let image = match image {
            rgb @ DynamicImage::ImageRgb8(_) => rgb,
            other => DynamicImage::ImageRgb8(other.to_rgb8()),
        };
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    /// Current image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Current image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Borrow the underlying `DynamicImage`.
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    /// Consume the processor and return the underlying `DynamicImage`.
    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Transformations (consume self, return new Self) -----------------------

    /// Smooth the colour image with a Gaussian kernel.
    #[instrument(skip(self), fields(kernel_size = params.kernel_size))]
    pub fn gaussian_blur(self, params: BlurParams) -> Self {
        let sigma = params.sigma();
        info!(sigma, "Applying Gaussian blur");
        let blurred = gaussian_blur_f32(&self.image.to_rgb8(), sigma);
        Self {
            image: DynamicImage::ImageRgb8(blurred),
        }
    }

    /// Sobel gradient magnitude of the grayscale image, saturated to 8 bits.
    #[instrument(skip(self))]
    pub fn sobel_edges(self) -> Self {
        info!("Computing Sobel gradient magnitude");
        let gradients = sobel_gradients(&self.image.to_luma8());
        let magnitude = GrayImage::from_fn(gradients.width(), gradients.height(), |x, y| {
            Luma([gradients.get_pixel(x, y).0[0].min(u8::MAX as u16) as u8])
        });
        Self {
            image: DynamicImage::ImageLuma8(magnitude),
        }
    }

    /// Canny edge detection with hysteresis thresholds. The result is a
    /// single-channel image containing only 0 and 255.
    #[instrument(skip(self), fields(low = params.low, high = params.high))]
    pub fn canny_edges(self, params: CannyParams) -> Self {
        info!("Running Canny edge detection");
        let edges = canny(&self.image.to_luma8(), params.low, params.high);
        Self {
            image: DynamicImage::ImageLuma8(edges),
        }
    }

    /// Equalize the histogram of the luma (Y) channel only, leaving chroma
    /// untouched.
    #[instrument(skip(self))]
    pub fn equalize_luma(self) -> Self {
        info!("Equalizing luma histogram");

        let rgb = self.image.to_rgb8();
        let (width, height) = rgb.dimensions();

        let mut luma = GrayImage::new(width, height);
        let mut chroma = Vec::with_capacity(width as usize * height as usize);
        for (x, y, pixel) in rgb.enumerate_pixels() {
            let [y_val, u, v] = rgb_to_yuv(*pixel);
            luma.put_pixel(x, y, Luma([y_val]));
            chroma.push((u, v));
        }

        let equalized = equalize_histogram(&luma);

        let output = RgbImage::from_fn(width, height, |x, y| {
            let (u, v) = chroma[y as usize * width as usize + x as usize];
            yuv_to_rgb([equalized.get_pixel(x, y).0[0], u, v])
        });

        debug!("Luma equalization complete");
        Self {
            image: DynamicImage::ImageRgb8(output),
        }
    }

    /// Binarize the grayscale image against its local neighbourhood mean.
    #[instrument(skip(self), fields(block_size = params.block_size, c = params.c))]
    pub fn adaptive_threshold(self, params: AdaptiveThresholdParams) -> Self {
        info!(method = ?params.method, "Applying adaptive threshold");
        let binary = threshold::adaptive_threshold(&self.image.to_luma8(), &params);
        Self {
            image: DynamicImage::ImageLuma8(binary),
        }
    }

    // -- Output ---------------------------------------------------------------

    /// Write the image to a file. The format is inferred from the file extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.image.save(path.as_ref()).map_err(|err| {
            BildwerkError::ImageError(format!(
                "failed to save image to {}: {}",
                path.as_ref().display(),
                err
            ))
        })
    }
}

// -- Colour space helpers -----------------------------------------------------

/// 8-bit RGB → YUV using BT.601 weights, chroma offset by 128.
fn rgb_to_yuv(pixel: Rgb<u8>) -> [u8; 3] {
    let [r, g, b] = pixel.0.map(f32::from);
    let y = 0.299 * r + 0.587 * g + 0.114 * b;
    let u = (b - y) * 0.492 + 128.0;
    let v = (r - y) * 0.877 + 128.0;
    [to_u8(y), to_u8(u), to_u8(v)]
}

/// Inverse of [`rgb_to_yuv`].
fn yuv_to_rgb(yuv: [u8; 3]) -> Rgb<u8> {
    let y = f32::from(yuv[0]);
    let u = f32::from(yuv[1]) - 128.0;
    let v = f32::from(yuv[2]) - 128.0;
    let r = y + 1.140 * v;
    let g = y - 0.395 * u - 0.581 * v;
    let b = y + 2.032 * u;
    Rgb([to_u8(r), to_u8(g), to_u8(b)])
}

fn to_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

// -- Tests --------------------------------------------------------------------
