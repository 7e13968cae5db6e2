// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing ahead of OCR
//!
//! The stages always run in the same order:
//! 1. Grayscale conversion
//! 2. Otsu binarization
//! 3. Deskew (only when enabled)
//! 4. Median denoise

use image::{DynamicImage, GrayImage, Luma};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};
use imageproc::filter::median_filter;
use thiserror::Error;
use tracing::debug;

use super::deskew::{deskew, DeskewError};

/// Neighbourhood size of the denoising median filter
pub const MEDIAN_KERNEL_SIZE: u32 = 5;

/// Value written for pixels above the Otsu level
pub const BINARY_MAX_VALUE: u8 = 255;

/// BT.601 luma weights in 14-bit fixed point (R, G, B)
const LUMA_WEIGHTS: [u32; 3] = [4899, 9617, 1868];
const LUMA_SHIFT: u32 = 14;

/// Errors raised by a preprocessing stage
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("Cannot preprocess an empty raster ({width}x{height})")]
    EmptyRaster { width: u32, height: u32 },

    #[error(transparent)]
    Deskew(#[from] DeskewError),
}

/// Which optional stages of the pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreprocessOptions {
    pub deskew: bool,
    pub median_kernel_size: u32,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            deskew: false,
            median_kernel_size: MEDIAN_KERNEL_SIZE,
        }
    }
}

impl PreprocessOptions {
    pub fn with_deskew(deskew: bool) -> Self {
        Self {
            deskew,
            ..Self::default()
        }
    }
}

/// Convert a colour raster to single-channel 8-bit luma
///
/// Uses BT.601 weights (0.299, 0.587, 0.114) with round-half-up, so pure
/// red, green and blue map to 76, 150 and 29. Alpha is ignored.
pub fn to_grayscale(image: &DynamicImage) -> GrayImage {
    let rgb = image.to_rgb8();
    let rounding = 1 << (LUMA_SHIFT - 1);

    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        let sum = u32::from(r) * LUMA_WEIGHTS[0]
            + u32::from(g) * LUMA_WEIGHTS[1]
            + u32::from(b) * LUMA_WEIGHTS[2];
        Luma([((sum + rounding) >> LUMA_SHIFT) as u8])
    })
}

/// Binarize with a global level picked by Otsu's method
///
/// Pixels strictly above the level become 255, all others 0.
pub fn binarize(gray: &GrayImage) -> GrayImage {
    let level = otsu_level(gray);
    debug!("Otsu level: {}", level);
    threshold(gray, level, ThresholdType::Binary)
}

/// Median filter with a square `kernel_size` neighbourhood
pub fn remove_noise(image: &GrayImage, kernel_size: u32) -> GrayImage {
    let radius = kernel_size / 2;
    median_filter(image, radius, radius)
}

/// Run the full preprocessing pipeline on a decoded raster
pub fn preprocess(
    image: &DynamicImage,
    options: &PreprocessOptions,
) -> Result<GrayImage, TransformError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(TransformError::EmptyRaster {
            width: image.width(),
            height: image.height(),
        });
    }

    let gray = to_grayscale(image);
    let mut raster = binarize(&gray);

    if options.deskew {
        raster = deskew(&raster)?;
    }

    Ok(remove_noise(&raster, options.median_kernel_size))
}
