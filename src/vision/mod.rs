// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing module for CPU-based image-to-text
//!
//! This module provides:
//! - Decoding of uploaded image bytes
//! - Classical preprocessing (grayscale, Otsu binarization, deskew, median denoise)
//! - The debug artifact writer
//! - OCR backends behind the `OcrEngine` trait

pub mod debug_artifact;
pub mod deskew;
pub mod image_utils;
pub mod ocr;
pub mod preprocessing;

pub use debug_artifact::{DebugArtifactWriter, DebugImageMode};
pub use image_utils::{decode_image_bytes, ImageError, ImageInfo};
pub use ocr::{OcrEngine, OcrEngineError, TesseractEngine};
pub use preprocessing::{preprocess, PreprocessOptions, TransformError};
