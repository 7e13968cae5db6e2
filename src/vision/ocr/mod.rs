// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text recognition backends
//!
//! The service talks to OCR through the [`OcrEngine`] trait; the production
//! backend shells out to the `tesseract` CLI.

pub mod tesseract;

use async_trait::async_trait;
use image::GrayImage;
use thiserror::Error;

pub use tesseract::TesseractEngine;

/// Errors raised by an OCR backend
#[derive(Debug, Error)]
pub enum OcrEngineError {
    #[error("OCR engine '{program}' is not available: {source}")]
    Unavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("OCR engine failed ({status}): {stderr}")]
    Failed { status: String, stderr: String },

    #[error("Failed to encode raster for OCR engine: {0}")]
    Encode(#[from] image::ImageError),

    #[error("OCR engine I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A backend able to turn a preprocessed raster into text
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Short name used in logs and the health endpoint
    fn name(&self) -> &str;

    /// Recognize the text in `raster` for the given language code
    async fn recognize(&self, raster: &GrayImage, language: &str)
        -> Result<String, OcrEngineError>;
}
