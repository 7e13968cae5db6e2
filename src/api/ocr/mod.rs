// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR API endpoint module
//!
//! Provides POST / for extracting text from an uploaded image.

pub mod handler;
pub mod response;

pub use handler::{image_to_text, ocr_handler, UPLOAD_FIELD};
pub use response::{HealthResponse, OcrResponse};
