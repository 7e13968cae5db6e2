// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the OCR service

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Pipeline capabilities compiled into this build
pub const FEATURES: &[&str] = &[
    "multipart-upload",
    "grayscale",
    "otsu-binarization",
    "deskew",
    "median-denoise",
    "debug-artifact",
    "tesseract-cli",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Mongol OCR Service {}", VERSION_NUMBER)
}
