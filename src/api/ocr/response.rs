// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR response types

use serde::{Deserialize, Serialize};

/// Response envelope for `POST /`
///
/// Serializes to an object with exactly one key, `{"text": ...}` or
/// `{"error": ...}`, so both can never appear together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrResponse {
    /// Recognized text (may be empty)
    Text(String),
    /// Human-readable failure description
    Error(String),
}

impl OcrResponse {
    pub fn text(&self) -> Option<&str> {
        match self {
            OcrResponse::Text(text) => Some(text),
            OcrResponse::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            OcrResponse::Text(_) => None,
            OcrResponse::Error(message) => Some(message),
        }
    }
}

/// Response body for `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// OCR backend name
    pub engine: String,
    pub language: String,
    pub deskew: bool,
}
