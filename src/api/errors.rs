// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::multipart::MultipartError;
use thiserror::Error;

use super::ocr::OcrResponse;
use crate::vision::{ImageError, OcrEngineError, TransformError};

/// Failures of one image-to-text request
///
/// Every variant is reported to the caller as `{"error": <Display>}`. Decode
/// failures always read "Invalid image file"; everything else carries its own
/// description verbatim.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid image file")]
    InvalidImage(#[from] ImageError),

    #[error("Missing '{0}' field in multipart upload")]
    MissingField(String),

    #[error("{message}")]
    Upload { status: StatusCode, message: String },

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Engine(#[from] OcrEngineError),

    #[error("Image processing task failed: {0}")]
    Task(String),
}

impl ServiceError {
    /// Short machine-readable kind, used for logging only
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::InvalidImage(_) => "decode",
            ServiceError::MissingField(_) => "missing_field",
            ServiceError::Upload { .. } => "upload",
            ServiceError::Transform(_) => "transform",
            ServiceError::Engine(OcrEngineError::Unavailable { .. }) => "engine_unavailable",
            ServiceError::Engine(_) => "engine",
            ServiceError::Task(_) => "task",
        }
    }

    /// HTTP status for the error envelope
    ///
    /// Pipeline failures keep `200 OK`: the outcome lives in the JSON body.
    /// Only malformed requests get a client-error status.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::MissingField(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::Upload { status, .. } => *status,
            _ => StatusCode::OK,
        }
    }
}

impl From<MultipartError> for ServiceError {
    fn from(e: MultipartError) -> Self {
        ServiceError::Upload {
            status: e.status(),
            message: e.body_text(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(OcrResponse::Error(self.to_string()))).into_response()
    }
}
