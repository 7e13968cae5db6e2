// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR endpoint handler

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::multipart::{Multipart, MultipartRejection};
use bytes::Bytes;
use image::GrayImage;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::response::OcrResponse;
use crate::api::errors::ServiceError;
use crate::api::http_server::AppState;
use crate::vision::{decode_image_bytes, preprocess};

/// Multipart field carrying the image
pub const UPLOAD_FIELD: &str = "file";

/// POST / - Extract text from an uploaded image
///
/// # Request
/// - multipart/form-data with the image bytes in the `file` field
///
/// # Response
/// - `{"text": "..."}` with the recognized text (possibly empty)
/// - `{"error": "Invalid image file"}` when the upload is not a decodable image
/// - `{"error": "..."}` with the failure description for any other pipeline error
///
/// Pipeline failures keep status 200. A missing `file` field gives 422 and an
/// unreadable or oversized body gives the multipart error status.
pub async fn ocr_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let request_id = Uuid::new_v4();
    let started = Instant::now();

    let result = match multipart {
        Ok(multipart) => match read_upload(multipart, state.config.max_upload_bytes).await {
            Ok(bytes) => image_to_text(&state, bytes, request_id).await,
            Err(e) => Err(e),
        },
        Err(rejection) => Err(ServiceError::Upload {
            status: rejection.status(),
            message: rejection.body_text(),
        }),
    };

    match result {
        Ok(text) => {
            info!(
                %request_id,
                "OCR complete: {} chars, {}ms",
                text.chars().count(),
                started.elapsed().as_millis()
            );
            Json(OcrResponse::Text(text)).into_response()
        }
        Err(e) => {
            warn!(%request_id, kind = e.kind(), "OCR request failed: {}", e);
            e.into_response()
        }
    }
}

/// Pull the bytes of the `file` field; other fields are skipped
async fn read_upload(mut multipart: Multipart, max_bytes: usize) -> Result<Bytes, ServiceError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(UPLOAD_FIELD) {
            let bytes = field.bytes().await?;
            if bytes.len() > max_bytes {
                return Err(ServiceError::Upload {
                    status: StatusCode::PAYLOAD_TOO_LARGE,
                    message: format!(
                        "Upload of {} bytes exceeds the limit of {} bytes",
                        bytes.len(),
                        max_bytes
                    ),
                });
            }
            return Ok(bytes);
        }
    }
    Err(ServiceError::MissingField(UPLOAD_FIELD.to_string()))
}

/// Run decode, preprocessing, the debug write and OCR for one upload
///
/// Decoding and the transforms are CPU-bound and run on the blocking pool;
/// a panic there surfaces as a `Task` error instead of tearing down the
/// connection.
pub async fn image_to_text(
    state: &AppState,
    bytes: Bytes,
    request_id: Uuid,
) -> Result<String, ServiceError> {
    let options = state.config.preprocess_options();
    let debug_writer = state.debug_writer.clone();

    let raster = tokio::task::spawn_blocking(move || -> Result<GrayImage, ServiceError> {
        let (image, info) = decode_image_bytes(&bytes)?;
        debug!(
            %request_id,
            "Decoded image: {}x{} {:?}, {} bytes",
            info.width, info.height, info.format, info.size_bytes
        );

        let raster = preprocess(&image, &options)?;
        debug_writer.write(&raster, &request_id);
        Ok(raster)
    })
    .await
    .map_err(|e| ServiceError::Task(e.to_string()))??;

    let text = state
        .engine
        .recognize(&raster, &state.config.language)
        .await?;

    Ok(text)
}
