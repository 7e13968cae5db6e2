// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Endpoint tests for POST /
//!
//! These tests verify that the handler:
//! - Returns exactly one of `text` / `error` for every upload
//! - Reports undecodable uploads with the fixed "Invalid image file" message
//! - Feeds the OCR engine a single-channel, thresholded raster
//! - Keeps concurrent requests apart
//! - Passes engine and transform failures through verbatim

use super::common::*;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use image::ImageFormat;
use mongol_ocr_service::config::ServiceConfig;
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;

#[tokio::test]
async fn test_valid_png_returns_text() {
    let app = app_with(ServiceConfig::default(), dimensions_engine());

    let (status, body) = post_file(&app, &page_image(40, 20, ImageFormat::Png)).await;

    assert_eq!(status, 200);
    assert_single_key(&body);
    assert_eq!(body["text"], "40x20 mon");
}

#[tokio::test]
async fn test_valid_jpeg_returns_text() {
    let app = app_with(ServiceConfig::default(), dimensions_engine());

    let (status, body) = post_file(&app, &page_image(32, 32, ImageFormat::Jpeg)).await;

    assert_eq!(status, 200);
    assert_eq!(body["text"], "32x32 mon");
}

#[tokio::test]
async fn test_non_image_bytes_rejected() {
    let app = app_with(ServiceConfig::default(), dimensions_engine());

    let (status, body) = post_file(&app, b"%PDF-1.4 this is not an image").await;

    assert_eq!(status, 200);
    assert_eq!(body, serde_json::json!({"error": "Invalid image file"}));
}

#[tokio::test]
async fn test_empty_upload_rejected() {
    let app = app_with(ServiceConfig::default(), dimensions_engine());

    let (_, body) = post_file(&app, b"").await;

    assert_eq!(body, serde_json::json!({"error": "Invalid image file"}));
}

#[tokio::test]
async fn test_truncated_header_rejected() {
    let app = app_with(ServiceConfig::default(), dimensions_engine());
    let png = page_image(20, 20, ImageFormat::Png);

    let (_, body) = post_file(&app, &png[..10]).await;

    assert_eq!(body, serde_json::json!({"error": "Invalid image file"}));
}

#[tokio::test]
async fn test_single_pixel_image_does_not_crash() {
    let app = app_with(ServiceConfig::default(), dimensions_engine());

    let (status, body) = post_file(&app, &solid_image(1, 1, [255, 255, 255])).await;

    assert_eq!(status, 200);
    assert_single_key(&body);
}

#[tokio::test]
async fn test_single_pixel_image_with_deskew_does_not_crash() {
    let config = ServiceConfig {
        deskew: true,
        ..Default::default()
    };
    let app = app_with(config, dimensions_engine());

    let (status, body) = post_file(&app, &solid_image(1, 1, [0, 0, 0])).await;

    assert_eq!(status, 200);
    assert_single_key(&body);
}

#[tokio::test]
async fn test_same_image_twice_same_text() {
    let app = app_with(ServiceConfig::default(), dimensions_engine());
    let png = page_image(64, 48, ImageFormat::Png);

    let (_, first) = post_file(&app, &png).await;
    let (_, second) = post_file(&app, &png).await;

    assert_eq!(first, second);
    assert!(first["text"].is_string());
}

#[tokio::test]
async fn test_concurrent_requests_do_not_mix() {
    let engine = Arc::new(DimensionsEngine {
        delay: Duration::from_millis(50),
    });
    let app = app_with(ServiceConfig::default(), engine);

    let small = page_image(10, 20, ImageFormat::Png);
    let large = page_image(30, 5, ImageFormat::Png);

    let (a, b) = tokio::join!(post_file(&app, &small), post_file(&app, &large));

    assert_eq!(a.1["text"], "10x20 mon");
    assert_eq!(b.1["text"], "30x5 mon");
}

#[tokio::test]
async fn test_engine_receives_binary_single_channel_raster() {
    let engine = Arc::new(RecordingEngine::default());
    let app = app_with(ServiceConfig::default(), engine.clone());

    let (_, body) = post_file(&app, &page_image(60, 30, ImageFormat::Png)).await;
    assert_eq!(body["text"], "");

    let rasters = engine.rasters.lock().unwrap();
    assert_eq!(rasters.len(), 1);
    let raster = &rasters[0];
    assert_eq!(raster.dimensions(), (60, 30));
    assert!(raster.pixels().all(|p| p[0] == 0 || p[0] == 255));
    // Dark block in the middle, light page around it
    assert_eq!(raster.get_pixel(30, 15)[0], 0);
    assert_eq!(raster.get_pixel(2, 2)[0], 255);
}

#[tokio::test]
async fn test_configured_language_is_used() {
    let config = ServiceConfig {
        language: "mon+eng".to_string(),
        ..Default::default()
    };
    let app = app_with(config, dimensions_engine());

    let (_, body) = post_file(&app, &page_image(8, 8, ImageFormat::Png)).await;

    assert_eq!(body["text"], "8x8 mon+eng");
}

#[tokio::test]
async fn test_engine_failure_reported_verbatim() {
    let app = app_with(ServiceConfig::default(), Arc::new(FailingEngine));

    let (status, body) = post_file(&app, &page_image(16, 16, ImageFormat::Png)).await;

    assert_eq!(status, 200);
    assert_single_key(&body);
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("Failed loading language 'mon'"), "{}", message);
}

#[tokio::test]
async fn test_deskew_failure_reported_verbatim() {
    let config = ServiceConfig {
        deskew: true,
        ..Default::default()
    };
    let app = app_with(config, dimensions_engine());

    // All-black input leaves no non-zero pixel after thresholding
    let (status, body) = post_file(&app, &solid_image(12, 12, [0, 0, 0])).await;

    assert_eq!(status, 200);
    assert_eq!(
        body["error"],
        "Cannot estimate skew: raster has no non-zero pixels"
    );
}

#[tokio::test]
async fn test_deskew_keeps_upright_page() {
    let config = ServiceConfig {
        deskew: true,
        ..Default::default()
    };
    let upright = Arc::new(RecordingEngine::default());
    let plain = Arc::new(RecordingEngine::default());
    let png = page_image(48, 48, ImageFormat::Png);

    post_file(&app_with(config, upright.clone()), &png).await;
    post_file(&app_with(ServiceConfig::default(), plain.clone()), &png).await;

    assert_eq!(upright.rasters.lock().unwrap()[0], plain.rasters.lock().unwrap()[0]);
}

#[tokio::test]
async fn test_missing_file_field() {
    let app = app_with(ServiceConfig::default(), dimensions_engine());
    let body = multipart_body("image", "page.png", "image/png", &page_image(8, 8, ImageFormat::Png));

    let response = app.oneshot(upload_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert_single_key(&body);
    assert!(body["error"].as_str().unwrap().contains("file"));
}

#[tokio::test]
async fn test_non_multipart_request() {
    let app = app_with(ServiceConfig::default(), dimensions_engine());
    let request = Request::builder()
        .method(Method::POST)
        .uri("/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"image": "abc"}"#))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert!(response.status().is_client_error());
    let body = json_body(response).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_oversized_upload_rejected() {
    let config = ServiceConfig {
        max_upload_bytes: 512,
        ..Default::default()
    };
    let app = app_with(config, dimensions_engine());
    let noise: Vec<u8> = (0..8192u32).map(|i| (i * 31 % 251) as u8).collect();

    let response = app.oneshot(upload_file(&noise)).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = json_body(response).await;
    assert_eq!(
        body["error"],
        "Upload of 8192 bytes exceeds the limit of 512 bytes"
    );
}

#[tokio::test]
async fn test_upload_exactly_at_limit_accepted() {
    let png = page_image(24, 12, ImageFormat::Png);
    let config = ServiceConfig {
        max_upload_bytes: png.len(),
        ..Default::default()
    };
    let app = app_with(config, dimensions_engine());

    let (status, body) = post_file(&app, &png).await;

    assert_eq!(status, 200);
    assert_eq!(body["text"], "24x12 mon");
}

#[tokio::test]
async fn test_upload_one_byte_over_limit_rejected() {
    let png = page_image(24, 12, ImageFormat::Png);
    let limit = png.len() - 1;
    let config = ServiceConfig {
        max_upload_bytes: limit,
        ..Default::default()
    };
    let app = app_with(config, dimensions_engine());

    let (status, body) = post_file(&app, &png).await;

    assert_eq!(status, 413);
    assert_single_key(&body);
    assert_eq!(
        body["error"],
        format!(
            "Upload of {} bytes exceeds the limit of {} bytes",
            png.len(),
            limit
        )
    );
}

#[tokio::test]
async fn test_get_root_not_allowed() {
    let app = app_with(ServiceConfig::default(), dimensions_engine());
    let request = Request::builder()
        .method(Method::GET)
        .uri("/")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
