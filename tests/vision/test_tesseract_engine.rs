// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Subprocess behaviour of the tesseract engine

use image::{GrayImage, Luma};
use mongol_ocr_service::vision::{OcrEngine, OcrEngineError, TesseractEngine};
use std::path::PathBuf;

fn blank_page() -> GrayImage {
    GrayImage::from_pixel(64, 32, Luma([255]))
}

#[cfg(unix)]
#[tokio::test]
async fn test_non_zero_exit_is_failure() {
    // `false` ignores its arguments and exits 1
    let engine = TesseractEngine::new(Some(PathBuf::from("false")));

    let err = engine.recognize(&blank_page(), "mon").await.unwrap_err();

    assert!(matches!(err, OcrEngineError::Failed { .. }), "{:?}", err);
}

#[tokio::test]
async fn test_unknown_program_is_unavailable() {
    let engine = TesseractEngine::new(Some(PathBuf::from("no-such-ocr-engine-binary")));

    let err = engine.recognize(&blank_page(), "mon").await.unwrap_err();

    assert!(matches!(err, OcrEngineError::Unavailable { .. }));
}

/// Needs tesseract with the `mon` traineddata installed
#[tokio::test]
#[ignore]
async fn test_real_tesseract_blank_page() {
    let engine = TesseractEngine::default();

    let languages = engine.available_languages().await.unwrap();
    assert!(languages.iter().any(|l| l == "mon"));

    let text = engine.recognize(&blank_page(), "mon").await.unwrap();
    assert!(text.trim().is_empty(), "unexpected text: {:?}", text);
}
