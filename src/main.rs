// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use mongol_ocr_service::{
    api::{start_server, AppState},
    cli::Cli,
    version,
    vision::DebugImageMode,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging, defaulting to info
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Cli::parse()
        .into_config()
        .context("invalid service configuration")?;

    info!("🚀 Starting {}", version::get_version_string());
    info!("Features: {}", version::FEATURES.join(", "));
    info!(
        "Pipeline: grayscale → otsu → {}median({}) → tesseract (lang={})",
        if config.deskew { "deskew → " } else { "" },
        config.preprocess_options().median_kernel_size,
        config.language
    );

    let engine = config.ocr_engine();

    // A missing engine is not fatal: requests report it in their error body
    match engine.probe().await {
        Ok(banner) => info!("✅ OCR engine found: {} ({})", engine.program().display(), banner),
        Err(e) => warn!("⚠️  OCR engine check failed: {}", e),
    }

    match engine.available_languages().await {
        Ok(languages) => {
            for code in config.language.split('+') {
                if !languages.iter().any(|l| l == code) {
                    warn!(
                        "⚠️  Language '{}' is not installed for {} (available: {})",
                        code,
                        engine.program().display(),
                        languages.join(", ")
                    );
                }
            }
        }
        Err(e) => warn!("⚠️  Could not list OCR languages: {}", e),
    }

    match config.debug_image {
        DebugImageMode::Off => info!("Debug image disabled"),
        mode => info!(
            "Debug image: {:?} at {}",
            mode,
            config.debug_image_path.display()
        ),
    }

    let state = AppState::new(config, Arc::new(engine));
    start_server(state).await
}
