// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use clap::builder::BoolishValueParser;
use clap::Parser;
use std::path::PathBuf;

use crate::config::{ConfigError, ServiceConfig};
use crate::vision::DebugImageMode;

/// Image-to-text OCR service
///
/// Every flag can also be set through its environment variable. Flags and
/// environment override the `[service]` table of the optional config file.
#[derive(Parser, Debug, Default)]
#[command(name = "mongol-ocr-service")]
#[command(version)]
#[command(about = "HTTP service that preprocesses uploaded images and runs OCR on them", long_about = None)]
pub struct Cli {
    /// TOML config file with a [service] table
    #[arg(long, env = "OCR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Listen address
    #[arg(long, env = "OCR_HOST")]
    pub host: Option<String>,

    /// Listen port
    #[arg(long, env = "OCR_PORT")]
    pub port: Option<u16>,

    /// Path to the tesseract executable (default: found via PATH)
    #[arg(long, env = "OCR_ENGINE_PATH")]
    pub ocr_engine_path: Option<PathBuf>,

    /// Language code passed to the OCR engine
    #[arg(long, env = "OCR_LANGUAGE")]
    pub language: Option<String>,

    /// Enable the deskew stage (true/false)
    #[arg(long, env = "OCR_DESKEW", value_parser = BoolishValueParser::new())]
    pub deskew: Option<bool>,

    /// Debug image mode
    #[arg(long, env = "OCR_DEBUG_IMAGE", value_enum)]
    pub debug_image: Option<DebugImageMode>,

    /// Debug image location; the extension selects the encoding
    #[arg(long, env = "OCR_DEBUG_IMAGE_PATH")]
    pub debug_image_path: Option<PathBuf>,

    /// Maximum upload size in bytes
    #[arg(long, env = "OCR_MAX_UPLOAD_BYTES")]
    pub max_upload_bytes: Option<usize>,

    /// Reflect the caller's origin and allow credentials in CORS responses
    #[arg(long, env = "OCR_CORS_ALLOW_CREDENTIALS", value_parser = BoolishValueParser::new())]
    pub cors_allow_credentials: Option<bool>,
}

impl Cli {
    /// Resolve the final configuration: defaults, then file, then flags/env
    pub fn into_config(self) -> Result<ServiceConfig, ConfigError> {
        let base = match &self.config {
            Some(path) => ServiceConfig::from_file(path)?,
            None => ServiceConfig::default(),
        };

        let config = self.apply(base);
        config.validate()?;
        Ok(config)
    }

    fn apply(self, mut config: ServiceConfig) -> ServiceConfig {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(path) = self.ocr_engine_path {
            config.ocr_engine_path = Some(path);
        }
        if let Some(language) = self.language {
            config.language = language;
        }
        if let Some(deskew) = self.deskew {
            config.deskew = deskew;
        }
        if let Some(mode) = self.debug_image {
            config.debug_image = mode;
        }
        if let Some(path) = self.debug_image_path {
            config.debug_image_path = path;
        }
        if let Some(limit) = self.max_upload_bytes {
            config.max_upload_bytes = limit;
        }
        if let Some(allow) = self.cors_allow_credentials {
            config.cors_allow_credentials = allow;
        }
        config
    }
}
