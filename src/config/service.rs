// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::vision::debug_artifact::{DebugArtifactWriter, DebugImageMode, DEFAULT_DEBUG_IMAGE_PATH};
use crate::vision::ocr::TesseractEngine;
use crate::vision::preprocessing::PreprocessOptions;

/// Script/language code requested from the OCR engine (Mongolian)
pub const DEFAULT_LANGUAGE: &str = "mon";

pub const DEFAULT_HOST: &str = "0.0.0.0";

pub const DEFAULT_PORT: u16 = 8000;

/// Maximum accepted upload size (10MB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration for '{field}': {message}")]
    Invalid { field: String, message: String },
}

impl ConfigError {
    fn invalid(field: &str, message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Image-to-text service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Address the HTTP listener binds to
    pub host: String,
    pub port: u16,
    /// Explicit OCR engine executable; `None` resolves `tesseract` via `PATH`
    pub ocr_engine_path: Option<PathBuf>,
    /// Language code passed to the OCR engine
    pub language: String,
    /// Run the deskew stage
    pub deskew: bool,
    pub debug_image: DebugImageMode,
    pub debug_image_path: PathBuf,
    pub max_upload_bytes: usize,
    /// Reflect the caller's origin and allow credentials in CORS responses
    pub cors_allow_credentials: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            ocr_engine_path: None,
            language: DEFAULT_LANGUAGE.to_string(),
            deskew: false,
            debug_image: DebugImageMode::default(),
            debug_image_path: PathBuf::from(DEFAULT_DEBUG_IMAGE_PATH),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            cors_allow_credentials: true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    service: ServiceConfig,
}

impl ServiceConfig {
    /// Load the `[service]` table of a TOML file; missing keys keep defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        let file: ConfigFile = toml::from_str(content)?;
        Ok(file.service)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::invalid("port", "must be non-zero"));
        }

        self.host
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::invalid("host", format!("'{}': {}", self.host, e)))?;

        // tesseract accepts several languages joined with '+', e.g. "mon+eng"
        let valid_language = !self.language.is_empty()
            && self
                .language
                .split('+')
                .all(|code| !code.is_empty() && code.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
        if !valid_language {
            return Err(ConfigError::invalid(
                "language",
                format!("'{}' is not a valid language code", self.language),
            ));
        }

        if self.max_upload_bytes == 0 {
            return Err(ConfigError::invalid("max_upload_bytes", "must be greater than 0"));
        }

        if self.debug_image != DebugImageMode::Off && self.debug_image_path.file_name().is_none() {
            return Err(ConfigError::invalid(
                "debug_image_path",
                format!("'{}' does not name a file", self.debug_image_path.display()),
            ));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip = self
            .host
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::invalid("host", format!("'{}': {}", self.host, e)))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn preprocess_options(&self) -> PreprocessOptions {
        PreprocessOptions::with_deskew(self.deskew)
    }

    pub fn debug_writer(&self) -> DebugArtifactWriter {
        DebugArtifactWriter::new(self.debug_image, &self.debug_image_path)
    }

    pub fn ocr_engine(&self) -> TesseractEngine {
        TesseractEngine::new(self.ocr_engine_path.clone())
    }
}
