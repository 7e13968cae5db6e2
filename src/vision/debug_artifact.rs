// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Diagnostic dump of the preprocessed raster
//!
//! Writes are best-effort and unsynchronized: with the default `Overwrite`
//! mode concurrent requests race on one file and the last writer wins.

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use image::GrayImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

/// Default location of the debug image, relative to the working directory
pub const DEFAULT_DEBUG_IMAGE_PATH: &str = "processed_image.jpg";

/// How the preprocessed raster is persisted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DebugImageMode {
    /// Never write the debug image
    Off,
    /// Overwrite one shared file on every request
    #[default]
    Overwrite,
    /// Write one file per request, suffixed with a request id
    PerRequest,
}

/// Writer for the debug artifact
#[derive(Debug, Clone)]
pub struct DebugArtifactWriter {
    mode: DebugImageMode,
    path: PathBuf,
}

impl DebugArtifactWriter {
    pub fn new(mode: DebugImageMode, path: impl Into<PathBuf>) -> Self {
        Self {
            mode,
            path: path.into(),
        }
    }

    pub fn disabled() -> Self {
        Self::new(DebugImageMode::Off, DEFAULT_DEBUG_IMAGE_PATH)
    }

    pub fn mode(&self) -> DebugImageMode {
        self.mode
    }

    /// Path the raster for `request_id` would be written to, if any
    pub fn target_path(&self, request_id: &Uuid) -> Option<PathBuf> {
        match self.mode {
            DebugImageMode::Off => None,
            DebugImageMode::Overwrite => Some(self.path.clone()),
            DebugImageMode::PerRequest => Some(per_request_path(&self.path, request_id)),
        }
    }

    /// Persist `raster`, encoded by the target file extension
    ///
    /// Failures are logged and swallowed; the returned path is only set when
    /// the write succeeded.
    pub fn write(&self, raster: &GrayImage, request_id: &Uuid) -> Option<PathBuf> {
        let path = self.target_path(request_id)?;

        match raster.save(&path) {
            Ok(()) => {
                debug!("Debug image written to {}", path.display());
                Some(path)
            }
            Err(e) => {
                warn!("Failed to write debug image to {}: {}", path.display(), e);
                None
            }
        }
    }
}

fn per_request_path(base: &Path, request_id: &Uuid) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "processed_image".to_string());
    let file_name = match base.extension() {
        Some(ext) => format!("{}-{}.{}", stem, request_id, ext.to_string_lossy()),
        None => format!("{}-{}", stem, request_id),
    };
    base.with_file_name(file_name)
}
