// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR engine wrapping the `tesseract` CLI tool

use std::io::{Cursor, ErrorKind};
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use image::{GrayImage, ImageFormat};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use super::{OcrEngine, OcrEngineError};

/// Program name resolved through `PATH` when no explicit path is configured
pub const DEFAULT_TESSERACT_PROGRAM: &str = "tesseract";

/// `tesseract` invoked as `<program> stdin stdout -l <language>`
///
/// The raster is piped in as PNG and the recognized text read back from
/// stdout. Every call spawns its own process, so concurrent requests never
/// share engine state.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    program: PathBuf,
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new(None)
    }
}

impl TesseractEngine {
    /// Create an engine for an explicit executable, or `tesseract` on `PATH`
    pub fn new(program: Option<PathBuf>) -> Self {
        Self {
            program: program.unwrap_or_else(|| PathBuf::from(DEFAULT_TESSERACT_PROGRAM)),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }

    fn map_spawn_error(&self, e: std::io::Error) -> OcrEngineError {
        if e.kind() == ErrorKind::NotFound || e.kind() == ErrorKind::PermissionDenied {
            OcrEngineError::Unavailable {
                program: self.program.display().to_string(),
                source: e,
            }
        } else {
            OcrEngineError::Io(e)
        }
    }

    /// Check that the executable starts, returning its version banner
    pub async fn probe(&self) -> Result<String, OcrEngineError> {
        let output = self
            .command()
            .arg("--version")
            .output()
            .await
            .map_err(|e| self.map_spawn_error(e))?;

        if !output.status.success() {
            return Err(failure(&output));
        }

        // Older releases print the banner on stderr
        let banner = if output.stdout.is_empty() {
            &output.stderr
        } else {
            &output.stdout
        };
        Ok(String::from_utf8_lossy(banner)
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_string())
    }

    /// Languages with traineddata installed, from `--list-langs`
    pub async fn available_languages(&self) -> Result<Vec<String>, OcrEngineError> {
        let output = self
            .command()
            .arg("--list-langs")
            .output()
            .await
            .map_err(|e| self.map_spawn_error(e))?;

        if !output.status.success() {
            return Err(failure(&output));
        }

        Ok(parse_language_list(&String::from_utf8_lossy(&output.stdout)))
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    async fn recognize(
        &self,
        raster: &GrayImage,
        language: &str,
    ) -> Result<String, OcrEngineError> {
        let mut png = Vec::new();
        raster.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        debug!(
            "Running {} on {}x{} raster ({} bytes PNG, lang={})",
            self.program.display(),
            raster.width(),
            raster.height(),
            png.len(),
            language
        );

        let mut child = self
            .command()
            .arg("stdin")
            .arg("stdout")
            .arg("-l")
            .arg(language)
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|e| self.map_spawn_error(e))?;

        // An engine that exits early closes its stdin; its exit status says why
        if let Some(mut stdin) = child.stdin.take() {
            match write_input(&mut stdin, &png).await {
                Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                    debug!("{} closed stdin early", self.program.display());
                }
                result => result?,
            }
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            let err = failure(&output);
            warn!("{}", err);
            return Err(err);
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

async fn write_input(stdin: &mut tokio::process::ChildStdin, data: &[u8]) -> std::io::Result<()> {
    stdin.write_all(data).await?;
    stdin.shutdown().await
}

fn failure(output: &std::process::Output) -> OcrEngineError {
    OcrEngineError::Failed {
        status: output.status.to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
}

/// Parse `tesseract --list-langs` output, skipping the header line
pub fn parse_language_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("List of available languages"))
        .map(str::to_string)
        .collect()
}
