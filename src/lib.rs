// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod cli;
pub mod config;
pub mod version;
pub mod vision;

pub use api::{create_app, start_server, AppState, OcrResponse, ServiceError};
pub use config::{ConfigError, ServiceConfig};
pub use vision::{OcrEngine, OcrEngineError, TesseractEngine};
