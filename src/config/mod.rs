// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Service configuration
//!
//! Built once at process start and handed to the router through `AppState`.
//! Precedence, lowest first: defaults, TOML file, environment / CLI flags.

pub mod service;

pub use service::{ConfigError, ServiceConfig};
