//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── request: RequestConfig   # Inputs, overrides, repeat count
//! ├── cache: CacheConfig       # Connection reuse, concurrent runs
//! └── output: OutputConfig     # JSON report, JSON logs
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.
//!
//! # Example
//!
//! ```bash
//! tandem --first AA --second B --repeat 3
//!
//! # Or via environment variables
//! TANDEM_FIRST=AA TANDEM_SECOND=B TANDEM_REPEAT=3 tandem
//! ```

mod output;
mod request;

use std::process;

use anyhow::Context;
use clap::Parser;
pub use output::OutputConfig;
pub use request::RequestConfig;
use serde::{Deserialize, Serialize};
use tandem_core::cache::CacheConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "tandem")]
#[command(about = "Runs a two-input plugin through the connection cache")]
#[command(version)]
pub struct Cli {
    /// Inputs and parameter overrides.
    #[clap(flatten)]
    pub request: RequestConfig,

    /// Connection cache configuration.
    #[clap(flatten)]
    pub cache: CacheConfig,

    /// Report and log formatting.
    #[clap(flatten)]
    pub output: OutputConfig,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with environment-based filtering.
    ///
    /// Logs go to stderr so that stdout only carries the report.
    pub fn init_tracing(&self) -> anyhow::Result<()> {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new("info"))
            .context("failed to create env filter")?;

        let layer = if self.output.log_json {
            fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .boxed()
        };

        tracing_subscriber::registry()
            .with(layer)
            .with(filter)
            .try_init()
            .context("failed to initialize tracing")?;

        Ok(())
    }

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.request
            .validate()
            .context("invalid request configuration")?;
        self.cache
            .validate()
            .context("invalid cache configuration")?;
        Ok(())
    }

    /// Logs configuration.
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "build information"
        );

        self.request.log();

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            reuse_connections = self.cache.reuse_connections,
            max_concurrent_runs = self.cache.max_concurrent_runs,
            json = self.output.json,
            "cache configuration"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}
