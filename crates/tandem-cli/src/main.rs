#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod runner;

use std::process;
use std::sync::Arc;

use anyhow::Context;
use tandem_core::algorithm::SelectAlgorithm;
use tandem_core::cache::ConnectionCache;
use tandem_core::context::{BufferedDiagnostics, PluginContext};
use tandem_core::plugin::Plugin;

use crate::config::Cli;
use crate::runner::Runner;

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "tandem_cli::startup";
pub const TRACING_TARGET_SHUTDOWN: &str = "tandem_cli::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "tandem_cli::config";
pub const TRACING_TARGET_RUNNER: &str = "tandem_cli::runner";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::debug!(
            target: TRACING_TARGET_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            error = %error,
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    cli.init_tracing()?;
    tracing::info!(
        target: TRACING_TARGET_STARTUP,
        version = env!("CARGO_PKG_VERSION"),
        "starting tandem"
    );
    cli.log();
    cli.validate()?;

    let runner = create_runner(&cli)?;
    let report = runner.execute(&cli.request).await?;

    if cli.output.json {
        println!("{}", report.to_json()?);
    } else {
        println!("{}", report.to_text());
    }

    Ok(())
}

/// Creates the runner with a cache reporting into an in-memory buffer.
fn create_runner(cli: &Cli) -> anyhow::Result<Runner> {
    let diagnostics = Arc::new(BufferedDiagnostics::new());
    let context = PluginContext::new().with_diagnostics(diagnostics.clone());

    let cache = ConnectionCache::with_config(SelectAlgorithm::new(), cli.cache.clone())
        .context("failed to create connection cache")?
        .with_context(context);

    Ok(Runner::new(Plugin::new(Runner::descriptor(), cache), diagnostics))
}
