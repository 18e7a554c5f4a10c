//! Output and logging configuration.

use clap::Args;
use serde::{Deserialize, Serialize};

/// Controls how the report and the logs are written.
#[derive(Debug, Clone, Default, Args, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Prints the report as JSON instead of text.
    #[arg(long, env = "TANDEM_JSON")]
    #[serde(default)]
    pub json: bool,

    /// Writes logs as JSON lines.
    #[arg(long, env = "TANDEM_LOG_JSON")]
    #[serde(default)]
    pub log_json: bool,
}
