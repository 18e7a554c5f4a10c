//! Request configuration.

use anyhow::{Result as AnyhowResult, anyhow};
use clap::Args;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tandem_core::params::{BaseParameters, ParameterBundle};

use crate::TRACING_TARGET_CONFIG;

/// Upper bound on `--repeat`.
const MAX_REPEAT: usize = 1000;

/// Inputs and parameter overrides for the requests sent through the cache.
///
/// # Environment Variables
///
/// - `TANDEM_FIRST` - First input
/// - `TANDEM_SECOND` - Second input
/// - `TANDEM_REPEAT` - Number of identical requests (default: 2, max: 1000)
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct RequestConfig {
    /// First input.
    #[arg(long, env = "TANDEM_FIRST")]
    pub first: String,

    /// Second input.
    #[arg(long, env = "TANDEM_SECOND")]
    pub second: String,

    /// Overrides the derived flag.
    #[arg(long)]
    #[serde(default)]
    pub flag: Option<bool>,

    /// Overrides the derived count.
    #[arg(long, allow_negative_numbers = true)]
    #[serde(default)]
    pub count: Option<i64>,

    /// Overrides the derived label.
    #[arg(long)]
    #[serde(default)]
    pub label: Option<String>,

    /// Base parameter as KEY=VALUE; VALUE is read as JSON, or as a plain
    /// string when it is not valid JSON. May be repeated.
    #[arg(long = "base", value_name = "KEY=VALUE", value_parser = parse_base_entry)]
    #[serde(default)]
    pub base: Vec<(String, Value)>,

    /// Number of identical requests to send.
    #[arg(long, env = "TANDEM_REPEAT", default_value_t = 2)]
    pub repeat: usize,

    /// Sends one more request with the flag set to this value.
    #[arg(long)]
    #[serde(default)]
    pub then_flag: Option<bool>,
}

impl RequestConfig {
    /// Validates the request configuration.
    pub fn validate(&self) -> AnyhowResult<()> {
        if self.repeat == 0 {
            return Err(anyhow!("repeat must be at least 1"));
        }

        if self.repeat > MAX_REPEAT {
            return Err(anyhow!(
                "repeat must not exceed {MAX_REPEAT}, got {}",
                self.repeat
            ));
        }

        Ok(())
    }

    /// Applies the configured overrides on top of the derived bundle.
    pub fn apply(&self, derived: ParameterBundle) -> ParameterBundle {
        let mut bundle = derived;

        if let Some(flag) = self.flag {
            bundle = bundle.with_flag(flag);
        }

        if let Some(count) = self.count {
            bundle = bundle.with_count(count);
        }

        if let Some(label) = &self.label {
            bundle = bundle.with_label(label.clone());
        }

        if !self.base.is_empty() {
            let base: BaseParameters = self.base.iter().cloned().collect();
            bundle = bundle.with_base(base);
        }

        bundle
    }

    /// Logs the request configuration.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            first_len = self.first.chars().count(),
            second_len = self.second.chars().count(),
            flag = ?self.flag,
            count = ?self.count,
            label = ?self.label,
            base_entries = self.base.len(),
            repeat = self.repeat,
            then_flag = ?self.then_flag,
            "request configuration"
        );
    }
}

/// Parses a `KEY=VALUE` base parameter entry.
fn parse_base_entry(entry: &str) -> Result<(String, Value), String> {
    let (key, raw) = entry
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{entry}`"))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in `{entry}`"));
    }

    let value =
        serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()));

    Ok((key.to_owned(), value))
}
