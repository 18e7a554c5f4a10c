//! Sends the configured requests through a plugin and collects a report.

use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;
use tandem_core::algorithm::{Derived, Origin, SelectAlgorithm};
use tandem_core::cache::CacheStats;
use tandem_core::context::BufferedDiagnostics;
use tandem_core::params::ParameterBundle;
use tandem_core::plugin::{Plugin, PluginDescriptor};

use crate::TRACING_TARGET_RUNNER;
use crate::config::RequestConfig;

/// Plugin driven by the harness.
pub type SelectPlugin = Plugin<SelectAlgorithm<String, String>>;

/// Result of a single request.
#[derive(Debug, Clone, Serialize)]
pub struct RequestOutcome {
    /// One-based request index.
    pub index: usize,
    /// Render form of the requested parameters.
    pub parameters: String,
    /// Render form of the output.
    pub output: String,
    /// Which input the output was derived from.
    pub origin: Origin,
    /// Whether the algorithm ran for this request.
    pub computed: bool,
    /// Diagnostic lines reported while serving the request.
    pub diagnostics: Vec<String>,
}

/// Everything the harness prints.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Descriptor of the plugin that served the requests.
    pub plugin: PluginDescriptor,
    /// Bundle derived from the inputs, before any override.
    pub derived: ParameterBundle,
    /// Outcomes in the order the requests were sent.
    pub requests: Vec<RequestOutcome>,
    /// Cache counters after the last request.
    pub stats: CacheStats,
}

impl Report {
    /// Renders the report as text.
    pub fn to_text(&self) -> String {
        let mut lines = vec![format!(
            "{} {}: derived {}",
            self.plugin.name,
            self.plugin.version,
            self.derived.render()
        )];

        for outcome in &self.requests {
            let state = if outcome.computed { "computed" } else { "reused" };
            lines.push(format!(
                "request {}: {} -> {} [{state}]",
                outcome.index, outcome.parameters, outcome.output
            ));
            lines.extend(outcome.diagnostics.iter().map(|line| format!("  {line}")));
        }

        lines.push(format!(
            "cache: {} requests, {} hits ({:.0}%), {} misses, {} rejections, {} computations, {} failures",
            self.stats.requests(),
            self.stats.hits,
            self.stats.hit_ratio() * 100.0,
            self.stats.misses,
            self.stats.rejections,
            self.stats.computations,
            self.stats.failures
        ));

        lines.join("\n")
    }

    /// Renders the report as pretty-printed JSON.
    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize report")
    }
}

/// Drives requests through one plugin.
pub struct Runner {
    plugin: SelectPlugin,
    diagnostics: Arc<BufferedDiagnostics>,
}

impl Runner {
    /// Creates a runner whose plugin reports into `diagnostics`.
    pub fn new(plugin: SelectPlugin, diagnostics: Arc<BufferedDiagnostics>) -> Self {
        Self {
            plugin,
            diagnostics,
        }
    }

    /// Returns the descriptor the harness registers its plugin under.
    pub fn descriptor() -> PluginDescriptor {
        PluginDescriptor::new(
            SelectAlgorithm::<String, String>::NAME,
            "Selects the output derived from the first input when the flag is set, the second otherwise",
        )
        .with_author(env!("CARGO_PKG_AUTHORS"))
    }

    /// Sends `repeat` requests with the configured parameters, then the
    /// optional flag-flipped request.
    pub async fn execute(&self, request: &RequestConfig) -> anyhow::Result<Report> {
        let first = Arc::new(request.first.clone());
        let second = Arc::new(request.second.clone());

        let derived = self
            .plugin
            .derive_parameters(&first, &second)
            .context("failed to derive parameters")?;
        let desired = request.apply(self.plugin.copy_parameters(&derived));

        let mut bundles = vec![desired.clone(); request.repeat];
        if let Some(flag) = request.then_flag {
            bundles.push(desired.with_flag(flag));
        }

        let mut requests = Vec::with_capacity(bundles.len());
        for (index, bundle) in bundles.iter().enumerate() {
            let before = self.plugin.stats().computations;
            let output = self
                .plugin
                .connect(&first, &second, bundle)
                .await
                .with_context(|| format!("request {} failed", index + 1))?;

            let outcome = self.outcome(index + 1, bundle, &output, before);
            tracing::debug!(
                target: TRACING_TARGET_RUNNER,
                index = outcome.index,
                computed = outcome.computed,
                output = %outcome.output,
                "request served"
            );
            requests.push(outcome);
        }

        Ok(Report {
            plugin: self.plugin.descriptor().clone(),
            derived,
            requests,
            stats: self.plugin.stats(),
        })
    }

    fn outcome(
        &self,
        index: usize,
        bundle: &ParameterBundle,
        output: &Derived,
        computations_before: u64,
    ) -> RequestOutcome {
        RequestOutcome {
            index,
            parameters: bundle.render(),
            output: output.render(),
            origin: output.origin(),
            computed: self.plugin.stats().computations > computations_before,
            diagnostics: self.diagnostics.take(),
        }
    }
}

#[cfg(test)]
mod tests {
    use tandem_core::cache::{CacheConfig, ConnectionCache};
    use tandem_core::context::PluginContext;

    use super::*;

    fn runner(config: CacheConfig) -> Runner {
        let diagnostics = Arc::new(BufferedDiagnostics::new());
        let context = PluginContext::new().with_diagnostics(diagnostics.clone());
        let cache = ConnectionCache::with_config(SelectAlgorithm::new(), config)
            .unwrap()
            .with_context(context);

        Runner::new(Plugin::new(Runner::descriptor(), cache), diagnostics)
    }

    fn request(first: &str, second: &str) -> RequestConfig {
        RequestConfig {
            first: first.to_owned(),
            second: second.to_owned(),
            flag: None,
            count: None,
            label: None,
            base: Vec::new(),
            repeat: 2,
            then_flag: None,
        }
    }

    #[tokio::test]
    async fn test_second_request_is_reused() {
        let report = runner(CacheConfig::default())
            .execute(&request("AA", "B"))
            .await
            .unwrap();

        assert_eq!(report.derived.render(), "(AAB,1,false)");
        assert_eq!(report.requests.len(), 2);

        let (first, second) = (&report.requests[0], &report.requests[1]);
        assert!(first.computed);
        assert_eq!(first.output, "derived from B");
        assert_eq!(first.diagnostics.len(), 6);
        assert_eq!(first.diagnostics[0], "selection started");
        assert!(!second.computed);
        assert!(second.diagnostics.is_empty());

        assert_eq!(report.stats.hits, 1);
        assert_eq!(report.stats.computations, 1);
    }

    #[tokio::test]
    async fn test_then_flag_recomputes() {
        let config = RequestConfig {
            flag: Some(true),
            then_flag: Some(false),
            ..request("AA", "B")
        };

        let report = runner(CacheConfig::default())
            .execute(&config)
            .await
            .unwrap();

        let last = report.requests.last().unwrap();
        assert_eq!(report.requests.len(), 3);
        assert_eq!(last.parameters, "(AAB,1,false)");
        assert!(last.computed);
        assert_eq!(report.stats.rejections, 1);
        assert_eq!(report.stats.computations, 2);
    }

    #[tokio::test]
    async fn test_reuse_disabled_computes_every_request() {
        let config = CacheConfig {
            reuse_connections: false,
            ..CacheConfig::default()
        };

        let report = runner(config).execute(&request("A", "BB")).await.unwrap();

        assert!(report.requests.iter().all(|outcome| outcome.computed));
        assert_eq!(report.stats.computations, 2);
    }

    #[test]
    fn test_descriptor_matches_selection_rule() {
        let descriptor = Runner::descriptor();

        assert_eq!(descriptor.name, SelectAlgorithm::<String, String>::NAME);
        assert!(descriptor.description.contains("first input when the flag is set"));
    }

    #[tokio::test]
    async fn test_report_renders_text_and_json() {
        let report = runner(CacheConfig::default())
            .execute(&request("xyz", "ab"))
            .await
            .unwrap();

        let text = report.to_text();
        assert!(text.contains("request 1: (xyzab,1,false) -> derived from ab [computed]"));
        assert!(text.contains("request 2: (xyzab,1,false) -> derived from ab [reused]"));
        assert!(text.contains("1 hits"));

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["requests"][0]["origin"], "second");
        assert_eq!(json["stats"]["computations"], 1);
    }
}
