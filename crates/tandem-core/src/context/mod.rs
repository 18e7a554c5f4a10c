//! Run-time context handed to algorithms.
//!
//! The context is opaque to the core: algorithms only use it to reach the
//! diagnostic sink. Hosts use it to tag runs with an identifier.

mod diagnostics;

use std::sync::Arc;

pub use diagnostics::{BufferedDiagnostics, Diagnostics, TracingDiagnostics};
use jiff::Timestamp;
use uuid::Uuid;

/// Context for algorithm invocations.
///
/// Cloning is cheap: clones share the same diagnostic sink.
#[derive(Clone)]
pub struct PluginContext {
    /// Unique identifier for this context.
    context_id: Uuid,
    /// Context creation timestamp.
    created_at: Timestamp,
    /// Sink receiving free-text progress lines.
    diagnostics: Arc<dyn Diagnostics>,
}

impl PluginContext {
    /// Creates a new context reporting diagnostics through `tracing`.
    pub fn new() -> Self {
        Self {
            context_id: Uuid::now_v7(),
            created_at: Timestamp::now(),
            diagnostics: Arc::new(TracingDiagnostics::new()),
        }
    }

    /// Replaces the diagnostic sink.
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Returns the context identifier.
    pub fn context_id(&self) -> Uuid {
        self.context_id
    }

    /// Returns the context creation timestamp.
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Returns the diagnostic sink.
    pub fn diagnostics(&self) -> &dyn Diagnostics {
        self.diagnostics.as_ref()
    }

    /// Reports a progress line to the diagnostic sink.
    pub fn report(&self, line: impl AsRef<str>) {
        self.diagnostics.report(line.as_ref());
    }
}

impl Default for PluginContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PluginContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginContext")
            .field("context_id", &self.context_id)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_reaches_sink() {
        let sink = Arc::new(BufferedDiagnostics::new());
        let ctx = PluginContext::new().with_diagnostics(sink.clone());

        ctx.report("first");
        ctx.report(String::from("second"));

        assert_eq!(sink.lines(), vec!["first", "second"]);
    }

    #[test]
    fn test_clones_share_sink_and_identity() {
        let sink = Arc::new(BufferedDiagnostics::new());
        let ctx = PluginContext::new().with_diagnostics(sink.clone());
        let clone = ctx.clone();

        clone.report("from clone");

        assert_eq!(ctx.context_id(), clone.context_id());
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_distinct_contexts_have_distinct_ids() {
        assert_ne!(
            PluginContext::new().context_id(),
            PluginContext::new().context_id()
        );
    }
}
