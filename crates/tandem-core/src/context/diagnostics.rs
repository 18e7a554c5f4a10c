//! Diagnostic sinks for algorithm progress lines.

use std::sync::{Mutex, PoisonError};

use crate::TRACING_TARGET_DIAGNOSTICS;

/// A sink accepting free-text progress lines.
pub trait Diagnostics: Send + Sync {
    /// Records one progress line.
    fn report(&self, line: &str);
}

/// Emits every line as a `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl TracingDiagnostics {
    /// Creates a new tracing sink.
    pub fn new() -> Self {
        Self
    }
}

impl Diagnostics for TracingDiagnostics {
    fn report(&self, line: &str) {
        tracing::info!(target: TRACING_TARGET_DIAGNOSTICS, "{line}");
    }
}

/// Collects lines in memory.
///
/// Useful when the host wants to display the progress of a run after the
/// fact, and in tests asserting on the reported lines.
#[derive(Debug, Default)]
pub struct BufferedDiagnostics {
    lines: Mutex<Vec<String>>,
}

impl BufferedDiagnostics {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the collected lines.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Takes the collected lines, leaving the buffer empty.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Returns the number of collected lines.
    pub fn len(&self) -> usize {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns true if no lines were collected.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Diagnostics for BufferedDiagnostics {
    fn report(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_owned());
    }
}
