//! Flag-driven selection between two derived outputs.

use std::fmt;
use std::marker::PhantomData;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

use super::{Algorithm, Describe};
use crate::TRACING_TARGET_ALGORITHM;
use crate::connection::Slot;
use crate::context::PluginContext;
use crate::error::{Error, Result};
use crate::params::ParameterBundle;
use crate::timing::Timing;

/// Which input an output was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(AsRefStr, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Origin {
    /// Derived from the first input.
    First,
    /// Derived from the second input.
    Second,
}

/// Output derived from one of the two inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Derived {
    /// Input the output was derived from.
    origin: Origin,
    /// String form of that input.
    source: String,
}

impl Derived {
    /// Creates an output derived from the input at `origin`.
    pub fn new(origin: Origin, source: impl Into<String>) -> Self {
        Self {
            origin,
            source: source.into(),
        }
    }

    /// Returns which input this output was derived from.
    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Returns the string form of the originating input.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the display form `derived from <input>`.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Derived {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "derived from {}", self.source)
    }
}

/// Selects the output derived from the first input when the flag is set,
/// and the output derived from the second input otherwise.
///
/// Both candidates are computed before the selection. `count` and `label`
/// do not influence the choice; they are passed through to the diagnostics
/// untouched.
pub struct SelectAlgorithm<A: ?Sized, B: ?Sized> {
    _inputs: PhantomData<fn(&A, &B)>,
}

impl<A: ?Sized, B: ?Sized> SelectAlgorithm<A, B> {
    /// Algorithm name used in logs.
    pub const NAME: &'static str = "select";

    /// Creates the algorithm.
    pub fn new() -> Self {
        Self {
            _inputs: PhantomData,
        }
    }
}

impl<A: ?Sized, B: ?Sized> Default for SelectAlgorithm<A, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ?Sized, B: ?Sized> Clone for SelectAlgorithm<A, B> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<A: ?Sized, B: ?Sized> fmt::Debug for SelectAlgorithm<A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectAlgorithm").finish()
    }
}

impl<A, B> Algorithm for SelectAlgorithm<A, B>
where
    A: Describe + Send + Sync + 'static,
    B: Describe + Send + Sync + 'static,
{
    type First = A;
    type Second = B;
    type Output = Derived;

    fn name(&self) -> &str {
        Self::NAME
    }

    fn run(
        &self,
        ctx: &PluginContext,
        first: &A,
        second: &B,
        parameters: &ParameterBundle,
    ) -> Result<Derived> {
        let started_at = Timestamp::now();
        ctx.report("selection started");

        let first_str = first
            .describe()
            .map_err(|e| Error::malformed_input(Slot::FirstInput, e))?;
        ctx.report(format!("first input: {first_str}"));

        let second_str = second
            .describe()
            .map_err(|e| Error::malformed_input(Slot::SecondInput, e))?;
        ctx.report(format!("second input: {second_str}"));

        ctx.report(format!("parameters: {}", parameters.render()));

        let from_first = Derived::new(Origin::First, first_str);
        let from_second = Derived::new(Origin::Second, second_str);
        let output = if parameters.flag() {
            from_first
        } else {
            from_second
        };
        ctx.report(format!("output: {}", output.render()));

        let timing = Timing::since(started_at);
        ctx.report(format!("elapsed: {:.6} s", timing.elapsed_secs()));

        tracing::debug!(
            target: TRACING_TARGET_ALGORITHM,
            context_id = %ctx.context_id(),
            origin = %output.origin(),
            flag = parameters.flag(),
            elapsed_secs = timing.elapsed_secs(),
            "selection completed"
        );

        Ok(output)
    }
}
