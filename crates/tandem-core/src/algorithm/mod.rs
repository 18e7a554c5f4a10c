//! Algorithms computing an output from two inputs.
//!
//! This module provides:
//! - [`Algorithm`]: the computation contract
//! - [`Describe`]: string forms of inputs
//! - [`SelectAlgorithm`]: selects an output derived from one of the inputs

mod describe;
mod select;

pub use describe::Describe;
pub use select::{Derived, Origin, SelectAlgorithm};

use crate::context::PluginContext;
use crate::error::Result;
use crate::params::ParameterBundle;

/// A stateless computation over two inputs and a parameter bundle.
///
/// Implementations must be deterministic: identical inputs and parameters
/// always produce the same output, and no state outside the parameters is
/// consulted. The context is only used to report progress lines.
///
/// `run` is synchronous and is never interrupted once started.
pub trait Algorithm: Send + Sync + 'static {
    /// Type of the first input.
    type First: Send + Sync + 'static;
    /// Type of the second input.
    type Second: Send + Sync + 'static;
    /// Type of the computed output.
    type Output: Send + Sync + 'static;

    /// Returns a short name used in logs.
    fn name(&self) -> &str;

    /// Computes the output for the given inputs and parameters.
    ///
    /// # Errors
    ///
    /// Failures propagate to the caller unchanged; the algorithm never
    /// retries internally.
    fn run(
        &self,
        ctx: &PluginContext,
        first: &Self::First,
        second: &Self::Second,
        parameters: &ParameterBundle,
    ) -> Result<Self::Output>;
}
