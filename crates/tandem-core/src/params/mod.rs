//! Parameter bundles steering a computation.
//!
//! - [`ParameterBundle`]: flag, count and label plus an opaque base set
//! - [`BaseParameters`]: host-defined parameters carried but not interpreted

mod base;
mod bundle;

pub use base::BaseParameters;
pub use bundle::ParameterBundle;
