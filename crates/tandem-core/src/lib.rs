#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod algorithm;
pub mod cache;
pub mod connection;
pub mod context;
mod error;
pub mod params;
pub mod plugin;
mod timing;

#[doc(hidden)]
pub mod prelude;

pub use error::{BoxedError, Error, Result};
pub use timing::Timing;

/// Tracing target for diagnostic lines reported by algorithms.
pub const TRACING_TARGET_DIAGNOSTICS: &str = "tandem_core::diagnostics";

/// Tracing target for algorithm executions.
pub const TRACING_TARGET_ALGORITHM: &str = "tandem_core::algorithm";

/// Tracing target for connection cache operations.
pub const TRACING_TARGET_CACHE: &str = "tandem_core::cache";
