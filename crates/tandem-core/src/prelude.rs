//! Convenient re-exports for common use.

pub use crate::algorithm::{Algorithm, Derived, Describe, Origin, SelectAlgorithm};
pub use crate::cache::{CacheConfig, CacheStats, ConnectionCache};
pub use crate::connection::{Connection, ConnectionStore, IdentityPair, MemoryStore, Slot};
pub use crate::context::{BufferedDiagnostics, Diagnostics, PluginContext, TracingDiagnostics};
pub use crate::error::{BoxedError, Error, Result};
pub use crate::params::{BaseParameters, ParameterBundle};
pub use crate::plugin::{Plugin, PluginDescriptor};
pub use crate::timing::Timing;
