//! Adapter exposing a cached algorithm to a host.
//!
//! A host registers a [`Plugin`] under its [`PluginDescriptor`] and calls the
//! operations below directly; discovery and registration stay on the host
//! side.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_ALGORITHM;
use crate::algorithm::{Algorithm, Describe};
use crate::cache::{CacheStats, ConnectionCache};
use crate::error::Result;
use crate::params::ParameterBundle;

/// Metadata a host displays and registers a plugin under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDescriptor {
    /// Plugin name.
    pub name: String,
    /// One-line description.
    pub description: String,
    /// Plugin version.
    pub version: String,
    /// Plugin author.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl PluginDescriptor {
    /// Creates a descriptor versioned like this crate.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
            author: None,
        }
    }

    /// Sets the version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Sets the author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }
}

/// A cached algorithm together with its descriptor.
pub struct Plugin<A: Algorithm> {
    descriptor: PluginDescriptor,
    cache: ConnectionCache<A>,
}

impl<A: Algorithm> Plugin<A> {
    /// Creates a plugin around `cache`.
    pub fn new(descriptor: PluginDescriptor, cache: ConnectionCache<A>) -> Self {
        tracing::debug!(
            target: TRACING_TARGET_ALGORITHM,
            plugin = %descriptor.name,
            version = %descriptor.version,
            algorithm = cache.algorithm().name(),
            "plugin created"
        );

        Self { descriptor, cache }
    }

    /// Returns the descriptor.
    pub fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    /// Returns the connection cache.
    pub fn cache(&self) -> &ConnectionCache<A> {
        &self.cache
    }

    /// Returns a snapshot of the cache counters.
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Derives the default parameters for two inputs.
    pub fn derive_parameters(
        &self,
        first: &A::First,
        second: &A::Second,
    ) -> Result<ParameterBundle>
    where
        A::First: Describe + PartialEq<A::Second>,
        A::Second: Describe,
    {
        ParameterBundle::derive(first, second)
    }

    /// Returns an independent copy of `parameters`.
    pub fn copy_parameters(&self, parameters: &ParameterBundle) -> ParameterBundle {
        ParameterBundle::copy_of(parameters)
    }

    /// Runs the algorithm directly, bypassing the cache.
    pub fn run(
        &self,
        first: &A::First,
        second: &A::Second,
        parameters: &ParameterBundle,
    ) -> Result<A::Output> {
        self.cache
            .algorithm()
            .run(self.cache.context(), first, second, parameters)
    }

    /// Returns the output for the pair, reusing the stored connection when
    /// its parameters equal `desired`.
    pub async fn connect(
        &self,
        first: &Arc<A::First>,
        second: &Arc<A::Second>,
        desired: &ParameterBundle,
    ) -> Result<Arc<A::Output>> {
        self.cache.accept_or_recompute(first, second, desired).await
    }
}

impl<A: Algorithm> std::fmt::Debug for Plugin<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plugin")
            .field("descriptor", &self.descriptor)
            .field("cache", &self.cache)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::{Origin, SelectAlgorithm};

    fn plugin() -> Plugin<SelectAlgorithm<String, String>> {
        Plugin::new(
            PluginDescriptor::new("select", "Selects one of two inputs").with_author("tandem"),
            ConnectionCache::new(SelectAlgorithm::new()),
        )
    }

    #[test]
    fn test_descriptor_defaults_to_crate_version() {
        let descriptor = PluginDescriptor::new("select", "Selects one of two inputs");

        assert_eq!(descriptor.version, env!("CARGO_PKG_VERSION"));
        assert!(descriptor.author.is_none());
        assert_eq!(descriptor.with_version("2.0.0").version, "2.0.0");
    }

    #[test]
    fn test_run_bypasses_cache() {
        let plugin = plugin();
        let (first, second) = ("AA".to_owned(), "B".to_owned());
        let parameters = plugin.derive_parameters(&first, &second).unwrap();

        let output = plugin.run(&first, &second, &parameters).unwrap();

        assert_eq!(output.origin(), Origin::Second);
        assert_eq!(plugin.stats().computations, 0);
        assert!(plugin.cache().is_empty());
    }

    #[tokio::test]
    async fn test_connect_goes_through_cache() {
        let plugin = plugin();
        let first = Arc::new("AA".to_owned());
        let second = Arc::new("B".to_owned());
        let desired = plugin.derive_parameters(&first, &second).unwrap();
        let copy = plugin.copy_parameters(&desired);

        let output = plugin.connect(&first, &second, &desired).await.unwrap();
        let again = plugin.connect(&first, &second, &copy).await.unwrap();

        assert!(Arc::ptr_eq(&output, &again));
        assert_eq!(plugin.stats().computations, 1);
    }
}
