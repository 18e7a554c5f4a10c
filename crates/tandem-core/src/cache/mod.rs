//! Connection cache between an algorithm and its callers.
//!
//! The cache keeps one current [`Connection`] per identity pair and decides,
//! for every request, whether that connection may be reused:
//!
//! ```text
//! Absent ──────────────── run, store ─────────────▶ Cached(c)
//! Cached(c), c accepts desired ── reuse c.output ──▶ Cached(c)
//! Cached(c), c rejects desired ── run, replace ────▶ Cached(c')
//! ```
//!
//! Each request holds a per-pair lock for the whole probe, compare and
//! (run, store) sequence, so a pair never has two computations in flight and
//! a request that waited re-evaluates acceptance against the fresh result.
//! Requests on distinct pairs only contend for the run permits configured in
//! [`CacheConfig::max_concurrent_runs`].

mod config;
mod stats;

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

pub use config::{CacheConfig, CacheConfigBuilder, CacheConfigBuilderError};
use jiff::Timestamp;
pub use stats::CacheStats;
use stats::StatsCounters;
use tokio::sync::{Mutex as AsyncMutex, MutexGuard, Semaphore};

use crate::TRACING_TARGET_CACHE;
use crate::algorithm::Algorithm;
use crate::connection::{Connection, ConnectionStore, IdentityPair, MemoryStore};
use crate::context::PluginContext;
use crate::error::{Error, Result};
use crate::params::ParameterBundle;
use crate::timing::Timing;

/// Connection type produced by algorithm `A`.
pub type ConnectionOf<A> =
    Connection<<A as Algorithm>::First, <A as Algorithm>::Second, <A as Algorithm>::Output>;

/// Store type holding connections produced by algorithm `A`.
pub type StoreOf<A> = dyn ConnectionStore<
        <A as Algorithm>::First,
        <A as Algorithm>::Second,
        <A as Algorithm>::Output,
    >;

/// Caches the outputs of an algorithm per identity pair and parameter bundle.
///
/// The cache lives as long as its owning context and never evicts on its
/// own; connections leave only when replaced, invalidated or cleared.
pub struct ConnectionCache<A: Algorithm> {
    algorithm: A,
    context: PluginContext,
    config: CacheConfig,
    store: Arc<StoreOf<A>>,
    pair_locks: Mutex<HashMap<IdentityPair, Arc<AsyncMutex<()>>>>,
    run_permits: Semaphore,
    stats: StatsCounters,
}

impl<A: Algorithm> ConnectionCache<A> {
    /// Creates a cache with the default configuration and an in-memory store.
    pub fn new(algorithm: A) -> Self {
        Self::build(algorithm, CacheConfig::default())
    }

    /// Creates a cache with the given configuration and an in-memory store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration is invalid.
    pub fn with_config(algorithm: A, config: CacheConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(algorithm, config))
    }

    fn build(algorithm: A, config: CacheConfig) -> Self {
        tracing::info!(
            target: TRACING_TARGET_CACHE,
            algorithm = algorithm.name(),
            reuse_connections = config.reuse_connections,
            max_concurrent_runs = config.max_concurrent_runs,
            "connection cache initialized"
        );

        Self {
            run_permits: Semaphore::new(config.max_concurrent_runs),
            algorithm,
            context: PluginContext::new(),
            config,
            store: Arc::new(MemoryStore::<A::First, A::Second, A::Output>::new()),
            pair_locks: Mutex::new(HashMap::new()),
            stats: StatsCounters::default(),
        }
    }

    /// Replaces the context handed to the algorithm.
    pub fn with_context(mut self, context: PluginContext) -> Self {
        self.context = context;
        self
    }

    /// Replaces the connection store.
    pub fn with_store(mut self, store: Arc<StoreOf<A>>) -> Self {
        self.store = store;
        self
    }

    /// Returns the algorithm.
    pub fn algorithm(&self) -> &A {
        &self.algorithm
    }

    /// Returns the context handed to the algorithm.
    pub fn context(&self) -> &PluginContext {
        &self.context
    }

    /// Returns the cache configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Returns a snapshot of the cache counters.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    /// Returns the number of stored connections.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns true if no connections are stored.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Returns the output for `(first, second)` computed with `desired`.
    ///
    /// Reuses the stored connection for the pair when its parameters equal
    /// `desired`; otherwise runs the algorithm and replaces the stored
    /// connection with the new one. The cache keeps its own copy of
    /// `desired`.
    ///
    /// # Errors
    ///
    /// Propagates algorithm failures. A failed computation stores nothing and
    /// leaves the pair as it was before the request.
    pub async fn accept_or_recompute(
        &self,
        first: &Arc<A::First>,
        second: &Arc<A::Second>,
        desired: &ParameterBundle,
    ) -> Result<Arc<A::Output>> {
        let key = IdentityPair::of(first, second);
        let pair_lock = self.pair_lock(key);
        let _guard = pair_lock.lock().await;

        self.resolve(key, first, second, desired).await
    }

    /// Returns the current connection for `(first, second)` without computing.
    pub fn lookup(
        &self,
        first: &Arc<A::First>,
        second: &Arc<A::Second>,
    ) -> Option<Arc<ConnectionOf<A>>> {
        self.store.get(&IdentityPair::of(first, second))
    }

    /// Drops the current connection for `(first, second)`.
    ///
    /// Waits for an in-flight computation on the pair to finish first, so the
    /// connection it stores is the one removed. Returns true if a connection
    /// was removed.
    pub async fn invalidate(&self, first: &Arc<A::First>, second: &Arc<A::Second>) -> bool {
        let key = IdentityPair::of(first, second);
        let removed = {
            let pair_lock = self.pair_lock(key);
            let _guard = pair_lock.lock().await;
            self.store.remove(&key)
        };

        if let Some(connection) = &removed {
            tracing::debug!(
                target: TRACING_TARGET_CACHE,
                pair = %key,
                connection_id = %connection.id(),
                "connection invalidated"
            );
        }

        removed.is_some()
    }

    /// Drops every stored connection.
    pub fn clear(&self) {
        let count = self.store.len();
        self.store.clear();

        tracing::debug!(
            target: TRACING_TARGET_CACHE,
            count,
            "connection cache cleared"
        );
    }

    /// Probes the store and either reuses or recomputes.
    ///
    /// Must only be called while holding the pair lock for `key`.
    async fn resolve(
        &self,
        key: IdentityPair,
        first: &Arc<A::First>,
        second: &Arc<A::Second>,
        desired: &ParameterBundle,
    ) -> Result<Arc<A::Output>> {
        match self.store.get(&key) {
            Some(connection) if self.config.reuse_connections && connection.accepts(desired) => {
                self.stats.record_hit();
                tracing::debug!(
                    target: TRACING_TARGET_CACHE,
                    pair = %key,
                    connection_id = %connection.id(),
                    "connection accepted"
                );
                return Ok(Arc::clone(connection.output()));
            }
            Some(connection) => {
                self.stats.record_rejection();
                tracing::debug!(
                    target: TRACING_TARGET_CACHE,
                    pair = %key,
                    connection_id = %connection.id(),
                    stored = %connection.parameters(),
                    desired = %desired,
                    "connection rejected"
                );
            }
            None => {
                self.stats.record_miss();
                tracing::trace!(
                    target: TRACING_TARGET_CACHE,
                    pair = %key,
                    "no connection stored"
                );
            }
        }

        let connection = Arc::new(self.compute(first, second, desired).await?);
        let output = Arc::clone(connection.output());
        let connection_id = connection.id();

        if let Some(replaced) = self.store.put(connection) {
            tracing::debug!(
                target: TRACING_TARGET_CACHE,
                pair = %key,
                connection_id = %connection_id,
                replaced_id = %replaced.id(),
                "connection replaced"
            );
        } else {
            tracing::debug!(
                target: TRACING_TARGET_CACHE,
                pair = %key,
                connection_id = %connection_id,
                "connection stored"
            );
        }

        Ok(output)
    }

    /// Runs the algorithm and wraps its output in a new connection.
    async fn compute(
        &self,
        first: &Arc<A::First>,
        second: &Arc<A::Second>,
        desired: &ParameterBundle,
    ) -> Result<ConnectionOf<A>> {
        let _permit = self
            .run_permits
            .acquire()
            .await
            .map_err(|e| Error::Internal(format!("semaphore closed: {e}")))?;

        self.stats.record_computation();
        let started_at = Timestamp::now();

        match self.algorithm.run(&self.context, first, second, desired) {
            Ok(output) => {
                let timing = Timing::since(started_at);
                tracing::debug!(
                    target: TRACING_TARGET_CACHE,
                    algorithm = self.algorithm.name(),
                    elapsed_secs = timing.elapsed_secs(),
                    "algorithm completed"
                );

                Ok(Connection::new(
                    Arc::clone(first),
                    Arc::clone(second),
                    Arc::new(output),
                    desired,
                    timing,
                ))
            }
            Err(error) => {
                self.stats.record_failure();
                tracing::warn!(
                    target: TRACING_TARGET_CACHE,
                    algorithm = self.algorithm.name(),
                    error = %error,
                    "algorithm failed"
                );
                Err(error)
            }
        }
    }

    /// Returns the lock serializing requests on `key`, creating it if needed.
    ///
    /// The table entry is pruned when the last handle for `key` is dropped,
    /// including when the request is cancelled or the algorithm panics.
    fn pair_lock(&self, key: IdentityPair) -> PairLockHandle<'_, A> {
        let mut locks = self
            .pair_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let lock = Arc::clone(locks.entry(key).or_default());

        PairLockHandle {
            cache: self,
            key,
            lock,
        }
    }
}

/// Shared handle to the lock of one identity pair.
struct PairLockHandle<'a, A: Algorithm> {
    cache: &'a ConnectionCache<A>,
    key: IdentityPair,
    lock: Arc<AsyncMutex<()>>,
}

impl<A: Algorithm> PairLockHandle<'_, A> {
    async fn lock(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().await
    }
}

impl<A: Algorithm> Drop for PairLockHandle<'_, A> {
    fn drop(&mut self) {
        let mut locks = self
            .cache
            .pair_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        // The table and this handle are the only holders.
        if Arc::strong_count(&self.lock) == 2 {
            locks.remove(&self.key);
        }
    }
}

impl<A: Algorithm> fmt::Debug for ConnectionCache<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionCache")
            .field("algorithm", &self.algorithm.name())
            .field("context", &self.context)
            .field("config", &self.config)
            .field("connections", &self.store.len())
            .field("stats", &self.stats.snapshot())
            .finish()
    }
}
