//! Connection stores keyed by input identity.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use super::{Connection, IdentityPair};

/// Store holding at most one current connection per identity pair.
///
/// This is the narrow interface a cache needs from its host: lookup and
/// replacement by key. Atomicity of probe-then-replace sequences is the
/// cache's job, not the store's.
pub trait ConnectionStore<A, B, O>: Send + Sync {
    /// Returns the current connection for `key`.
    fn get(&self, key: &IdentityPair) -> Option<Arc<Connection<A, B, O>>>;

    /// Stores `connection` under its identity, returning the one it replaced.
    fn put(&self, connection: Arc<Connection<A, B, O>>) -> Option<Arc<Connection<A, B, O>>>;

    /// Removes the connection for `key`, returning it.
    fn remove(&self, key: &IdentityPair) -> Option<Arc<Connection<A, B, O>>>;

    /// Removes every connection.
    fn clear(&self);

    /// Returns the number of stored connections.
    fn len(&self) -> usize;

    /// Returns true if no connections are stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory connection store.
pub struct MemoryStore<A, B, O> {
    connections: RwLock<HashMap<IdentityPair, Arc<Connection<A, B, O>>>>,
}

impl<A, B, O> MemoryStore<A, B, O> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }
}

impl<A, B, O> Default for MemoryStore<A, B, O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, B, O> ConnectionStore<A, B, O> for MemoryStore<A, B, O>
where
    A: Send + Sync,
    B: Send + Sync,
    O: Send + Sync,
{
    fn get(&self, key: &IdentityPair) -> Option<Arc<Connection<A, B, O>>> {
        self.connections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn put(&self, connection: Arc<Connection<A, B, O>>) -> Option<Arc<Connection<A, B, O>>> {
        self.connections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(connection.identity(), connection)
    }

    fn remove(&self, key: &IdentityPair) -> Option<Arc<Connection<A, B, O>>> {
        self.connections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
    }

    fn clear(&self) {
        self.connections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn len(&self) -> usize {
        self.connections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl<A, B, O> fmt::Debug for MemoryStore<A, B, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self
            .connections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        f.debug_struct("MemoryStore")
            .field("connections", &len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;
    use crate::Timing;
    use crate::params::ParameterBundle;

    type Store = MemoryStore<String, String, String>;

    fn connection(
        first: &Arc<String>,
        second: &Arc<String>,
        flag: bool,
    ) -> Arc<Connection<String, String, String>> {
        Arc::new(Connection::new(
            Arc::clone(first),
            Arc::clone(second),
            Arc::new(format!("flag={flag}")),
            &ParameterBundle::new(flag, 0, ""),
            Timing::since(Timestamp::now()),
        ))
    }

    #[test]
    fn test_put_then_get() {
        let store = Store::new();
        let (first, second) = (Arc::new("a".to_owned()), Arc::new("b".to_owned()));
        let stored = connection(&first, &second, false);

        assert!(store.put(Arc::clone(&stored)).is_none());

        let found = store.get(&IdentityPair::of(&first, &second)).unwrap();
        assert_eq!(found.id(), stored.id());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_put_replaces_current_connection() {
        let store = Store::new();
        let (first, second) = (Arc::new("a".to_owned()), Arc::new("b".to_owned()));
        let old = connection(&first, &second, false);
        let new = connection(&first, &second, true);

        store.put(Arc::clone(&old));
        let replaced = store.put(Arc::clone(&new)).unwrap();

        assert_eq!(replaced.id(), old.id());
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.get(&IdentityPair::of(&first, &second)).unwrap().id(),
            new.id()
        );
    }

    #[test]
    fn test_keys_are_identity_based() {
        let store = Store::new();
        let (first, second) = (Arc::new("a".to_owned()), Arc::new("b".to_owned()));
        let twin = Arc::new("a".to_owned());

        store.put(connection(&first, &second, false));

        assert!(store.get(&IdentityPair::of(&twin, &second)).is_none());
    }

    #[test]
    fn test_remove_and_clear() {
        let store = Store::new();
        let (a, b, c) = (
            Arc::new("a".to_owned()),
            Arc::new("b".to_owned()),
            Arc::new("c".to_owned()),
        );
        store.put(connection(&a, &b, false));
        store.put(connection(&a, &c, false));

        assert!(store.remove(&IdentityPair::of(&a, &b)).is_some());
        assert!(store.remove(&IdentityPair::of(&a, &b)).is_none());
        assert_eq!(store.len(), 1);

        store.clear();
        assert!(store.is_empty());
    }
}
