//! Identity keys for input pairs and connections.

use std::sync::Arc;

use derive_more::{Debug, Display, From, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of an `(input1, input2)` pair.
///
/// Built from the addresses of the two shared allocations, so two pairs are
/// the same key only if they refer to the very same input objects; equal
/// values in different allocations are different keys.
///
/// A stored [`Connection`](super::Connection) holds both inputs alive, so an
/// address cannot be recycled by another object while a connection is keyed
/// by it.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Debug, Display)]
#[debug("IdentityPair({first:#x}, {second:#x})")]
#[display("({first:#x}, {second:#x})")]
pub struct IdentityPair {
    first: usize,
    second: usize,
}

impl IdentityPair {
    /// Returns the identity of the pair `(first, second)`.
    pub fn of<A: ?Sized, B: ?Sized>(first: &Arc<A>, second: &Arc<B>) -> Self {
        Self {
            first: Arc::as_ptr(first).addr(),
            second: Arc::as_ptr(second).addr(),
        }
    }

    /// Returns the address of the first input.
    pub fn first(&self) -> usize {
        self.first
    }

    /// Returns the address of the second input.
    pub fn second(&self) -> usize {
        self.second
    }
}

/// Unique identifier of a stored connection.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Debug, Display, From, Into)]
#[debug("{_0}")]
#[display("{_0}")]
#[serde(transparent)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Creates a new time-ordered connection ID.
    #[inline]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Returns the underlying UUID.
    #[inline]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_identity() {
        let first = Arc::new("AA".to_owned());
        let second = Arc::new("B".to_owned());

        assert_eq!(
            IdentityPair::of(&first, &second),
            IdentityPair::of(&Arc::clone(&first), &Arc::clone(&second))
        );
    }

    #[test]
    fn test_equal_values_in_distinct_allocations_differ() {
        let first = Arc::new("AA".to_owned());
        let twin = Arc::new("AA".to_owned());
        let second = Arc::new("B".to_owned());

        assert_ne!(
            IdentityPair::of(&first, &second),
            IdentityPair::of(&twin, &second)
        );
    }

    #[test]
    fn test_order_matters() {
        let a = Arc::new(1u32);
        let b = Arc::new(2u32);

        assert_ne!(IdentityPair::of(&a, &b), IdentityPair::of(&b, &a));
    }

    #[test]
    fn test_connection_ids_are_unique() {
        assert_ne!(ConnectionId::new(), ConnectionId::new());
    }
}
