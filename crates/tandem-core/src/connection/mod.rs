//! Connections between input pairs and computed outputs.
//!
//! This module provides:
//! - [`Connection`]: immutable record of one computation
//! - [`Slot`]: the labeled slots a connection exposes
//! - [`IdentityPair`]: the identity key of an input pair
//! - [`ConnectionStore`]: the store a cache keeps connections in
//! - [`MemoryStore`]: the default in-memory store

mod identity;
mod record;
mod slot;
mod store;

pub use identity::{ConnectionId, IdentityPair};
pub use record::Connection;
pub use slot::Slot;
pub use store::{ConnectionStore, MemoryStore};
