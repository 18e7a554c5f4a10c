//! The connection record.

use std::fmt;
use std::sync::Arc;

use super::{ConnectionId, IdentityPair, Slot};
use crate::params::ParameterBundle;
use crate::timing::Timing;

/// Immutable record binding two inputs to the output computed from them.
///
/// The record keeps its own copy of the parameters that were used, taken at
/// construction; nothing the caller does to its bundle afterwards reaches
/// the record. There is no way to mutate a connection once built.
pub struct Connection<A, B, O> {
    id: ConnectionId,
    first: Arc<A>,
    second: Arc<B>,
    output: Arc<O>,
    parameters: ParameterBundle,
    timing: Timing,
}

impl<A, B, O> Connection<A, B, O> {
    /// Creates a connection, snapshotting `parameters`.
    pub fn new(
        first: Arc<A>,
        second: Arc<B>,
        output: Arc<O>,
        parameters: &ParameterBundle,
        timing: Timing,
    ) -> Self {
        Self {
            id: ConnectionId::new(),
            first,
            second,
            output,
            parameters: ParameterBundle::copy_of(parameters),
            timing,
        }
    }

    /// Returns the connection identifier.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Returns the identity of the input pair this connection is keyed by.
    pub fn identity(&self) -> IdentityPair {
        IdentityPair::of(&self.first, &self.second)
    }

    /// Returns the first input.
    pub fn first(&self) -> &Arc<A> {
        &self.first
    }

    /// Returns the second input.
    pub fn second(&self) -> &Arc<B> {
        &self.second
    }

    /// Returns the computed output.
    pub fn output(&self) -> &Arc<O> {
        &self.output
    }

    /// Returns the parameters the output was computed with.
    pub fn parameters(&self) -> &ParameterBundle {
        &self.parameters
    }

    /// Returns when the output was computed and how long it took.
    pub fn timing(&self) -> Timing {
        self.timing
    }

    /// Returns the address of the object registered under `slot`.
    pub fn address_of(&self, slot: Slot) -> usize {
        match slot {
            Slot::FirstInput => Arc::as_ptr(&self.first).addr(),
            Slot::SecondInput => Arc::as_ptr(&self.second).addr(),
            Slot::Output => Arc::as_ptr(&self.output).addr(),
        }
    }

    /// Returns true if this connection may serve a request for `desired`.
    ///
    /// Acceptance is bundle equality and nothing else.
    pub fn accepts(&self, desired: &ParameterBundle) -> bool {
        self.parameters == *desired
    }
}

impl<A, B, O> Clone for Connection<A, B, O> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            first: Arc::clone(&self.first),
            second: Arc::clone(&self.second),
            output: Arc::clone(&self.output),
            parameters: self.parameters.clone(),
            timing: self.timing,
        }
    }
}

impl<A, B, O> fmt::Debug for Connection<A, B, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("identity", &self.identity())
            .field("parameters", &self.parameters)
            .field("timing", &self.timing)
            .finish_non_exhaustive()
    }
}
