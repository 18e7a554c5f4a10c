//! Error types for plugin computations.

use thiserror::Error;

use crate::connection::Slot;

/// Type alias for boxed dynamic errors that can be sent across threads.
///
/// Used as the source of [`Error::MalformedInput`], so any failure raised while
/// producing an input's string form can be carried without losing its type.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for plugin operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur while deriving parameters or running an algorithm.
///
/// A parameter mismatch on a cache probe is not an error: it is the normal
/// miss path and never surfaces here.
#[derive(Debug, Error)]
pub enum Error {
    /// The string form of an input could not be produced.
    #[error("malformed input in slot {slot}: {source}")]
    MalformedInput {
        /// Slot of the offending input.
        slot: Slot,
        /// Underlying failure.
        #[source]
        source: BoxedError,
    },

    /// The algorithm body failed for another reason.
    #[error("algorithm failed: {0}")]
    Algorithm(String),

    /// Configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Creates a malformed input error for the given slot.
    pub fn malformed_input(slot: Slot, source: impl Into<BoxedError>) -> Self {
        Self::MalformedInput {
            slot,
            source: source.into(),
        }
    }

    /// Returns the slot of the input that caused the error, if any.
    pub fn slot(&self) -> Option<Slot> {
        match self {
            Self::MalformedInput { slot, .. } => Some(*slot),
            _ => None,
        }
    }

    /// Returns true if the error was caused by a malformed input.
    pub fn is_malformed_input(&self) -> bool {
        matches!(self, Self::MalformedInput { .. })
    }
}
