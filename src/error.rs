//! Error types for chain construction and rendering

use thiserror::Error;

use crate::chain::ChainKind;

/// Errors raised while validating and merging provider chains.
///
/// These are construction-time defects: they surface before any rendering
/// begins and are never redirected to `404`/`500` handlers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// A provider somewhere in the chain has no usable id. The provider is
    /// named through its child (the previously visited provider walking from
    /// the chain head), or `Root` when the head itself is at fault.
    #[error("{kind} provider above '{child}' is missing a string id")]
    MissingId { kind: ChainKind, child: String },

    /// The same id appeared twice across the merged template+context chain.
    #[error("duplicate provider id '{id}' in merged chain")]
    DuplicateId { id: String },

    /// A provider defines an entry under a name the resolver reserves.
    #[error("{kind} provider '{id}' uses reserved entry name '{name}'")]
    ReservedEntry {
        kind: ChainKind,
        id: String,
        name: String,
    },
}

/// Errors surfaced by the render loop.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// Chain construction failed; rendering never started.
    #[error(transparent)]
    Chain(#[from] ChainError),

    /// Terminal rendering failure. Never intercepted by the `404`/`500`
    /// redirection; carries the original error when it wraps one.
    #[error("{message}")]
    Fatal {
        message: String,
        source: Option<Box<ResolveError>>,
    },

    /// Ordinary rendering failure, typically raised by a user callable.
    /// Redirected once to the `500` handler before turning terminal.
    #[error("{0}")]
    Message(String),
}

impl ResolveError {
    /// Build an ordinary (redirectable) error from a message.
    pub fn message(message: impl Into<String>) -> Self {
        ResolveError::Message(message.into())
    }

    pub(crate) fn fatal(message: String, source: Option<ResolveError>) -> Self {
        ResolveError::Fatal {
            message,
            source: source.map(Box::new),
        }
    }

    /// Terminal errors propagate to the caller without re-entering the
    /// render loop.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ResolveError::Chain(_) | ResolveError::Fatal { .. })
    }
}

impl From<&str> for ResolveError {
    fn from(message: &str) -> Self {
        ResolveError::Message(message.to_string())
    }
}

impl From<String> for ResolveError {
    fn from(message: String) -> Self {
        ResolveError::Message(message)
    }
}
