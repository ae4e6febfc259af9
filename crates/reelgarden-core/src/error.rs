//! Error types for the spin-resolution engine.
//!
//! Effect-level failures ([`EngineError::UnknownSymbolKind`],
//! [`EngineError::MissingActionSymbol`]) never abort a spin: the resolver
//! records them and skips the offending effect application. Lifecycle
//! failures ([`EngineError::InvalidGuardState`], [`EngineError::StaleCompletion`])
//! are returned to the caller without mutating the machine.

use thiserror::Error;

use crate::symbol::SymbolKey;

/// Errors produced by the engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A catalog lookup or an effect referenced a key that is not registered.
    #[error("unknown symbol kind: {key}")]
    UnknownSymbolKind {
        /// The missing key
        key: SymbolKey,
    },

    /// Two definitions in one catalog share a key.
    #[error("duplicate symbol kind: {key}")]
    DuplicateSymbolKind {
        /// The repeated key
        key: SymbolKey,
    },

    /// An `add` effect declared no symbol to add.
    #[error("add effect on {key} has no action symbol")]
    MissingActionSymbol {
        /// Key of the symbol carrying the effect
        key: SymbolKey,
    },

    /// An operation was invoked outside the lifecycle state it requires.
    #[error("cannot {operation} while {state}")]
    InvalidGuardState {
        /// The rejected operation
        operation: &'static str,
        /// The state the machine was in
        state: &'static str,
    },

    /// A completion signal did not match the request at the head of the queue.
    #[error("stale completion: expected {expected}, got {got}")]
    StaleCompletion {
        /// Ticket of the pending request, if any
        expected: String,
        /// Ticket supplied by the caller
        got: String,
    },

    /// The selected reward was not among the offered choices.
    #[error("symbol {key} was not offered as a reward")]
    InvalidRewardChoice {
        /// The rejected key
        key: SymbolKey,
    },

    /// Grid dimensions must both be non-zero.
    #[error("invalid grid {rows}x{columns}")]
    InvalidGrid {
        /// Requested row count
        rows: usize,
        /// Requested column count
        columns: usize,
    },
}

/// Result alias used throughout the engine.
pub type EngineResult<T> = Result<T, EngineError>;
