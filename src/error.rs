//! Error types for the index and the graph store.

use crate::graph::{EdgeId, VertexId};
use thiserror::Error;

/// Failure modes of `HashedIndex::insert`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InsertError {
    #[error("key already present")]
    DuplicateKey,

    /// Growing the table would need a size that does not fit in `usize`.
    #[error("cannot grow table: no prime slot count >= {requested} is representable")]
    CapacityExhausted { requested: usize },
}

/// Rejected `IndexConfig` values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("initial slot count must be at least 1")]
    ZeroSlots,

    #[error("no prime slot count >= {0} is representable")]
    SlotsTooLarge(usize),

    #[error("hash multiplier must be non-zero")]
    ZeroMultiplier,

    #[error("hash multiplier must be odd, got {0}")]
    EvenMultiplier(u64),

    #[error("hash offset must be positive")]
    ZeroOffset,

    #[error("sieve bound must be at least 2, got {0}")]
    SieveTooSmall(usize),
}

/// Errors that can occur during graph operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("vertex {0} not found")]
    VertexNotFound(VertexId),

    #[error("edge {0} not found")]
    EdgeNotFound(EdgeId),

    /// An internal invariant no longer holds. The store should be discarded.
    #[error("graph store corrupted: {0}")]
    Corrupted(String),

    #[error(transparent)]
    Index(#[from] InsertError),
}

pub type GraphResult<T> = Result<T, GraphError>;
