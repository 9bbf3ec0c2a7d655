//! dense-graph: an undirected graph store with permanent identifiers over
//! dense, compacting arrays, indexed by a prime-sized chained hash table.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: O(1) amortized identifier lookup and O(degree) deletion while
//!   vertex and edge records stay packed in gap-free arrays.
//! - Layers:
//!   - HashedIndex<K, V>: separate-chaining table. Keys fold to a `u64`
//!     (`IndexKey`), a universal hash over the Mersenne prime `2^61 - 1`
//!     picks the bucket, and the bucket count is always a prime from a
//!     lazily extended sieve.
//!   - GraphStore<V, E>: vertex and edge vectors, per-vertex adjacency
//!     lists of edge identifiers, and two HashedIndex instances mapping
//!     identifiers to current array positions.
//!   - Traversals (BFS, stack-based DFS, connectivity) as methods on
//!     GraphStore, keeping visit state in a walk-local set.
//!
//! Constraints
//! - Single-threaded; mutation needs `&mut`. Wrap the store in one lock if
//!   it must be shared.
//! - Identifiers are issued from per-kind counters starting at 0 and are
//!   never reused.
//! - Array positions are always `0..count`. Deleting a record moves the
//!   last record of its kind into the hole and repoints its index entry.
//! - Positions are not stable; refer to records by identifier.
//!
//! Resizing
//! - Grow when `len * 2 > slots` after an insert, to the smallest prime
//!   `>= 2 * slots`. Shrink when `len * 8 <= slots` after a remove, to the
//!   smallest prime `>= ceil(slots / 2)`, never below the initial size.
//! - Resizes rehash every entry synchronously. Entries cache their folded
//!   key, so rehashing never re-folds.
//!
//! Errors
//! - Duplicate index keys and exhausted capacity surface as `InsertError`.
//! - Unknown identifiers surface as `GraphError::VertexNotFound` /
//!   `GraphError::EdgeNotFound`; lookups that have a natural "absent"
//!   answer return `Option`.
//! - Broken internal invariants surface as `GraphError::Corrupted`; the
//!   store should not be used afterwards.

pub mod config;
pub mod error;
pub mod graph;
pub mod hash_func;
pub mod hashed_index;
mod hashed_index_proptest;
pub mod primes;
mod traversal;

// Public surface
pub use config::IndexConfig;
pub use error::{ConfigError, GraphError, GraphResult, InsertError};
pub use graph::{Edge, EdgeId, GraphStore, Vertex, VertexId};
pub use hash_func::{HashParams, IndexKey};
pub use hashed_index::HashedIndex;
pub use primes::PrimeTable;
