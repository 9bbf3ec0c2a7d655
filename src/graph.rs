//! GraphStore: undirected graph over dense vertex and edge arrays.
//!
//! Records live in two gap-free vectors. Identifiers are issued from
//! monotonically increasing counters and never reused; two `HashedIndex`
//! instances translate an identifier to the record's current array
//! position. Deleting a record moves the last record of the same kind into
//! the freed slot and repoints that record's index entry, so positions are
//! always `0..count`.
//!
//! `adjacency[pos]` lists the identifiers of the edges incident to the
//! vertex at `pos`, in insertion (and therefore increasing identifier)
//! order. It is relocated together with its vertex.

use crate::config::IndexConfig;
use crate::error::{ConfigError, GraphError, GraphResult, InsertError};
use crate::hash_func::{HashParams, IndexKey};
use crate::hashed_index::HashedIndex;
use std::fmt;
use tracing::{debug, trace, warn};

/// Permanent identifier of a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub u64);

impl VertexId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VertexId({})", self.0)
    }
}

impl From<u64> for VertexId {
    fn from(id: u64) -> Self {
        VertexId(id)
    }
}

impl IndexKey for VertexId {
    #[inline]
    fn fold(&self, _params: &HashParams) -> u64 {
        self.0
    }
}

/// Permanent identifier of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub u64);

impl EdgeId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EdgeId({})", self.0)
    }
}

impl From<u64> for EdgeId {
    fn from(id: u64) -> Self {
        EdgeId(id)
    }
}

impl IndexKey for EdgeId {
    #[inline]
    fn fold(&self, _params: &HashParams) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Vertex<V> {
    id: VertexId,
    pub data: V,
}

impl<V> Vertex<V> {
    pub fn id(&self) -> VertexId {
        self.id
    }

    pub fn into_data(self) -> V {
        self.data
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge<E> {
    id: EdgeId,
    source: VertexId,
    target: VertexId,
    pub data: E,
}

impl<E> Edge<E> {
    pub fn id(&self) -> EdgeId {
        self.id
    }

    pub fn source(&self) -> VertexId {
        self.source
    }

    pub fn target(&self) -> VertexId {
        self.target
    }

    pub fn endpoints(&self) -> (VertexId, VertexId) {
        (self.source, self.target)
    }

    pub fn touches(&self, v: VertexId) -> bool {
        self.source == v || self.target == v
    }

    /// The endpoint opposite `from`, or `None` if `from` is not an endpoint.
    pub fn other(&self, from: VertexId) -> Option<VertexId> {
        if self.source == from {
            Some(self.target)
        } else if self.target == from {
            Some(self.source)
        } else {
            None
        }
    }

    /// True if this edge joins `a` and `b` in either direction.
    pub fn connects(&self, a: VertexId, b: VertexId) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }

    pub fn into_data(self) -> E {
        self.data
    }
}

#[derive(Debug)]
pub struct GraphStore<V, E> {
    vertices: Vec<Vertex<V>>,
    edges: Vec<Edge<E>>,
    adjacency: Vec<Vec<EdgeId>>,
    vertex_index: HashedIndex<VertexId, usize>,
    edge_index: HashedIndex<EdgeId, usize>,
    next_vertex_id: u64,
    next_edge_id: u64,
}

pub(crate) fn corrupted(msg: impl Into<String>) -> GraphError {
    let msg = msg.into();
    warn!(%msg, "graph store invariant violated");
    GraphError::Corrupted(msg)
}

// Register a freshly issued identifier; a duplicate means the counters and
// the index disagree.
fn register<K>(index: &mut HashedIndex<K, usize>, id: K, pos: usize) -> GraphResult<()>
where
    K: IndexKey + Copy + fmt::Display,
{
    match index.insert(id, pos) {
        Ok(()) => Ok(()),
        Err(InsertError::DuplicateKey) => Err(corrupted(format!("{id} is already indexed"))),
        Err(e) => Err(e.into()),
    }
}

// Point a relocated record's index entry at its new position.
fn repoint<K>(index: &mut HashedIndex<K, usize>, id: K, pos: usize) -> GraphResult<()>
where
    K: IndexKey + Copy + fmt::Display,
{
    let slot = index
        .get_mut(&id)
        .ok_or_else(|| corrupted(format!("relocated {id} has no index entry")))?;
    *slot = pos;
    Ok(())
}

impl<V, E> GraphStore<V, E> {
    pub fn new() -> Self {
        Self::from_indices(HashedIndex::new(), HashedIndex::new())
    }

    /// Build a store whose vertex and edge indices both use `config`.
    pub fn with_index_config(config: IndexConfig) -> Result<Self, ConfigError> {
        Ok(Self::from_indices(
            HashedIndex::with_config(config)?,
            HashedIndex::with_config(config)?,
        ))
    }

    fn from_indices(
        vertex_index: HashedIndex<VertexId, usize>,
        edge_index: HashedIndex<EdgeId, usize>,
    ) -> Self {
        Self {
            vertices: Vec::new(),
            edges: Vec::new(),
            adjacency: Vec::new(),
            vertex_index,
            edge_index,
            next_vertex_id: 0,
            next_edge_id: 0,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// True when the store holds no vertices.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Current array position of `id`. Positions change on deletion.
    pub fn vertex_position(&self, id: VertexId) -> Option<usize> {
        self.vertex_index.get(&id).copied()
    }

    pub fn edge_position(&self, id: EdgeId) -> Option<usize> {
        self.edge_index.get(&id).copied()
    }

    pub fn contains_vertex(&self, id: VertexId) -> bool {
        self.vertex_index.contains(&id)
    }

    pub fn contains_edge(&self, id: EdgeId) -> bool {
        self.edge_index.contains(&id)
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex<V>> {
        let pos = self.vertex_position(id)?;
        self.vertices.get(pos)
    }

    pub fn vertex_mut(&mut self, id: VertexId) -> Option<&mut Vertex<V>> {
        let pos = self.vertex_position(id)?;
        self.vertices.get_mut(pos)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge<E>> {
        let pos = self.edge_position(id)?;
        self.edges.get(pos)
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> Option<&mut Edge<E>> {
        let pos = self.edge_position(id)?;
        self.edges.get_mut(pos)
    }

    /// Vertices in array-position order.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex<V>> {
        self.vertices.iter()
    }

    /// Edges in array-position order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge<E>> {
        self.edges.iter()
    }

    pub(crate) fn require_vertex(&self, id: VertexId) -> GraphResult<usize> {
        self.vertex_position(id)
            .ok_or(GraphError::VertexNotFound(id))
    }

    fn require_edge(&self, id: EdgeId) -> GraphResult<usize> {
        self.edge_position(id).ok_or(GraphError::EdgeNotFound(id))
    }

    /// Position of a vertex reached through an edge. Absence is corruption,
    /// not a caller error.
    pub(crate) fn endpoint_position(&self, id: VertexId) -> GraphResult<usize> {
        self.vertex_position(id)
            .ok_or_else(|| corrupted(format!("edge endpoint {id} is not a live vertex")))
    }

    /// Identifiers of the edges incident to `id`, oldest first.
    pub fn incident_edges(&self, id: VertexId) -> GraphResult<&[EdgeId]> {
        let pos = self.require_vertex(id)?;
        Ok(&self.adjacency[pos])
    }

    pub fn degree(&self, id: VertexId) -> GraphResult<usize> {
        Ok(self.incident_edges(id)?.len())
    }

    /// Opposite endpoints of every incident edge of `id`, in adjacency order.
    pub fn neighbors(&self, id: VertexId) -> GraphResult<Vec<VertexId>> {
        let pos = self.require_vertex(id)?;
        self.neighbors_at(pos)
    }

    pub(crate) fn neighbors_at(&self, pos: usize) -> GraphResult<Vec<VertexId>> {
        let owner = self.vertices[pos].id;
        self.adjacency[pos]
            .iter()
            .map(|&eid| self.other_endpoint(eid, owner))
            .collect()
    }

    fn other_endpoint(&self, eid: EdgeId, owner: VertexId) -> GraphResult<VertexId> {
        let edge = self
            .edge(eid)
            .ok_or_else(|| corrupted(format!("adjacency of {owner} lists missing {eid}")))?;
        edge.other(owner)
            .ok_or_else(|| corrupted(format!("adjacency of {owner} lists {eid}, which does not touch it")))
    }

    pub fn add_vertex(&mut self, data: V) -> GraphResult<VertexId> {
        let id = VertexId(self.next_vertex_id);
        let pos = self.vertices.len();
        register(&mut self.vertex_index, id, pos)?;
        self.vertices.push(Vertex { id, data });
        self.adjacency.push(Vec::new());
        self.next_vertex_id += 1;
        trace!(vertex = %id, pos, "added vertex");
        Ok(id)
    }

    /// Join `source` and `target`. Both must be live; no identifier is
    /// issued otherwise. A self-loop is listed once in its vertex's
    /// adjacency.
    pub fn add_edge(&mut self, source: VertexId, target: VertexId, data: E) -> GraphResult<EdgeId> {
        let sp = self.require_vertex(source)?;
        let tp = self.require_vertex(target)?;
        let id = EdgeId(self.next_edge_id);
        let pos = self.edges.len();
        register(&mut self.edge_index, id, pos)?;
        self.edges.push(Edge {
            id,
            source,
            target,
            data,
        });
        self.adjacency[sp].push(id);
        if tp != sp {
            self.adjacency[tp].push(id);
        }
        self.next_edge_id += 1;
        trace!(edge = %id, %source, %target, "added edge");
        Ok(id)
    }

    /// An edge joining `source` and `target` in either direction.
    ///
    /// `Ok(None)` when both vertices exist but are not adjacent.
    pub fn probe_edge(&self, source: VertexId, target: VertexId) -> GraphResult<Option<EdgeId>> {
        let sp = self.require_vertex(source)?;
        self.require_vertex(target)?;
        for &eid in &self.adjacency[sp] {
            let other = self.other_endpoint(eid, source)?;
            if other == target {
                return Ok(Some(eid));
            }
        }
        Ok(None)
    }

    /// Remove an edge, unlinking it from both endpoints. O(degree).
    pub fn delete_edge(&mut self, id: EdgeId) -> GraphResult<Edge<E>> {
        let pos = self.require_edge(id)?;
        let (source, target) = self.edges[pos].endpoints();
        let sp = self.endpoint_position(source)?;
        let tp = self.endpoint_position(target)?;

        // Locate both adjacency entries before mutating anything.
        let find = |p: usize, owner: VertexId| {
            self.adjacency[p]
                .iter()
                .position(|&e| e == id)
                .ok_or_else(|| corrupted(format!("{id} missing from adjacency of {owner}")))
        };
        let s_slot = find(sp, source)?;
        let t_slot = if tp != sp { Some(find(tp, target)?) } else { None };

        self.adjacency[sp].remove(s_slot);
        if let Some(t_slot) = t_slot {
            self.adjacency[tp].remove(t_slot);
        }
        self.edge_index.remove(&id);
        let removed = self.edges.swap_remove(pos);
        if let Some(moved) = self.edges.get(pos) {
            repoint(&mut self.edge_index, moved.id, pos)?;
        }
        trace!(edge = %id, pos, "deleted edge");
        Ok(removed)
    }

    /// Remove a vertex and, first, every edge incident to it.
    pub fn delete_vertex(&mut self, id: VertexId) -> GraphResult<Vertex<V>> {
        let pos = self.require_vertex(id)?;
        let incident = self.adjacency[pos].clone();
        debug!(vertex = %id, degree = incident.len(), "deleting vertex");
        for eid in incident {
            self.delete_edge(eid)?;
        }
        // Edge deletion never moves vertices, so `pos` is still valid.
        if !self.adjacency[pos].is_empty() {
            return Err(corrupted(format!(
                "adjacency of {id} not empty after deleting its edges"
            )));
        }

        self.vertex_index.remove(&id);
        let removed = self.vertices.swap_remove(pos);
        self.adjacency.swap_remove(pos);
        if let Some(moved) = self.vertices.get(pos) {
            repoint(&mut self.vertex_index, moved.id, pos)?;
        }
        trace!(vertex = %id, pos, "deleted vertex");
        Ok(removed)
    }

    /// Verify every structural invariant, stopping at the first violation:
    /// index/array bijection, dense positions, live endpoints, and each
    /// edge appearing exactly once in each endpoint's adjacency.
    pub fn check_invariants(&self) -> GraphResult<()> {
        if self.adjacency.len() != self.vertices.len() {
            return Err(corrupted(format!(
                "{} adjacency lists for {} vertices",
                self.adjacency.len(),
                self.vertices.len()
            )));
        }
        if self.vertex_index.len() != self.vertices.len() {
            return Err(corrupted("vertex index size differs from vertex count"));
        }
        if self.edge_index.len() != self.edges.len() {
            return Err(corrupted("edge index size differs from edge count"));
        }
        for (pos, v) in self.vertices.iter().enumerate() {
            if self.vertex_position(v.id) != Some(pos) {
                return Err(corrupted(format!("{} does not resolve to position {pos}", v.id)));
            }
            if v.id.0 >= self.next_vertex_id {
                return Err(corrupted(format!("{} was never issued", v.id)));
            }
        }
        for (pos, e) in self.edges.iter().enumerate() {
            if self.edge_position(e.id) != Some(pos) {
                return Err(corrupted(format!("{} does not resolve to position {pos}", e.id)));
            }
            if e.id.0 >= self.next_edge_id {
                return Err(corrupted(format!("{} was never issued", e.id)));
            }
            for end in [e.source, e.target] {
                let p = self.endpoint_position(end)?;
                let count = self.adjacency[p].iter().filter(|&&x| x == e.id).count();
                if count != 1 {
                    return Err(corrupted(format!(
                        "{} listed {count} times in adjacency of {end}",
                        e.id
                    )));
                }
            }
        }
        for pos in 0..self.vertices.len() {
            self.neighbors_at(pos)?;
        }
        Ok(())
    }
}

impl<V, E> Default for GraphStore<V, E> {
    fn default() -> Self {
        Self::new()
    }
}
