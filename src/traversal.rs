//! Breadth-first, depth-first and connectivity walks over a `GraphStore`.
//!
//! Neighbors are always visited in adjacency order, which is increasing
//! edge-identifier order. Visit state is held in a set owned by the walk;
//! the store's records carry no scratch marks.

use crate::error::GraphResult;
use crate::graph::{GraphStore, VertexId};
use hashbrown::HashSet;
use std::collections::VecDeque;

impl<V, E> GraphStore<V, E> {
    /// Vertices reachable from `source` in breadth-first order, starting
    /// with `source`.
    pub fn breadth_first_search(&self, source: VertexId) -> GraphResult<Vec<VertexId>> {
        self.require_vertex(source)?;
        let mut path = Vec::new();
        let mut visited: HashSet<VertexId> = HashSet::new();
        let mut queue = VecDeque::new();
        visited.insert(source);
        queue.push_back(source);

        while let Some(v) = queue.pop_front() {
            let pos = self.endpoint_position(v)?;
            for n in self.neighbors_at(pos)? {
                if visited.insert(n) {
                    queue.push_back(n);
                }
            }
            path.push(v);
        }
        Ok(path)
    }

    /// Vertices reachable from `source` in explicit-stack depth-first order.
    ///
    /// A popped vertex pushes its unfinished neighbors and is then finished
    /// and appended. Marking happens on pop, so a vertex may sit on the stack
    /// several times; the copy pushed last wins.
    pub fn depth_first_search(&self, source: VertexId) -> GraphResult<Vec<VertexId>> {
        self.require_vertex(source)?;
        let mut path = Vec::new();
        let mut finished: HashSet<VertexId> = HashSet::new();
        let mut stack = vec![source];

        while let Some(v) = stack.pop() {
            if finished.contains(&v) {
                continue;
            }
            let pos = self.endpoint_position(v)?;
            for n in self.neighbors_at(pos)? {
                if !finished.contains(&n) {
                    stack.push(n);
                }
            }
            finished.insert(v);
            path.push(v);
        }
        Ok(path)
    }

    /// Whether the walk from `a` reaches `b` as a neighbor. The walk stops
    /// as soon as `b` shows up. The start vertex itself does not count, so
    /// `is_connected(v, v)` holds only when `v` is reached again through an
    /// edge.
    pub fn is_connected(&self, a: VertexId, b: VertexId) -> GraphResult<bool> {
        self.require_vertex(a)?;
        self.require_vertex(b)?;
        let mut finished: HashSet<VertexId> = HashSet::new();
        let mut stack = vec![a];

        while let Some(v) = stack.pop() {
            if finished.contains(&v) {
                continue;
            }
            let pos = self.endpoint_position(v)?;
            for n in self.neighbors_at(pos)? {
                if n == b {
                    return Ok(true);
                }
                if !finished.contains(&n) {
                    stack.push(n);
                }
            }
            finished.insert(v);
        }
        Ok(false)
    }
}
