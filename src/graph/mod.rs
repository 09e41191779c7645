//! Compact per-group directed graphs.
//!
//! Each group's edges are collapsed into a simple graph: system names
//! are interned to dense `u32` ids in first-seen order, parallel edges
//! are removed, and self-loops stay in the successor sets with an extra
//! per-vertex flag. Dense ids keep the adjacency flat and make dropping
//! a group a single deallocation.

pub mod cycle;
pub mod scc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::models::Edge;

/// Dense vertex id, local to one group graph.
pub type VertexId = u32;

/// A group's deduplicated directed graph.
#[derive(Debug, Clone, Default)]
pub struct GroupGraph {
    succ: Vec<Vec<VertexId>>,
    self_loop: Vec<bool>,
}

impl GroupGraph {
    /// Build the simple graph for one group's edge list.
    pub fn from_edges(edges: &[Edge]) -> Self {
        let mut ids: FxHashMap<&str, VertexId> = FxHashMap::default();
        let mut graph = GroupGraph::default();
        let mut seen: FxHashSet<(VertexId, VertexId)> = FxHashSet::default();

        for edge in edges {
            let s = graph.intern(&mut ids, &edge.source);
            let d = graph.intern(&mut ids, &edge.destination);
            if seen.insert((s, d)) {
                graph.succ[s as usize].push(d);
                if s == d {
                    graph.self_loop[s as usize] = true;
                }
            }
        }
        graph
    }

    fn intern<'a>(&mut self, ids: &mut FxHashMap<&'a str, VertexId>, name: &'a str) -> VertexId {
        if let Some(&id) = ids.get(name) {
            return id;
        }
        let id = self.succ.len() as VertexId;
        ids.insert(name, id);
        self.succ.push(Vec::new());
        self.self_loop.push(false);
        id
    }

    pub fn vertex_count(&self) -> usize {
        self.succ.len()
    }

    pub fn successors(&self, v: VertexId) -> &[VertexId] {
        &self.succ[v as usize]
    }

    pub fn has_self_loop(&self, v: VertexId) -> bool {
        self.self_loop[v as usize]
    }
}

#[cfg(test)]
pub(crate) fn edges(pairs: &[(&str, &str)]) -> Vec<Edge> {
    pairs
        .iter()
        .map(|(s, d)| Edge {
            source: s.to_string(),
            destination: d.to_string(),
        })
        .collect()
}
