//! Bounded longest-simple-cycle search.
//!
//! Acyclic structure is pruned first with Tarjan SCCs; the exponential
//! backtracking DFS only ever runs inside a component that is known to
//! contain a cycle. Within a component, each DFS root explores only
//! vertices with a larger local id, so every simple cycle is seen
//! exactly once (rooted at its minimum-id vertex) instead of once per
//! rotation. Like the SCC pass, the DFS keeps an explicit frame stack;
//! path depth and node expansions are both capped.

use rustc_hash::FxHashMap;
use tracing::debug;

use super::scc::strongly_connected_components;
use super::{GroupGraph, VertexId};

/// Hard cap on the DFS path depth, and therefore on a reportable cycle
/// length.
pub const MAX_PATH_LENGTH: usize = 1000;

/// Default per-component node-expansion ceiling.
pub const DEFAULT_MAX_EXPANSIONS: u64 = 10_000_000;

/// Knobs for the cycle search.
#[derive(Debug, Clone, Copy)]
pub struct SearchLimits {
    /// Node expansions allowed per strongly connected component before
    /// the search gives up and keeps its best answer so far.
    pub max_expansions: u64,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_expansions: DEFAULT_MAX_EXPANSIONS,
        }
    }
}

/// Outcome of searching one group graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    /// Length of the longest simple cycle found, 0 if none.
    pub length: usize,
    /// True if any component hit the expansion ceiling; `length` is
    /// then a lower bound.
    pub truncated: bool,
}

/// Length of the longest simple directed cycle in a group graph.
pub fn longest_cycle(graph: &GroupGraph, limits: &SearchLimits) -> SearchResult {
    let mut best = 0usize;
    let mut truncated = false;

    for component in strongly_connected_components(graph) {
        if component.len() == 1 {
            // A lone vertex hosts a cycle only via a self-loop, and
            // that cycle has length 1.
            if graph.has_self_loop(component[0]) {
                best = best.max(1);
            }
            continue;
        }

        let local_succ = induce(graph, &component);
        let hit_ceiling = search_component(&local_succ, &mut best, limits.max_expansions);
        truncated |= hit_ceiling;
    }

    SearchResult {
        length: best,
        truncated,
    }
}

/// Restrict the graph to one component, renumbering its vertices to
/// local ids `0..m`.
fn induce(graph: &GroupGraph, component: &[VertexId]) -> Vec<Vec<u32>> {
    let mut local: FxHashMap<VertexId, u32> =
        FxHashMap::with_capacity_and_hasher(component.len(), Default::default());
    for (i, &v) in component.iter().enumerate() {
        local.insert(v, i as u32);
    }

    let mut succ = vec![Vec::new(); component.len()];
    for (i, &v) in component.iter().enumerate() {
        for &w in graph.successors(v) {
            if let Some(&lw) = local.get(&w) {
                succ[i].push(lw);
            }
        }
    }
    succ
}

struct Frame {
    vertex: u32,
    next_succ: usize,
}

/// Backtracking DFS over one component. Folds candidate lengths into
/// `best`; returns true if the expansion ceiling was hit.
fn search_component(succ: &[Vec<u32>], best: &mut usize, max_expansions: u64) -> bool {
    let m = succ.len();
    let mut on_path = vec![false; m];
    let mut expansions = 0u64;

    for root in 0..m as u32 {
        // Roots ascend, so the pool of usable vertices (ids >= root)
        // only shrinks: once it cannot beat the best, no later root can.
        if m - root as usize <= *best {
            break;
        }

        let mut frames = vec![Frame {
            vertex: root,
            next_succ: 0,
        }];
        on_path[root as usize] = true;

        while let Some(frame) = frames.last_mut() {
            let v = frame.vertex;
            let neighbors = &succ[v as usize];

            if expansions >= max_expansions {
                // Unwind cleanly, keeping whatever was found.
                on_path[v as usize] = false;
                frames.pop();
                continue;
            }

            if frame.next_succ < neighbors.len() {
                let w = neighbors[frame.next_succ];
                frame.next_succ += 1;

                if w == root {
                    // The path closes back at the root: its vertex count
                    // is the cycle length.
                    *best = (*best).max(frames.len());
                } else if w > root && !on_path[w as usize] && frames.len() < MAX_PATH_LENGTH {
                    expansions += 1;
                    on_path[w as usize] = true;
                    frames.push(Frame {
                        vertex: w,
                        next_succ: 0,
                    });
                }
            } else {
                on_path[v as usize] = false;
                frames.pop();
            }
        }

        if expansions >= max_expansions {
            debug!(
                component_size = m,
                max_expansions, "cycle search hit expansion ceiling"
            );
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::edges;

    fn longest(pairs: &[(&str, &str)]) -> usize {
        let graph = GroupGraph::from_edges(&edges(pairs));
        longest_cycle(&graph, &SearchLimits::default()).length
    }

    #[test]
    fn no_edges_no_cycle() {
        assert_eq!(longest(&[]), 0);
    }

    #[test]
    fn chain_has_no_cycle() {
        assert_eq!(longest(&[("A", "B"), ("B", "C"), ("C", "D")]), 0);
    }

    #[test]
    fn self_loop_is_length_one() {
        assert_eq!(longest(&[("A", "A")]), 1);
    }

    #[test]
    fn mutual_pair_is_length_two() {
        assert_eq!(longest(&[("A", "B"), ("B", "A")]), 2);
    }

    #[test]
    fn triangle_is_length_three() {
        assert_eq!(longest(&[("A", "B"), ("B", "C"), ("C", "A")]), 3);
    }

    #[test]
    fn longer_of_two_cycles_wins() {
        assert_eq!(
            longest(&[
                ("A", "B"),
                ("B", "C"),
                ("C", "A"),
                ("X", "Y"),
                ("Y", "Z"),
                ("Z", "W"),
                ("W", "X"),
            ]),
            4
        );
    }

    #[test]
    fn dense_complete_graph() {
        // All 12 directed edges among 4 vertices: the answer is the full
        // Hamiltonian cycle.
        let names = ["A", "B", "C", "D"];
        let mut pairs = Vec::new();
        for s in names {
            for d in names {
                if s != d {
                    pairs.push((s, d));
                }
            }
        }
        assert_eq!(longest(&pairs), 4);
    }

    #[test]
    fn self_loop_inside_larger_component() {
        // The 3-cycle beats the self-loop on B.
        assert_eq!(
            longest(&[("A", "B"), ("B", "B"), ("B", "C"), ("C", "A")]),
            3
        );
    }

    #[test]
    fn two_triangles_sharing_a_vertex() {
        // One SCC of 5 vertices, but the longest *simple* cycle is still 3:
        // any walk through both triangles revisits the shared vertex.
        assert_eq!(
            longest(&[
                ("A", "B"),
                ("B", "C"),
                ("C", "A"),
                ("A", "D"),
                ("D", "E"),
                ("E", "A"),
            ]),
            3
        );
    }

    #[test]
    fn figure_with_chord() {
        // 4-ring with a chord: longest simple cycle is the full ring.
        assert_eq!(
            longest(&[
                ("A", "B"),
                ("B", "C"),
                ("C", "D"),
                ("D", "A"),
                ("A", "C"),
            ]),
            4
        );
    }

    #[test]
    fn duplicate_edges_do_not_change_the_answer() {
        assert_eq!(
            longest(&[("A", "B"), ("B", "A"), ("A", "B"), ("B", "A")]),
            2
        );
    }

    #[test]
    fn expansion_ceiling_truncates_but_keeps_a_result() {
        let names = ["A", "B", "C", "D", "E", "F"];
        let mut pairs = Vec::new();
        for s in names {
            for d in names {
                if s != d {
                    pairs.push((s, d));
                }
            }
        }
        let graph = GroupGraph::from_edges(&edges(&pairs));
        let limits = SearchLimits { max_expansions: 3 };
        let result = longest_cycle(&graph, &limits);
        assert!(result.truncated);
        assert!(result.length <= 6);

        let full = longest_cycle(&graph, &SearchLimits::default());
        assert!(!full.truncated);
        assert_eq!(full.length, 6);
    }

    #[test]
    fn large_ring_within_depth_cap() {
        let names: Vec<String> = (0..500).map(|i| format!("n{i}")).collect();
        let mut pairs: Vec<(&str, &str)> = names
            .windows(2)
            .map(|w| (w[0].as_str(), w[1].as_str()))
            .collect();
        pairs.push((names.last().unwrap().as_str(), names[0].as_str()));
        let graph = GroupGraph::from_edges(&edges(&pairs));
        let result = longest_cycle(&graph, &SearchLimits::default());
        assert_eq!(result.length, 500);
        assert!(!result.truncated);
    }
}
