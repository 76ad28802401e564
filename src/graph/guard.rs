//! Cycle prevention for the blocking subgraph.
//!
//! Only blocking-kind edges participate: informational relations may form
//! arbitrary shapes. The check is a reachability query over a blocking-only
//! view of the edge set, O(V+E) in that subgraph.

use petgraph::algo::has_path_connecting;
use petgraph::graphmap::DiGraphMap;

use crate::core::task::TaskId;
use crate::graph::edge::DependencyEdge;

/// Validates that inserting a blocking edge keeps the blocking subgraph
/// acyclic.
pub struct CycleGuard;

impl CycleGuard {
    /// Would adding a blocking edge `from -> to` create a cycle?
    ///
    /// A cycle exists iff `from` is already reachable from `to` along
    /// blocking edges. The caller is responsible for only invoking this for
    /// blocking-kind insertions and for holding the write lock so the edge
    /// set cannot shift under the check.
    pub fn would_cycle<'a>(
        edges: impl Iterator<Item = &'a DependencyEdge>,
        from: TaskId,
        to: TaskId,
    ) -> bool {
        let mut graph: DiGraphMap<TaskId, ()> = DiGraphMap::new();
        for edge in edges.filter(|e| e.kind.is_blocking()) {
            graph.add_edge(edge.from_task, edge.to_task, ());
        }

        if !graph.contains_node(to) || !graph.contains_node(from) {
            return false;
        }
        has_path_connecting(&graph, to, from, None)
    }
}
