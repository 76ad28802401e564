//! Edge storage with adjacency indexes.
//!
//! The store is pure data access plus the structural invariants
//! (no self-loops, blocking subgraph stays acyclic). Policy — who may add
//! edges, what events a mutation emits — lives in the engine.

use std::collections::HashMap;

use crate::core::task::TaskId;
use crate::graph::edge::{DependencyEdge, EdgeId, RelationKind};
use crate::graph::guard::CycleGuard;
use crate::{dlog_debug, Error, Result};

/// Holds directed, typed edges between task identifiers.
///
/// Lookups by task run over adjacency indexes kept in sync with the edge
/// table, so per-task queries are O(degree).
#[derive(Debug, Default)]
pub struct DependencyStore {
    /// Edge table keyed by synthetic id.
    edges: HashMap<EdgeId, DependencyEdge>,
    /// Edge ids by `from_task`.
    outgoing: HashMap<TaskId, Vec<EdgeId>>,
    /// Edge ids by `to_task`.
    incoming: HashMap<TaskId, Vec<EdgeId>>,
}

impl DependencyStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new dependency edge after validating structural invariants.
    ///
    /// # Errors
    /// - [`Error::SelfDependency`] if `from == to`.
    /// - [`Error::CircularDependency`] if the edge is blocking-kind and the
    ///   target can already reach the source along blocking edges. The store
    ///   is left untouched in both failure cases.
    ///
    /// The caller must hold the engine write lock so that check-then-insert
    /// is atomic with respect to concurrent insertions.
    pub fn add(&mut self, from: TaskId, to: TaskId, kind: RelationKind) -> Result<DependencyEdge> {
        if from == to {
            return Err(Error::SelfDependency { task: from });
        }

        if kind.is_blocking() && CycleGuard::would_cycle(self.edges.values(), from, to) {
            return Err(Error::CircularDependency { from, to });
        }

        let edge = DependencyEdge::new(from, to, kind);
        dlog_debug!(
            "DependencyStore::add {} {} -> {} ({})",
            edge.id.short(),
            from.short(),
            to.short(),
            kind
        );
        self.outgoing.entry(from).or_default().push(edge.id);
        self.incoming.entry(to).or_default().push(edge.id);
        self.edges.insert(edge.id, edge.clone());
        Ok(edge)
    }

    /// Remove an edge by id, returning the removed edge.
    ///
    /// No cycle re-validation is needed: removal cannot introduce one.
    pub fn remove(&mut self, id: EdgeId) -> Result<DependencyEdge> {
        let edge = self.edges.remove(&id).ok_or(Error::EdgeNotFound { id })?;
        Self::unindex(&mut self.outgoing, edge.from_task, id);
        Self::unindex(&mut self.incoming, edge.to_task, id);
        dlog_debug!("DependencyStore::remove {}", id.short());
        Ok(edge)
    }

    /// Remove every edge touching the given task, returning the removed
    /// edges. Used when the host destroys a task (edge lifetime is owned by
    /// the task lifecycle).
    pub fn remove_task_edges(&mut self, task: TaskId) -> Vec<DependencyEdge> {
        let mut ids: Vec<EdgeId> = self
            .outgoing
            .get(&task)
            .into_iter()
            .chain(self.incoming.get(&task))
            .flatten()
            .copied()
            .collect();
        ids.sort();
        ids.dedup();

        ids.into_iter()
            .filter_map(|id| self.remove(id).ok())
            .collect()
    }

    /// Get an edge by id.
    pub fn get(&self, id: EdgeId) -> Option<&DependencyEdge> {
        self.edges.get(&id)
    }

    /// All edges leaving the given task.
    pub fn list_outgoing(&self, task: TaskId) -> Vec<&DependencyEdge> {
        self.collect(&self.outgoing, task)
    }

    /// All edges entering the given task.
    pub fn list_incoming(&self, task: TaskId) -> Vec<&DependencyEdge> {
        self.collect(&self.incoming, task)
    }

    /// Iterator over every edge in the store.
    pub fn iter(&self) -> impl Iterator<Item = &DependencyEdge> {
        self.edges.values()
    }

    /// Number of edges in the store.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether the store holds no edges.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    fn collect(&self, index: &HashMap<TaskId, Vec<EdgeId>>, task: TaskId) -> Vec<&DependencyEdge> {
        index
            .get(&task)
            .into_iter()
            .flatten()
            .filter_map(|id| self.edges.get(id))
            .collect()
    }

    fn unindex(index: &mut HashMap<TaskId, Vec<EdgeId>>, task: TaskId, id: EdgeId) {
        if let Some(ids) = index.get_mut(&task) {
            ids.retain(|&e| e != id);
            if ids.is_empty() {
                index.remove(&task);
            }
        }
    }
}
