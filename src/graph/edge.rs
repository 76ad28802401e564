//! Typed dependency edges between tasks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::task::TaskId;

/// Unique identifier for a dependency edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub Uuid);

impl EdgeId {
    /// Create a new unique edge identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Return first 8 characters of the UUID for display.
    pub fn short(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for EdgeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of relationship an edge expresses.
///
/// `Blocks` and `Requires` carry blocking semantics: the `from` task cannot
/// be considered complete until the `to` task is done. The remaining kinds
/// are informational and never participate in cycle checks or blocking
/// queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// The `from` task is blocked by the `to` task.
    Blocks,
    /// The `from` task requires an artifact of the `to` task.
    Requires,
    /// The tasks are loosely related.
    RelatedTo,
    /// The `from` task duplicates the `to` task.
    DuplicateOf,
}

impl RelationKind {
    /// Whether this kind prevents the `from` task from completing until the
    /// `to` task is done.
    pub fn is_blocking(&self) -> bool {
        matches!(self, RelationKind::Blocks | RelationKind::Requires)
    }
}

impl std::fmt::Display for RelationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelationKind::Blocks => write!(f, "blocks"),
            RelationKind::Requires => write!(f, "requires"),
            RelationKind::RelatedTo => write!(f, "related_to"),
            RelationKind::DuplicateOf => write!(f, "duplicate_of"),
        }
    }
}

/// A directed, typed dependency between two tasks.
///
/// Invariants, enforced by the store: `from_task != to_task`, and the
/// subgraph induced by blocking-kind edges is acyclic at all times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// Synthetic identifier for this edge.
    pub id: EdgeId,
    /// The dependent task.
    pub from_task: TaskId,
    /// The task being depended on.
    pub to_task: TaskId,
    /// What kind of relationship this is.
    pub kind: RelationKind,
    /// When the edge was created.
    pub created_at: DateTime<Utc>,
}

impl DependencyEdge {
    /// Create a new edge with a fresh id and the current timestamp.
    pub fn new(from_task: TaskId, to_task: TaskId, kind: RelationKind) -> Self {
        Self {
            id: EdgeId::new(),
            from_task,
            to_task,
            kind,
            created_at: Utc::now(),
        }
    }
}
