//! Lifecycle events consumed by the rule engine.
//!
//! Events carry owned snapshots of the relevant entity state at publication
//! time, never live references, so later mutations cannot retroactively
//! change what a rule observed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::task::{ProjectId, TaskId, TaskStatus};
use crate::graph::edge::DependencyEdge;

/// A typed lifecycle event.
///
/// Most variants are dispatched by the host when it mutates a task or
/// project. `DependencyAdded`/`DependencyRemoved` are emitted by the engine's
/// own graph mutations, and `TaskUnblocked` is synthesized by the engine when
/// a mutation clears a task's last unfinished blocker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum LifecycleEvent {
    /// A task was created.
    TaskCreated {
        task: TaskId,
        project: Option<ProjectId>,
        name: String,
    },
    /// A task's status changed.
    TaskStatusChanged {
        task: TaskId,
        project: Option<ProjectId>,
        from: TaskStatus,
        to: TaskStatus,
    },
    /// A task's last unfinished blocker completed or was detached.
    TaskUnblocked {
        task: TaskId,
        project: Option<ProjectId>,
    },
    /// A dependency edge was inserted.
    DependencyAdded {
        edge: DependencyEdge,
        project: Option<ProjectId>,
    },
    /// A dependency edge was removed. Carries a snapshot of the deleted edge.
    DependencyRemoved {
        edge: DependencyEdge,
        project: Option<ProjectId>,
    },
    /// A project's metadata changed.
    ProjectUpdated { project: ProjectId },
    /// A task crossed a configured due-date lead threshold.
    DueDateThresholdCrossed {
        task: TaskId,
        project: Option<ProjectId>,
        due_at: DateTime<Utc>,
        lead_hours: i64,
    },
}

/// Discriminant of [`LifecycleEvent`], used for trigger-type matching and
/// the rule index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    TaskCreated,
    TaskStatusChanged,
    TaskUnblocked,
    DependencyAdded,
    DependencyRemoved,
    ProjectUpdated,
    DueDateThresholdCrossed,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EventKind::TaskCreated => "task_created",
            EventKind::TaskStatusChanged => "task_status_changed",
            EventKind::TaskUnblocked => "task_unblocked",
            EventKind::DependencyAdded => "dependency_added",
            EventKind::DependencyRemoved => "dependency_removed",
            EventKind::ProjectUpdated => "project_updated",
            EventKind::DueDateThresholdCrossed => "due_date_threshold_crossed",
        };
        write!(f, "{}", s)
    }
}

impl LifecycleEvent {
    /// The event's kind discriminant.
    pub fn kind(&self) -> EventKind {
        match self {
            LifecycleEvent::TaskCreated { .. } => EventKind::TaskCreated,
            LifecycleEvent::TaskStatusChanged { .. } => EventKind::TaskStatusChanged,
            LifecycleEvent::TaskUnblocked { .. } => EventKind::TaskUnblocked,
            LifecycleEvent::DependencyAdded { .. } => EventKind::DependencyAdded,
            LifecycleEvent::DependencyRemoved { .. } => EventKind::DependencyRemoved,
            LifecycleEvent::ProjectUpdated { .. } => EventKind::ProjectUpdated,
            LifecycleEvent::DueDateThresholdCrossed { .. } => EventKind::DueDateThresholdCrossed,
        }
    }

    /// The project scope the event occurred in, if any.
    pub fn project(&self) -> Option<ProjectId> {
        match self {
            LifecycleEvent::TaskCreated { project, .. }
            | LifecycleEvent::TaskStatusChanged { project, .. }
            | LifecycleEvent::TaskUnblocked { project, .. }
            | LifecycleEvent::DependencyAdded { project, .. }
            | LifecycleEvent::DependencyRemoved { project, .. }
            | LifecycleEvent::DueDateThresholdCrossed { project, .. } => *project,
            LifecycleEvent::ProjectUpdated { project } => Some(*project),
        }
    }

    /// The task the event is about, if it has one.
    ///
    /// Dependency events answer with the dependent (`from`) task, the one
    /// whose actionability the edge affects.
    pub fn task(&self) -> Option<TaskId> {
        match self {
            LifecycleEvent::TaskCreated { task, .. }
            | LifecycleEvent::TaskStatusChanged { task, .. }
            | LifecycleEvent::TaskUnblocked { task, .. }
            | LifecycleEvent::DueDateThresholdCrossed { task, .. } => Some(*task),
            LifecycleEvent::DependencyAdded { edge, .. }
            | LifecycleEvent::DependencyRemoved { edge, .. } => Some(edge.from_task),
            LifecycleEvent::ProjectUpdated { .. } => None,
        }
    }
}
