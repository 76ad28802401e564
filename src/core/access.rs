//! Capability-style interfaces to the host application.
//!
//! The engine never touches the host's storage directly. Everything it needs
//! from the surrounding project tracker goes through these narrow traits,
//! which keeps the core testable and the blast radius of automation actions
//! explicit.

use serde::{Deserialize, Serialize};

use crate::core::task::{ProjectId, TaskId, TaskStatus};
use crate::Result;

/// Narrow view of the host's task repository.
///
/// Implementations own the completion-timestamp contract: the timestamp is
/// set exactly when `set_status` transitions a task into [`TaskStatus::Done`]
/// and cleared on any transition out of it.
pub trait TaskAccess: Send + Sync {
    /// Current status of a task.
    fn get_status(&self, task: TaskId) -> Result<TaskStatus>;

    /// Write a new status for a task.
    fn set_status(&self, task: TaskId, status: TaskStatus) -> Result<()>;

    /// Whether the task exists at all.
    fn exists(&self, task: TaskId) -> bool;

    /// Create a new task in the given project, returning its id.
    ///
    /// Used by the `CreateTask` automation action.
    fn create_task(&self, project: Option<ProjectId>, name: &str, description: &str)
        -> Result<TaskId>;

    /// Attach a label to a task. Attaching an already-present label is a no-op.
    fn attach_label(&self, task: TaskId, label: &str) -> Result<()>;
}

/// Narrow view of the host's project repository.
pub trait ProjectAccess: Send + Sync {
    /// The project a task belongs to, if any.
    fn scope_of(&self, task: TaskId) -> Option<ProjectId>;
}

/// A notification produced by an automation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// The task the notification is about, if the triggering event had one.
    pub task: Option<TaskId>,
    /// Human-readable message configured on the rule.
    pub message: String,
}

/// Sink for notifications emitted by automation actions.
pub trait NotificationSink: Send + Sync {
    /// Deliver a notification to the given recipients.
    fn notify(&self, notification: &Notification, recipients: &[String]) -> Result<()>;
}
