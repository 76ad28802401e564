//! In-memory reference implementation of the collaborator traits.
//!
//! Backs the crate's own tests and gives hosts something to prototype
//! against before wiring in their real repositories.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::core::access::{Notification, NotificationSink, ProjectAccess, TaskAccess};
use crate::core::task::{ProjectId, TaskId, TaskStatus};
use crate::{Error, Result};

/// A task record held by [`InMemoryHost`].
#[derive(Debug, Clone)]
pub struct MemoryTask {
    pub name: String,
    pub description: String,
    pub status: TaskStatus,
    pub project: Option<ProjectId>,
    pub labels: Vec<String>,
    /// Set exactly while the task is in `Done`.
    pub completed_at: Option<DateTime<Utc>>,
}

/// A delivered notification, kept for inspection.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub notification: Notification,
    pub recipients: Vec<String>,
}

#[derive(Default)]
struct Inner {
    tasks: HashMap<TaskId, MemoryTask>,
    deliveries: Vec<Delivery>,
}

/// Mutex-guarded in-memory host implementing all three collaborator traits.
#[derive(Default)]
pub struct InMemoryHost {
    inner: Mutex<Inner>,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a task with the given status and project scope, returning its id.
    pub fn add_task(
        &self,
        name: &str,
        status: TaskStatus,
        project: Option<ProjectId>,
    ) -> TaskId {
        let id = TaskId::new();
        let completed_at = (status == TaskStatus::Done).then(Utc::now);
        self.inner.lock().unwrap().tasks.insert(
            id,
            MemoryTask {
                name: name.to_string(),
                description: String::new(),
                status,
                project,
                labels: Vec::new(),
                completed_at,
            },
        );
        id
    }

    /// Snapshot of a task record.
    pub fn task(&self, id: TaskId) -> Option<MemoryTask> {
        self.inner.lock().unwrap().tasks.get(&id).cloned()
    }

    /// All notifications delivered so far, in order.
    pub fn deliveries(&self) -> Vec<Delivery> {
        self.inner.lock().unwrap().deliveries.clone()
    }

    /// Number of tasks currently stored.
    pub fn task_count(&self) -> usize {
        self.inner.lock().unwrap().tasks.len()
    }

    /// Find a task id by name, if present.
    pub fn find_by_name(&self, name: &str) -> Option<TaskId> {
        self.inner
            .lock()
            .unwrap()
            .tasks
            .iter()
            .find(|(_, t)| t.name == name)
            .map(|(id, _)| *id)
    }
}

impl TaskAccess for InMemoryHost {
    fn get_status(&self, task: TaskId) -> Result<TaskStatus> {
        self.inner
            .lock()
            .unwrap()
            .tasks
            .get(&task)
            .map(|t| t.status)
            .ok_or(Error::TaskNotFound { id: task })
    }

    fn set_status(&self, task: TaskId, status: TaskStatus) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        let record = inner
            .tasks
            .get_mut(&task)
            .ok_or(Error::TaskNotFound { id: task })?;
        record.status = status;
        record.completed_at = (status == TaskStatus::Done).then(Utc::now);
        Ok(())
    }

    fn exists(&self, task: TaskId) -> bool {
        self.inner.lock().unwrap().tasks.contains_key(&task)
    }

    fn create_task(
        &self,
        project: Option<ProjectId>,
        name: &str,
        description: &str,
    ) -> Result<TaskId> {
        let id = TaskId::new();
        self.inner.lock().unwrap().tasks.insert(
            id,
            MemoryTask {
                name: name.to_string(),
                description: description.to_string(),
                status: TaskStatus::Pending,
                project,
                labels: Vec::new(),
                completed_at: None,
            },
        );
        Ok(id)
    }

    fn attach_label(&self, task: TaskId, label: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        let record = inner
            .tasks
            .get_mut(&task)
            .ok_or(Error::TaskNotFound { id: task })?;
        if !record.labels.iter().any(|l| l == label) {
            record.labels.push(label.to_string());
        }
        Ok(())
    }
}

impl ProjectAccess for InMemoryHost {
    fn scope_of(&self, task: TaskId) -> Option<ProjectId> {
        self.inner
            .lock()
            .unwrap()
            .tasks
            .get(&task)
            .and_then(|t| t.project)
    }
}

impl NotificationSink for InMemoryHost {
    fn notify(&self, notification: &Notification, recipients: &[String]) -> Result<()> {
        self.inner.lock().unwrap().deliveries.push(Delivery {
            notification: notification.clone(),
            recipients: recipients.to_vec(),
        });
        Ok(())
    }
}
