//! Derived blocking views over the edge set.
//!
//! Everything here is a read-time derivation. In particular `is_blocked`
//! never writes a `Blocked` status back to the task repository; whether to
//! reflect the derived value into the stored status is the host's call.

use crate::core::access::TaskAccess;
use crate::core::task::{TaskId, TaskStatus};
use crate::graph::store::DependencyStore;
use crate::Result;

/// Pure queries over the blocking-kind subset of the edge set.
pub struct BlockingResolver;

impl BlockingResolver {
    /// Tasks that must complete before `task` can be considered unblocked:
    /// the targets of its blocking-kind outgoing edges.
    pub fn blocking_tasks_of(store: &DependencyStore, task: TaskId) -> Vec<TaskId> {
        let mut out: Vec<TaskId> = store
            .list_outgoing(task)
            .into_iter()
            .filter(|e| e.kind.is_blocking())
            .map(|e| e.to_task)
            .collect();
        out.sort();
        out.dedup();
        out
    }

    /// Tasks waiting on `task`: the sources of its blocking-kind incoming
    /// edges.
    pub fn blocked_tasks_of(store: &DependencyStore, task: TaskId) -> Vec<TaskId> {
        let mut out: Vec<TaskId> = store
            .list_incoming(task)
            .into_iter()
            .filter(|e| e.kind.is_blocking())
            .map(|e| e.from_task)
            .collect();
        out.sort();
        out.dedup();
        out
    }

    /// Whether any of `task`'s blocking targets is not yet done.
    ///
    /// A blocker that no longer exists in the repository does not block;
    /// its edges are expected to be cascade-removed by the task lifecycle.
    pub fn is_blocked(
        store: &DependencyStore,
        tasks: &dyn TaskAccess,
        task: TaskId,
    ) -> Result<bool> {
        for blocker in Self::blocking_tasks_of(store, task) {
            if !tasks.exists(blocker) {
                continue;
            }
            if tasks.get_status(blocker)? != TaskStatus::Done {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
