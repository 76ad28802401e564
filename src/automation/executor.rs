//! Action execution with per-rule failure isolation.
//!
//! Each matched rule runs exactly one action against the collaborator
//! traits. A failure is converted into an error outcome for the ledger and
//! never propagates to the caller of the original mutation; automation is
//! best-effort relative to the primary operation.

use crate::automation::event::LifecycleEvent;
use crate::automation::ledger::ExecutionStatus;
use crate::automation::rule::{ActionConfig, AutomationRule};
use crate::core::access::{Notification, NotificationSink, TaskAccess};
use crate::core::task::TaskStatus;
use crate::{dlog_debug, Result};

/// Result of running one rule's action.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    pub status: ExecutionStatus,
    pub detail: Option<String>,
    /// Events caused by the action, to be re-dispatched by the engine with
    /// the cascade depth incremented.
    pub follow_ups: Vec<LifecycleEvent>,
}

impl ActionOutcome {
    fn success(follow_ups: Vec<LifecycleEvent>) -> Self {
        Self {
            status: ExecutionStatus::Success,
            detail: None,
            follow_ups,
        }
    }

    fn skipped(detail: &str) -> Self {
        Self {
            status: ExecutionStatus::Skipped,
            detail: Some(detail.to_string()),
            follow_ups: Vec::new(),
        }
    }

    fn error(detail: String) -> Self {
        Self {
            status: ExecutionStatus::Error,
            detail: Some(detail),
            follow_ups: Vec::new(),
        }
    }
}

/// Executes matched rules' actions against the host collaborators.
pub struct ActionExecutor;

impl ActionExecutor {
    /// Run one rule's action for one event. Never returns an `Err`; every
    /// failure is folded into the outcome.
    pub fn execute(
        rule: &AutomationRule,
        event: &LifecycleEvent,
        tasks: &dyn TaskAccess,
        notifier: &dyn NotificationSink,
    ) -> ActionOutcome {
        let outcome = match Self::run(&rule.action, event, tasks, notifier) {
            Ok(outcome) => outcome,
            Err(e) => ActionOutcome::error(e.to_string()),
        };
        dlog_debug!(
            "rule {} action -> {:?}",
            rule.id.short(),
            outcome.status
        );
        outcome
    }

    fn run(
        action: &ActionConfig,
        event: &LifecycleEvent,
        tasks: &dyn TaskAccess,
        notifier: &dyn NotificationSink,
    ) -> Result<ActionOutcome> {
        match action {
            ActionConfig::ChangeStatus { to } => {
                let Some(task) = event.task() else {
                    return Ok(ActionOutcome::skipped("event has no task"));
                };
                let from = tasks.get_status(task)?;
                if from == *to {
                    return Ok(ActionOutcome::skipped("task already at target status"));
                }
                tasks.set_status(task, *to)?;
                Ok(ActionOutcome::success(vec![
                    LifecycleEvent::TaskStatusChanged {
                        task,
                        project: event.project(),
                        from,
                        to: *to,
                    },
                ]))
            }
            ActionConfig::Notify {
                recipients,
                message,
            } => {
                if recipients.is_empty() {
                    return Ok(ActionOutcome::skipped("no recipients configured"));
                }
                let notification = Notification {
                    task: event.task(),
                    message: message.clone(),
                };
                notifier.notify(&notification, recipients)?;
                Ok(ActionOutcome::success(Vec::new()))
            }
            ActionConfig::CreateTask { name, description } => {
                let task = tasks.create_task(event.project(), name, description)?;
                Ok(ActionOutcome::success(vec![LifecycleEvent::TaskCreated {
                    task,
                    project: event.project(),
                    name: name.clone(),
                }]))
            }
            ActionConfig::AttachLabel { label } => {
                let Some(task) = event.task() else {
                    return Ok(ActionOutcome::skipped("event has no task"));
                };
                tasks.attach_label(task, label)?;
                Ok(ActionOutcome::success(Vec::new()))
            }
        }
    }
}
