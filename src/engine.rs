//! The engine facade: one entry point wiring the dependency graph and the
//! rule engine together behind a single write lock.
//!
//! All mutable state (edges, rules, ledger) lives in `EngineInner` behind a
//! mutex, making the engine a single logical writer: dependency insertion,
//! event processing, rule matching, and action execution for one triggering
//! mutation run to completion before the mutating call returns. Independent
//! callers may share the engine across threads; the lock serializes them.

use std::sync::{Arc, Mutex};

use chrono::Duration;
use crossbeam_channel::Receiver;

use crate::automation::bus::{LifecycleEventBus, PublishedEvent};
use crate::automation::event::LifecycleEvent;
use crate::automation::executor::ActionExecutor;
use crate::automation::ledger::{ExecutionLedger, ExecutionLogEntry, ExecutionStatus, RuleStats};
use crate::automation::matcher::{MatchOutcome, RuleMatcher};
use crate::automation::rule::{
    ActionConfig, AutomationRule, RuleId, RuleScope, RuleStore, RuleUpdate, TriggerConfig,
};
use crate::config::EngineConfig;
use crate::core::access::{NotificationSink, ProjectAccess, TaskAccess};
use crate::core::task::{TaskId, TaskStatus};
use crate::graph::edge::{DependencyEdge, EdgeId, RelationKind};
use crate::graph::resolver::BlockingResolver;
use crate::graph::store::DependencyStore;
use crate::{dlog, dlog_debug, dlog_warn, Error, Result};

struct EngineInner {
    store: DependencyStore,
    rules: RuleStore,
    ledger: ExecutionLedger,
}

/// Task dependency graph + automation rule engine.
pub struct Engine {
    tasks: Arc<dyn TaskAccess>,
    projects: Arc<dyn ProjectAccess>,
    notifier: Arc<dyn NotificationSink>,
    bus: LifecycleEventBus,
    config: EngineConfig,
    inner: Mutex<EngineInner>,
}

impl Engine {
    /// Create an engine over the given host collaborators.
    pub fn new(
        config: EngineConfig,
        tasks: Arc<dyn TaskAccess>,
        projects: Arc<dyn ProjectAccess>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            tasks,
            projects,
            notifier,
            bus: LifecycleEventBus::new(),
            config,
            inner: Mutex::new(EngineInner {
                store: DependencyStore::new(),
                rules: RuleStore::new(),
                ledger: ExecutionLedger::new(),
            }),
        }
    }

    /// The configuration the engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ========== Dependency graph ==========

    /// Insert a dependency edge and run automation for the resulting
    /// `DependencyAdded` event before returning.
    ///
    /// # Errors
    /// [`Error::SelfDependency`] and [`Error::CircularDependency`] surface
    /// here; automation failures do not.
    pub fn add_dependency(
        &self,
        from: TaskId,
        to: TaskId,
        kind: RelationKind,
    ) -> Result<DependencyEdge> {
        let mut inner = self.lock();
        let edge = inner.store.add(from, to, kind)?;
        dlog!("dependency added: {} -> {} ({})", from.short(), to.short(), kind);

        let event = LifecycleEvent::DependencyAdded {
            edge: edge.clone(),
            project: self.projects.scope_of(from),
        };
        self.process(&mut inner, event, 0);
        Ok(edge)
    }

    /// Remove an edge by id and run automation for the `DependencyRemoved`
    /// event. Synthesizes `TaskUnblocked` if the removal detached the
    /// dependent task's last unfinished blocker.
    pub fn remove_dependency(&self, id: EdgeId) -> Result<DependencyEdge> {
        let mut inner = self.lock();
        let edge = inner.store.remove(id)?;
        dlog!("dependency removed: {}", id.short());

        let event = LifecycleEvent::DependencyRemoved {
            edge: edge.clone(),
            project: self.projects.scope_of(edge.from_task),
        };
        self.process(&mut inner, event, 0);
        Ok(edge)
    }

    /// Cascade-remove every edge touching a destroyed task. Each removal is
    /// processed as its own `DependencyRemoved` event.
    pub fn remove_task_edges(&self, task: TaskId) -> Vec<DependencyEdge> {
        let mut inner = self.lock();
        let removed = inner.store.remove_task_edges(task);
        for edge in &removed {
            let event = LifecycleEvent::DependencyRemoved {
                edge: edge.clone(),
                project: self.projects.scope_of(edge.from_task),
            };
            self.process(&mut inner, event, 0);
        }
        removed
    }

    /// Snapshot of all edges leaving a task.
    pub fn list_outgoing(&self, task: TaskId) -> Vec<DependencyEdge> {
        self.lock().store.list_outgoing(task).into_iter().cloned().collect()
    }

    /// Snapshot of all edges entering a task.
    pub fn list_incoming(&self, task: TaskId) -> Vec<DependencyEdge> {
        self.lock().store.list_incoming(task).into_iter().cloned().collect()
    }

    /// Tasks that must complete before `task` is unblocked.
    pub fn blocking_tasks_of(&self, task: TaskId) -> Vec<TaskId> {
        BlockingResolver::blocking_tasks_of(&self.lock().store, task)
    }

    /// Tasks waiting on `task`.
    pub fn blocked_tasks_of(&self, task: TaskId) -> Vec<TaskId> {
        BlockingResolver::blocked_tasks_of(&self.lock().store, task)
    }

    /// Derived, read-time blockedness. Never writes status back.
    pub fn is_blocked(&self, task: TaskId) -> Result<bool> {
        BlockingResolver::is_blocked(&self.lock().store, self.tasks.as_ref(), task)
    }

    // ========== Rules ==========

    /// Create a new active rule.
    pub fn create_rule(
        &self,
        scope: RuleScope,
        trigger: TriggerConfig,
        action: ActionConfig,
        created_by: &str,
    ) -> AutomationRule {
        let rule = AutomationRule::new(scope, trigger, action, created_by);
        dlog!("rule created: {}", rule.id.short());
        self.lock().rules.insert(rule.clone());
        rule
    }

    /// Apply a partial update to a rule.
    pub fn update_rule(&self, id: RuleId, update: RuleUpdate) -> Result<AutomationRule> {
        self.lock().rules.update(id, update).map(Clone::clone)
    }

    /// Flip a rule's active flag, returning the new state.
    pub fn toggle_active(&self, id: RuleId) -> Result<bool> {
        self.lock().rules.toggle_active(id)
    }

    /// Delete a rule. Its ledger entries are retained.
    pub fn delete_rule(&self, id: RuleId) -> Result<AutomationRule> {
        self.lock().rules.remove(id)
    }

    /// Snapshot of one rule.
    pub fn get_rule(&self, id: RuleId) -> Option<AutomationRule> {
        self.lock().rules.get(id).cloned()
    }

    /// Snapshot of all rules in creation order.
    pub fn list_rules(&self) -> Vec<AutomationRule> {
        self.lock().rules.list().into_iter().cloned().collect()
    }

    // ========== Events & ledger ==========

    /// Process a host-originated lifecycle event. Returns once all rule
    /// matching and action execution for the event (and its bounded cascade)
    /// has been attempted. Automation failures are recorded in the ledger,
    /// never surfaced here.
    pub fn dispatch(&self, event: LifecycleEvent) {
        let mut inner = self.lock();
        self.process(&mut inner, event, 0);
    }

    /// Status counts and most recent execution time for a rule, recomputed
    /// from the retained log.
    pub fn stats_for(&self, rule_id: RuleId) -> RuleStats {
        self.lock().ledger.stats_for(rule_id)
    }

    /// The newest `limit` log entries, newest first.
    pub fn recent_logs(&self, limit: usize) -> Vec<ExecutionLogEntry> {
        self.lock().ledger.recent(limit).into_iter().cloned().collect()
    }

    /// Drop log entries older than the given retention window.
    pub fn purge_logs_older_than(&self, retention: Duration) -> usize {
        self.lock().ledger.purge_older_than(retention)
    }

    /// Drop log entries older than the configured retention window.
    pub fn purge_logs(&self) -> usize {
        self.purge_logs_older_than(Duration::days(self.config.log_retention_days))
    }

    /// Observe processed events. See [`LifecycleEventBus::subscribe`].
    pub fn subscribe(&self) -> Receiver<PublishedEvent> {
        self.bus.subscribe()
    }

    // ========== Internals ==========

    fn lock(&self) -> std::sync::MutexGuard<'_, EngineInner> {
        // A poisoned lock means a panic mid-mutation; propagating the panic
        // is the only sound option for an always-consistent graph.
        self.inner.lock().expect("engine lock poisoned")
    }

    /// Run automation for one event at the given cascade depth, then
    /// synthesize any `TaskUnblocked` events the mutation caused.
    fn process(&self, inner: &mut EngineInner, event: LifecycleEvent, depth: usize) {
        self.bus.publish(&event);
        dlog_debug!("process {} at depth {}", event.kind(), depth);

        let candidate_ids: Vec<RuleId> = RuleMatcher::candidates(&inner.rules, &event)
            .into_iter()
            .map(|r| r.id)
            .collect();

        for id in candidate_ids {
            // Snapshot the rule so evaluation/execution observe a stable
            // config even if an earlier action mutated shared state.
            let Some(rule) = inner.rules.get(id).cloned() else {
                continue;
            };

            match RuleMatcher::evaluate(&rule, &event) {
                MatchOutcome::NotMatched => {}
                MatchOutcome::EvaluationFailed(detail) => {
                    dlog_warn!("rule {} trigger evaluation failed: {}", id.short(), detail);
                    self.record(inner, id, ExecutionStatus::Skipped, Some(detail));
                }
                MatchOutcome::Matched => {
                    let outcome = ActionExecutor::execute(
                        &rule,
                        &event,
                        self.tasks.as_ref(),
                        self.notifier.as_ref(),
                    );
                    self.record(inner, id, outcome.status, outcome.detail);

                    if outcome.follow_ups.is_empty() {
                        continue;
                    }
                    if depth + 1 > self.config.max_cascade_depth {
                        let detail = Error::RecursionDepthExceeded {
                            limit: self.config.max_cascade_depth,
                        }
                        .to_string();
                        dlog_warn!("rule {} halted: {}", id.short(), detail);
                        self.record(inner, id, ExecutionStatus::Error, Some(detail));
                        continue;
                    }
                    for follow_up in outcome.follow_ups {
                        self.process(inner, follow_up, depth + 1);
                    }
                }
            }
        }

        self.synthesize_unblocked(inner, &event, depth);
    }

    fn record(
        &self,
        inner: &mut EngineInner,
        id: RuleId,
        status: ExecutionStatus,
        detail: Option<String>,
    ) {
        // The rule can only be gone if it was deleted between candidate
        // collection and now, which the lock prevents; stay defensive anyway.
        let EngineInner { rules, ledger, .. } = inner;
        if let Some(rule) = rules.get_mut(id) {
            ledger.record(rule, status, detail);
        }
    }

    /// After a task completes or a blocking edge disappears, dependents whose
    /// last unfinished blocker that was get a synthesized `TaskUnblocked`.
    fn synthesize_unblocked(&self, inner: &mut EngineInner, event: &LifecycleEvent, depth: usize) {
        let affected: Vec<TaskId> = match event {
            LifecycleEvent::TaskStatusChanged {
                task,
                to: TaskStatus::Done,
                ..
            } => BlockingResolver::blocked_tasks_of(&inner.store, *task),
            LifecycleEvent::DependencyRemoved { edge, .. } if edge.kind.is_blocking() => {
                vec![edge.from_task]
            }
            _ => return,
        };

        let mut unblocked = Vec::new();
        for task in affected {
            match BlockingResolver::is_blocked(&inner.store, self.tasks.as_ref(), task) {
                Ok(false) => unblocked.push(task),
                Ok(true) => {}
                Err(e) => dlog_warn!("unblocked check failed for {}: {}", task.short(), e),
            }
        }

        for task in unblocked {
            if depth + 1 > self.config.max_cascade_depth {
                dlog_warn!("unblocked cascade halted at depth limit");
                return;
            }
            let event = LifecycleEvent::TaskUnblocked {
                task,
                project: self.projects.scope_of(task),
            };
            self.process(inner, event, depth + 1);
        }
    }
}
