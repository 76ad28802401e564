//! Automation rules: typed triggers, typed actions, and the rule store.
//!
//! Trigger and action parameters are closed tagged unions rather than opaque
//! dictionaries; JSON appears only at the storage boundary (serde) and is
//! always deserialized into the typed variant before use.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::automation::event::EventKind;
use crate::core::task::{ProjectId, TaskStatus};
use crate::graph::edge::RelationKind;
use crate::{Error, Result};

/// Unique identifier for an automation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(pub Uuid);

impl RuleId {
    /// Create a new unique rule identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Return first 8 characters of the UUID for display.
    pub fn short(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for RuleId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a rule applies everywhere or to a single project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "scope")]
pub enum RuleScope {
    /// Applies to events in every project.
    Global,
    /// Applies only to events in the given project.
    Project { id: ProjectId },
}

impl RuleScope {
    /// Whether this scope admits an event in the given project.
    pub fn admits(&self, project: Option<ProjectId>) -> bool {
        match self {
            RuleScope::Global => true,
            RuleScope::Project { id } => project == Some(*id),
        }
    }
}

/// Trigger condition, one variant per event kind a rule can react to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum TriggerConfig {
    /// A task was created, optionally with a name matching the given regex.
    TaskCreated { name_matches: Option<String> },
    /// A task's status changed, optionally restricted on either end.
    StatusChanged {
        from: Option<TaskStatus>,
        to: Option<TaskStatus>,
    },
    /// A task became unblocked.
    TaskUnblocked,
    /// A dependency was added, optionally restricted to one relation kind.
    DependencyAdded { kind: Option<RelationKind> },
    /// A dependency was removed.
    DependencyRemoved,
    /// A project was updated.
    ProjectUpdated,
    /// A task's due date is at most `within_hours` away.
    DueDateApproaching { within_hours: i64 },
}

impl TriggerConfig {
    /// The event kind this trigger listens for.
    pub fn event_kind(&self) -> EventKind {
        match self {
            TriggerConfig::TaskCreated { .. } => EventKind::TaskCreated,
            TriggerConfig::StatusChanged { .. } => EventKind::TaskStatusChanged,
            TriggerConfig::TaskUnblocked => EventKind::TaskUnblocked,
            TriggerConfig::DependencyAdded { .. } => EventKind::DependencyAdded,
            TriggerConfig::DependencyRemoved => EventKind::DependencyRemoved,
            TriggerConfig::ProjectUpdated => EventKind::ProjectUpdated,
            TriggerConfig::DueDateApproaching { .. } => EventKind::DueDateThresholdCrossed,
        }
    }
}

/// Action a matched rule performs, one variant per capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum ActionConfig {
    /// Set the event's task to the given status.
    ChangeStatus { to: TaskStatus },
    /// Send a notification to the listed recipients.
    Notify {
        recipients: Vec<String>,
        message: String,
    },
    /// Create a new task in the event's project.
    CreateTask { name: String, description: String },
    /// Attach a label to the event's task.
    AttachLabel { label: String },
}

/// A configured automation rule.
///
/// `last_executed_at` and `execution_count` are rolling summaries mutated
/// only by the execution ledger, never by rule edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomationRule {
    pub id: RuleId,
    pub scope: RuleScope,
    pub trigger: TriggerConfig,
    pub action: ActionConfig,
    pub is_active: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_executed_at: Option<DateTime<Utc>>,
    pub execution_count: u64,
}

impl AutomationRule {
    /// Create a new active rule.
    pub fn new(
        scope: RuleScope,
        trigger: TriggerConfig,
        action: ActionConfig,
        created_by: &str,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: RuleId::new(),
            scope,
            trigger,
            action,
            is_active: true,
            created_by: created_by.to_string(),
            created_at: now,
            updated_at: now,
            last_executed_at: None,
            execution_count: 0,
        }
    }
}

/// User-editable fields for `update_rule`. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct RuleUpdate {
    pub scope: Option<RuleScope>,
    pub trigger: Option<TriggerConfig>,
    pub action: Option<ActionConfig>,
}

/// Owns the rules plus an explicit index grouping rule ids by the event kind
/// their trigger listens for. The index is rebuilt on every rule mutation and
/// always yields rules in creation order with id tie-break, so matching is
/// deterministic.
#[derive(Debug, Default)]
pub struct RuleStore {
    rules: HashMap<RuleId, AutomationRule>,
    by_kind: HashMap<EventKind, Vec<RuleId>>,
}

impl RuleStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a rule and reindex.
    pub fn insert(&mut self, rule: AutomationRule) -> RuleId {
        let id = rule.id;
        self.rules.insert(id, rule);
        self.rebuild_index();
        id
    }

    /// Apply a partial update to a rule and reindex.
    pub fn update(&mut self, id: RuleId, update: RuleUpdate) -> Result<&AutomationRule> {
        let rule = self.rules.get_mut(&id).ok_or(Error::RuleNotFound { id })?;
        if let Some(scope) = update.scope {
            rule.scope = scope;
        }
        if let Some(trigger) = update.trigger {
            rule.trigger = trigger;
        }
        if let Some(action) = update.action {
            rule.action = action;
        }
        rule.updated_at = Utc::now();
        self.rebuild_index();
        Ok(&self.rules[&id])
    }

    /// Flip a rule's active flag, returning the new state.
    pub fn toggle_active(&mut self, id: RuleId) -> Result<bool> {
        let rule = self.rules.get_mut(&id).ok_or(Error::RuleNotFound { id })?;
        rule.is_active = !rule.is_active;
        rule.updated_at = Utc::now();
        Ok(rule.is_active)
    }

    /// Remove a rule and reindex.
    pub fn remove(&mut self, id: RuleId) -> Result<AutomationRule> {
        let rule = self.rules.remove(&id).ok_or(Error::RuleNotFound { id })?;
        self.rebuild_index();
        Ok(rule)
    }

    /// Get a rule by id.
    pub fn get(&self, id: RuleId) -> Option<&AutomationRule> {
        self.rules.get(&id)
    }

    /// Mutable access for the ledger's counter updates.
    pub(crate) fn get_mut(&mut self, id: RuleId) -> Option<&mut AutomationRule> {
        self.rules.get_mut(&id)
    }

    /// All rules in creation order.
    pub fn list(&self) -> Vec<&AutomationRule> {
        let mut rules: Vec<&AutomationRule> = self.rules.values().collect();
        rules.sort_by_key(|r| (r.created_at, r.id));
        rules
    }

    /// Rule ids whose trigger listens for the given event kind, in creation
    /// order.
    pub fn ids_for_kind(&self, kind: EventKind) -> &[RuleId] {
        self.by_kind.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the store holds no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn rebuild_index(&mut self) {
        let mut by_kind: HashMap<EventKind, Vec<RuleId>> = HashMap::new();
        let mut ordered: Vec<&AutomationRule> = self.rules.values().collect();
        ordered.sort_by_key(|r| (r.created_at, r.id));
        for rule in ordered {
            by_kind
                .entry(rule.trigger.event_kind())
                .or_default()
                .push(rule.id);
        }
        self.by_kind = by_kind;
    }
}
