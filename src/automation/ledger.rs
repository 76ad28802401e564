//! Append-only record of rule match attempts.
//!
//! Entries are never mutated after creation and are purged only by age.
//! Rolling per-rule summaries (`execution_count`, `last_executed_at`) live on
//! the rule and stay monotonic regardless of log retention.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::automation::rule::{AutomationRule, RuleId};
use crate::dlog_debug;

/// Unique identifier for a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome classification for a match attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Success,
    Error,
    Skipped,
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionStatus::Success => write!(f, "success"),
            ExecutionStatus::Error => write!(f, "error"),
            ExecutionStatus::Skipped => write!(f, "skipped"),
        }
    }
}

/// One immutable record of a rule match attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionLogEntry {
    pub id: EntryId,
    pub rule_id: RuleId,
    /// JSON rendering of the rule's trigger config at execution time.
    pub trigger_snapshot: serde_json::Value,
    /// JSON rendering of the rule's action config at execution time.
    pub action_snapshot: serde_json::Value,
    pub status: ExecutionStatus,
    pub error_detail: Option<String>,
    pub executed_at: DateTime<Utc>,
}

/// Aggregated view over a rule's log entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RuleStats {
    pub success: u64,
    pub error: u64,
    pub skipped: u64,
    pub last_executed_at: Option<DateTime<Utc>>,
}

impl RuleStats {
    pub fn total(&self) -> u64 {
        self.success + self.error + self.skipped
    }
}

/// Append-only execution log plus the counter-bump side of recording.
#[derive(Debug, Default)]
pub struct ExecutionLedger {
    entries: Vec<ExecutionLogEntry>,
}

impl ExecutionLedger {
    /// Create a new empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry for the rule and atomically bump its rolling
    /// counters. Snapshots are taken from the rule as it is right now, so a
    /// later rule edit cannot change what this record shows.
    pub fn record(
        &mut self,
        rule: &mut AutomationRule,
        status: ExecutionStatus,
        error_detail: Option<String>,
    ) -> &ExecutionLogEntry {
        let now = Utc::now();
        let entry = ExecutionLogEntry {
            id: EntryId::new(),
            rule_id: rule.id,
            trigger_snapshot: serde_json::to_value(&rule.trigger)
                .unwrap_or(serde_json::Value::Null),
            action_snapshot: serde_json::to_value(&rule.action)
                .unwrap_or(serde_json::Value::Null),
            status,
            error_detail,
            executed_at: now,
        };
        rule.execution_count += 1;
        rule.last_executed_at = Some(now);
        dlog_debug!(
            "ledger: rule {} recorded {} (count={})",
            rule.id.short(),
            status,
            rule.execution_count
        );
        self.entries.push(entry);
        self.entries.last().expect("just pushed")
    }

    /// Counts by status and most recent execution time for a rule,
    /// recomputed from the log on demand so it can never drift from it.
    pub fn stats_for(&self, rule_id: RuleId) -> RuleStats {
        let mut stats = RuleStats::default();
        for entry in self.entries.iter().filter(|e| e.rule_id == rule_id) {
            match entry.status {
                ExecutionStatus::Success => stats.success += 1,
                ExecutionStatus::Error => stats.error += 1,
                ExecutionStatus::Skipped => stats.skipped += 1,
            }
            if stats.last_executed_at.map_or(true, |t| entry.executed_at > t) {
                stats.last_executed_at = Some(entry.executed_at);
            }
        }
        stats
    }

    /// The newest `limit` entries, newest first.
    pub fn recent(&self, limit: usize) -> Vec<&ExecutionLogEntry> {
        self.entries.iter().rev().take(limit).collect()
    }

    /// Drop entries older than the retention window. Returns how many were
    /// removed. Rule counters are deliberately untouched.
    pub fn purge_older_than(&mut self, retention: Duration) -> usize {
        let cutoff = Utc::now() - retention;
        let before = self.entries.len();
        self.entries.retain(|e| e.executed_at >= cutoff);
        let purged = before - self.entries.len();
        if purged > 0 {
            dlog_debug!("ledger: purged {} entries older than {}", purged, cutoff);
        }
        purged
    }

    /// Total number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the ledger holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
