pub mod config;
pub mod error;
pub mod log;

// Dependency graph + rule engine
pub mod automation;
pub mod core;
pub mod engine;
pub mod graph;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{Error, Result};

pub use automation::event::LifecycleEvent;
pub use automation::ledger::{ExecutionLogEntry, ExecutionStatus, RuleStats};
pub use automation::rule::{
    ActionConfig, AutomationRule, RuleId, RuleScope, RuleUpdate, TriggerConfig,
};
pub use crate::core::access::{Notification, NotificationSink, ProjectAccess, TaskAccess};
pub use crate::core::task::{ProjectId, TaskId, TaskStatus};
pub use graph::edge::{DependencyEdge, EdgeId, RelationKind};
