use thiserror::Error;

use crate::automation::rule::RuleId;
use crate::core::task::TaskId;
use crate::graph::edge::EdgeId;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Task cannot depend on itself: {task}")]
    SelfDependency { task: TaskId },

    #[error("Dependency from {from} to {to} would create a cycle")]
    CircularDependency { from: TaskId, to: TaskId },

    #[error("Dependency edge not found: {id}")]
    EdgeNotFound { id: EdgeId },

    #[error("Automation rule not found: {id}")]
    RuleNotFound { id: RuleId },

    #[error("Task not found: {id}")]
    TaskNotFound { id: TaskId },

    #[error("Trigger evaluation failed: {0}")]
    TriggerEvaluation(String),

    #[error("Action execution failed: {0}")]
    ActionExecution(String),

    #[error("Automation cascade exceeded depth limit of {limit}")]
    RecursionDepthExceeded { limit: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
