//! Workflow rule types
//!
//! Rules are plain data so they can be exported, synced and compared. A rule
//! pairs a [`RuleCondition`] over a task with a [`RuleAction`] to run when the
//! condition holds.

use super::ids::{ColumnId, RuleId};
use super::task::{Priority, Task};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A predicate over a task and the column it sits in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum RuleCondition {
    Completed,
    PriorityIs(Priority),
    InColumn(ColumnId),
    ProgressAtLeast(u8),
    AllSubtasksComplete,
    TitleContains(String),
    All(Vec<RuleCondition>),
    Any(Vec<RuleCondition>),
}

impl RuleCondition {
    /// Evaluate against a task placed in `column`
    pub fn matches(&self, task: &Task, column: Option<&ColumnId>) -> bool {
        match self {
            Self::Completed => task.completed,
            Self::PriorityIs(p) => task.priority == *p,
            Self::InColumn(c) => column == Some(c),
            Self::ProgressAtLeast(n) => task.progress >= *n,
            Self::AllSubtasksComplete => task.all_subtasks_complete(),
            Self::TitleContains(s) => task.title.to_lowercase().contains(&s.to_lowercase()),
            Self::All(conds) => conds.iter().all(|c| c.matches(task, column)),
            Self::Any(conds) => conds.iter().any(|c| c.matches(task, column)),
        }
    }
}

/// What a rule does to a matching task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleAction {
    MoveToColumn { column: ColumnId },
    SetPriority { priority: Priority },
    SetCompleted { completed: bool },
    SetProgress { progress: u8 },
    SetField { field: String, value: Value },
}

/// A condition/action pair evaluated as tasks mutate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRule {
    pub id: RuleId,
    pub name: String,
    pub condition: RuleCondition,
    pub action: RuleAction,
    #[serde(default = "enabled_default")]
    pub enabled: bool,
}

fn enabled_default() -> bool {
    true
}

impl WorkflowRule {
    /// Create an enabled rule
    pub fn new(name: impl Into<String>, condition: RuleCondition, action: RuleAction) -> Self {
        Self {
            id: RuleId::new(),
            name: name.into(),
            condition,
            action,
            enabled: true,
        }
    }

    /// Disable the rule
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}
