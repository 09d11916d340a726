//! AddRule command

use crate::error::{KanbanError, Result};
use crate::operation::Execute;
use crate::session::KanbanSession;
use crate::types::{RuleAction, RuleCondition, WorkflowRule};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

fn default_enabled() -> bool {
    true
}

/// Register a workflow rule. Rules run after later local mutations, in the
/// order they were added.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddRule {
    pub name: String,
    pub condition: RuleCondition,
    pub action: RuleAction,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

operation!(AddRule, verb = "add", noun = "rule", description = "Add a workflow rule");

impl AddRule {
    pub fn new(name: impl Into<String>, condition: RuleCondition, action: RuleAction) -> Self {
        Self {
            name: name.into(),
            condition,
            action,
            enabled: true,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for AddRule {
    async fn execute(&self, ctx: &mut KanbanSession) -> Result<Value> {
        if self.name.trim().is_empty() {
            return Err(KanbanError::missing_field("name"));
        }
        if let RuleAction::MoveToColumn { column } = &self.action {
            if ctx.store().get_column(column).is_none() {
                return Err(KanbanError::ColumnNotFound {
                    id: column.to_string(),
                });
            }
        }
        if let RuleAction::SetProgress { progress } = &self.action {
            if *progress > 100 {
                return Err(KanbanError::invalid_value(
                    "progress",
                    format!("{} is not a percentage", progress),
                ));
            }
        }

        let mut rule = WorkflowRule::new(self.name.trim(), self.condition.clone(), self.action.clone());
        rule.enabled = self.enabled;
        let result = serde_json::to_value(&rule)?;
        ctx.rules_mut().push(rule);
        Ok(result)
    }
}
