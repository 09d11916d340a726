//! RemoveRule command

use crate::error::{KanbanError, Result};
use crate::operation::Execute;
use crate::session::KanbanSession;
use crate::types::RuleId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Remove a workflow rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveRule {
    pub id: RuleId,
}

operation!(RemoveRule, verb = "remove", noun = "rule", description = "Remove a workflow rule");

impl RemoveRule {
    pub fn new(id: impl Into<RuleId>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for RemoveRule {
    async fn execute(&self, ctx: &mut KanbanSession) -> Result<Value> {
        let rules = ctx.rules_mut();
        let idx = rules
            .iter()
            .position(|r| r.id == self.id)
            .ok_or_else(|| KanbanError::not_found("rule", self.id.as_str()))?;
        let removed = rules.remove(idx);
        Ok(json!({ "removed": true, "id": self.id, "name": removed.name }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::AddRule;
    use crate::task::{AddTask, UpdateTask};
    use crate::test_support::session;
    use crate::types::{ColumnId, RuleAction, RuleCondition, TaskId};

    #[tokio::test]
    async fn test_rule_fires_until_removed() {
        let (_clock, mut ctx) = session();
        let rule = ctx
            .process(&AddRule::new(
                "completed goes to done",
                RuleCondition::Completed,
                RuleAction::MoveToColumn {
                    column: "done".into(),
                },
            ))
            .await
            .unwrap();
        let rule_id = rule["id"].as_str().unwrap().to_string();

        let a = ctx.process(&AddTask::new("A")).await.unwrap()["id"]
            .as_str()
            .unwrap()
            .to_string();
        ctx.process(&UpdateTask::new(a.as_str()).with_completed(true))
            .await
            .unwrap();
        assert_eq!(
            ctx.store().board().column_of(&TaskId::from(a.as_str())),
            Some(&ColumnId::from("done"))
        );

        ctx.process(&RemoveRule::new(rule_id.as_str())).await.unwrap();
        assert!(ctx.rules().is_empty());

        let b = ctx.process(&AddTask::new("B")).await.unwrap()["id"]
            .as_str()
            .unwrap()
            .to_string();
        ctx.process(&UpdateTask::new(b.as_str()).with_completed(true))
            .await
            .unwrap();
        assert_eq!(
            ctx.store().board().column_of(&TaskId::from(b.as_str())),
            Some(&ColumnId::from("todo"))
        );
    }

    #[tokio::test]
    async fn test_rule_validation() {
        let (_clock, mut ctx) = session();
        let err = ctx
            .process(&AddRule::new(
                "nowhere",
                RuleCondition::Completed,
                RuleAction::MoveToColumn {
                    column: "archive".into(),
                },
            ))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(ctx
            .process(&RemoveRule::new("missing"))
            .await
            .unwrap_err()
            .is_not_found());
    }
}
