//! DeleteDependency command

use crate::error::{KanbanError, Result};
use crate::operation::Execute;
use crate::session::{Change, KanbanSession};
use crate::types::DependencyId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Remove a dependency edge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteDependency {
    pub id: DependencyId,
}

operation!(DeleteDependency, verb = "delete", noun = "dependency", description = "Delete a dependency edge");

impl DeleteDependency {
    pub fn new(id: impl Into<DependencyId>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for DeleteDependency {
    async fn execute(&self, ctx: &mut KanbanSession) -> Result<Value> {
        let removed = ctx
            .store_mut()
            .remove_dependency(&self.id)
            .ok_or_else(|| KanbanError::not_found("dependency", self.id.as_str()))?;
        ctx.commit(vec![Change::Dependency(self.id.clone())]);
        Ok(json!({
            "deleted": true,
            "id": self.id,
            "taskId": removed.task_id,
            "dependentTaskId": removed.dependent_task_id,
        }))
    }
}
