//! GetTask command

use super::placed_task_json;
use crate::error::{KanbanError, Result};
use crate::operation::Execute;
use crate::session::KanbanSession;
use crate::timer::elapsed_now;
use crate::types::TaskId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Get a task by ID with computed fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetTask {
    /// The task ID to retrieve
    pub id: TaskId,
}

operation!(GetTask, verb = "get", noun = "task", description = "Retrieve a task by ID with computed fields", read_only);

impl GetTask {
    /// Create a new GetTask command
    pub fn new(id: impl Into<TaskId>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for GetTask {
    async fn execute(&self, ctx: &mut KanbanSession) -> Result<Value> {
        let store = ctx.store();
        let mut result = match store.get_archived(&self.id) {
            Some(archived) => {
                let mut value = serde_json::to_value(&archived.task)?;
                value["archived"] = json!(true);
                value["column"] = json!(archived.column_id);
                value
            }
            None => {
                let mut value = placed_task_json(store, &self.id)?;
                value["archived"] = json!(false);
                value
            }
        };

        let blocked_by: Vec<&TaskId> = store
            .dependencies()
            .filter(|d| d.dependent_task_id == self.id)
            .map(|d| &d.task_id)
            .collect();
        let blocks: Vec<&TaskId> = store
            .dependencies()
            .filter(|d| d.task_id == self.id)
            .map(|d| &d.dependent_task_id)
            .collect();

        result["elapsed"] = json!(elapsed_now(store, &self.id, ctx.now())?);
        result["blockedBy"] = json!(blocked_by);
        result["blocks"] = json!(blocks);
        result["commentCount"] = json!(store.comments(&self.id).len());
        result["attachmentCount"] = json!(store.attachments(&self.id).len());
        Ok(result)
    }
}
