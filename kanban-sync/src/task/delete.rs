//! DeleteTask command

use crate::error::{KanbanError, Result};
use crate::operation::Execute;
use crate::session::{Change, KanbanSession};
use crate::types::TaskId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Delete a task and everything attached to it.
///
/// Works on live and archived tasks. Dependency edges naming the task, its
/// timer, comments and attachments go with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteTask {
    /// The task ID to delete
    pub id: TaskId,
}

operation!(DeleteTask, verb = "delete", noun = "task", description = "Delete a task");

impl DeleteTask {
    /// Create a new DeleteTask command
    pub fn new(id: impl Into<TaskId>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for DeleteTask {
    async fn execute(&self, ctx: &mut KanbanSession) -> Result<Value> {
        let removed = ctx.engine().delete_task(&self.id)?;
        ctx.commit(vec![Change::Task(self.id.clone())]);
        Ok(json!({ "deleted": true, "id": self.id, "title": removed.title }))
    }
}
