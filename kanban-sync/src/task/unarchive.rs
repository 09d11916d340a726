//! UnarchiveTask command

use super::placed_task_json;
use crate::error::{KanbanError, Result};
use crate::operation::Execute;
use crate::session::{Change, KanbanSession};
use crate::types::TaskId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Restore an archived task to the end of its original column, or the first
/// column if that one is gone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnarchiveTask {
    pub id: TaskId,
}

operation!(UnarchiveTask, verb = "unarchive", noun = "task", description = "Restore a task from the archive");

impl UnarchiveTask {
    pub fn new(id: impl Into<TaskId>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for UnarchiveTask {
    async fn execute(&self, ctx: &mut KanbanSession) -> Result<Value> {
        ctx.engine().unarchive_task(&self.id)?;
        ctx.commit(vec![Change::Task(self.id.clone())]);
        placed_task_json(ctx.store(), &self.id)
    }
}
