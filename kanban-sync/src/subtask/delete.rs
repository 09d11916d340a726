//! DeleteSubtask command

use super::load_task;
use crate::error::{KanbanError, Result};
use crate::operation::Execute;
use crate::session::{Change, KanbanSession};
use crate::types::{SubtaskId, TaskId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Remove a checklist item from a task
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSubtask {
    pub task_id: TaskId,
    pub subtask_id: SubtaskId,
}

operation!(DeleteSubtask, verb = "delete", noun = "subtask", description = "Remove a subtask from a task");

impl DeleteSubtask {
    pub fn new(task_id: impl Into<TaskId>, subtask_id: impl Into<SubtaskId>) -> Self {
        Self {
            task_id: task_id.into(),
            subtask_id: subtask_id.into(),
        }
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for DeleteSubtask {
    async fn execute(&self, ctx: &mut KanbanSession) -> Result<Value> {
        let mut task = load_task(ctx, &self.task_id)?;
        let before = task.subtasks.len();
        task.subtasks.retain(|s| s.id != self.subtask_id);
        if task.subtasks.len() == before {
            return Err(KanbanError::not_found("subtask", self.subtask_id.as_str()));
        }
        task.recompute_progress();
        let progress = task.progress;

        ctx.store_mut().put_task(task);
        ctx.commit(vec![Change::Task(self.task_id.clone())]);
        Ok(json!({ "deleted": true, "subtaskId": self.subtask_id, "progress": progress }))
    }
}
