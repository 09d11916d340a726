//! ToggleSubtask command

use super::load_task;
use crate::error::{KanbanError, Result};
use crate::operation::Execute;
use crate::session::{Change, KanbanSession};
use crate::types::{SubtaskId, TaskId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Flip a subtask's completed flag, or set it explicitly
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleSubtask {
    pub task_id: TaskId,
    pub subtask_id: SubtaskId,
    /// Explicit state; omitted flips the current one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

operation!(ToggleSubtask, verb = "toggle", noun = "subtask", description = "Toggle a subtask's completion");

impl ToggleSubtask {
    pub fn new(task_id: impl Into<TaskId>, subtask_id: impl Into<SubtaskId>) -> Self {
        Self {
            task_id: task_id.into(),
            subtask_id: subtask_id.into(),
            completed: None,
        }
    }

    pub fn set(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for ToggleSubtask {
    async fn execute(&self, ctx: &mut KanbanSession) -> Result<Value> {
        let mut task = load_task(ctx, &self.task_id)?;
        let subtask = task
            .subtasks
            .iter_mut()
            .find(|s| s.id == self.subtask_id)
            .ok_or_else(|| KanbanError::not_found("subtask", self.subtask_id.as_str()))?;
        let completed = self.completed.unwrap_or(!subtask.completed);
        let changed = subtask.completed != completed;
        subtask.completed = completed;
        task.recompute_progress();
        let progress = task.progress;

        if changed {
            ctx.store_mut().put_task(task);
            ctx.commit(vec![Change::Task(self.task_id.clone())]);
        }
        Ok(json!({
            "subtaskId": self.subtask_id,
            "completed": completed,
            "progress": progress,
        }))
    }
}
