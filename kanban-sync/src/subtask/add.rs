//! AddSubtask command

use super::load_task;
use crate::error::{KanbanError, Result};
use crate::operation::Execute;
use crate::session::{Change, KanbanSession};
use crate::types::{Subtask, TaskId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Append a checklist item to a task
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSubtask {
    pub task_id: TaskId,
    pub title: String,
}

operation!(AddSubtask, verb = "add", noun = "subtask", description = "Add a subtask to a task");

impl AddSubtask {
    pub fn new(task_id: impl Into<TaskId>, title: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            title: title.into(),
        }
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for AddSubtask {
    async fn execute(&self, ctx: &mut KanbanSession) -> Result<Value> {
        if self.title.trim().is_empty() {
            return Err(KanbanError::missing_field("title"));
        }
        let mut task = load_task(ctx, &self.task_id)?;
        let subtask = Subtask::new(self.title.trim());
        task.subtasks.push(subtask.clone());
        task.recompute_progress();
        let progress = task.progress;

        ctx.store_mut().put_task(task);
        ctx.commit(vec![Change::Task(self.task_id.clone())]);
        Ok(json!({ "subtask": subtask, "progress": progress }))
    }
}
