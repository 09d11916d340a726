//! ResetTimer command

use crate::error::{KanbanError, Result};
use crate::operation::Execute;
use crate::session::{Change, KanbanSession};
use crate::timer::Timers;
use crate::types::TaskId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Stop a task's timer and discard its accumulated time
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetTimer {
    pub task_id: TaskId,
}

operation!(ResetTimer, verb = "reset", noun = "timer", description = "Clear a task's accumulated time");

impl ResetTimer {
    pub fn new(task_id: impl Into<TaskId>) -> Self {
        Self {
            task_id: task_id.into(),
        }
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for ResetTimer {
    async fn execute(&self, ctx: &mut KanbanSession) -> Result<Value> {
        let cleared = Timers::new(ctx.store_mut()).reset(&self.task_id)?;
        if cleared {
            ctx.commit(vec![Change::Timer(self.task_id.clone())]);
        }
        Ok(json!({ "taskId": self.task_id, "reset": cleared }))
    }
}
