//! StartTimer command

use crate::error::{KanbanError, Result};
use crate::operation::Execute;
use crate::session::{Change, KanbanSession};
use crate::timer::{elapsed_now, Timers};
use crate::types::TaskId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Start a task's timer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartTimer {
    /// The task to time
    pub task_id: TaskId,
}

operation!(StartTimer, verb = "start", noun = "timer", description = "Start timing a task");

impl StartTimer {
    pub fn new(task_id: impl Into<TaskId>) -> Self {
        Self {
            task_id: task_id.into(),
        }
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for StartTimer {
    async fn execute(&self, ctx: &mut KanbanSession) -> Result<Value> {
        let now = ctx.now();
        let started = Timers::new(ctx.store_mut()).start(&self.task_id, now)?;
        if started {
            ctx.commit(vec![Change::Timer(self.task_id.clone())]);
        }
        Ok(json!({
            "taskId": self.task_id,
            "started": started,
            "elapsed": elapsed_now(ctx.store(), &self.task_id, now)?,
        }))
    }
}
