//! GetElapsed command

use crate::error::{KanbanError, Result};
use crate::operation::Execute;
use crate::session::KanbanSession;
use crate::timer::elapsed_now;
use crate::types::TaskId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Sample a task's elapsed time without touching it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetElapsed {
    pub task_id: TaskId,
}

operation!(GetElapsed, verb = "elapsed", noun = "timer", description = "Read a task's elapsed time", read_only);

impl GetElapsed {
    pub fn new(task_id: impl Into<TaskId>) -> Self {
        Self {
            task_id: task_id.into(),
        }
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for GetElapsed {
    async fn execute(&self, ctx: &mut KanbanSession) -> Result<Value> {
        let now = ctx.now();
        let running = ctx
            .store()
            .get_timer(&self.task_id)
            .is_some_and(|t| t.is_running());
        Ok(json!({
            "taskId": self.task_id,
            "elapsed": elapsed_now(ctx.store(), &self.task_id, now)?,
            "running": running,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::AddTask;
    use crate::test_support::session;
    use crate::timer::StartTimer;

    #[tokio::test]
    async fn test_elapsed_is_not_logged() {
        let (clock, mut ctx) = session();
        let added = ctx.process(&AddTask::new("Timed")).await.unwrap();
        let id = added["id"].as_str().unwrap().to_string();
        ctx.process(&StartTimer::new(id.as_str())).await.unwrap();
        let logged = ctx.activity().count();

        clock.advance(1_500);
        let sample = ctx.process(&GetElapsed::new(id.as_str())).await.unwrap();
        assert_eq!(sample["elapsed"], 1_500);
        assert_eq!(sample["running"], true);
        assert_eq!(ctx.activity().count(), logged);
    }
}
