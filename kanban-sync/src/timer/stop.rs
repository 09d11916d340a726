//! StopTimer command

use crate::error::{KanbanError, Result};
use crate::operation::Execute;
use crate::session::{Change, KanbanSession};
use crate::timer::Timers;
use crate::types::TaskId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Stop a task's timer, committing the time since it started
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopTimer {
    pub task_id: TaskId,
}

operation!(StopTimer, verb = "stop", noun = "timer", description = "Stop timing a task");

impl StopTimer {
    pub fn new(task_id: impl Into<TaskId>) -> Self {
        Self {
            task_id: task_id.into(),
        }
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for StopTimer {
    async fn execute(&self, ctx: &mut KanbanSession) -> Result<Value> {
        let now = ctx.now();
        let stopped = Timers::new(ctx.store_mut()).stop(&self.task_id, now)?;
        if stopped {
            ctx.commit(vec![Change::Timer(self.task_id.clone())]);
        }
        let elapsed = ctx
            .store()
            .get_timer(&self.task_id)
            .map(|t| t.elapsed)
            .unwrap_or(0);
        Ok(json!({ "taskId": self.task_id, "stopped": stopped, "elapsed": elapsed }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::AddTask;
    use crate::test_support::session;
    use crate::timer::StartTimer;

    #[tokio::test]
    async fn test_stop_commits_elapsed() {
        let (clock, mut ctx) = session();
        let added = ctx.process(&AddTask::new("Timed")).await.unwrap();
        let id = added["id"].as_str().unwrap().to_string();

        ctx.process(&StartTimer::new(id.as_str())).await.unwrap();
        clock.advance(5_000);
        let result = ctx.process(&StopTimer::new(id.as_str())).await.unwrap();
        assert_eq!(result["elapsed"], 5_000);

        let again = ctx.process(&StopTimer::new(id.as_str())).await.unwrap();
        assert_eq!(again["stopped"], false);
        assert_eq!(again["elapsed"], 5_000);
    }
}
