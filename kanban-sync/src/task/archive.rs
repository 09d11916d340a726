//! ArchiveTask command

use crate::error::{KanbanError, Result};
use crate::operation::Execute;
use crate::session::{Change, KanbanSession};
use crate::types::TaskId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Take a task off the board into the archive, remembering its column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveTask {
    pub id: TaskId,
}

operation!(ArchiveTask, verb = "archive", noun = "task", description = "Move a task to the archive");

impl ArchiveTask {
    pub fn new(id: impl Into<TaskId>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for ArchiveTask {
    async fn execute(&self, ctx: &mut KanbanSession) -> Result<Value> {
        let now = ctx.now();
        let timer_running = ctx
            .store()
            .get_timer(&self.id)
            .is_some_and(|t| t.is_running());

        let archived = ctx.engine().archive_task(&self.id, now)?;

        let mut changes = vec![Change::Task(self.id.clone())];
        if timer_running {
            changes.push(Change::Timer(self.id.clone()));
        }
        ctx.commit(changes);
        Ok(serde_json::to_value(&archived)?)
    }
}
