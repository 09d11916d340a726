//! MoveTask command

use crate::error::{KanbanError, Result};
use crate::operation::Execute;
use crate::session::{Change, KanbanSession};
use crate::types::{ColumnId, TaskId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Move a task within or between columns.
///
/// `index` is in the target column's post-removal index space and is
/// clamped; omitted, the task goes to the end. A drop on the slot the task
/// already holds changes nothing and broadcasts nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveTask {
    /// The task ID to move
    pub id: TaskId,
    /// Column the drag started in (default: the task's current column)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<ColumnId>,
    /// Column the task was dropped on
    pub to: ColumnId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

operation!(MoveTask, verb = "move", noun = "task", description = "Move a task to a different column or position");

impl MoveTask {
    /// Move to the end of a column
    pub fn to_column(id: impl Into<TaskId>, to: impl Into<ColumnId>) -> Self {
        Self {
            id: id.into(),
            from: None,
            to: to.into(),
            index: None,
        }
    }

    /// Full drag: source column, target column and slot
    pub fn new(
        id: impl Into<TaskId>,
        from: impl Into<ColumnId>,
        to: impl Into<ColumnId>,
        index: usize,
    ) -> Self {
        Self {
            id: id.into(),
            from: Some(from.into()),
            to: to.into(),
            index: Some(index),
        }
    }

    pub fn at_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for MoveTask {
    async fn execute(&self, ctx: &mut KanbanSession) -> Result<Value> {
        let from = match &self.from {
            Some(from) => from.clone(),
            None => ctx
                .store()
                .board()
                .column_of(&self.id)
                .cloned()
                .ok_or_else(|| KanbanError::TaskNotFound {
                    id: self.id.to_string(),
                })?,
        };
        let moved = ctx
            .engine()
            .move_task(&self.id, &from, &self.to, self.index.unwrap_or(usize::MAX))?;
        if moved {
            ctx.commit(vec![Change::Task(self.id.clone())]);
        }

        let (column, index) = ctx
            .store()
            .board()
            .position_of(&self.id)
            .map(|(c, i)| (c.clone(), i))
            .ok_or_else(|| KanbanError::TaskNotFound {
                id: self.id.to_string(),
            })?;
        Ok(json!({ "id": self.id, "moved": moved, "column": column, "index": index }))
    }
}
