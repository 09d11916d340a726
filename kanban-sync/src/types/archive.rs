//! Archived tasks

use super::ids::{ColumnId, TaskId};
use super::task::Task;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A task removed from the board but kept for restore
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivedTask {
    pub task: Task,
    /// The column the task lived in when archived
    pub column_id: ColumnId,
    pub archived_at: DateTime<Utc>,
}

impl ArchivedTask {
    /// Archive a task taken out of `column_id`
    pub fn new(task: Task, column_id: ColumnId, archived_at: DateTime<Utc>) -> Self {
        Self {
            task,
            column_id,
            archived_at,
        }
    }

    /// The archived task's id
    pub fn id(&self) -> &TaskId {
        &self.task.id
    }
}
