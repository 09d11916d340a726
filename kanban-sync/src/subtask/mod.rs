//! Subtask commands
//!
//! Subtasks live inside their task, so every subtask change rebroadcasts the
//! whole task. Progress follows the completed share of subtasks whenever a
//! task has any.

mod add;
mod delete;
mod toggle;

pub use add::AddSubtask;
pub use delete::DeleteSubtask;
pub use toggle::ToggleSubtask;

use crate::error::{KanbanError, Result};
use crate::session::KanbanSession;
use crate::types::{Task, TaskId};

fn load_task(ctx: &KanbanSession, id: &TaskId) -> Result<Task> {
    ctx.store()
        .get_task(id)
        .cloned()
        .ok_or_else(|| KanbanError::TaskNotFound { id: id.to_string() })
}
