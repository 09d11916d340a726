//! Comment commands. Comments are append-only.

mod add;
mod list;

pub use add::AddComment;
pub use list::ListComments;

use crate::error::{KanbanError, Result};
use crate::store::EntityStore;
use crate::types::TaskId;

/// Comments and attachments may hang off live or archived tasks
pub(crate) fn require_known_task(store: &EntityStore, task: &TaskId) -> Result<()> {
    if store.get_task(task).is_some() || store.get_archived(task).is_some() {
        Ok(())
    } else {
        Err(KanbanError::TaskNotFound {
            id: task.to_string(),
        })
    }
}
