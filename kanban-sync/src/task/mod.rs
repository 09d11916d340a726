//! Task commands

mod add;
mod archive;
mod delete;
mod get;
mod list_archived;
mod mv;
mod unarchive;
mod update;

pub use add::AddTask;
pub use archive::ArchiveTask;
pub use delete::DeleteTask;
pub use get::GetTask;
pub use list_archived::ListArchived;
pub use mv::MoveTask;
pub use unarchive::UnarchiveTask;
pub use update::UpdateTask;

use crate::error::{KanbanError, Result};
use crate::store::EntityStore;
use crate::types::TaskId;
use serde_json::{json, Value};

/// A live task as JSON with its `column` and `index` alongside the task fields
pub(crate) fn placed_task_json(store: &EntityStore, id: &TaskId) -> Result<Value> {
    let task = store.get_task(id).ok_or_else(|| KanbanError::TaskNotFound {
        id: id.to_string(),
    })?;
    let mut value = serde_json::to_value(task)?;
    if let Some((column, index)) = store.board().position_of(id) {
        value["column"] = json!(column);
        value["index"] = json!(index);
    }
    Ok(value)
}
