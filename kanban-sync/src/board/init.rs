//! InitBoard command

use crate::error::{KanbanError, Result};
use crate::operation::Execute;
use crate::session::{Change, KanbanSession};
use crate::store::EntityStore;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Initialize an empty board with the default todo/doing/done columns
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InitBoard {}

operation!(InitBoard, verb = "init", noun = "board", description = "Initialize a new kanban board");

impl InitBoard {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for InitBoard {
    async fn execute(&self, ctx: &mut KanbanSession) -> Result<Value> {
        let existing = ctx.store().board().column_order.len();
        if existing > 0 {
            return Err(KanbanError::validation(format!(
                "board already initialized with {} columns",
                existing
            )));
        }
        ctx.replace_store(EntityStore::with_default_columns());
        ctx.commit(vec![Change::Board]);
        let columns: Vec<_> = ctx.store().board().ordered_columns().cloned().collect();
        Ok(json!({ "columns": columns, "swimlanes": [] }))
    }
}
