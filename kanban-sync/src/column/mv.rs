//! MoveColumn command

use crate::error::{KanbanError, Result};
use crate::operation::Execute;
use crate::session::{Change, KanbanSession};
use crate::types::ColumnId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Reorder a column; `index` is in post-removal index space and clamped
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveColumn {
    pub id: ColumnId,
    pub index: usize,
}

operation!(MoveColumn, verb = "move", noun = "column", description = "Move a column to a new position");

impl MoveColumn {
    pub fn new(id: impl Into<ColumnId>, index: usize) -> Self {
        Self {
            id: id.into(),
            index,
        }
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for MoveColumn {
    async fn execute(&self, ctx: &mut KanbanSession) -> Result<Value> {
        let moved = ctx.engine().move_column(&self.id, self.index)?;
        if moved {
            ctx.commit(vec![Change::Column(self.id.clone())]);
        }
        Ok(json!({
            "id": self.id,
            "moved": moved,
            "columnOrder": ctx.store().board().column_order,
        }))
    }
}
