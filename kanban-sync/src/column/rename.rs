//! RenameColumn command

use crate::error::{KanbanError, Result};
use crate::operation::Execute;
use crate::session::{Change, KanbanSession};
use crate::types::ColumnId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Change a column's title
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameColumn {
    pub id: ColumnId,
    pub title: String,
}

operation!(RenameColumn, verb = "rename", noun = "column", description = "Rename a column");

impl RenameColumn {
    pub fn new(id: impl Into<ColumnId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for RenameColumn {
    async fn execute(&self, ctx: &mut KanbanSession) -> Result<Value> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(KanbanError::missing_field("title"));
        }
        let column = ctx
            .store_mut()
            .column_mut(&self.id)
            .ok_or_else(|| KanbanError::ColumnNotFound {
                id: self.id.to_string(),
            })?;
        column.title = title.to_string();
        ctx.commit(vec![Change::Column(self.id.clone())]);
        Ok(json!({ "id": self.id, "title": title }))
    }
}
