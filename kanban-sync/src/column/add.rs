//! AddColumn command

use crate::error::{KanbanError, Result};
use crate::operation::Execute;
use crate::session::{Change, KanbanSession};
use crate::types::{Column, ColumnId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Add an empty column to the board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddColumn {
    /// Column ID (default: generated)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ColumnId>,
    pub title: String,
    /// Slot in the column order (default: last)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

operation!(AddColumn, verb = "add", noun = "column", description = "Add a column to the board");

impl AddColumn {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            index: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<ColumnId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn at_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for AddColumn {
    async fn execute(&self, ctx: &mut KanbanSession) -> Result<Value> {
        if self.title.trim().is_empty() {
            return Err(KanbanError::missing_field("title"));
        }
        let id = self.id.clone().unwrap_or_default();
        let index = ctx
            .engine()
            .add_column(Column::new(id.clone(), self.title.trim()), self.index)?;
        ctx.commit(vec![Change::Column(id.clone())]);
        Ok(json!({ "id": id, "title": self.title.trim(), "index": index }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::session;

    #[tokio::test]
    async fn test_add_column_at_index() {
        let (_clock, mut ctx) = session();
        let result = ctx
            .process(&AddColumn::new("Review").with_id("review").at_index(2))
            .await
            .unwrap();
        assert_eq!(result["index"], 2);
        let order: Vec<_> = ctx
            .store()
            .board()
            .column_order
            .iter()
            .map(|c| c.as_str())
            .collect();
        assert_eq!(order, vec!["todo", "doing", "review", "done"]);
    }

    #[tokio::test]
    async fn test_duplicate_column_rejected() {
        let (_clock, mut ctx) = session();
        let err = ctx
            .process(&AddColumn::new("Again").with_id("todo"))
            .await
            .unwrap_err();
        assert!(matches!(err, KanbanError::DuplicateId { .. }));
    }
}
