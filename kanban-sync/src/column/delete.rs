//! DeleteColumn command

use crate::error::{KanbanError, Result};
use crate::operation::Execute;
use crate::session::{Change, KanbanSession};
use crate::types::ColumnId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Delete an empty column. A column that still holds tasks is refused.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteColumn {
    pub id: ColumnId,
}

operation!(DeleteColumn, verb = "delete", noun = "column", description = "Delete an empty column");

impl DeleteColumn {
    pub fn new(id: impl Into<ColumnId>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for DeleteColumn {
    async fn execute(&self, ctx: &mut KanbanSession) -> Result<Value> {
        let removed = ctx.engine().delete_column(&self.id)?;
        ctx.commit(vec![Change::Column(self.id.clone())]);
        Ok(json!({ "deleted": true, "id": self.id, "title": removed.title }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::AddTask;
    use crate::test_support::session;

    #[tokio::test]
    async fn test_non_empty_column_is_refused() {
        let (_clock, mut ctx) = session();
        ctx.process(&AddTask::new("Busy").in_column("doing"))
            .await
            .unwrap();
        let err = ctx.process(&DeleteColumn::new("doing")).await.unwrap_err();
        assert!(matches!(err, KanbanError::ColumnNotEmpty { count: 1, .. }));

        ctx.process(&DeleteColumn::new("done")).await.unwrap();
        assert_eq!(ctx.store().board().column_order.len(), 2);
    }
}
