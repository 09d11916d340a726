//! ImportBoard command

use crate::document::BoardDocument;
use crate::error::{KanbanError, Result};
use crate::operation::Execute;
use crate::session::{Change, KanbanSession};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Replace the whole board with an exported document.
///
/// The document must carry `columnOrder`, `columns` and `tasks`; a document
/// that is malformed or breaks placement is rejected and the board is kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportBoard {
    pub document: Value,
}

operation!(ImportBoard, verb = "import", noun = "board", description = "Replace the board with an exported document");

impl ImportBoard {
    pub fn new(document: Value) -> Self {
        Self { document }
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for ImportBoard {
    async fn execute(&self, ctx: &mut KanbanSession) -> Result<Value> {
        let store = BoardDocument::from_value(self.document.clone())?.into_store()?;
        ctx.replace_store(store);
        ctx.commit(vec![Change::Board]);
        let store = ctx.store();
        Ok(json!({
            "imported": true,
            "columns": store.board().column_order.len(),
            "tasks": store.task_count(),
            "archived": store.archived().len(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::ExportBoard;
    use crate::task::{AddTask, MoveTask};
    use crate::test_support::session;

    #[tokio::test]
    async fn test_export_import_restores_board() {
        let (_clock, mut ctx) = session();
        let a = ctx.process(&AddTask::new("A")).await.unwrap()["id"]
            .as_str()
            .unwrap()
            .to_string();
        ctx.process(&AddTask::new("B").in_column("doing"))
            .await
            .unwrap();
        let exported = ctx.process(&ExportBoard::new()).await.unwrap();
        let snapshot = ctx.store().clone();

        ctx.process(&MoveTask::to_column(a.as_str(), "done"))
            .await
            .unwrap();
        assert_ne!(ctx.store(), &snapshot);

        let result = ctx.process(&ImportBoard::new(exported)).await.unwrap();
        assert_eq!(result["tasks"], 2);
        assert_eq!(ctx.store(), &snapshot);
    }

    #[tokio::test]
    async fn test_malformed_import_keeps_state() {
        let (_clock, mut ctx) = session();
        ctx.process(&AddTask::new("Keep me")).await.unwrap();
        let before = ctx.store().clone();

        let err = ctx
            .process(&ImportBoard::new(json!({"columnOrder": [], "columns": {}})))
            .await
            .unwrap_err();
        assert!(matches!(err, KanbanError::MissingField { .. }));

        let err = ctx
            .process(&ImportBoard::new(json!({
                "columnOrder": ["todo"],
                "columns": {"todo": {"id": "todo", "title": "To Do", "taskIds": ["ghost"]}},
                "tasks": {}
            })))
            .await
            .unwrap_err();
        assert!(matches!(err, KanbanError::Validation { .. }));
        assert_eq!(ctx.store(), &before);
    }

    #[tokio::test]
    async fn test_out_of_range_progress_is_rejected() {
        let (_clock, mut ctx) = session();
        ctx.process(&AddTask::new("Keep me")).await.unwrap();
        let before = ctx.store().clone();
        let queued = ctx.reconciler().queued();

        let err = ctx
            .process(&ImportBoard::new(json!({
                "columnOrder": ["todo"],
                "columns": {"todo": {"id": "todo", "title": "To Do", "taskIds": ["t1"]}},
                "tasks": {"t1": {"id": "t1", "title": "Overdone", "progress": 250}}
            })))
            .await
            .unwrap_err();
        assert!(matches!(err, KanbanError::InvalidValue { ref field, .. } if field == "progress"));
        assert_eq!(ctx.store(), &before);
        assert_eq!(ctx.reconciler().queued(), queued);
    }
}
