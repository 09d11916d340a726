//! ExportBoard command

use crate::document::BoardDocument;
use crate::error::{KanbanError, Result};
use crate::operation::Execute;
use crate::session::KanbanSession;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Serialize the whole board into a transportable document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportBoard {}

operation!(ExportBoard, verb = "export", noun = "board", description = "Export the board as a JSON document", read_only);

impl ExportBoard {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for ExportBoard {
    async fn execute(&self, ctx: &mut KanbanSession) -> Result<Value> {
        Ok(serde_json::to_value(BoardDocument::from_store(ctx.store()))?)
    }
}
