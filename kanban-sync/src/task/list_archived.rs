//! ListArchived command

use crate::error::{KanbanError, Result};
use crate::operation::Execute;
use crate::session::KanbanSession;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// List archived tasks, oldest first
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListArchived {}

operation!(ListArchived, verb = "list", noun = "archived", description = "List archived tasks", read_only);

#[async_trait]
impl Execute<KanbanSession, KanbanError> for ListArchived {
    async fn execute(&self, ctx: &mut KanbanSession) -> Result<Value> {
        let archived = ctx.store().archived();
        Ok(json!({ "archived": archived, "count": archived.len() }))
    }
}
