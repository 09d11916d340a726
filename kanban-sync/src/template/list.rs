//! ListTemplates command

use crate::error::{KanbanError, Result};
use crate::operation::Execute;
use crate::session::KanbanSession;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// List saved templates, oldest first
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListTemplates {}

operation!(ListTemplates, verb = "list", noun = "templates", description = "List saved board templates", read_only);

#[async_trait]
impl Execute<KanbanSession, KanbanError> for ListTemplates {
    async fn execute(&self, ctx: &mut KanbanSession) -> Result<Value> {
        let templates = ctx.templates().list();
        Ok(json!({ "count": templates.len(), "templates": templates }))
    }
}
