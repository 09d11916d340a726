//! DeleteTemplate command

use crate::error::{KanbanError, Result};
use crate::operation::Execute;
use crate::session::KanbanSession;
use crate::types::TemplateId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

/// Forget a saved template, on disk too when a template directory is configured
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteTemplate {
    pub id: TemplateId,
}

operation!(DeleteTemplate, verb = "delete", noun = "template", description = "Delete a saved board template");

impl DeleteTemplate {
    pub fn new(id: impl Into<TemplateId>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for DeleteTemplate {
    async fn execute(&self, ctx: &mut KanbanSession) -> Result<Value> {
        ctx.templates().get(&self.id)?;
        if let Some(disk) = ctx.template_store() {
            match disk.delete(&self.id).await {
                Ok(()) => {}
                Err(e) if e.is_not_found() => debug!(template = %self.id, "template had no file"),
                Err(e) => return Err(e),
            }
        }
        let removed = ctx.templates_mut().remove(&self.id)?;
        Ok(json!({ "deleted": true, "id": self.id, "name": removed.name }))
    }
}
