//! SaveTemplate command

use crate::error::{KanbanError, Result};
use crate::operation::Execute;
use crate::session::KanbanSession;
use crate::template::BoardTemplate;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Snapshot the current board under a name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveTemplate {
    pub name: String,
}

operation!(SaveTemplate, verb = "save", noun = "template", description = "Save the board as a named template");

impl SaveTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for SaveTemplate {
    async fn execute(&self, ctx: &mut KanbanSession) -> Result<Value> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(KanbanError::missing_field("name"));
        }
        let template = BoardTemplate::capture(name, ctx.store(), ctx.now());
        if let Some(disk) = ctx.template_store() {
            disk.save(&template).await?;
        }
        let summary = serde_json::to_value(template.summary())?;
        ctx.templates_mut().insert(template);
        Ok(summary)
    }
}
