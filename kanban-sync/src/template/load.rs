//! LoadTemplate command

use crate::error::{KanbanError, Result};
use crate::operation::Execute;
use crate::session::{Change, KanbanSession};
use crate::types::TemplateId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Replace the board with a saved template. The replace is broadcast whole.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadTemplate {
    pub id: TemplateId,
}

operation!(LoadTemplate, verb = "load", noun = "template", description = "Replace the board with a saved template");

impl LoadTemplate {
    pub fn new(id: impl Into<TemplateId>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for LoadTemplate {
    async fn execute(&self, ctx: &mut KanbanSession) -> Result<Value> {
        let template = ctx.templates().get(&self.id)?;
        let name = template.name.clone();
        let store = template.document.clone().into_store()?;
        ctx.replace_store(store);
        ctx.commit(vec![Change::Board]);
        Ok(json!({
            "loaded": true,
            "id": self.id,
            "name": name,
            "taskCount": ctx.store().task_count(),
        }))
    }
}
