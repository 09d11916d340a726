//! RenameSwimlane command

use crate::error::{KanbanError, Result};
use crate::operation::Execute;
use crate::session::{Change, KanbanSession};
use crate::types::{Swimlane, SwimlaneId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Change a swimlane's title
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameSwimlane {
    pub id: SwimlaneId,
    pub title: String,
}

operation!(RenameSwimlane, verb = "rename", noun = "swimlane", description = "Rename a swimlane");

impl RenameSwimlane {
    pub fn new(id: impl Into<SwimlaneId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for RenameSwimlane {
    async fn execute(&self, ctx: &mut KanbanSession) -> Result<Value> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(KanbanError::missing_field("title"));
        }
        if ctx.store().get_swimlane(&self.id).is_none() {
            return Err(KanbanError::SwimlaneNotFound {
                id: self.id.to_string(),
            });
        }
        let swimlane = Swimlane::new(self.id.clone(), title);
        let result = serde_json::to_value(&swimlane)?;
        ctx.store_mut().put_swimlane(swimlane);
        ctx.commit(vec![Change::Swimlane(self.id.clone())]);
        Ok(result)
    }
}
