//! AddSwimlane command

use crate::error::{KanbanError, Result};
use crate::operation::Execute;
use crate::session::{Change, KanbanSession};
use crate::types::{Swimlane, SwimlaneId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Add a swimlane
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddSwimlane {
    /// Swimlane ID (default: generated)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SwimlaneId>,
    pub title: String,
}

operation!(AddSwimlane, verb = "add", noun = "swimlane", description = "Add a swimlane to the board");

impl AddSwimlane {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
        }
    }

    pub fn with_id(mut self, id: impl Into<SwimlaneId>) -> Self {
        self.id = Some(id.into());
        self
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for AddSwimlane {
    async fn execute(&self, ctx: &mut KanbanSession) -> Result<Value> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(KanbanError::missing_field("title"));
        }
        let id = self.id.clone().unwrap_or_default();
        if ctx.store().get_swimlane(&id).is_some() {
            return Err(KanbanError::duplicate_id("swimlane", id.as_str()));
        }
        let swimlane = Swimlane::new(id.clone(), title);
        let result = serde_json::to_value(&swimlane)?;
        ctx.store_mut().put_swimlane(swimlane);
        ctx.commit(vec![Change::Swimlane(id)]);
        Ok(result)
    }
}
