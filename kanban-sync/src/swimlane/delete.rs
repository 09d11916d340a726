//! DeleteSwimlane command

use crate::error::{KanbanError, Result};
use crate::operation::Execute;
use crate::session::{Change, KanbanSession};
use crate::types::SwimlaneId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Delete a swimlane. Tasks in it lose their swimlane but stay put.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteSwimlane {
    pub id: SwimlaneId,
}

operation!(DeleteSwimlane, verb = "delete", noun = "swimlane", description = "Delete a swimlane");

impl DeleteSwimlane {
    pub fn new(id: impl Into<SwimlaneId>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for DeleteSwimlane {
    async fn execute(&self, ctx: &mut KanbanSession) -> Result<Value> {
        let cleared = ctx.engine().delete_swimlane(&self.id)?;
        let mut changes = vec![Change::Swimlane(self.id.clone())];
        changes.extend(cleared.iter().cloned().map(Change::Task));
        ctx.commit(changes);
        Ok(json!({ "deleted": true, "id": self.id, "cleared": cleared }))
    }
}
