//! GetBoard command

use crate::error::{KanbanError, Result};
use crate::operation::Execute;
use crate::projection::{group_by_swimlane, ViewQuery};
use crate::session::KanbanSession;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Get the board as seen through a search term and filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetBoard {
    #[serde(default)]
    pub query: ViewQuery,
    /// Also group each column's visible tasks by swimlane
    #[serde(default)]
    pub lanes: bool,
}

operation!(GetBoard, verb = "get", noun = "board", description = "Get the projected board view", read_only);

impl GetBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, query: ViewQuery) -> Self {
        self.query = query;
        self
    }

    pub fn with_lanes(mut self) -> Self {
        self.lanes = true;
        self
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for GetBoard {
    async fn execute(&self, ctx: &mut KanbanSession) -> Result<Value> {
        let view = ctx.view(&self.query);
        let mut result = serde_json::to_value(&view)?;
        result["visibleTasks"] = json!(view.visible_count());
        result["totalTasks"] = json!(ctx.store().task_count());
        if self.lanes {
            let lanes: Vec<_> = view
                .columns
                .iter()
                .map(|c| json!({ "column": c.id, "lanes": group_by_swimlane(ctx.store(), c) }))
                .collect();
            result["lanes"] = json!(lanes);
        }
        Ok(result)
    }
}
