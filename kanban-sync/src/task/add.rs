//! AddTask command

use super::placed_task_json;
use crate::error::{KanbanError, Result};
use crate::operation::Execute;
use crate::session::{Change, KanbanSession};
use crate::types::{ColumnId, Priority, SwimlaneId, Task};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Add a new task to the board
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTask {
    /// The task title (required)
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Target column (default: first column)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<ColumnId>,
    /// Slot in the column (default: end)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swimlane: Option<SwimlaneId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimation: Option<u32>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_fields: BTreeMap<String, Value>,
}

operation!(AddTask, verb = "add", noun = "task", description = "Create a new task on the board");

impl AddTask {
    /// Create a new AddTask command with just a title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            column: None,
            index: None,
            priority: None,
            due_date: None,
            swimlane: None,
            estimation: None,
            custom_fields: BTreeMap::new(),
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Place the task in a column
    pub fn in_column(mut self, column: impl Into<ColumnId>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Place the task at a slot
    pub fn at_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_swimlane(mut self, swimlane: impl Into<SwimlaneId>) -> Self {
        self.swimlane = Some(swimlane.into());
        self
    }

    pub fn with_field(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.custom_fields.insert(field.into(), value.into());
        self
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for AddTask {
    async fn execute(&self, ctx: &mut KanbanSession) -> Result<Value> {
        if self.title.trim().is_empty() {
            return Err(KanbanError::missing_field("title"));
        }
        let column = match &self.column {
            Some(column) => column.clone(),
            None => ctx
                .store()
                .board()
                .first_column()
                .map(|c| c.id.clone())
                .ok_or_else(|| KanbanError::validation("board has no columns"))?,
        };
        if let Some(swimlane) = &self.swimlane {
            if ctx.store().get_swimlane(swimlane).is_none() {
                return Err(KanbanError::SwimlaneNotFound {
                    id: swimlane.to_string(),
                });
            }
        }

        let mut task = Task::new(self.title.trim());
        task.description = self.description.clone().unwrap_or_default();
        task.priority = self.priority.unwrap_or_default();
        task.due_date = self.due_date;
        task.swimlane = self.swimlane.clone();
        task.estimation = self.estimation;
        task.custom_fields = self.custom_fields.clone();
        let id = task.id.clone();

        ctx.engine().add_task(task, &column, self.index)?;
        ctx.commit(vec![Change::Task(id.clone())]);
        placed_task_json(ctx.store(), &id)
    }
}
