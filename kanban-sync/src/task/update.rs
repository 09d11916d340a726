//! UpdateTask command

use super::placed_task_json;
use crate::error::{KanbanError, Result};
use crate::operation::Execute;
use crate::session::{Change, KanbanSession};
use crate::types::{Priority, SwimlaneId, TaskId};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Update an existing task.
///
/// Absent fields are left alone. The stored task is replaced whole.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTask {
    /// The task ID to update
    pub id: TaskId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// None = don't change, Some(None) = clear, Some(Some(x)) = set
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    /// None = don't change, Some(None) = clear, Some(Some(x)) = set
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub swimlane: Option<Option<SwimlaneId>>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub estimation: Option<Option<u32>>,
    /// Replace all custom field values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_fields: Option<BTreeMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
}

/// An explicit `null` means "clear", so a present key is always `Some`
fn present<'de, T, D>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

operation!(UpdateTask, verb = "update", noun = "task", description = "Update task properties");

impl UpdateTask {
    /// Create a new UpdateTask command
    pub fn new(id: impl Into<TaskId>) -> Self {
        Self {
            id: id.into(),
            title: None,
            description: None,
            due_date: None,
            priority: None,
            completed: None,
            swimlane: None,
            estimation: None,
            custom_fields: None,
            progress: None,
        }
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_due_date(mut self, due: Option<NaiveDate>) -> Self {
        self.due_date = Some(due);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    /// Set or clear the swimlane
    pub fn with_swimlane(mut self, swimlane: Option<SwimlaneId>) -> Self {
        self.swimlane = Some(swimlane);
        self
    }

    pub fn with_estimation(mut self, estimation: Option<u32>) -> Self {
        self.estimation = Some(estimation);
        self
    }

    /// Replace all custom field values
    pub fn with_custom_fields(mut self, fields: BTreeMap<String, Value>) -> Self {
        self.custom_fields = Some(fields);
        self
    }

    pub fn with_progress(mut self, progress: u8) -> Self {
        self.progress = Some(progress);
        self
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for UpdateTask {
    async fn execute(&self, ctx: &mut KanbanSession) -> Result<Value> {
        let mut task = ctx
            .store()
            .get_task(&self.id)
            .cloned()
            .ok_or_else(|| KanbanError::TaskNotFound {
                id: self.id.to_string(),
            })?;

        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(KanbanError::missing_field("title"));
            }
            task.title = title.trim().to_string();
        }
        if let Some(Some(swimlane)) = &self.swimlane {
            if ctx.store().get_swimlane(swimlane).is_none() {
                return Err(KanbanError::SwimlaneNotFound {
                    id: swimlane.to_string(),
                });
            }
        }
        if let Some(progress) = self.progress {
            task.set_progress(progress)?;
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(due) = self.due_date {
            task.due_date = due;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        if let Some(swimlane) = &self.swimlane {
            task.swimlane = swimlane.clone();
        }
        if let Some(estimation) = self.estimation {
            task.estimation = estimation;
        }
        if let Some(fields) = &self.custom_fields {
            task.custom_fields = fields.clone();
        }

        ctx.store_mut().put_task(task);
        ctx.commit(vec![Change::Task(self.id.clone())]);
        placed_task_json(ctx.store(), &self.id)
    }
}
