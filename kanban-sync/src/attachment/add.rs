//! AddAttachment command

use crate::comment::require_known_task;
use crate::error::{KanbanError, Result};
use crate::operation::Execute;
use crate::session::{Change, KanbanSession};
use crate::types::{Attachment, TaskId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Attach a file reference to a task
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddAttachment {
    pub task_id: TaskId,
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub size: u64,
}

operation!(AddAttachment, verb = "add", noun = "attachment", description = "Attach a file to a task");

impl AddAttachment {
    pub fn new(task_id: impl Into<TaskId>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            name: name.into(),
            url: url.into(),
            mime_type: None,
            size: 0,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for AddAttachment {
    async fn execute(&self, ctx: &mut KanbanSession) -> Result<Value> {
        if self.name.trim().is_empty() {
            return Err(KanbanError::missing_field("name"));
        }
        if self.url.trim().is_empty() {
            return Err(KanbanError::missing_field("url"));
        }
        require_known_task(ctx.store(), &self.task_id)?;

        let mut attachment = Attachment::new(
            self.task_id.clone(),
            self.name.trim(),
            self.url.trim(),
            ctx.now(),
        );
        attachment.mime_type = self.mime_type.clone();
        attachment.size = self.size;

        let result = serde_json::to_value(&attachment)?;
        ctx.store_mut().append_attachment(attachment.clone());
        ctx.commit(vec![Change::Attachment(attachment)]);
        Ok(result)
    }
}
