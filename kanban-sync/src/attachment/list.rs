//! ListAttachments command

use crate::comment::require_known_task;
use crate::error::{KanbanError, Result};
use crate::operation::Execute;
use crate::session::KanbanSession;
use crate::types::TaskId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// List a task's attachments, oldest first
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAttachments {
    pub task_id: TaskId,
}

operation!(ListAttachments, verb = "list", noun = "attachments", description = "List attachments on a task", read_only);

impl ListAttachments {
    pub fn new(task_id: impl Into<TaskId>) -> Self {
        Self {
            task_id: task_id.into(),
        }
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for ListAttachments {
    async fn execute(&self, ctx: &mut KanbanSession) -> Result<Value> {
        require_known_task(ctx.store(), &self.task_id)?;
        let attachments = ctx.store().attachments(&self.task_id);
        let total: u64 = attachments.iter().map(|a| a.size).sum();
        Ok(json!({
            "attachments": attachments,
            "count": attachments.len(),
            "totalSize": total,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachment::AddAttachment;
    use crate::task::AddTask;
    use crate::test_support::session;

    #[tokio::test]
    async fn test_attach_and_list() {
        let (_clock, mut ctx) = session();
        let id = ctx.process(&AddTask::new("Design")).await.unwrap()["id"]
            .as_str()
            .unwrap()
            .to_string();
        let added = ctx
            .process(
                &AddAttachment::new(id.as_str(), "mock.png", "https://files.example/mock.png")
                    .with_mime_type("image/png")
                    .with_size(2048),
            )
            .await
            .unwrap();
        assert_eq!(added["mimeType"], "image/png");

        ctx.process(&AddAttachment::new(id.as_str(), "notes.txt", "file:///notes.txt"))
            .await
            .unwrap();

        let listed = ctx.process(&ListAttachments::new(id.as_str())).await.unwrap();
        assert_eq!(listed["count"], 2);
        assert_eq!(listed["totalSize"], 2048);
        assert_eq!(listed["attachments"][1]["name"], "notes.txt");
    }

    #[tokio::test]
    async fn test_missing_url_rejected() {
        let (_clock, mut ctx) = session();
        let id = ctx.process(&AddTask::new("Design")).await.unwrap()["id"]
            .as_str()
            .unwrap()
            .to_string();
        let err = ctx
            .process(&AddAttachment::new(id.as_str(), "x", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, KanbanError::MissingField { .. }));
    }
}
