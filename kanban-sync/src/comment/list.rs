//! ListComments command

use super::require_known_task;
use crate::error::{KanbanError, Result};
use crate::operation::Execute;
use crate::session::KanbanSession;
use crate::types::TaskId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// List a task's comments, oldest first
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListComments {
    pub task_id: TaskId,
}

operation!(ListComments, verb = "list", noun = "comments", description = "List comments on a task", read_only);

impl ListComments {
    pub fn new(task_id: impl Into<TaskId>) -> Self {
        Self {
            task_id: task_id.into(),
        }
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for ListComments {
    async fn execute(&self, ctx: &mut KanbanSession) -> Result<Value> {
        require_known_task(ctx.store(), &self.task_id)?;
        let comments = ctx.store().comments(&self.task_id);
        Ok(json!({ "comments": comments, "count": comments.len() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comment::AddComment;
    use crate::sync::EntityPayload;
    use crate::task::{AddTask, ArchiveTask};
    use crate::test_support::session;

    #[tokio::test]
    async fn test_comments_append_in_order() {
        let (clock, mut ctx) = session();
        let id = ctx.process(&AddTask::new("Discuss")).await.unwrap()["id"]
            .as_str()
            .unwrap()
            .to_string();
        ctx.process(&AddComment::new(id.as_str(), "first"))
            .await
            .unwrap();
        clock.advance(1_000);
        ctx.process(&AddComment::new(id.as_str(), "second").by("alice"))
            .await
            .unwrap();

        let listed = ctx.process(&ListComments::new(id.as_str())).await.unwrap();
        assert_eq!(listed["count"], 2);
        assert_eq!(listed["comments"][0]["body"], "first");
        assert_eq!(listed["comments"][0]["author"], "test-client");
        assert_eq!(listed["comments"][1]["author"], "alice");

        let comment_messages = ctx
            .reconciler()
            .outbox()
            .filter(|m| matches!(m.payload, EntityPayload::CommentAdded(_)))
            .count();
        assert_eq!(comment_messages, 2);
    }

    #[tokio::test]
    async fn test_archived_task_still_takes_comments() {
        let (_clock, mut ctx) = session();
        let id = ctx.process(&AddTask::new("Old")).await.unwrap()["id"]
            .as_str()
            .unwrap()
            .to_string();
        ctx.process(&ArchiveTask::new(id.as_str())).await.unwrap();
        ctx.process(&AddComment::new(id.as_str(), "postmortem"))
            .await
            .unwrap();
        assert!(ctx
            .process(&AddComment::new("ghost", "hi"))
            .await
            .unwrap_err()
            .is_not_found());
        assert!(ctx
            .process(&AddComment::new(id.as_str(), "   "))
            .await
            .is_err());
    }
}
