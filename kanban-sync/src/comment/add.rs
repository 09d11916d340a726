//! AddComment command

use super::require_known_task;
use crate::error::{KanbanError, Result};
use crate::operation::Execute;
use crate::session::{Change, KanbanSession};
use crate::types::{Comment, TaskId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Append a comment to a task
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddComment {
    pub task_id: TaskId,
    pub body: String,
    /// Author name (default: this client's id)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

operation!(AddComment, verb = "add", noun = "comment", description = "Add a comment to a task");

impl AddComment {
    pub fn new(task_id: impl Into<TaskId>, body: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            body: body.into(),
            author: None,
        }
    }

    pub fn by(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for AddComment {
    async fn execute(&self, ctx: &mut KanbanSession) -> Result<Value> {
        if self.body.trim().is_empty() {
            return Err(KanbanError::missing_field("body"));
        }
        require_known_task(ctx.store(), &self.task_id)?;

        let author = self
            .author
            .clone()
            .unwrap_or_else(|| ctx.config().client_id.to_string());
        let comment = Comment::new(self.task_id.clone(), self.body.as_str(), ctx.now()).with_author(author);
        let result = serde_json::to_value(&comment)?;
        ctx.store_mut().append_comment(comment.clone());
        ctx.commit(vec![Change::Comment(comment)]);
        Ok(result)
    }
}
