//! Activity log entries

use super::ids::{LogEntryId, TaskId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Input keys that name the task an operation acted on
const TASK_KEYS: [&str; 2] = ["taskId", "id"];

/// Nouns whose `id` input is a task id
const TASK_NOUNS: [&str; 1] = ["task"];

/// One processed mutation, successful or not
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: LogEntryId,
    pub timestamp: DateTime<Utc>,
    /// Canonical op string, e.g. "move task"
    pub op: String,
    /// The operation as submitted
    pub input: Value,
    /// The result, or `{"error": ...}`
    pub output: Value,
    /// Client that ran the operation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    pub duration_ms: u64,
    pub ok: bool,
}

impl LogEntry {
    /// Record a successful operation
    pub fn new(
        op: impl Into<String>,
        timestamp: DateTime<Utc>,
        input: Value,
        output: Value,
        duration_ms: u64,
    ) -> Self {
        Self {
            id: LogEntryId::new(),
            timestamp,
            op: op.into(),
            input,
            output,
            actor: None,
            duration_ms,
            ok: true,
        }
    }

    /// Record a refused or failed operation
    pub fn failure(
        op: impl Into<String>,
        timestamp: DateTime<Utc>,
        input: Value,
        error: &str,
        duration_ms: u64,
    ) -> Self {
        Self {
            ok: false,
            ..Self::new(op, timestamp, input, json!({ "error": error }), duration_ms)
        }
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    /// The task this entry acted on, if any.
    ///
    /// `taskId` in the input names it for timer, subtask, comment and
    /// attachment ops; `id` does for task ops. A task created by "add task"
    /// is found in the output.
    pub fn task(&self) -> Option<TaskId> {
        let noun = self.op.rsplit(' ').next().unwrap_or_default();
        let from_input = TASK_KEYS
            .iter()
            .filter(|key| **key == "taskId" || TASK_NOUNS.contains(&noun))
            .find_map(|key| self.input.get(*key).and_then(Value::as_str));
        let from_output = || {
            (self.ok && TASK_NOUNS.contains(&noun))
                .then(|| self.output.get("id").and_then(Value::as_str))
                .flatten()
        };
        from_input.or_else(from_output).map(TaskId::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_for_task_op() {
        let entry = LogEntry::new(
            "add task",
            Utc::now(),
            json!({"title": "Test"}),
            json!({"id": "t1"}),
            50,
        );

        assert!(entry.ok);
        assert!(entry.actor.is_none());
        assert_eq!(entry.task(), Some(TaskId::from("t1")));
    }

    #[test]
    fn test_failure_keeps_error_and_actor() {
        let entry = LogEntry::failure(
            "start timer",
            Utc::now(),
            json!({"taskId": "t9"}),
            "task not found: t9",
            1,
        )
        .with_actor("client-a");

        assert!(!entry.ok);
        assert_eq!(entry.output["error"], "task not found: t9");
        assert_eq!(entry.actor.as_deref(), Some("client-a"));
        assert_eq!(entry.task(), Some(TaskId::from("t9")));
    }

    #[test]
    fn test_column_ids_are_not_tasks() {
        let entry = LogEntry::new(
            "delete column",
            Utc::now(),
            json!({"id": "doing"}),
            json!({"deleted": true, "id": "doing"}),
            2,
        );
        assert_eq!(entry.task(), None);
    }
}
