//! Task types: Task, Priority, Subtask, Comment, Attachment

use super::ids::{AttachmentId, CommentId, SubtaskId, SwimlaneId, TaskId};
use crate::error::{KanbanError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Task priority
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Canonical wire representation
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = KanbanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(KanbanError::invalid_value(
                "priority",
                format!("expected low, medium or high, got '{}'", other),
            )),
        }
    }
}

/// A checklist item inside a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: SubtaskId,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

impl Subtask {
    /// Create an incomplete subtask
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: SubtaskId::new(),
            title: title.into(),
            completed: false,
        }
    }
}

/// A task/card on the kanban board.
///
/// Column membership is not stored here: the owning column's `task_ids`
/// sequence is the single source of placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swimlane: Option<SwimlaneId>,
    /// Estimated effort in points
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimation: Option<u32>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    #[serde(default)]
    pub custom_fields: BTreeMap<String, Value>,
    /// Percent complete, 0..=100
    #[serde(default)]
    pub progress: u8,
}

impl Task {
    /// Create a new task with a fresh id
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_id(TaskId::new(), title)
    }

    /// Create a new task with an explicit id
    pub fn with_id(id: impl Into<TaskId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            due_date: None,
            priority: Priority::default(),
            completed: false,
            swimlane: None,
            estimation: None,
            subtasks: Vec::new(),
            custom_fields: BTreeMap::new(),
            progress: 0,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the swimlane
    pub fn with_swimlane(mut self, swimlane: impl Into<SwimlaneId>) -> Self {
        self.swimlane = Some(swimlane.into());
        self
    }

    /// Set the due date
    pub fn with_due_date(mut self, due: NaiveDate) -> Self {
        self.due_date = Some(due);
        self
    }

    /// Set progress, rejecting values above 100
    pub fn set_progress(&mut self, percent: u8) -> Result<()> {
        check_progress(percent)?;
        self.progress = percent;
        Ok(())
    }

    /// Check a task that arrived whole, from an import or another client
    pub fn validate(&self) -> Result<()> {
        check_progress(self.progress)
    }

    /// Recompute progress from subtasks. Tasks without subtasks keep their manual value.
    pub fn recompute_progress(&mut self) {
        let total = self.subtasks.len();
        if total == 0 {
            return;
        }
        let done = self.subtasks.iter().filter(|s| s.completed).count();
        // done <= total, so the quotient is at most 100
        self.progress = u8::try_from(done * 100 / total).unwrap_or(100);
    }

    /// True when the task has subtasks and all of them are complete
    pub fn all_subtasks_complete(&self) -> bool {
        !self.subtasks.is_empty() && self.subtasks.iter().all(|s| s.completed)
    }

    /// Case-insensitive substring match on title and description.
    ///
    /// `needle` must already be lowercase.
    pub fn matches_search(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.title.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
    }

    /// Look up a field by its wire name, falling back to custom fields
    pub fn field_value(&self, field: &str) -> Option<Value> {
        let top = match field {
            "id" => Some(Value::from(self.id.as_str())),
            "title" => Some(Value::from(self.title.as_str())),
            "description" => Some(Value::from(self.description.as_str())),
            "dueDate" => Some(
                self.due_date
                    .map(|d| Value::from(d.to_string()))
                    .unwrap_or(Value::Null),
            ),
            "priority" => Some(Value::from(self.priority.as_str())),
            "completed" => Some(Value::from(self.completed)),
            "swimlane" => Some(
                self.swimlane
                    .as_ref()
                    .map(|s| Value::from(s.as_str()))
                    .unwrap_or(Value::Null),
            ),
            "estimation" => Some(self.estimation.map(Value::from).unwrap_or(Value::Null)),
            "progress" => Some(Value::from(self.progress)),
            _ => None,
        };
        top.or_else(|| self.custom_fields.get(field).cloned())
    }
}

/// A comment on a task. Comments are append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub task_id: TaskId,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Create a new comment
    pub fn new(task_id: impl Into<TaskId>, body: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: CommentId::new(),
            task_id: task_id.into(),
            body: body.into(),
            author: None,
            created_at,
        }
    }

    /// Set the author
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }
}

/// A file reference attached to a task. Attachments are append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: AttachmentId,
    pub task_id: TaskId,
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub size: u64,
    pub added_at: DateTime<Utc>,
}

impl Attachment {
    /// Create a new attachment
    pub fn new(
        task_id: impl Into<TaskId>,
        name: impl Into<String>,
        url: impl Into<String>,
        added_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AttachmentId::new(),
            task_id: task_id.into(),
            name: name.into(),
            url: url.into(),
            mime_type: None,
            size: 0,
            added_at,
        }
    }
}

fn check_progress(percent: u8) -> Result<()> {
    if percent > 100 {
        return Err(KanbanError::invalid_value(
            "progress",
            format!("{} is outside 0..=100", percent),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_parse() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn test_progress_bounds() {
        let mut task = Task::new("Bounded");
        assert!(task.set_progress(100).is_ok());
        assert!(matches!(
            task.set_progress(101),
            Err(KanbanError::InvalidValue { .. })
        ));
        assert_eq!(task.progress, 100);
        assert!(task.validate().is_ok());

        task.progress = 250;
        assert!(matches!(
            task.validate(),
            Err(KanbanError::InvalidValue { ref field, .. }) if field == "progress"
        ));
    }

    #[test]
    fn test_recompute_progress_from_subtasks() {
        let mut task = Task::new("Checklist");
        task.subtasks.push(Subtask::new("one"));
        task.subtasks.push(Subtask::new("two"));
        task.subtasks.push(Subtask::new("three"));
        task.subtasks[0].completed = true;
        task.recompute_progress();
        assert_eq!(task.progress, 33);

        for s in &mut task.subtasks {
            s.completed = true;
        }
        task.recompute_progress();
        assert_eq!(task.progress, 100);
        assert!(task.all_subtasks_complete());
    }

    #[test]
    fn test_recompute_without_subtasks_keeps_manual_value() {
        let mut task = Task::new("Manual");
        task.set_progress(40).unwrap();
        task.recompute_progress();
        assert_eq!(task.progress, 40);
    }

    #[test]
    fn test_search_matches_title_and_description() {
        let task = Task::new("Fix Login").with_description("OAuth Redirect broken");
        assert!(task.matches_search("login"));
        assert!(task.matches_search("redirect"));
        assert!(task.matches_search(""));
        assert!(!task.matches_search("logout"));
    }

    #[test]
    fn test_field_value_falls_back_to_custom_fields() {
        let mut task = Task::new("Fields").with_priority(Priority::High);
        task.custom_fields
            .insert("team".into(), Value::from("platform"));
        assert_eq!(task.field_value("priority"), Some(Value::from("high")));
        assert_eq!(task.field_value("team"), Some(Value::from("platform")));
        assert_eq!(task.field_value("missing"), None);
    }

    #[test]
    fn test_task_serializes_camel_case() {
        let task = Task::with_id("t1", "Wire").with_due_date(NaiveDate::from_ymd_opt(2026, 1, 2).unwrap());
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["dueDate"], "2026-01-02");
        assert_eq!(json["priority"], "medium");
        assert!(json.get("customFields").is_some());
    }
}
