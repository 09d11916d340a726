//! Error types for the kanban sync engine

use crate::sync::EntityKey;
use thiserror::Error;

/// Result type for kanban operations
pub type Result<T> = std::result::Result<T, KanbanError>;

/// Errors that can occur in kanban operations
#[derive(Debug, Error)]
pub enum KanbanError {
    /// Task not found
    #[error("task not found: {id}")]
    TaskNotFound { id: String },

    /// Column not found
    #[error("column not found: {id}")]
    ColumnNotFound { id: String },

    /// Swimlane not found
    #[error("swimlane not found: {id}")]
    SwimlaneNotFound { id: String },

    /// Generic resource not found (templates, dependencies, archived tasks, ...)
    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    /// A drag named a source column the task is not in
    #[error("task '{task}' is not in column '{column}'")]
    NotInColumn { task: String, column: String },

    /// Column has tasks and cannot be deleted
    #[error("column '{id}' has {count} tasks and cannot be deleted")]
    ColumnNotEmpty { id: String, count: usize },

    /// Duplicate ID
    #[error("duplicate {item_type} ID: {id}")]
    DuplicateId { item_type: String, id: String },

    /// Dependency cycle detected
    #[error("dependency cycle detected: {path}")]
    DependencyCycle { path: String },

    /// Malformed board document or broken placement
    #[error("validation failed: {message}")]
    Validation { message: String },

    /// Missing required field
    #[error("missing required field: {field}")]
    MissingField { field: String },

    /// Invalid field value
    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    /// Parse error
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Local and remote copies of an entity could not be ordered
    #[error("sync conflict on {entity_type} '{entity_id}': {message}")]
    SyncConflict {
        entity_type: String,
        entity_id: String,
        message: String,
    },

    /// The push channel dropped or refused a message
    #[error("push channel lost: {message}")]
    ChannelLoss { message: String },

    /// Reconnect attempts exhausted; the board must be reloaded
    #[error("board is out of sync ({queued} queued mutations); reload required")]
    OutOfSync { queued: usize },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] Box<figment::Error>),
}

impl KanbanError {
    /// Create a parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a duplicate ID error
    pub fn duplicate_id(item_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::DuplicateId {
            item_type: item_type.into(),
            id: id.into(),
        }
    }

    /// Create a generic not-found error
    pub fn not_found(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Create a sync conflict error for an entity whose copies could not be ordered
    pub fn sync_conflict(key: &EntityKey, message: impl Into<String>) -> Self {
        Self::SyncConflict {
            entity_type: key.entity_type.to_string(),
            entity_id: key.entity_id.clone(),
            message: message.into(),
        }
    }

    /// Create a channel loss error
    pub fn channel_loss(message: impl Into<String>) -> Self {
        Self::ChannelLoss {
            message: message.into(),
        }
    }

    /// Check if this error names an unknown entity.
    ///
    /// Not-found errors leave state untouched, so callers treat them as logged no-ops.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::TaskNotFound { .. }
                | Self::ColumnNotFound { .. }
                | Self::SwimlaneNotFound { .. }
                | Self::NotFound { .. }
                | Self::NotInColumn { .. }
        )
    }

    /// Check if this is a retryable error.
    ///
    /// Retryable send failures keep the outbox and trigger a reconnect; any
    /// other failure means the queue cannot be delivered as it stands.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ChannelLoss { .. })
    }
}

impl From<figment::Error> for KanbanError {
    fn from(error: figment::Error) -> Self {
        Self::Config(Box::new(error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = KanbanError::TaskNotFound {
            id: "abc123".into(),
        };
        assert_eq!(err.to_string(), "task not found: abc123");
    }

    #[test]
    fn test_out_of_sync_display() {
        let err = KanbanError::OutOfSync { queued: 3 };
        assert!(err.to_string().contains("3 queued"));
    }

    #[test]
    fn test_not_found_classification() {
        assert!(KanbanError::not_found("template", "x").is_not_found());
        assert!(KanbanError::NotInColumn {
            task: "t1".into(),
            column: "todo".into()
        }
        .is_not_found());
        assert!(!KanbanError::validation("bad").is_not_found());
    }

    #[test]
    fn test_retryable() {
        assert!(KanbanError::channel_loss("closed").is_retryable());
        assert!(!KanbanError::OutOfSync { queued: 0 }.is_retryable());
    }

    #[test]
    fn test_sync_conflict_names_the_entity() {
        let key = EntityKey::new(crate::sync::EntityType::Task, "t7");
        let err = KanbanError::sync_conflict(&key, "remote change has no timestamp");
        assert_eq!(
            err.to_string(),
            "sync conflict on task 't7': remote change has no timestamp"
        );
        assert!(!err.is_retryable());
    }
}
