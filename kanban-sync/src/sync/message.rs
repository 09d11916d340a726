//! Wire messages exchanged over the push channel

use super::stamp::Stamp;
use crate::document::BoardDocument;
use crate::types::{
    ArchivedTask, Attachment, ClientId, ColumnId, Comment, Dependency, MessageId, Swimlane, Task,
    TimerState,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of entity a message is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Board,
    Task,
    Column,
    Swimlane,
    Dependency,
    Timer,
    Comment,
    Attachment,
}

impl EntityType {
    /// Canonical wire name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Board => "board",
            Self::Task => "task",
            Self::Column => "column",
            Self::Swimlane => "swimlane",
            Self::Dependency => "dependency",
            Self::Timer => "timer",
            Self::Comment => "comment",
            Self::Attachment => "attachment",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of one entity for conflict tracking
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityKey {
    pub entity_type: EntityType,
    pub entity_id: String,
}

impl EntityKey {
    /// Create a key
    pub fn new(entity_type: EntityType, entity_id: impl Into<String>) -> Self {
        Self {
            entity_type,
            entity_id: entity_id.into(),
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.entity_type, self.entity_id)
    }
}

/// Where a task sits: column plus index in that column's sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub column: ColumnId,
    pub index: usize,
}

/// Full replacement state for one entity.
///
/// Payloads always carry whole objects; receivers replace, never merge fields.
/// A task's placement travels with the task so a move is a single message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum EntityPayload {
    TaskUpsert { task: Task, placement: Placement },
    TaskDeleted,
    TaskArchived(ArchivedTask),
    ColumnUpsert { id: ColumnId, title: String, index: usize },
    ColumnDeleted,
    SwimlaneUpsert(Swimlane),
    SwimlaneDeleted,
    DependencyUpsert(Dependency),
    DependencyDeleted,
    Timer(TimerState),
    CommentAdded(Comment),
    AttachmentAdded(Attachment),
    BoardReplaced(Box<BoardDocument>),
}

impl EntityPayload {
    /// The entity kind this payload describes
    pub fn entity_type(&self) -> EntityType {
        match self {
            Self::TaskUpsert { .. } | Self::TaskDeleted | Self::TaskArchived(_) => EntityType::Task,
            Self::ColumnUpsert { .. } | Self::ColumnDeleted => EntityType::Column,
            Self::SwimlaneUpsert(_) | Self::SwimlaneDeleted => EntityType::Swimlane,
            Self::DependencyUpsert(_) | Self::DependencyDeleted => EntityType::Dependency,
            Self::Timer(_) => EntityType::Timer,
            Self::CommentAdded(_) => EntityType::Comment,
            Self::AttachmentAdded(_) => EntityType::Attachment,
            Self::BoardReplaced(_) => EntityType::Board,
        }
    }
}

/// One mutation on the push channel: `{entityType, entityId, payload, timestamp}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncMessage {
    pub id: MessageId,
    pub entity_type: EntityType,
    pub entity_id: String,
    pub payload: EntityPayload,
    /// Absent on paths that never stamped the mutation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Stamp>,
    pub origin: ClientId,
}

impl SyncMessage {
    /// Build a stamped message
    pub fn new(
        entity_id: impl Into<String>,
        payload: EntityPayload,
        timestamp: Option<Stamp>,
        origin: ClientId,
    ) -> Self {
        Self {
            id: MessageId::new(),
            entity_type: payload.entity_type(),
            entity_id: entity_id.into(),
            payload,
            timestamp,
            origin,
        }
    }

    /// The conflict-tracking key for this message
    pub fn key(&self) -> EntityKey {
        EntityKey::new(self.entity_type, self.entity_id.clone())
    }
}
