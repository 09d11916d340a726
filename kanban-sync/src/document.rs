//! Board export/import document.
//!
//! The document is a single JSON object with required keys `columnOrder`,
//! `columns` and `tasks`. Swimlanes, dependencies, timers, comments,
//! attachments and the archive are optional on import and always written on
//! export. Import replaces state wholesale; there is no partial merge.

use crate::error::{KanbanError, Result};
use crate::ordering::verify_placement;
use crate::store::EntityStore;
use crate::types::{
    ArchivedTask, Attachment, Board, Column, ColumnId, Comment, Dependency, Swimlane, SwimlaneId,
    Task, TaskId, TimerState,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Keys an import document must carry
pub const REQUIRED_KEYS: [&str; 3] = ["columnOrder", "columns", "tasks"];

/// Transportable snapshot of a whole board
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardDocument {
    pub column_order: Vec<ColumnId>,
    pub columns: BTreeMap<ColumnId, Column>,
    pub tasks: BTreeMap<TaskId, Task>,
    #[serde(default)]
    pub swimlanes: BTreeMap<SwimlaneId, Swimlane>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
    #[serde(default)]
    pub timers: BTreeMap<TaskId, TimerState>,
    #[serde(default)]
    pub comments: BTreeMap<TaskId, Vec<Comment>>,
    #[serde(default)]
    pub attachments: BTreeMap<TaskId, Vec<Attachment>>,
    #[serde(default)]
    pub archived: Vec<ArchivedTask>,
}

impl BoardDocument {
    /// Deep snapshot of a store
    pub fn from_store(store: &EntityStore) -> Self {
        Self {
            column_order: store.board.column_order.clone(),
            columns: store.board.columns.clone(),
            tasks: store.tasks.clone(),
            swimlanes: store.swimlanes.clone(),
            dependencies: store.dependencies.values().cloned().collect(),
            timers: store.timers.clone(),
            comments: store.comments.clone(),
            attachments: store.attachments.clone(),
            archived: store.archive.clone(),
        }
    }

    /// Parse a document from an arbitrary JSON value, checking required keys first
    pub fn from_value(value: Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| KanbanError::validation("board document must be a JSON object"))?;
        if let Some(missing) = REQUIRED_KEYS.iter().find(|k| !object.contains_key(**k)) {
            return Err(KanbanError::missing_field(*missing));
        }
        serde_json::from_value(value).map_err(|e| KanbanError::validation(e.to_string()))
    }

    /// Parse a document from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| KanbanError::validation(e.to_string()))?;
        Self::from_value(value)
    }

    /// Render as pretty JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build a store from this document, rejecting broken placement
    pub fn into_store(self) -> Result<EntityStore> {
        let mut dependencies = BTreeMap::new();
        for dep in self.dependencies {
            if dependencies.insert(dep.id.clone(), dep).is_some() {
                return Err(KanbanError::validation("duplicate dependency id"));
            }
        }
        let store = EntityStore {
            board: Board {
                column_order: self.column_order,
                columns: self.columns,
            },
            tasks: self.tasks,
            swimlanes: self.swimlanes,
            dependencies,
            timers: self.timers,
            comments: self.comments,
            attachments: self.attachments,
            archive: self.archived,
        };
        for (key, task) in &store.tasks {
            if key != &task.id {
                return Err(KanbanError::validation(format!(
                    "task stored under '{}' has id '{}'",
                    key, task.id
                )));
            }
            task.validate()?;
        }
        for archived in &store.archive {
            archived.task.validate()?;
        }
        verify_placement(&store)?;
        Ok(store)
    }
}
