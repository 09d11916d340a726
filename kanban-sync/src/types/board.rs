//! Board-level types: Board, Column, Swimlane

use super::ids::{ColumnId, SwimlaneId, TaskId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A column defines a workflow stage and owns the order of its tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: ColumnId,
    pub title: String,
    #[serde(default)]
    pub task_ids: Vec<TaskId>,
}

impl Column {
    /// Create an empty column
    pub fn new(id: impl Into<ColumnId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            task_ids: Vec::new(),
        }
    }

    /// Index of a task within this column
    pub fn index_of(&self, task_id: &TaskId) -> Option<usize> {
        self.task_ids.iter().position(|t| t == task_id)
    }

    /// Check whether the column holds a task
    pub fn contains(&self, task_id: &TaskId) -> bool {
        self.task_ids.contains(task_id)
    }
}

/// A swimlane provides horizontal grouping orthogonal to columns.
///
/// Membership is a property of the task (`Task::swimlane`), never a second list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Swimlane {
    pub id: SwimlaneId,
    pub title: String,
}

impl Swimlane {
    /// Create a new swimlane
    pub fn new(id: impl Into<SwimlaneId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// The kanban board: ordered column ids plus the column map.
///
/// `column_order` is always a permutation of the keys of `columns`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub column_order: Vec<ColumnId>,
    pub columns: BTreeMap<ColumnId, Column>,
}

impl Board {
    /// Create an empty board
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a board with the default todo/doing/done columns
    pub fn with_default_columns() -> Self {
        let mut board = Self::new();
        for column in Self::default_columns() {
            board.column_order.push(column.id.clone());
            board.columns.insert(column.id.clone(), column);
        }
        board
    }

    /// Get the default columns for a new board
    pub fn default_columns() -> Vec<Column> {
        vec![
            Column::new("todo", "To Do"),
            Column::new("doing", "Doing"),
            Column::new("done", "Done"),
        ]
    }

    /// Find a column by ID
    pub fn column(&self, id: &ColumnId) -> Option<&Column> {
        self.columns.get(id)
    }

    /// Columns in display order
    pub fn ordered_columns(&self) -> impl Iterator<Item = &Column> {
        self.column_order.iter().filter_map(|id| self.columns.get(id))
    }

    /// First column in display order
    pub fn first_column(&self) -> Option<&Column> {
        self.ordered_columns().next()
    }

    /// The column currently holding a task
    pub fn column_of(&self, task_id: &TaskId) -> Option<&ColumnId> {
        self.position_of(task_id).map(|(column, _)| column)
    }

    /// Column and index currently holding a task
    pub fn position_of(&self, task_id: &TaskId) -> Option<(&ColumnId, usize)> {
        self.ordered_columns()
            .find_map(|c| c.index_of(task_id).map(|idx| (&c.id, idx)))
    }

    /// Total number of placed tasks
    pub fn placed_count(&self) -> usize {
        self.columns.values().map(|c| c.task_ids.len()).sum()
    }
}
