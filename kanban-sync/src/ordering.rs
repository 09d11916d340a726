//! Ordering engine - placement of tasks in columns and columns in the board.
//!
//! Every operation validates all of its inputs before touching the store, so a
//! failed call leaves state exactly as it was. Cascades (delete, archive,
//! column removal) run to completion inside a single call.
//!
//! Reordering uses post-removal index space: the item is spliced out first
//! and `to_index` is then clamped to the shortened sequence. Moving the first
//! of `[a, b, c]` to index 2 yields `[b, c, a]`.

use crate::error::{KanbanError, Result};
use crate::store::EntityStore;
use crate::types::{ArchivedTask, Column, ColumnId, SwimlaneId, Task, TaskId};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use tracing::debug;

/// Mutating view over an [`EntityStore`] that keeps placement consistent
pub struct OrderingEngine<'a> {
    store: &'a mut EntityStore,
}

impl<'a> OrderingEngine<'a> {
    /// Wrap a store
    pub fn new(store: &'a mut EntityStore) -> Self {
        Self { store }
    }

    /// Add a new task to a column at `index` (default: end)
    pub fn add_task(&mut self, task: Task, column: &ColumnId, index: Option<usize>) -> Result<usize> {
        if self.store.get_task(&task.id).is_some() || self.store.get_archived(&task.id).is_some() {
            return Err(KanbanError::duplicate_id("task", task.id.as_str()));
        }
        let col = self.column_mut(column)?;
        let slot = index.unwrap_or(col.task_ids.len()).min(col.task_ids.len());
        col.task_ids.insert(slot, task.id.clone());
        debug!(task = %task.id, column = %column, index = slot, "added task");
        self.store.put_task(task);
        Ok(slot)
    }

    /// Put an existing task at `index` in `column`, taking it out of wherever it is now.
    ///
    /// Returns the index the task landed at.
    pub fn place_task(&mut self, task: &TaskId, column: &ColumnId, index: usize) -> Result<usize> {
        self.require_task(task)?;
        self.require_column(column)?;

        self.unplace(task);
        let col = self.column_mut(column)?;
        let slot = index.min(col.task_ids.len());
        col.task_ids.insert(slot, task.clone());
        Ok(slot)
    }

    /// Move a task between (or within) columns.
    ///
    /// Returns `Ok(false)` without mutating when the drop lands on the slot the
    /// task already occupies.
    pub fn move_task(
        &mut self,
        task: &TaskId,
        from: &ColumnId,
        to: &ColumnId,
        to_index: usize,
    ) -> Result<bool> {
        self.require_task(task)?;
        self.require_column(to)?;
        let source = self.column(from)?;
        let current = source.index_of(task).ok_or_else(|| KanbanError::NotInColumn {
            task: task.to_string(),
            column: from.to_string(),
        })?;

        if from == to {
            let target = to_index.min(source.task_ids.len() - 1);
            if target == current {
                return Ok(false);
            }
            let col = self.column_mut(from)?;
            let id = col.task_ids.remove(current);
            col.task_ids.insert(target, id);
        } else {
            let id = self.column_mut(from)?.task_ids.remove(current);
            let dest = self.column_mut(to)?;
            let target = to_index.min(dest.task_ids.len());
            dest.task_ids.insert(target, id);
        }
        debug!(task = %task, from = %from, to = %to, index = to_index, "moved task");
        Ok(true)
    }

    /// Move a column to a new slot in the column order
    pub fn move_column(&mut self, column: &ColumnId, to_index: usize) -> Result<bool> {
        let order = &mut self.store.board.column_order;
        let current = order
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| KanbanError::ColumnNotFound {
                id: column.to_string(),
            })?;
        let target = to_index.min(order.len() - 1);
        if target == current {
            return Ok(false);
        }
        let id = order.remove(current);
        order.insert(target, id);
        debug!(column = %column, index = target, "moved column");
        Ok(true)
    }

    /// Add an empty column at `index` in the column order (default: end)
    pub fn add_column(&mut self, column: Column, index: Option<usize>) -> Result<usize> {
        if self.store.get_column(&column.id).is_some() {
            return Err(KanbanError::duplicate_id("column", column.id.as_str()));
        }
        if !column.task_ids.is_empty() {
            return Err(KanbanError::validation(format!(
                "new column '{}' must start empty",
                column.id
            )));
        }
        let id = column.id.clone();
        self.store.put_column(column);
        let last = self.store.board.column_order.len() - 1;
        let target = index.unwrap_or(last).min(last);
        self.move_column(&id, target)?;
        Ok(target)
    }

    /// Delete an empty column
    pub fn delete_column(&mut self, column: &ColumnId) -> Result<Column> {
        let count = self.column(column)?.task_ids.len();
        if count > 0 {
            return Err(KanbanError::ColumnNotEmpty {
                id: column.to_string(),
                count,
            });
        }
        self.store
            .remove_column(column)
            .ok_or_else(|| KanbanError::ColumnNotFound {
                id: column.to_string(),
            })
    }

    /// Delete a column, first relocating its tasks to the end of the first other column.
    ///
    /// Used when a remote client deleted a column that still holds tasks here.
    /// Returns the relocated task ids.
    pub fn dissolve_column(&mut self, column: &ColumnId) -> Result<Vec<TaskId>> {
        let moved = self.column(column)?.task_ids.clone();
        if moved.is_empty() {
            self.delete_column(column)?;
            return Ok(moved);
        }
        let fallback = self
            .store
            .columns()
            .find(|c| &c.id != column)
            .map(|c| c.id.clone())
            .ok_or_else(|| KanbanError::ColumnNotEmpty {
                id: column.to_string(),
                count: moved.len(),
            })?;

        self.column_mut(column)?.task_ids.clear();
        self.column_mut(&fallback)?.task_ids.extend(moved.iter().cloned());
        self.store.remove_column(column);
        debug!(column = %column, fallback = %fallback, relocated = moved.len(), "dissolved column");
        Ok(moved)
    }

    /// Delete a task and everything hanging off it.
    ///
    /// Removes the id from its column, every dependency edge naming it, its
    /// timer, comments and attachments. Archived tasks are purged the same way.
    pub fn delete_task(&mut self, task: &TaskId) -> Result<Task> {
        let removed = match self.store.remove_task(task) {
            Some(t) => {
                self.unplace(task);
                t
            }
            None => self
                .store
                .take_archived(task)
                .map(|a| a.task)
                .ok_or_else(|| KanbanError::TaskNotFound {
                    id: task.to_string(),
                })?,
        };

        let edges: Vec<_> = self
            .store
            .dependencies_touching(task)
            .map(|d| d.id.clone())
            .collect();
        for edge in &edges {
            self.store.remove_dependency(edge);
        }
        self.store.remove_timer(task);
        self.store.comments.remove(task);
        self.store.attachments.remove(task);
        debug!(task = %task, edges = edges.len(), "deleted task");
        Ok(removed)
    }

    /// Take a task off the board into the archive.
    ///
    /// A running timer is stopped at `now`; the timer, comments, attachments
    /// and dependency edges stay so that unarchive restores the task whole.
    pub fn archive_task(&mut self, task: &TaskId, now: DateTime<Utc>) -> Result<ArchivedTask> {
        self.require_task(task)?;
        let column = self
            .store
            .board
            .column_of(task)
            .cloned()
            .ok_or_else(|| KanbanError::validation(format!("task '{}' is not placed", task)))?;

        self.unplace(task);
        if let Some(timer) = self.store.timers.get_mut(task) {
            timer.stop(now);
        }
        let body = self
            .store
            .remove_task(task)
            .ok_or_else(|| KanbanError::TaskNotFound {
                id: task.to_string(),
            })?;
        let archived = ArchivedTask::new(body, column, now);
        self.store.archive.push(archived.clone());
        debug!(task = %task, "archived task");
        Ok(archived)
    }

    /// Store an archived copy received from elsewhere, replacing any live or archived copy
    pub fn put_archived(&mut self, archived: ArchivedTask) {
        let id = archived.id().clone();
        if self.store.remove_task(&id).is_some() {
            self.unplace(&id);
        }
        self.store.take_archived(&id);
        self.store.archive.push(archived);
    }

    /// Restore an archived task to the end of its original column.
    ///
    /// Falls back to the first column when the original no longer exists.
    pub fn unarchive_task(&mut self, task: &TaskId) -> Result<(ColumnId, usize)> {
        let original = self
            .store
            .get_archived(task)
            .map(|a| a.column_id.clone())
            .ok_or_else(|| KanbanError::not_found("archived task", task.as_str()))?;
        let column = if self.store.get_column(&original).is_some() {
            original
        } else {
            self.store
                .board
                .first_column()
                .map(|c| c.id.clone())
                .ok_or_else(|| KanbanError::ColumnNotFound {
                    id: original.to_string(),
                })?
        };

        let archived = self
            .store
            .take_archived(task)
            .ok_or_else(|| KanbanError::not_found("archived task", task.as_str()))?;
        self.store.put_task(archived.task);
        let col = self.column_mut(&column)?;
        col.task_ids.push(task.clone());
        let index = col.task_ids.len() - 1;
        debug!(task = %task, column = %column, "unarchived task");
        Ok((column, index))
    }

    /// Delete a swimlane and clear it from every task that referenced it.
    ///
    /// Returns the tasks whose swimlane was cleared.
    pub fn delete_swimlane(&mut self, swimlane: &SwimlaneId) -> Result<Vec<TaskId>> {
        self.store
            .remove_swimlane(swimlane)
            .ok_or_else(|| KanbanError::SwimlaneNotFound {
                id: swimlane.to_string(),
            })?;
        let mut touched = Vec::new();
        for task in self.store.tasks.values_mut() {
            if task.swimlane.as_ref() == Some(swimlane) {
                task.swimlane = None;
                touched.push(task.id.clone());
            }
        }
        Ok(touched)
    }

    fn unplace(&mut self, task: &TaskId) {
        for column in self.store.board.columns.values_mut() {
            column.task_ids.retain(|t| t != task);
        }
    }

    fn require_task(&self, task: &TaskId) -> Result<()> {
        match self.store.get_task(task) {
            Some(_) => Ok(()),
            None => Err(KanbanError::TaskNotFound {
                id: task.to_string(),
            }),
        }
    }

    fn require_column(&self, column: &ColumnId) -> Result<()> {
        self.column(column).map(|_| ())
    }

    fn column(&self, column: &ColumnId) -> Result<&Column> {
        self.store
            .get_column(column)
            .ok_or_else(|| KanbanError::ColumnNotFound {
                id: column.to_string(),
            })
    }

    fn column_mut(&mut self, column: &ColumnId) -> Result<&mut Column> {
        self.store
            .column_mut(column)
            .ok_or_else(|| KanbanError::ColumnNotFound {
                id: column.to_string(),
            })
    }
}

/// Check the placement invariants of a store.
///
/// - `column_order` is a permutation of the column map's keys
/// - each column's id matches its key
/// - every placed id names a live task and appears in exactly one slot
/// - every live task is placed
/// - no archived task is also live
pub fn verify_placement(store: &EntityStore) -> Result<()> {
    let board = store.board();

    let order: BTreeSet<_> = board.column_order.iter().collect();
    if order.len() != board.column_order.len() {
        return Err(KanbanError::validation("columnOrder contains duplicates"));
    }
    if order.len() != board.columns.len() || board.columns.keys().any(|k| !order.contains(k)) {
        return Err(KanbanError::validation(
            "columnOrder is not a permutation of the columns",
        ));
    }

    let mut placed = BTreeSet::new();
    for (key, column) in &board.columns {
        if key != &column.id {
            return Err(KanbanError::validation(format!(
                "column stored under '{}' has id '{}'",
                key, column.id
            )));
        }
        for task in &column.task_ids {
            if store.get_task(task).is_none() {
                return Err(KanbanError::validation(format!(
                    "column '{}' references unknown task '{}'",
                    key, task
                )));
            }
            if !placed.insert(task) {
                return Err(KanbanError::validation(format!(
                    "task '{}' is placed more than once",
                    task
                )));
            }
        }
    }

    if let Some(orphan) = store.tasks().find(|t| !placed.contains(&t.id)) {
        return Err(KanbanError::validation(format!(
            "task '{}' is not placed in any column",
            orphan.id
        )));
    }
    if let Some(dup) = store.archived().iter().find(|a| store.get_task(a.id()).is_some()) {
        return Err(KanbanError::validation(format!(
            "task '{}' is both live and archived",
            dup.id()
        )));
    }
    Ok(())
}
