//! Entity store - authoritative in-memory maps of board entities.
//!
//! The store provides access, not logic. Lookups on unknown ids return `None`
//! and removals never cascade: deleting a task here does not touch columns,
//! dependencies or timers. Cascades live in [`crate::ordering`].

use crate::types::{
    ArchivedTask, Attachment, Board, Column, ColumnId, Comment, Dependency, DependencyId,
    Swimlane, SwimlaneId, Task, TaskId, TimerState,
};
use std::collections::BTreeMap;

/// In-memory maps of tasks, columns, swimlanes, dependencies, timers,
/// comments, attachments and archived tasks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityStore {
    pub(crate) board: Board,
    pub(crate) tasks: BTreeMap<TaskId, Task>,
    pub(crate) swimlanes: BTreeMap<SwimlaneId, Swimlane>,
    pub(crate) dependencies: BTreeMap<DependencyId, Dependency>,
    pub(crate) timers: BTreeMap<TaskId, TimerState>,
    pub(crate) comments: BTreeMap<TaskId, Vec<Comment>>,
    pub(crate) attachments: BTreeMap<TaskId, Vec<Attachment>>,
    pub(crate) archive: Vec<ArchivedTask>,
}

impl EntityStore {
    /// Create an empty store with no columns
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the default todo/doing/done columns
    pub fn with_default_columns() -> Self {
        Self {
            board: Board::with_default_columns(),
            ..Self::default()
        }
    }

    /// The board structure (column order + columns)
    pub fn board(&self) -> &Board {
        &self.board
    }

    // =========================================================================
    // Tasks
    // =========================================================================

    /// Get a task by id
    pub fn get_task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.get(id)
    }

    /// Insert or fully replace a task. Returns the previous object if any.
    pub fn put_task(&mut self, task: Task) -> Option<Task> {
        self.tasks.insert(task.id.clone(), task)
    }

    /// Remove a task object only
    pub fn remove_task(&mut self, id: &TaskId) -> Option<Task> {
        self.tasks.remove(id)
    }

    /// All live tasks, ordered by id
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    /// Number of live tasks
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub(crate) fn task_mut(&mut self, id: &TaskId) -> Option<&mut Task> {
        self.tasks.get_mut(id)
    }

    // =========================================================================
    // Columns
    // =========================================================================

    /// Get a column by id
    pub fn get_column(&self, id: &ColumnId) -> Option<&Column> {
        self.board.columns.get(id)
    }

    /// Insert or fully replace a column. New columns are appended to the column order.
    pub fn put_column(&mut self, column: Column) -> Option<Column> {
        if !self.board.columns.contains_key(&column.id) {
            self.board.column_order.push(column.id.clone());
        }
        self.board.columns.insert(column.id.clone(), column)
    }

    /// Remove a column and its slot in the column order
    pub fn remove_column(&mut self, id: &ColumnId) -> Option<Column> {
        let removed = self.board.columns.remove(id)?;
        self.board.column_order.retain(|c| c != id);
        Some(removed)
    }

    /// Columns in display order
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.board.ordered_columns()
    }

    pub(crate) fn column_mut(&mut self, id: &ColumnId) -> Option<&mut Column> {
        self.board.columns.get_mut(id)
    }

    // =========================================================================
    // Swimlanes
    // =========================================================================

    /// Get a swimlane by id
    pub fn get_swimlane(&self, id: &SwimlaneId) -> Option<&Swimlane> {
        self.swimlanes.get(id)
    }

    /// Insert or fully replace a swimlane
    pub fn put_swimlane(&mut self, swimlane: Swimlane) -> Option<Swimlane> {
        self.swimlanes.insert(swimlane.id.clone(), swimlane)
    }

    /// Remove a swimlane object only
    pub fn remove_swimlane(&mut self, id: &SwimlaneId) -> Option<Swimlane> {
        self.swimlanes.remove(id)
    }

    /// All swimlanes
    pub fn swimlanes(&self) -> impl Iterator<Item = &Swimlane> {
        self.swimlanes.values()
    }

    // =========================================================================
    // Dependencies
    // =========================================================================

    /// Get a dependency edge by id
    pub fn get_dependency(&self, id: &DependencyId) -> Option<&Dependency> {
        self.dependencies.get(id)
    }

    /// Insert or replace a dependency edge
    pub fn put_dependency(&mut self, dependency: Dependency) -> Option<Dependency> {
        self.dependencies.insert(dependency.id.clone(), dependency)
    }

    /// Remove a dependency edge
    pub fn remove_dependency(&mut self, id: &DependencyId) -> Option<Dependency> {
        self.dependencies.remove(id)
    }

    /// All dependency edges
    pub fn dependencies(&self) -> impl Iterator<Item = &Dependency> {
        self.dependencies.values()
    }

    /// Edges where the task appears as either endpoint
    pub fn dependencies_touching<'a>(
        &'a self,
        task: &'a TaskId,
    ) -> impl Iterator<Item = &'a Dependency> + 'a {
        self.dependencies.values().filter(move |d| d.touches(task))
    }

    // =========================================================================
    // Timers
    // =========================================================================

    /// Get a task's timer
    pub fn get_timer(&self, task: &TaskId) -> Option<&TimerState> {
        self.timers.get(task)
    }

    /// Insert or replace a task's timer
    pub fn put_timer(&mut self, task: TaskId, timer: TimerState) -> Option<TimerState> {
        self.timers.insert(task, timer)
    }

    /// Remove a task's timer
    pub fn remove_timer(&mut self, task: &TaskId) -> Option<TimerState> {
        self.timers.remove(task)
    }

    pub(crate) fn timer_entry(&mut self, task: &TaskId) -> &mut TimerState {
        self.timers.entry(task.clone()).or_default()
    }

    // =========================================================================
    // Comments and attachments (append-only)
    // =========================================================================

    /// Append a comment. Re-appending an id already present is ignored.
    pub fn append_comment(&mut self, comment: Comment) -> bool {
        let list = self.comments.entry(comment.task_id.clone()).or_default();
        if list.iter().any(|c| c.id == comment.id) {
            return false;
        }
        list.push(comment);
        true
    }

    /// Comments for a task, oldest first
    pub fn comments(&self, task: &TaskId) -> &[Comment] {
        self.comments.get(task).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Append an attachment. Re-appending an id already present is ignored.
    pub fn append_attachment(&mut self, attachment: Attachment) -> bool {
        let list = self
            .attachments
            .entry(attachment.task_id.clone())
            .or_default();
        if list.iter().any(|a| a.id == attachment.id) {
            return false;
        }
        list.push(attachment);
        true
    }

    /// Attachments for a task, oldest first
    pub fn attachments(&self, task: &TaskId) -> &[Attachment] {
        self.attachments.get(task).map(Vec::as_slice).unwrap_or(&[])
    }

    // =========================================================================
    // Archive
    // =========================================================================

    /// Archived tasks, oldest first
    pub fn archived(&self) -> &[ArchivedTask] {
        &self.archive
    }

    /// Find an archived task
    pub fn get_archived(&self, task: &TaskId) -> Option<&ArchivedTask> {
        self.archive.iter().find(|a| a.id() == task)
    }

    pub(crate) fn take_archived(&mut self, task: &TaskId) -> Option<ArchivedTask> {
        let idx = self.archive.iter().position(|a| a.id() == task)?;
        Some(self.archive.remove(idx))
    }
}
