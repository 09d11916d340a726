//! Dependency edges between tasks

use super::ids::{DependencyId, TaskId};
use serde::{Deserialize, Serialize};

/// Directed edge: `dependent_task_id` depends on `task_id`.
///
/// Edges are not validated for cycles or dangling endpoints unless the
/// session is configured to reject cycles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    pub id: DependencyId,
    pub task_id: TaskId,
    pub dependent_task_id: TaskId,
}

impl Dependency {
    /// Create a new edge with a fresh id
    pub fn new(task_id: impl Into<TaskId>, dependent_task_id: impl Into<TaskId>) -> Self {
        Self {
            id: DependencyId::new(),
            task_id: task_id.into(),
            dependent_task_id: dependent_task_id.into(),
        }
    }

    /// Check whether either endpoint is the given task
    pub fn touches(&self, task: &TaskId) -> bool {
        &self.task_id == task || &self.dependent_task_id == task
    }
}
