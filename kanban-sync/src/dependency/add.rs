//! AddDependency command

use super::find_path;
use crate::error::{KanbanError, Result};
use crate::operation::Execute;
use crate::session::{Change, KanbanSession};
use crate::types::{Dependency, TaskId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Record that one task depends on another
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddDependency {
    /// The blocking task
    pub task_id: TaskId,
    /// The task that waits on `task_id`
    pub dependent_task_id: TaskId,
}

operation!(AddDependency, verb = "add", noun = "dependency", description = "Add a dependency between two tasks");

impl AddDependency {
    pub fn new(task_id: impl Into<TaskId>, dependent_task_id: impl Into<TaskId>) -> Self {
        Self {
            task_id: task_id.into(),
            dependent_task_id: dependent_task_id.into(),
        }
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for AddDependency {
    async fn execute(&self, ctx: &mut KanbanSession) -> Result<Value> {
        let store = ctx.store();
        for id in [&self.task_id, &self.dependent_task_id] {
            if store.get_task(id).is_none() && store.get_archived(id).is_none() {
                return Err(KanbanError::TaskNotFound { id: id.to_string() });
            }
        }
        if self.task_id == self.dependent_task_id {
            return Err(KanbanError::invalid_value(
                "dependentTaskId",
                "a task cannot depend on itself",
            ));
        }
        if store
            .dependencies()
            .any(|d| d.task_id == self.task_id && d.dependent_task_id == self.dependent_task_id)
        {
            return Err(KanbanError::duplicate_id(
                "dependency",
                format!("{} -> {}", self.task_id, self.dependent_task_id),
            ));
        }
        if ctx.config().reject_dependency_cycles {
            if let Some(mut path) = find_path(store, &self.dependent_task_id, &self.task_id) {
                path.push(self.dependent_task_id.clone());
                return Err(KanbanError::DependencyCycle {
                    path: path.iter().map(TaskId::as_str).collect::<Vec<_>>().join(" -> "),
                });
            }
        }

        let dependency = Dependency::new(self.task_id.clone(), self.dependent_task_id.clone());
        let id = dependency.id.clone();
        let result = serde_json::to_value(&dependency)?;
        ctx.store_mut().put_dependency(dependency);
        ctx.commit(vec![Change::Dependency(id)]);
        Ok(result)
    }
}
