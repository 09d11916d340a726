//! ListDependencies command

use crate::error::{KanbanError, Result};
use crate::operation::Execute;
use crate::session::KanbanSession;
use crate::types::{Dependency, TaskId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// List dependency edges, optionally only those touching one task
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDependencies {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
}

operation!(ListDependencies, verb = "list", noun = "dependencies", description = "List dependency edges", read_only);

impl ListDependencies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_task(task_id: impl Into<TaskId>) -> Self {
        Self {
            task_id: Some(task_id.into()),
        }
    }
}

#[async_trait]
impl Execute<KanbanSession, KanbanError> for ListDependencies {
    async fn execute(&self, ctx: &mut KanbanSession) -> Result<Value> {
        let store = ctx.store();
        let edges: Vec<&Dependency> = match &self.task_id {
            Some(task) => store.dependencies_touching(task).collect(),
            None => store.dependencies().collect(),
        };
        Ok(json!({ "dependencies": edges, "count": edges.len() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::{AddDependency, DeleteDependency};
    use crate::task::AddTask;
    use crate::test_support::session;

    #[tokio::test]
    async fn test_list_and_delete() {
        let (_clock, mut ctx) = session();
        let mut ids = Vec::new();
        for title in ["A", "B", "C"] {
            let id = ctx.process(&AddTask::new(title)).await.unwrap()["id"]
                .as_str()
                .unwrap()
                .to_string();
            ids.push(id);
        }
        let ab = ctx
            .process(&AddDependency::new(ids[0].as_str(), ids[1].as_str()))
            .await
            .unwrap()["id"]
            .as_str()
            .unwrap()
            .to_string();
        ctx.process(&AddDependency::new(ids[1].as_str(), ids[2].as_str()))
            .await
            .unwrap();

        let all = ctx.process(&ListDependencies::new()).await.unwrap();
        assert_eq!(all["count"], 2);
        let for_c = ctx
            .process(&ListDependencies::for_task(ids[2].as_str()))
            .await
            .unwrap();
        assert_eq!(for_c["count"], 1);

        ctx.process(&DeleteDependency::new(ab.as_str())).await.unwrap();
        let for_a = ctx
            .process(&ListDependencies::for_task(ids[0].as_str()))
            .await
            .unwrap();
        assert_eq!(for_a["count"], 0);

        let again = ctx
            .process(&DeleteDependency::new(ab.as_str()))
            .await
            .unwrap_err();
        assert!(again.is_not_found());
    }
}
