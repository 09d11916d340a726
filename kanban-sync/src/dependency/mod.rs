//! Dependency commands
//!
//! An edge says `dependent_task_id` depends on `task_id`. Cycles are allowed
//! unless `reject_dependency_cycles` is set in the session config.

mod add;
mod delete;
mod list;

pub use add::AddDependency;
pub use delete::DeleteDependency;
pub use list::ListDependencies;

use crate::store::EntityStore;
use crate::types::TaskId;
use std::collections::BTreeSet;

/// Path from `from` to `to` following existing edges in the blocking direction.
///
/// Adding an edge `to -> from` would close this path into a cycle.
pub(crate) fn find_path(store: &EntityStore, from: &TaskId, to: &TaskId) -> Option<Vec<TaskId>> {
    let mut visited = BTreeSet::new();
    let mut path = vec![from.clone()];
    if walk(store, from, to, &mut visited, &mut path) {
        Some(path)
    } else {
        None
    }
}

fn walk(
    store: &EntityStore,
    node: &TaskId,
    target: &TaskId,
    visited: &mut BTreeSet<TaskId>,
    path: &mut Vec<TaskId>,
) -> bool {
    if node == target {
        return true;
    }
    if !visited.insert(node.clone()) {
        return false;
    }
    let next: Vec<TaskId> = store
        .dependencies()
        .filter(|d| &d.task_id == node)
        .map(|d| d.dependent_task_id.clone())
        .collect();
    for child in next {
        path.push(child.clone());
        if walk(store, &child, target, visited, path) {
            return true;
        }
        path.pop();
    }
    false
}
