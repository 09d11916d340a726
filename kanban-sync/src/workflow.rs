//! Workflow rule evaluation
//!
//! Rules run once per local mutation over the tasks that mutation touched,
//! in insertion order. Each rule sees the task as left by the rules before
//! it. An action that would change nothing is skipped, and a failing action
//! is logged and skipped rather than failing the mutation that triggered it.

use crate::error::Result;
use crate::ordering::OrderingEngine;
use crate::store::EntityStore;
use crate::types::{RuleAction, TaskId, WorkflowRule};
use tracing::{debug, warn};

/// Evaluate `rules` against every live task in `touched`.
///
/// Returns the tasks an action changed, in first-change order.
pub fn run_rules(
    store: &mut EntityStore,
    rules: &[WorkflowRule],
    touched: &[TaskId],
) -> Vec<TaskId> {
    let mut changed: Vec<TaskId> = Vec::new();
    for task_id in touched {
        for rule in rules.iter().filter(|r| r.enabled) {
            let Some(task) = store.get_task(task_id) else {
                break;
            };
            let column = store.board().column_of(task_id);
            if !rule.condition.matches(task, column) {
                continue;
            }
            match apply_action(store, task_id, &rule.action) {
                Ok(true) => {
                    debug!(rule = %rule.name, task = %task_id, "workflow rule fired");
                    if !changed.contains(task_id) {
                        changed.push(task_id.clone());
                    }
                }
                Ok(false) => {}
                Err(e) => warn!(rule = %rule.name, task = %task_id, error = %e, "workflow action skipped"),
            }
        }
    }
    changed
}

/// Apply one action to one task. Returns whether anything changed.
pub fn apply_action(store: &mut EntityStore, task_id: &TaskId, action: &RuleAction) -> Result<bool> {
    if let RuleAction::MoveToColumn { column } = action {
        let from = store.board().column_of(task_id).cloned();
        return match from {
            Some(from) if &from == column => Ok(false),
            Some(from) => {
                OrderingEngine::new(store).move_task(task_id, &from, column, usize::MAX)
            }
            None => Ok(false),
        };
    }

    let Some(task) = store.task_mut(task_id) else {
        return Ok(false);
    };
    match action {
        RuleAction::SetPriority { priority } => {
            if task.priority == *priority {
                return Ok(false);
            }
            task.priority = *priority;
        }
        RuleAction::SetCompleted { completed } => {
            if task.completed == *completed {
                return Ok(false);
            }
            task.completed = *completed;
        }
        RuleAction::SetProgress { progress } => {
            if task.progress == *progress {
                return Ok(false);
            }
            task.set_progress(*progress)?;
        }
        RuleAction::SetField { field, value } => {
            if task.custom_fields.get(field) == Some(value) {
                return Ok(false);
            }
            task.custom_fields.insert(field.clone(), value.clone());
        }
        RuleAction::MoveToColumn { .. } => return Ok(false),
    }
    Ok(true)
}
