//! Filter/view projector.
//!
//! [`project`] derives a read-only view of the board from canonical state. It
//! takes the store by shared reference and never mutates it.

use crate::store::EntityStore;
use crate::types::{ColumnId, SwimlaneId, TaskId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Search term plus exact-match field filters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewQuery {
    /// Case-insensitive substring matched against title and description
    #[serde(default)]
    pub search_term: String,
    /// Field name -> required value. Names are task wire names or custom field ids.
    #[serde(default)]
    pub filters: BTreeMap<String, Value>,
}

impl ViewQuery {
    /// Query that matches everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the search term
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    /// Add an exact-match filter
    pub fn with_filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.insert(field.into(), value.into());
        self
    }

    /// True when the query keeps every task
    pub fn is_empty(&self) -> bool {
        self.search_term.trim().is_empty() && self.filters.is_empty()
    }
}

/// One column of the projected board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnView {
    pub id: ColumnId,
    pub title: String,
    pub task_ids: Vec<TaskId>,
}

/// Tasks of one column grouped under one swimlane (`None` = no swimlane)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaneView {
    pub swimlane: Option<SwimlaneId>,
    pub task_ids: Vec<TaskId>,
}

/// The filtered, searched board
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardView {
    pub columns: Vec<ColumnView>,
    pub query: ViewQuery,
}

impl BoardView {
    /// Find a projected column
    pub fn column(&self, id: &ColumnId) -> Option<&ColumnView> {
        self.columns.iter().find(|c| &c.id == id)
    }

    /// Every visible task id in board order
    pub fn task_ids(&self) -> impl Iterator<Item = &TaskId> {
        self.columns.iter().flat_map(|c| c.task_ids.iter())
    }

    /// Number of visible tasks
    pub fn visible_count(&self) -> usize {
        self.columns.iter().map(|c| c.task_ids.len()).sum()
    }
}

/// Project the board through a query.
///
/// Keeps, per column and in canonical order, the tasks whose title or
/// description contains the search term (case-insensitive) and whose fields
/// equal every filter value.
pub fn project(store: &EntityStore, query: &ViewQuery) -> BoardView {
    let needle = if query.search_term.trim().is_empty() {
        String::new()
    } else {
        query.search_term.to_lowercase()
    };
    let columns = store
        .columns()
        .map(|column| ColumnView {
            id: column.id.clone(),
            title: column.title.clone(),
            task_ids: column
                .task_ids
                .iter()
                .filter(|id| {
                    store.get_task(id).is_some_and(|task| {
                        task.matches_search(&needle)
                            && query
                                .filters
                                .iter()
                                .all(|(field, want)| task.field_value(field).as_ref() == Some(want))
                    })
                })
                .cloned()
                .collect(),
        })
        .collect();

    BoardView {
        columns,
        query: query.clone(),
    }
}

/// Split a projected column into swimlane groups.
///
/// Groups follow the store's swimlane order, with unassigned tasks last; empty
/// groups are omitted.
pub fn group_by_swimlane(store: &EntityStore, column: &ColumnView) -> Vec<LaneView> {
    let mut lanes: BTreeMap<Option<&SwimlaneId>, Vec<TaskId>> = BTreeMap::new();
    for id in &column.task_ids {
        let lane = store.get_task(id).and_then(|t| t.swimlane.as_ref());
        lanes.entry(lane).or_default().push(id.clone());
    }

    let mut groups: Vec<LaneView> = store
        .swimlanes()
        .filter_map(|lane| {
            lanes.remove(&Some(&lane.id)).map(|task_ids| LaneView {
                swimlane: Some(lane.id.clone()),
                task_ids,
            })
        })
        .collect();
    // Tasks pointing at swimlanes this store does not know go with the unassigned group
    let mut unassigned = Vec::new();
    for (_, ids) in lanes {
        unassigned.extend(ids);
    }
    if !unassigned.is_empty() {
        groups.push(LaneView {
            swimlane: None,
            task_ids: unassigned,
        });
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ordering::OrderingEngine;
    use crate::types::{Priority, Swimlane, Task};

    fn sample() -> EntityStore {
        let mut store = EntityStore::with_default_columns();
        let mut engine = OrderingEngine::new(&mut store);
        let tasks = [
            ("t1", "Write docs", Priority::High, "todo"),
            ("t2", "Fix login bug", Priority::Low, "todo"),
            ("t3", "Review PR", Priority::High, "doing"),
            ("t4", "Deploy", Priority::Medium, "doing"),
            ("t5", "Retro notes", Priority::Low, "done"),
        ];
        for (id, title, priority, column) in tasks {
            engine
                .add_task(
                    Task::with_id(id, title).with_priority(priority),
                    &ColumnId::from(column),
                    None,
                )
                .unwrap();
        }
        store
    }

    #[test]
    fn test_filter_by_priority_keeps_canonical_state() {
        let store = sample();
        let before = store.clone();
        let view = project(&store, &ViewQuery::new().with_filter("priority", "high"));

        let visible: Vec<_> = view.task_ids().map(|t| t.as_str()).collect();
        assert_eq!(visible, vec!["t1", "t3"]);
        assert_eq!(view.column(&"done".into()).unwrap().task_ids.len(), 0);
        assert_eq!(store, before);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let store = sample();
        let view = project(&store, &ViewQuery::new().with_search(" LOGIN"));
        let visible: Vec<_> = view.task_ids().map(|t| t.as_str()).collect();
        assert_eq!(visible, vec!["t2"]);
    }

    #[test]
    fn test_search_keeps_surrounding_spaces() {
        let mut store = sample();
        for (id, title) in [("t6", "Prefix cleanup"), ("t7", "Apply quick fix")] {
            OrderingEngine::new(&mut store)
                .add_task(Task::with_id(id, title), &ColumnId::from("todo"), None)
                .unwrap();
        }

        let view = project(&store, &ViewQuery::new().with_search(" fix"));
        let visible: Vec<_> = view.task_ids().map(|t| t.as_str()).collect();
        assert_eq!(visible, vec!["t7"]);

        let blank = project(&store, &ViewQuery::new().with_search("   "));
        assert_eq!(blank.visible_count(), 7);
    }

    #[test]
    fn test_search_and_filters_combine() {
        let store = sample();
        let view = project(
            &store,
            &ViewQuery::new()
                .with_search("r")
                .with_filter("priority", "high"),
        );
        let visible: Vec<_> = view.task_ids().map(|t| t.as_str()).collect();
        // "Write docs" and "Review PR" both contain an r
        assert_eq!(visible, vec!["t1", "t3"]);
    }

    #[test]
    fn test_empty_query_shows_everything_in_order() {
        let store = sample();
        let view = project(&store, &ViewQuery::new());
        assert_eq!(view.visible_count(), 5);
        let order: Vec<_> = view.columns.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(order, vec!["todo", "doing", "done"]);
    }

    #[test]
    fn test_filter_on_custom_field() {
        let mut store = sample();
        let mut task = store.get_task(&"t4".into()).unwrap().clone();
        task.custom_fields.insert("env".into(), Value::from("prod"));
        store.put_task(task);

        let view = project(&store, &ViewQuery::new().with_filter("env", "prod"));
        assert_eq!(view.visible_count(), 1);
    }

    #[test]
    fn test_group_by_swimlane() {
        let mut store = sample();
        store.put_swimlane(Swimlane::new("backend", "Backend"));
        let mut task = store.get_task(&"t4".into()).unwrap().clone();
        task.swimlane = Some("backend".into());
        store.put_task(task);

        let view = project(&store, &ViewQuery::new());
        let groups = group_by_swimlane(&store, view.column(&"doing".into()).unwrap());
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].swimlane, Some(SwimlaneId::from("backend")));
        assert_eq!(groups[0].task_ids, vec![TaskId::from("t4")]);
        assert_eq!(groups[1].swimlane, None);
        assert_eq!(groups[1].task_ids, vec![TaskId::from("t3")]);
    }
}
