//! Property tests for the one-task-one-slot placement invariant.
//!
//! Random sequences of drags, deletes, archives and column moves are run
//! against the ordering engine; placement is verified after every step,
//! whether the step succeeded or was refused.

use chrono::{TimeZone, Utc};
use kanban_sync::ordering::{verify_placement, OrderingEngine};
use kanban_sync::{ColumnId, EntityStore, Task, TaskId};
use proptest::prelude::*;

const COLUMNS: [&str; 3] = ["todo", "doing", "done"];
const MAX_STEPS: usize = 60;

#[derive(Debug, Clone)]
enum Step {
    Add { column: usize, index: Option<usize> },
    Move { pick: usize, to: usize, index: usize },
    MoveWrongSource { pick: usize, to: usize },
    Delete { pick: usize },
    Archive { pick: usize },
    Unarchive { pick: usize },
    MoveColumn { column: usize, index: usize },
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => (0..3usize, proptest::option::of(0..8usize))
            .prop_map(|(column, index)| Step::Add { column, index }),
        4 => (any::<usize>(), 0..3usize, 0..10usize)
            .prop_map(|(pick, to, index)| Step::Move { pick, to, index }),
        1 => (any::<usize>(), 0..3usize).prop_map(|(pick, to)| Step::MoveWrongSource { pick, to }),
        1 => any::<usize>().prop_map(|pick| Step::Delete { pick }),
        1 => any::<usize>().prop_map(|pick| Step::Archive { pick }),
        1 => any::<usize>().prop_map(|pick| Step::Unarchive { pick }),
        1 => (0..3usize, 0..4usize).prop_map(|(column, index)| Step::MoveColumn { column, index }),
    ]
}

fn live(store: &EntityStore, pick: usize) -> Option<TaskId> {
    let ids: Vec<TaskId> = store.tasks().map(|t| t.id.clone()).collect();
    if ids.is_empty() {
        None
    } else {
        Some(ids[pick % ids.len()].clone())
    }
}

fn run(store: &mut EntityStore, step: &Step, counter: &mut usize) {
    let now = Utc.timestamp_millis_opt(0).unwrap();
    match step {
        Step::Add { column, index } => {
            *counter += 1;
            let task = Task::with_id(format!("t{counter}"), format!("Task {counter}"));
            OrderingEngine::new(store)
                .add_task(task, &ColumnId::from(COLUMNS[*column]), *index)
                .unwrap();
        }
        Step::Move { pick, to, index } => {
            if let Some(id) = live(store, *pick) {
                let from = store.board().column_of(&id).cloned().unwrap();
                OrderingEngine::new(store)
                    .move_task(&id, &from, &ColumnId::from(COLUMNS[*to]), *index)
                    .unwrap();
            }
        }
        Step::MoveWrongSource { pick, to } => {
            if let Some(id) = live(store, *pick) {
                let from = store.board().column_of(&id).cloned().unwrap();
                let wrong = COLUMNS
                    .iter()
                    .map(|c| ColumnId::from(*c))
                    .find(|c| c != &from)
                    .unwrap();
                let before = store.clone();
                let result = OrderingEngine::new(store).move_task(
                    &id,
                    &wrong,
                    &ColumnId::from(COLUMNS[*to]),
                    0,
                );
                assert!(result.is_err());
                assert_eq!(*store, before);
            }
        }
        Step::Delete { pick } => {
            if let Some(id) = live(store, *pick) {
                OrderingEngine::new(store).delete_task(&id).unwrap();
            }
        }
        Step::Archive { pick } => {
            if let Some(id) = live(store, *pick) {
                OrderingEngine::new(store).archive_task(&id, now).unwrap();
            }
        }
        Step::Unarchive { pick } => {
            let archived: Vec<TaskId> = store.archived().iter().map(|a| a.id().clone()).collect();
            if !archived.is_empty() {
                let id = archived[pick % archived.len()].clone();
                OrderingEngine::new(store).unarchive_task(&id).unwrap();
            }
        }
        Step::MoveColumn { column, index } => {
            OrderingEngine::new(store)
                .move_column(&ColumnId::from(COLUMNS[*column]), *index)
                .unwrap();
        }
    }
}

proptest! {
    #[test]
    fn placement_holds_after_every_step(steps in proptest::collection::vec(step(), 1..MAX_STEPS)) {
        let mut store = EntityStore::with_default_columns();
        let mut counter = 0;
        for step in &steps {
            run(&mut store, step, &mut counter);
            prop_assert!(verify_placement(&store).is_ok(), "broken after {:?}", step);
        }

        let placed = store.board().placed_count();
        prop_assert_eq!(placed, store.task_count());
        let mut order: Vec<String> = store.board().column_order.iter().map(|c| c.to_string()).collect();
        order.sort();
        prop_assert_eq!(order, vec!["doing", "done", "todo"]);
    }

    #[test]
    fn same_column_reorder_lands_on_requested_slot(len in 1..8usize, from in 0..8usize, to in 0..10usize) {
        let from = from % len;
        let mut store = EntityStore::with_default_columns();
        let todo = ColumnId::from("todo");
        for i in 0..len {
            OrderingEngine::new(&mut store)
                .add_task(Task::with_id(format!("t{i}"), "x"), &todo, None)
                .unwrap();
        }
        let id = TaskId::from(format!("t{from}"));
        OrderingEngine::new(&mut store).move_task(&id, &todo, &todo, to).unwrap();

        let slots = &store.get_column(&todo).unwrap().task_ids;
        prop_assert_eq!(slots.len(), len);
        prop_assert_eq!(slots.iter().position(|t| t == &id), Some(to.min(len - 1)));
    }
}
