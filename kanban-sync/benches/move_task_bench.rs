//! Benchmarks for drag reordering and board projection
//!
//! Boards of a few hundred tasks are the interactive case; every drag and
//! every keystroke in the search box pays these costs.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use kanban_sync::ordering::{verify_placement, OrderingEngine};
use kanban_sync::projection::project;
use kanban_sync::task::MoveTask;
use kanban_sync::{ColumnId, EntityStore, KanbanSession, SyncConfig, Task, TaskId, ViewQuery};
use tokio::runtime::Runtime;

const COLUMNS: [&str; 3] = ["todo", "doing", "done"];

fn board(tasks: usize) -> EntityStore {
    let mut store = EntityStore::with_default_columns();
    for i in 0..tasks {
        let column = ColumnId::from(COLUMNS[i % COLUMNS.len()]);
        OrderingEngine::new(&mut store)
            .add_task(Task::with_id(format!("t{i}"), format!("Task number {i}")), &column, None)
            .expect("Failed to seed board");
    }
    store
}

/// Benchmark raw engine moves across and within columns
fn bench_engine_moves(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_move_task");

    for size in [30, 300, 3_000] {
        group.bench_with_input(BenchmarkId::new("across_columns", size), &size, |b, &size| {
            let mut store = board(size);
            let id = TaskId::from("t0");
            let mut at = 0;
            b.iter(|| {
                let from = store.board().column_of(&id).cloned().expect("task is placed");
                let to = ColumnId::from(COLUMNS[at % COLUMNS.len()]);
                at += 1;
                black_box(
                    OrderingEngine::new(&mut store)
                        .move_task(&id, &from, &to, size / 6)
                        .expect("move failed"),
                );
            });
        });

        group.bench_with_input(BenchmarkId::new("verify_placement", size), &size, |b, &size| {
            let store = board(size);
            b.iter(|| verify_placement(black_box(&store)).expect("placement broken"));
        });
    }

    group.finish();
}

/// Benchmark a full move through the session, including the sync snapshot
fn bench_session_move(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut session = KanbanSession::new(SyncConfig::default()).with_store(board(300));
    let mut at = 0;

    c.bench_function("session_move_task", |b| {
        b.iter(|| {
            let to = COLUMNS[at % COLUMNS.len()];
            at += 1;
            let result = rt
                .block_on(session.process(&MoveTask::to_column("t0", to).at_index(0)))
                .expect("move failed");
            black_box(result);
        });
    });
}

/// Benchmark search and filter projection
fn bench_projection(c: &mut Criterion) {
    let store = board(3_000);
    let mut group = c.benchmark_group("projection");

    group.bench_function("search", |b| {
        let query = ViewQuery::new().with_search("number 29");
        b.iter(|| black_box(project(&store, &query)));
    });

    group.bench_function("filter", |b| {
        let query = ViewQuery::new().with_filter("priority", "medium");
        b.iter(|| black_box(project(&store, &query)));
    });

    group.finish();
}

criterion_group!(benches, bench_engine_moves, bench_session_move, bench_projection);
criterion_main!(benches);
