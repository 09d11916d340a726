//! Multi-client sync: last-writer-wins resolution, convergence over a hub,
//! outbox ordering across channel loss, and out-of-sync recovery

use kanban_sync::{
    clock::ManualClock,
    column::{AddColumn, RenameColumn},
    ordering::OrderingEngine,
    sync::{EntityKey, EntityPayload, EntityType, Placement, Resolution, Stamp, SyncState},
    task::{AddTask, GetTask, MoveTask},
    types::ClientId,
    BoardDocument, BoardEvent, BoardRuntime, ColumnId, ConnectionState, EntityStore,
    KanbanError, KanbanSession, MemoryChannel, MemoryHub, MemoryPersistence, Notice, RuntimeHandle,
    SyncConfig, SyncMessage, SyncReconciler, Task,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(5);

fn config(client: &str) -> SyncConfig {
    SyncConfig {
        client_id: ClientId::from(client),
        reconnect_backoff_ms: 1,
        search_debounce_ms: 0,
        ..SyncConfig::default()
    }
}

fn session(client: &str) -> KanbanSession {
    KanbanSession::with_clock(config(client), ManualClock::at(0).shared())
        .with_store(EntityStore::with_default_columns())
}

fn upsert(task: Task, column: &str, index: usize, stamp: Option<Stamp>, origin: &str) -> SyncMessage {
    SyncMessage::new(
        task.id.to_string(),
        EntityPayload::TaskUpsert {
            task,
            placement: Placement {
                column: ColumnId::from(column),
                index,
            },
        },
        stamp,
        ClientId::from(origin),
    )
}

async fn add(ctx: &mut KanbanSession, title: &str) -> String {
    ctx.process(&AddTask::new(title)).await.unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string()
}

async fn next_notice(notices: &mut broadcast::Receiver<Notice>, want: impl Fn(&Notice) -> bool) -> Notice {
    timeout(WAIT, async {
        loop {
            let notice = notices.recv().await.unwrap();
            if want(&notice) {
                return notice;
            }
        }
    })
    .await
    .unwrap()
}

#[tokio::test]
async fn newer_remote_copy_replaces_pending_local_change_exactly() {
    let mut ctx = session("local");
    let id = add(&mut ctx, "Local title").await;
    ctx.process(&MoveTask::to_column(id.as_str(), "doing")).await.unwrap();

    let mut remote = ctx.store().get_task(&id.as_str().into()).unwrap().clone();
    remote.title = "Remote title".into();
    remote.description = "from elsewhere".into();
    let message = upsert(remote.clone(), "done", 0, Some(Stamp::new(10_000, 0)), "other");

    let outcome = ctx.apply_remote(message).unwrap();
    assert_eq!(outcome.resolution, Resolution::Apply);
    assert_eq!(ctx.store().get_task(&remote.id), Some(&remote));
    assert_eq!(
        ctx.store().board().column_of(&remote.id),
        Some(&ColumnId::from("done"))
    );
    assert!(ctx.reconciler().outbox().all(|m| m.entity_id != id));
}

#[tokio::test]
async fn older_remote_copy_loses_to_pending_local_change() {
    let mut ctx = KanbanSession::with_clock(config("local"), ManualClock::at(5_000).shared())
        .with_store(EntityStore::with_default_columns());
    let id = add(&mut ctx, "Mine").await;
    let mine = ctx.store().get_task(&id.as_str().into()).unwrap().clone();

    let mut theirs = mine.clone();
    theirs.title = "Theirs".into();
    let outcome = ctx
        .apply_remote(upsert(theirs, "done", 0, Some(Stamp::new(1_000, 0)), "other"))
        .unwrap();

    assert!(matches!(outcome.resolution, Resolution::KeepLocal { .. }));
    assert_eq!(ctx.store().get_task(&mine.id), Some(&mine));
    assert_eq!(ctx.reconciler().queued(), 1);
}

#[tokio::test]
async fn unstamped_collision_applies_remote_with_conflict() {
    let mut ctx = session("local");
    let id = add(&mut ctx, "Mine").await;
    let mut theirs = ctx.store().get_task(&id.as_str().into()).unwrap().clone();
    theirs.title = "Theirs".into();

    let outcome = ctx
        .apply_remote(upsert(theirs.clone(), "todo", 0, None, "other"))
        .unwrap();

    match &outcome.resolution {
        Resolution::ApplyWithConflict { reason } => {
            assert!(reason.starts_with("sync conflict on task"), "{reason}")
        }
        other => panic!("expected a conflict, got {:?}", other),
    }
    assert_eq!(ctx.store().get_task(&theirs.id).unwrap().title, "Theirs");
    assert_eq!(
        ctx.reconciler().state(&EntityKey::new(EntityType::Task, id)),
        Some(SyncState::Synced { stamp: None })
    );
}

#[tokio::test]
async fn remote_delete_of_unknown_task_is_a_no_op() {
    let mut ctx = session("local");
    add(&mut ctx, "Keep me").await;
    let before = ctx.store().clone();

    let message = SyncMessage::new(
        "ghost",
        EntityPayload::TaskDeleted,
        Some(Stamp::new(1, 0)),
        ClientId::from("other"),
    );
    ctx.apply_remote(message).unwrap();
    assert_eq!(*ctx.store(), before);
}

#[tokio::test]
async fn outbox_survives_channel_loss_and_flushes_in_order() {
    let hub = MemoryHub::default();
    let (channel, _own) = hub.connect();
    let (_observer, mut observed) = hub.connect();
    let mut reconciler =
        SyncReconciler::new(ClientId::from("a")).with_retry(5, Duration::from_millis(1));

    for (wall, id) in [(1, "t1"), (2, "t2"), (3, "t3")] {
        reconciler.record_local(id, EntityPayload::TaskDeleted, wall);
    }
    channel.disconnect();
    let report = reconciler.flush(&*channel).await;
    assert!(report.sent.is_empty());
    assert!(report.error.is_some());
    assert_eq!(reconciler.connection(), ConnectionState::Disconnected);
    assert_eq!(reconciler.queued(), 3);

    channel.fail_reconnects(2);
    reconciler.reconnect(&*channel).await.unwrap();
    let report = reconciler.flush(&*channel).await;
    assert_eq!(report.sent.len(), 3);
    assert_eq!(reconciler.queued(), 0);

    let mut order = Vec::new();
    for _ in 0..3 {
        order.push(observed.recv().await.unwrap().entity_id);
    }
    assert_eq!(order, vec!["t1", "t2", "t3"]);
}

#[tokio::test]
async fn replayed_outbox_rebuilds_cross_entity_changes_in_order() {
    let mut a = session("a");
    a.process(&AddColumn::new("Review").with_id("review")).await.unwrap();
    let id = a.process(&AddTask::new("Check it").in_column("review")).await.unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();
    a.process(&RenameColumn::new("review", "Code review")).await.unwrap();

    let queued: Vec<SyncMessage> = a.reconciler().outbox().cloned().collect();
    let ids: Vec<&str> = queued.iter().map(|m| m.entity_id.as_str()).collect();
    assert_eq!(ids, vec!["review", id.as_str(), "review"]);

    let mut b = session("b");
    for message in queued {
        b.apply_remote(message).unwrap();
    }
    assert_eq!(
        b.store().board().column_of(&id.as_str().into()),
        Some(&ColumnId::from("review"))
    );
    assert_eq!(
        BoardDocument::from_store(b.store()),
        BoardDocument::from_store(a.store())
    );
}

#[tokio::test]
async fn remote_task_with_out_of_range_progress_is_rejected() {
    let mut ctx = session("local");
    add(&mut ctx, "Keep me").await;
    let before = ctx.store().clone();

    let mut task = Task::with_id("t9", "Overdone");
    task.progress = 250;
    let err = ctx
        .apply_remote(upsert(task, "todo", 0, Some(Stamp::new(1, 0)), "other"))
        .unwrap_err();
    assert!(matches!(err, KanbanError::InvalidValue { ref field, .. } if field == "progress"));
    assert_eq!(*ctx.store(), before);
}

fn spawn(hub: &MemoryHub, client: &str) -> (RuntimeHandle, Arc<MemoryChannel>) {
    let (channel, inbound) = hub.connect();
    let handle = BoardRuntime::spawn(session(client), channel.clone(), None, Some(inbound));
    (handle, channel)
}

#[tokio::test]
async fn two_clients_converge_over_the_hub() {
    let hub = MemoryHub::default();
    let (a, _a_channel) = spawn(&hub, "a");
    let (b, _b_channel) = spawn(&hub, "b");

    let id = a.execute(AddTask::new("Shared")).await.unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let mut b_view = b.view();
    timeout(WAIT, b_view.wait_for(|v| v.visible_count() == 1))
        .await
        .unwrap()
        .unwrap();

    b.execute(MoveTask::to_column(id.as_str(), "done")).await.unwrap();

    let done = ColumnId::from("done");
    let mut a_view = a.view();
    timeout(
        WAIT,
        a_view.wait_for(|v| v.column(&done).is_some_and(|c| c.task_ids.len() == 1)),
    )
    .await
    .unwrap()
    .unwrap();

    let a_session = a.shutdown().await.unwrap();
    let b_session = b.shutdown().await.unwrap();
    assert_eq!(
        BoardDocument::from_store(a_session.store()),
        BoardDocument::from_store(b_session.store())
    );
}

#[tokio::test]
async fn exhausted_reconnects_go_out_of_sync_until_reload() {
    let hub = MemoryHub::default();
    let (channel, _inbound) = hub.connect();
    let persistence = Arc::new(MemoryPersistence::new(BoardDocument::from_store(
        &EntityStore::with_default_columns(),
    )));
    let handle = BoardRuntime::spawn(
        session("a"),
        channel.clone(),
        Some(persistence.clone()),
        None,
    );
    let mut notices = handle.subscribe_notices();

    channel.disconnect();
    channel.fail_reconnects(5);
    handle.execute(AddTask::new("Queued")).await.unwrap();
    let notice = next_notice(&mut notices, |n| matches!(n, Notice::OutOfSync { .. })).await;
    assert_eq!(notice, Notice::OutOfSync { queued: 1 });

    let refused = handle.execute(AddTask::new("Refused")).await.unwrap_err();
    assert!(matches!(refused, KanbanError::OutOfSync { queued: 1 }));
    // reads still work
    assert!(handle
        .execute(GetTask::new("ghost"))
        .await
        .unwrap_err()
        .is_not_found());

    handle.reload().await.unwrap();
    let notice = next_notice(&mut notices, |n| matches!(n, Notice::Reloaded { .. })).await;
    assert_eq!(notice, Notice::Reloaded { tasks: 0 });

    handle.execute(AddTask::new("After reload")).await.unwrap();
    let notice = next_notice(&mut notices, |n| matches!(n, Notice::ChannelRestored { .. })).await;
    assert_eq!(notice, Notice::ChannelRestored { flushed: 1 });

    let session = handle.shutdown().await.unwrap();
    assert_eq!(session.store().task_count(), 1);
    assert_eq!(session.reconciler().queued(), 0);
    assert_eq!(session.reconciler().pending_count(), 0);
    let persisted = persistence.persisted().await;
    assert_eq!(persisted.len(), 1);
}

#[tokio::test]
async fn lagged_inbound_stream_forces_reload() {
    let hub = MemoryHub::default();
    let (channel, _inbound) = hub.connect();
    let handle = BoardRuntime::spawn(session("a"), channel, None, None);
    let mut notices = handle.subscribe_notices();

    handle.send(BoardEvent::Lagged { missed: 3 }).await.unwrap();
    next_notice(&mut notices, |n| matches!(n, Notice::OutOfSync { .. })).await;
    assert!(handle.execute(AddTask::new("Nope")).await.is_err());

    handle.reload().await.unwrap();
    next_notice(&mut notices, |n| matches!(n, Notice::Reloaded { .. })).await;
    handle.execute(AddTask::new("Yes")).await.unwrap();
    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn remote_board_replace_discards_pending_changes() {
    let hub = MemoryHub::default();
    let (channel, _inbound) = hub.connect();
    let handle = BoardRuntime::spawn(session("a"), channel, None, None);
    let mut notices = handle.subscribe_notices();

    // sent but never confirmed, so still pending
    handle.execute(AddTask::new("Doomed")).await.unwrap();

    let mut replacement = EntityStore::with_default_columns();
    OrderingEngine::new(&mut replacement)
        .add_task(Task::with_id("r1", "From server"), &ColumnId::from("todo"), None)
        .unwrap();
    handle
        .remote(SyncMessage::new(
            "board",
            EntityPayload::BoardReplaced(Box::new(BoardDocument::from_store(&replacement))),
            Some(Stamp::new(99_000, 0)),
            ClientId::from("server"),
        ))
        .await
        .unwrap();
    let notice = next_notice(&mut notices, |n| matches!(n, Notice::BoardReplaced { .. })).await;
    assert_eq!(notice, Notice::BoardReplaced { discarded: 1 });

    let session = handle.shutdown().await.unwrap();
    assert_eq!(*session.store(), replacement);
}
