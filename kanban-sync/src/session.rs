//! The board session: the one owner of board state.
//!
//! Every local mutation goes through [`KanbanSession::process`], which checks
//! the sync state, runs the operation, records an activity entry and lets the
//! operation hand its changed entities to [`KanbanSession::commit`]. Commit
//! runs workflow rules over touched tasks and queues one full-state sync
//! message per changed entity. Remote messages go through
//! [`KanbanSession::apply_remote`] and never trigger rules or rebroadcast.

use crate::clock::{system_clock, SharedClock};
use crate::config::SyncConfig;
use crate::document::BoardDocument;
use crate::error::{KanbanError, Result};
use crate::logging::Pretty;
use crate::operation::Execute;
use crate::ordering::OrderingEngine;
use crate::projection::{project, BoardView, ViewQuery};
use crate::store::EntityStore;
use crate::sync::{EntityPayload, Placement, Resolution, SyncMessage, SyncReconciler};
use crate::template::{TemplateRegistry, TemplateStore};
use crate::types::{
    Attachment, Column, ColumnId, Comment, DependencyId, LogEntry, SwimlaneId, TaskId,
    WorkflowRule,
};
use crate::workflow::run_rules;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::VecDeque;
use std::time::Instant;
use tracing::{debug, info, trace, warn};

/// Entity id used for whole-board messages
pub const BOARD_ENTITY_ID: &str = "board";

/// One entity a local operation changed
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Task(TaskId),
    Column(ColumnId),
    Swimlane(SwimlaneId),
    Dependency(DependencyId),
    Timer(TaskId),
    Comment(Comment),
    Attachment(Attachment),
    /// The whole board was replaced
    Board,
}

/// What happened to one inbound message
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteOutcome {
    pub resolution: Resolution,
    /// Pending local changes dropped because the board was replaced
    pub discarded_pending: usize,
}

/// Board state plus everything needed to mutate and sync it
pub struct KanbanSession {
    store: EntityStore,
    reconciler: SyncReconciler,
    clock: SharedClock,
    config: SyncConfig,
    rules: Vec<WorkflowRule>,
    templates: TemplateRegistry,
    template_store: Option<TemplateStore>,
    activity: VecDeque<LogEntry>,
}

impl KanbanSession {
    /// Create a session over an empty board using the system clock
    pub fn new(config: SyncConfig) -> Self {
        Self::with_clock(config, system_clock())
    }

    /// Create a session reading time from `clock`
    pub fn with_clock(config: SyncConfig, clock: SharedClock) -> Self {
        let reconciler = SyncReconciler::new(config.client_id.clone())
            .with_retry(config.max_reconnect_attempts, config.reconnect_backoff());
        let template_store = config.template_dir.clone().map(TemplateStore::new);
        Self {
            store: EntityStore::new(),
            reconciler,
            clock,
            config,
            rules: Vec::new(),
            templates: TemplateRegistry::new(),
            template_store,
            activity: VecDeque::new(),
        }
    }

    /// Start from an existing store
    pub fn with_store(mut self, store: EntityStore) -> Self {
        self.store = store;
        self
    }

    /// Load templates previously written to the template directory
    pub async fn load_templates(&mut self) -> Result<usize> {
        let Some(disk) = &self.template_store else {
            return Ok(0);
        };
        let loaded = disk.load_all().await?;
        let count = loaded.len();
        for template in loaded {
            self.templates.insert(template);
        }
        info!(count, "loaded templates");
        Ok(count)
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn reconciler(&self) -> &SyncReconciler {
        &self.reconciler
    }

    pub(crate) fn reconciler_mut(&mut self) -> &mut SyncReconciler {
        &mut self.reconciler
    }

    pub fn rules(&self) -> &[WorkflowRule] {
        &self.rules
    }

    pub(crate) fn rules_mut(&mut self) -> &mut Vec<WorkflowRule> {
        &mut self.rules
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    pub(crate) fn templates_mut(&mut self) -> &mut TemplateRegistry {
        &mut self.templates
    }

    pub(crate) fn template_store(&self) -> Option<&TemplateStore> {
        self.template_store.as_ref()
    }

    /// Activity entries, newest first
    pub fn activity(&self) -> impl Iterator<Item = &LogEntry> {
        self.activity.iter()
    }

    /// Activity entries that acted on one task, newest first
    pub fn task_activity<'a>(&'a self, task: &'a TaskId) -> impl Iterator<Item = &'a LogEntry> + 'a {
        self.activity
            .iter()
            .filter(move |entry| entry.task().as_ref() == Some(task))
    }

    /// Current wall time
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }

    pub(crate) fn store_mut(&mut self) -> &mut EntityStore {
        &mut self.store
    }

    pub(crate) fn engine(&mut self) -> OrderingEngine<'_> {
        OrderingEngine::new(&mut self.store)
    }

    /// Project the board through a query
    pub fn view(&self, query: &ViewQuery) -> BoardView {
        project(&self.store, query)
    }

    /// Run one operation.
    ///
    /// Mutations are refused while out of sync and always leave an activity
    /// entry, successful or not.
    pub async fn process<O>(&mut self, op: &O) -> Result<Value>
    where
        O: Execute<KanbanSession, KanbanError> + Serialize,
    {
        let started = Instant::now();
        let mutates = op.mutates();
        if mutates && self.reconciler.is_out_of_sync() {
            return Err(self.reconciler.out_of_sync_error());
        }

        let result = op.execute(self).await;

        if let Err(e) = &result {
            if e.is_not_found() {
                warn!(op = %op.op_string(), error = %e, "operation skipped");
            } else {
                debug!(op = %op.op_string(), error = %e, "operation failed");
            }
        }
        if mutates {
            let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
            let input = serde_json::to_value(op).unwrap_or(Value::Null);
            let entry = match &result {
                Ok(output) => LogEntry::new(op.op_string(), self.now(), input, output.clone(), duration_ms),
                Err(e) => LogEntry::failure(op.op_string(), self.now(), input, &e.to_string(), duration_ms),
            };
            let entry = entry.with_actor(self.config.client_id.as_str());
            self.log(entry);
        }
        result
    }

    fn log(&mut self, entry: LogEntry) {
        self.activity.push_front(entry);
        self.activity.truncate(self.config.activity_log_limit);
    }

    /// Hand changed entities to the reconciler.
    ///
    /// Enabled workflow rules run first over every touched live task; tasks
    /// they change are broadcast too. Returns the queued messages.
    pub(crate) fn commit(&mut self, mut changes: Vec<Change>) -> Vec<SyncMessage> {
        let touched: Vec<TaskId> = changes
            .iter()
            .filter_map(|c| match c {
                Change::Task(id) if self.store.get_task(id).is_some() => Some(id.clone()),
                _ => None,
            })
            .collect();
        if !touched.is_empty() && !self.rules.is_empty() {
            for id in run_rules(&mut self.store, &self.rules, &touched) {
                let change = Change::Task(id);
                if !changes.contains(&change) {
                    changes.push(change);
                }
            }
        }

        let wall = self.now().timestamp_millis();
        let mut queued = Vec::with_capacity(changes.len());
        for change in changes {
            if let Some((entity_id, payload)) = self.snapshot(change) {
                queued.push(self.reconciler.record_local(entity_id, payload, wall));
            }
        }
        queued
    }

    /// Current full state of one changed entity, as a payload
    fn snapshot(&self, change: Change) -> Option<(String, EntityPayload)> {
        let store = &self.store;
        let snapshot = match change {
            Change::Task(id) => {
                let payload = if let Some(task) = store.get_task(&id) {
                    let Some((column, index)) = store.board().position_of(&id) else {
                        warn!(task = %id, "live task has no placement; not broadcast");
                        return None;
                    };
                    EntityPayload::TaskUpsert {
                        task: task.clone(),
                        placement: Placement {
                            column: column.clone(),
                            index,
                        },
                    }
                } else if let Some(archived) = store.get_archived(&id) {
                    EntityPayload::TaskArchived(archived.clone())
                } else {
                    EntityPayload::TaskDeleted
                };
                (id.to_string(), payload)
            }
            Change::Column(id) => {
                let payload = match store.get_column(&id) {
                    Some(column) => EntityPayload::ColumnUpsert {
                        id: id.clone(),
                        title: column.title.clone(),
                        index: store
                            .board()
                            .column_order
                            .iter()
                            .position(|c| c == &id)
                            .unwrap_or(0),
                    },
                    None => EntityPayload::ColumnDeleted,
                };
                (id.to_string(), payload)
            }
            Change::Swimlane(id) => {
                let payload = match store.get_swimlane(&id) {
                    Some(lane) => EntityPayload::SwimlaneUpsert(lane.clone()),
                    None => EntityPayload::SwimlaneDeleted,
                };
                (id.to_string(), payload)
            }
            Change::Dependency(id) => {
                let payload = match store.get_dependency(&id) {
                    Some(dep) => EntityPayload::DependencyUpsert(dep.clone()),
                    None => EntityPayload::DependencyDeleted,
                };
                (id.to_string(), payload)
            }
            Change::Timer(task) => {
                let state = store.get_timer(&task).cloned().unwrap_or_default();
                (task.to_string(), EntityPayload::Timer(state))
            }
            Change::Comment(comment) => (comment.id.to_string(), EntityPayload::CommentAdded(comment)),
            Change::Attachment(attachment) => (
                attachment.id.to_string(),
                EntityPayload::AttachmentAdded(attachment),
            ),
            Change::Board => (
                BOARD_ENTITY_ID.to_string(),
                EntityPayload::BoardReplaced(Box::new(BoardDocument::from_store(store))),
            ),
        };
        Some(snapshot)
    }

    /// Swap in a whole new board, keeping sync state
    pub(crate) fn replace_store(&mut self, store: EntityStore) {
        self.store = store;
    }

    /// Replace the board with an authoritative copy and clear all pending sync state
    pub fn reload(&mut self, document: BoardDocument) -> Result<()> {
        let store = document.into_store()?;
        self.store = store;
        self.reconciler.reset();
        info!(tasks = self.store.task_count(), "board reloaded");
        Ok(())
    }

    /// Apply one message from the push channel.
    ///
    /// Remote copies replace local ones whole. Unknown ids in delete messages
    /// are logged no-ops.
    pub fn apply_remote(&mut self, message: SyncMessage) -> Result<RemoteOutcome> {
        trace!("inbound message {}", Pretty(&message));
        let resolution = self.reconciler.decide_remote(&message);
        let mut outcome = RemoteOutcome {
            resolution,
            discarded_pending: 0,
        };
        if !outcome.resolution.applies() {
            return Ok(outcome);
        }
        if let Resolution::ApplyWithConflict { reason } = &outcome.resolution {
            warn!(entity = %message.key(), %reason, "sync conflict, remote copy wins");
        }
        debug!(entity = %message.key(), origin = %message.origin, "applying remote change");
        outcome.discarded_pending = self.apply_payload(&message.entity_id, message.payload)?;
        Ok(outcome)
    }

    fn apply_payload(&mut self, entity_id: &str, payload: EntityPayload) -> Result<usize> {
        match payload {
            EntityPayload::TaskUpsert { task, placement } => {
                task.validate()?;
                let column = if self.store.get_column(&placement.column).is_some() {
                    placement.column
                } else {
                    let fallback = self
                        .store
                        .board()
                        .first_column()
                        .map(|c| c.id.clone())
                        .ok_or_else(|| KanbanError::ColumnNotFound {
                            id: placement.column.to_string(),
                        })?;
                    warn!(task = %task.id, column = %placement.column, %fallback, "unknown column, placing in first column");
                    fallback
                };
                let id = task.id.clone();
                self.store.take_archived(&id);
                self.store.put_task(task);
                self.engine().place_task(&id, &column, placement.index)?;
            }
            EntityPayload::TaskDeleted => {
                ignore_not_found(self.engine().delete_task(&TaskId::from(entity_id)))?;
            }
            EntityPayload::TaskArchived(archived) => {
                archived.task.validate()?;
                self.engine().put_archived(archived);
            }
            EntityPayload::ColumnUpsert { id, title, index } => {
                if let Some(column) = self.store.column_mut(&id) {
                    column.title = title;
                    self.engine().move_column(&id, index)?;
                } else {
                    self.engine().add_column(Column::new(id, title), Some(index))?;
                }
            }
            EntityPayload::ColumnDeleted => {
                let relocated = ignore_not_found(self.engine().dissolve_column(&ColumnId::from(entity_id)))?;
                if let Some(moved) = relocated.filter(|m| !m.is_empty()) {
                    info!(column = entity_id, relocated = moved.len(), "remote column delete relocated tasks");
                }
            }
            EntityPayload::SwimlaneUpsert(swimlane) => {
                self.store.put_swimlane(swimlane);
            }
            EntityPayload::SwimlaneDeleted => {
                ignore_not_found(self.engine().delete_swimlane(&SwimlaneId::from(entity_id)))?;
            }
            EntityPayload::DependencyUpsert(dependency) => {
                self.store.put_dependency(dependency);
            }
            EntityPayload::DependencyDeleted => {
                self.store.remove_dependency(&DependencyId::from(entity_id));
            }
            EntityPayload::Timer(state) => {
                let task = TaskId::from(entity_id);
                if self.store.get_task(&task).is_some() || self.store.get_archived(&task).is_some() {
                    self.store.put_timer(task, state);
                } else {
                    debug!(task = %task, "timer for unknown task ignored");
                }
            }
            EntityPayload::CommentAdded(comment) => {
                self.store.append_comment(comment);
            }
            EntityPayload::AttachmentAdded(attachment) => {
                self.store.append_attachment(attachment);
            }
            EntityPayload::BoardReplaced(document) => {
                let store = document.into_store()?;
                self.store = store;
                let discarded = self.reconciler.discard_pending();
                if discarded > 0 {
                    warn!(discarded, "remote board replace dropped pending local changes");
                }
                return Ok(discarded);
            }
        }
        Ok(0)
    }
}

/// Turn a not-found error into a logged no-op
fn ignore_not_found<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => {
            debug!(error = %e, "remote change for unknown entity ignored");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

impl std::fmt::Debug for KanbanSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KanbanSession")
            .field("client_id", &self.config.client_id)
            .field("tasks", &self.store.task_count())
            .field("connection", &self.reconciler.connection())
            .field("queued", &self.reconciler.queued())
            .finish()
    }
}
