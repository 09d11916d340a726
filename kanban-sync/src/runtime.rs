//! Board runtime: the single consumer of board events.
//!
//! One tokio task owns the [`KanbanSession`] and applies [`BoardEvent`]s in
//! the order they arrive. Every cascade of an event completes before the
//! next event is taken, so nothing outside the task ever observes a half
//! applied change. Readers get the projected board from a `watch` channel
//! and non-blocking notices from a `broadcast` channel.

use crate::command::Command;
use crate::error::{KanbanError, Result};
use crate::projection::{BoardView, ViewQuery};
use crate::session::KanbanSession;
use crate::sync::{
    ConnectionState, EntityKey, EntityPayload, PersistenceApi, PushChannel, Reconnect,
    Resolution, SyncMessage,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

const EVENT_QUEUE_CAPACITY: usize = 256;
const NOTICE_CAPACITY: usize = 64;

/// Everything the runtime reacts to
#[derive(Debug)]
pub enum BoardEvent {
    /// A local gesture, optionally answered on `reply`
    Local {
        command: Command,
        reply: Option<oneshot::Sender<Result<Value>>>,
    },
    /// A message from the push channel
    Remote(SyncMessage),
    /// Search input changed; applied after the debounce interval
    Search(String),
    /// Filter control changed; applied immediately
    Filters(BTreeMap<String, Value>),
    /// The push channel dropped
    ChannelLost,
    /// The inbound stream skipped messages
    Lagged { missed: u64 },
    /// Replace the board from the persistence API and clear sync state
    Reload,
    Shutdown,
}

/// Non-blocking things the user should hear about
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// A remote copy overrode a pending local change
    Conflict { entity: EntityKey, reason: String },
    /// A command or remote change was refused
    Rejected { op: String, error: String },
    /// Incremental sync gave up; reload required
    OutOfSync { queued: usize },
    /// The push channel came back and the outbox was flushed
    ChannelRestored { flushed: usize },
    /// A remote client replaced the whole board
    BoardReplaced { discarded: usize },
    Reloaded { tasks: usize },
}

/// Handle to a running board
#[derive(Debug)]
pub struct RuntimeHandle {
    events: mpsc::Sender<BoardEvent>,
    view: watch::Receiver<BoardView>,
    notices: broadcast::Sender<Notice>,
    task: JoinHandle<KanbanSession>,
}

impl RuntimeHandle {
    /// Run a command and wait for its result
    pub async fn execute(&self, command: impl Into<Command>) -> Result<Value> {
        let (tx, rx) = oneshot::channel();
        self.send(BoardEvent::Local {
            command: command.into(),
            reply: Some(tx),
        })
        .await?;
        rx.await
            .map_err(|_| KanbanError::channel_loss("board runtime dropped the reply"))?
    }

    /// Queue any event
    pub async fn send(&self, event: BoardEvent) -> Result<()> {
        self.events
            .send(event)
            .await
            .map_err(|_| KanbanError::channel_loss("board runtime stopped"))
    }

    /// Deliver a message as if it came off the push channel
    pub async fn remote(&self, message: SyncMessage) -> Result<()> {
        self.send(BoardEvent::Remote(message)).await
    }

    pub async fn set_search(&self, term: impl Into<String>) -> Result<()> {
        self.send(BoardEvent::Search(term.into())).await
    }

    pub async fn set_filters(&self, filters: BTreeMap<String, Value>) -> Result<()> {
        self.send(BoardEvent::Filters(filters)).await
    }

    pub async fn channel_lost(&self) -> Result<()> {
        self.send(BoardEvent::ChannelLost).await
    }

    pub async fn reload(&self) -> Result<()> {
        self.send(BoardEvent::Reload).await
    }

    /// Another producer for the event queue
    pub fn events(&self) -> mpsc::Sender<BoardEvent> {
        self.events.clone()
    }

    /// The projected board, republished after every change
    pub fn view(&self) -> watch::Receiver<BoardView> {
        self.view.clone()
    }

    pub fn subscribe_notices(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    /// Stop the loop and take the session back
    pub async fn shutdown(self) -> Result<KanbanSession> {
        // the loop may already have stopped on its own
        let _ = self.events.send(BoardEvent::Shutdown).await;
        self.task
            .await
            .map_err(|e| KanbanError::channel_loss(format!("board runtime task failed: {e}")))
    }
}

/// The event loop state
pub struct BoardRuntime {
    session: KanbanSession,
    channel: Arc<dyn PushChannel>,
    persistence: Option<Arc<dyn PersistenceApi>>,
    query: ViewQuery,
    pending_search: Option<String>,
    search_deadline: Option<Instant>,
    reconnect_deadline: Option<Instant>,
    debounce: Duration,
    view: watch::Sender<BoardView>,
    notices: broadcast::Sender<Notice>,
}

impl BoardRuntime {
    /// Start the loop on the current tokio runtime.
    ///
    /// With `persistence`, the board is fetched from it before the first
    /// event is handled. With `inbound`, messages from the push channel are
    /// forwarded into the queue as [`BoardEvent::Remote`].
    pub fn spawn(
        session: KanbanSession,
        channel: Arc<dyn PushChannel>,
        persistence: Option<Arc<dyn PersistenceApi>>,
        inbound: Option<broadcast::Receiver<SyncMessage>>,
    ) -> RuntimeHandle {
        let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
        let query = ViewQuery::default();
        let (view_tx, view_rx) = watch::channel(session.view(&query));
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);
        let forwarder = inbound.map(|rx| tokio::spawn(forward_inbound(rx, events_tx.clone())));

        let runtime = Self {
            debounce: session.config().search_debounce(),
            session,
            channel,
            persistence,
            query,
            pending_search: None,
            search_deadline: None,
            reconnect_deadline: None,
            view: view_tx,
            notices: notices.clone(),
        };
        let task = tokio::spawn(runtime.run(events_rx, forwarder));
        RuntimeHandle {
            events: events_tx,
            view: view_rx,
            notices,
            task,
        }
    }

    async fn run(
        mut self,
        mut events: mpsc::Receiver<BoardEvent>,
        forwarder: Option<JoinHandle<()>>,
    ) -> KanbanSession {
        info!(client = %self.session.config().client_id, "board runtime started");
        self.fetch_initial().await;

        loop {
            let deadline = self.search_deadline;
            let reconnect_at = self.reconnect_deadline;
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else {
                        debug!("event queue closed");
                        break;
                    };
                    if !self.handle(event).await {
                        break;
                    }
                }
                _ = wait_until(deadline) => self.apply_search(),
                _ = wait_until(reconnect_at) => self.reconnect().await,
            }
        }

        if let Some(forwarder) = forwarder {
            forwarder.abort();
        }
        info!(queued = self.session.reconciler().queued(), "board runtime stopped");
        self.session
    }

    /// Apply one event. Returns false when the loop should stop.
    async fn handle(&mut self, event: BoardEvent) -> bool {
        match event {
            BoardEvent::Local { command, reply } => self.local(command, reply).await,
            BoardEvent::Remote(message) => self.remote(message),
            BoardEvent::Search(term) => {
                if self.debounce.is_zero() {
                    self.query.search_term = term;
                    self.publish();
                } else {
                    self.pending_search = Some(term);
                    self.search_deadline = Some(Instant::now() + self.debounce);
                }
            }
            BoardEvent::Filters(filters) => {
                self.query.filters = filters;
                self.publish();
            }
            BoardEvent::ChannelLost => {
                self.session.reconciler_mut().channel_lost();
                self.sync().await;
            }
            BoardEvent::Lagged { missed } => {
                warn!(missed, "inbound stream lagged");
                self.session.reconciler_mut().force_out_of_sync();
                self.reconnect_deadline = None;
                let queued = self.session.reconciler().queued();
                self.notify(Notice::OutOfSync { queued });
            }
            BoardEvent::Reload => self.reload().await,
            BoardEvent::Shutdown => return false,
        }
        true
    }

    async fn local(&mut self, command: Command, reply: Option<oneshot::Sender<Result<Value>>>) {
        let result = command.execute(&mut self.session).await;
        match &result {
            Ok(_) => self.publish(),
            Err(e) => self.notify(Notice::Rejected {
                op: command.op_string(),
                error: e.to_string(),
            }),
        }
        if let Some(reply) = reply {
            // the caller may have stopped waiting
            let _ = reply.send(result);
        }
        if command.mutates() && self.session.reconciler().queued() > 0 {
            self.sync().await;
        }
    }

    fn remote(&mut self, message: SyncMessage) {
        let key = message.key();
        let replaces_board = matches!(message.payload, EntityPayload::BoardReplaced(_));
        match self.session.apply_remote(message) {
            Ok(outcome) => {
                if let Resolution::ApplyWithConflict { reason } = &outcome.resolution {
                    self.notify(Notice::Conflict {
                        entity: key,
                        reason: reason.clone(),
                    });
                }
                if outcome.resolution.applies() {
                    if replaces_board {
                        self.notify(Notice::BoardReplaced {
                            discarded: outcome.discarded_pending,
                        });
                    }
                    self.publish();
                }
            }
            Err(e) => {
                warn!(entity = %key, error = %e, "remote change rejected");
                self.notify(Notice::Rejected {
                    op: format!("remote {}", key),
                    error: e.to_string(),
                });
            }
        }
    }

    /// Push the outbox and persist what went out. Returns how many
    /// messages were sent.
    ///
    /// A disconnected channel is never retried inline; a reconnect is
    /// scheduled on the event loop instead.
    async fn sync(&mut self) -> usize {
        match self.session.reconciler().connection() {
            ConnectionState::OutOfSync => return 0,
            ConnectionState::Disconnected => {
                self.schedule_reconnect(Duration::ZERO);
                return 0;
            }
            ConnectionState::Connected => {}
        }
        let channel = Arc::clone(&self.channel);
        let report = self.session.reconciler_mut().flush(&*channel).await;
        self.persist(&report.sent).await;
        match report.error {
            Some(e) if e.is_retryable() => self.schedule_reconnect(Duration::ZERO),
            Some(e) => {
                warn!(error = %e, "outbox cannot be delivered");
                self.give_up();
            }
            None => {}
        }
        report.sent.len()
    }

    fn schedule_reconnect(&mut self, delay: Duration) {
        if self.reconnect_deadline.is_none() {
            self.reconnect_deadline = Some(Instant::now() + delay);
        }
    }

    /// One reconnect attempt, fired from the reconnect deadline
    async fn reconnect(&mut self) {
        self.reconnect_deadline = None;
        let channel = Arc::clone(&self.channel);
        match self.session.reconciler_mut().reconnect_attempt(&*channel).await {
            Reconnect::Restored => {
                let flushed = self.sync().await;
                self.notify(Notice::ChannelRestored { flushed });
            }
            Reconnect::RetryAfter(delay) => {
                debug!(?delay, "reconnect scheduled");
                self.reconnect_deadline = Some(Instant::now() + delay);
            }
            Reconnect::GaveUp => {
                warn!("giving up on push channel");
                self.give_up();
            }
        }
    }

    fn give_up(&mut self) {
        self.session.reconciler_mut().force_out_of_sync();
        self.reconnect_deadline = None;
        let queued = self.session.reconciler().queued();
        self.notify(Notice::OutOfSync { queued });
    }

    async fn persist(&mut self, sent: &[SyncMessage]) {
        let Some(api) = self.persistence.clone() else {
            return;
        };
        for message in sent {
            match api.persist(message).await {
                Ok(()) => {
                    if let Some(stamp) = message.timestamp {
                        self.session.reconciler_mut().confirm(&message.key(), stamp);
                    }
                }
                Err(e) => warn!(entity = %message.key(), error = %e, "persist failed, entity stays pending"),
            }
        }
    }

    async fn fetch_initial(&mut self) {
        let Some(api) = self.persistence.clone() else {
            return;
        };
        match api.fetch_board().await {
            Ok(document) => match self.session.reload(document) {
                Ok(()) => self.publish(),
                Err(e) => warn!(error = %e, "fetched board rejected, keeping local board"),
            },
            Err(e) => warn!(error = %e, "initial board fetch failed"),
        }
    }

    async fn reload(&mut self) {
        match self.persistence.clone() {
            Some(api) => {
                let reloaded = match api.fetch_board().await {
                    Ok(document) => self.session.reload(document),
                    Err(e) => Err(e),
                };
                if let Err(e) = reloaded {
                    warn!(error = %e, "reload failed");
                    self.notify(Notice::Rejected {
                        op: "reload board".into(),
                        error: e.to_string(),
                    });
                    return;
                }
            }
            None => self.session.reconciler_mut().reset(),
        }
        self.reconnect_deadline = None;
        let tasks = self.session.store().task_count();
        self.notify(Notice::Reloaded { tasks });
        self.publish();
    }

    fn apply_search(&mut self) {
        self.search_deadline = None;
        if let Some(term) = self.pending_search.take() {
            debug!(term = %term, "search applied");
            self.query.search_term = term;
        }
        self.publish();
    }

    /// Republish the projected board if it changed
    fn publish(&self) {
        let view = self.session.view(&self.query);
        self.view.send_if_modified(|current| {
            if *current == view {
                false
            } else {
                *current = view;
                true
            }
        });
    }

    fn notify(&self, notice: Notice) {
        debug!(?notice, "notice");
        // nobody listening is fine
        let _ = self.notices.send(notice);
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn forward_inbound(mut inbound: broadcast::Receiver<SyncMessage>, events: mpsc::Sender<BoardEvent>) {
    loop {
        let event = match inbound.recv().await {
            Ok(message) => BoardEvent::Remote(message),
            Err(RecvError::Lagged(missed)) => BoardEvent::Lagged { missed },
            Err(RecvError::Closed) => {
                debug!("inbound stream closed");
                let _ = events.send(BoardEvent::ChannelLost).await;
                break;
            }
        };
        if events.send(event).await.is_err() {
            break;
        }
    }
}
