//! Sync reconciler - per-entity pending/synced tracking, last-writer-wins
//! resolution, the ordered outbox and connection state.
//!
//! The reconciler decides; it never touches the entity store. The session
//! applies whatever [`Resolution`] says to apply.

use super::channel::PushChannel;
use super::message::{EntityKey, EntityPayload, SyncMessage};
use super::stamp::{LogicalClock, Stamp};
use crate::error::{KanbanError, Result};
use crate::types::ClientId;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Where one entity stands relative to the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Mutated locally; broadcast queued or sent, not yet seen back
    LocalPending { stamp: Stamp },
    /// Last known state matches what the server last broadcast
    Synced { stamp: Option<Stamp> },
}

/// Health of the push channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    /// Sends fail; mutations queue in the outbox
    Disconnected,
    /// Reconnect gave up or inbound messages were lost; reload required
    OutOfSync,
}

/// What to do with one inbound message
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// No competing local change; apply the remote copy
    Apply,
    /// Remote copy wins a tie it cannot prove; apply it and tell the user
    ApplyWithConflict { reason: String },
    /// Local pending change is newer; ignore the remote copy
    KeepLocal { local: Stamp },
    /// Remote copy is older than what is already applied
    Stale { current: Stamp },
    /// Our own message came back
    Echo { confirmed: bool },
}

impl Resolution {
    /// Whether the remote payload should be applied
    pub fn applies(&self) -> bool {
        matches!(self, Self::Apply | Self::ApplyWithConflict { .. })
    }
}

/// Outcome of one reconnect attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconnect {
    Restored,
    /// Still disconnected; try again after the delay
    RetryAfter(Duration),
    /// Attempts exhausted; the board is out of sync
    GaveUp,
}

/// Outcome of draining the outbox
#[derive(Debug, Default)]
pub struct FlushReport {
    /// Messages the channel accepted, in send order
    pub sent: Vec<SyncMessage>,
    /// The send failure that stopped the flush, if any
    pub error: Option<KanbanError>,
}

/// Tracks local mutations against remote ones for one client
#[derive(Debug)]
pub struct SyncReconciler {
    client_id: ClientId,
    clock: LogicalClock,
    entities: HashMap<EntityKey, SyncState>,
    outbox: VecDeque<SyncMessage>,
    connection: ConnectionState,
    max_reconnect_attempts: u32,
    reconnect_failures: u32,
    backoff: Duration,
}

impl SyncReconciler {
    /// Create a connected reconciler with default retry policy
    pub fn new(client_id: ClientId) -> Self {
        Self {
            client_id,
            clock: LogicalClock::new(),
            entities: HashMap::new(),
            outbox: VecDeque::new(),
            connection: ConnectionState::Connected,
            max_reconnect_attempts: 5,
            reconnect_failures: 0,
            backoff: Duration::from_millis(250),
        }
    }

    /// Set the reconnect policy
    pub fn with_retry(mut self, max_attempts: u32, backoff: Duration) -> Self {
        self.max_reconnect_attempts = max_attempts;
        self.backoff = backoff;
        self
    }

    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn is_out_of_sync(&self) -> bool {
        self.connection == ConnectionState::OutOfSync
    }

    /// Messages waiting to be sent, oldest first
    pub fn outbox(&self) -> impl Iterator<Item = &SyncMessage> {
        self.outbox.iter()
    }

    pub fn queued(&self) -> usize {
        self.outbox.len()
    }

    /// Current state of one entity, if it was ever touched
    pub fn state(&self, key: &EntityKey) -> Option<SyncState> {
        self.entities.get(key).copied()
    }

    /// Number of entities with unconfirmed local changes
    pub fn pending_count(&self) -> usize {
        self.entities
            .values()
            .filter(|s| matches!(s, SyncState::LocalPending { .. }))
            .count()
    }

    /// Stamp a local mutation, mark it pending and queue it for sending.
    ///
    /// Every mutation keeps its own slot at the back of the outbox, so the
    /// queue replays in the order the changes were made.
    pub fn record_local(
        &mut self,
        entity_id: impl Into<String>,
        payload: EntityPayload,
        wall_millis: i64,
    ) -> SyncMessage {
        let stamp = self.clock.tick(wall_millis);
        let message = SyncMessage::new(entity_id, payload, Some(stamp), self.client_id.clone());
        self.entities.insert(message.key(), SyncState::LocalPending { stamp });
        self.outbox.push_back(message.clone());
        debug!(entity = %message.key(), %stamp, "recorded local mutation");
        message
    }

    /// Decide what an inbound message means for local state.
    ///
    /// Updates the entity's state as a side effect: a winning remote copy
    /// leaves the entity synced at the remote stamp and drops any unsent
    /// local copy from the outbox.
    pub fn decide_remote(&mut self, message: &SyncMessage) -> Resolution {
        if let Some(stamp) = message.timestamp {
            self.clock.observe(stamp);
        }
        let key = message.key();

        if message.origin == self.client_id {
            let confirmed = match (self.entities.get(&key), message.timestamp) {
                (Some(SyncState::LocalPending { stamp }), Some(remote)) if *stamp == remote => {
                    self.entities
                        .insert(key, SyncState::Synced { stamp: Some(remote) });
                    true
                }
                _ => false,
            };
            return Resolution::Echo { confirmed };
        }

        let resolution = match (self.entities.get(&key).copied(), message.timestamp) {
            (Some(SyncState::LocalPending { stamp: local }), Some(remote)) if remote > local => {
                Resolution::Apply
            }
            (Some(SyncState::LocalPending { stamp: local }), Some(remote)) if remote < local => {
                Resolution::KeepLocal { local }
            }
            (Some(SyncState::LocalPending { .. }), Some(_)) => Resolution::ApplyWithConflict {
                reason: KanbanError::sync_conflict(&key, "local and remote changes carry the same timestamp")
                    .to_string(),
            },
            (Some(SyncState::LocalPending { .. }), None) => Resolution::ApplyWithConflict {
                reason: KanbanError::sync_conflict(&key, "remote change has no timestamp").to_string(),
            },
            (Some(SyncState::Synced { stamp: Some(current) }), Some(remote)) if remote < current => {
                Resolution::Stale { current }
            }
            _ => Resolution::Apply,
        };

        match &resolution {
            Resolution::Apply | Resolution::ApplyWithConflict { .. } => {
                let previous = match self.entities.get(&key) {
                    Some(SyncState::Synced { stamp }) => *stamp,
                    _ => None,
                };
                self.outbox.retain(|m| m.key() != key);
                self.entities.insert(
                    key,
                    SyncState::Synced {
                        stamp: message.timestamp.or(previous),
                    },
                );
            }
            Resolution::KeepLocal { local } => {
                debug!(entity = %key, %local, "kept newer local change");
            }
            Resolution::Stale { current } => {
                debug!(entity = %key, %current, "ignored stale remote change");
            }
            Resolution::Echo { .. } => {}
        }
        resolution
    }

    /// Confirm a pending entity from a persistence acknowledgement.
    ///
    /// Only the exact stamp that is pending is confirmed; a later local edit
    /// stays pending.
    pub fn confirm(&mut self, key: &EntityKey, stamp: Stamp) -> bool {
        match self.entities.get(key) {
            Some(SyncState::LocalPending { stamp: pending }) if *pending == stamp => {
                self.entities
                    .insert(key.clone(), SyncState::Synced { stamp: Some(stamp) });
                true
            }
            _ => false,
        }
    }

    /// Forget all pending state after the whole board was replaced.
    ///
    /// Returns how many pending entities were discarded.
    pub fn discard_pending(&mut self) -> usize {
        let pending = self.pending_count();
        self.entities.clear();
        self.outbox.clear();
        pending
    }

    /// Send the outbox in order, stopping at the first failure.
    ///
    /// A failed message stays at the head of the queue and the connection is
    /// marked disconnected.
    pub async fn flush(&mut self, channel: &dyn PushChannel) -> FlushReport {
        let mut report = FlushReport::default();
        if self.connection != ConnectionState::Connected {
            return report;
        }
        while let Some(message) = self.outbox.front() {
            match channel.send(message).await {
                Ok(()) => {
                    if let Some(sent) = self.outbox.pop_front() {
                        report.sent.push(sent);
                    }
                }
                Err(e) => {
                    warn!(error = %e, queued = self.outbox.len(), "send failed, holding outbox");
                    self.connection = ConnectionState::Disconnected;
                    report.error = Some(e);
                    break;
                }
            }
        }
        report
    }

    /// Note that the channel dropped
    pub fn channel_lost(&mut self) {
        if self.connection == ConnectionState::Connected {
            warn!(queued = self.outbox.len(), "push channel lost");
            self.connection = ConnectionState::Disconnected;
        }
    }

    /// Give up on incremental sync until the board is reloaded
    pub fn force_out_of_sync(&mut self) {
        warn!(queued = self.outbox.len(), "board out of sync");
        self.connection = ConnectionState::OutOfSync;
    }

    /// Make one reconnect attempt.
    ///
    /// A failure before the attempts run out asks for a retry after an
    /// exponentially growing delay; the last failure moves to
    /// [`ConnectionState::OutOfSync`].
    pub async fn reconnect_attempt(&mut self, channel: &dyn PushChannel) -> Reconnect {
        match self.connection {
            ConnectionState::Connected => return Reconnect::Restored,
            ConnectionState::OutOfSync => return Reconnect::GaveUp,
            ConnectionState::Disconnected => {}
        }
        match channel.reconnect().await {
            Ok(()) => {
                info!(attempts = self.reconnect_failures + 1, queued = self.outbox.len(), "push channel restored");
                self.reconnect_failures = 0;
                self.connection = ConnectionState::Connected;
                Reconnect::Restored
            }
            Err(e) => {
                self.reconnect_failures += 1;
                warn!(attempt = self.reconnect_failures, error = %e, "reconnect failed");
                if self.reconnect_failures >= self.max_reconnect_attempts.max(1) {
                    self.force_out_of_sync();
                    Reconnect::GaveUp
                } else {
                    let doublings = self.reconnect_failures.saturating_sub(1).min(16);
                    Reconnect::RetryAfter(self.backoff.saturating_mul(1 << doublings))
                }
            }
        }
    }

    /// Reconnect, sleeping between attempts.
    ///
    /// Exhausting the attempts returns [`KanbanError::OutOfSync`]. Callers
    /// with an event loop should drive [`Self::reconnect_attempt`] from a
    /// timer instead.
    pub async fn reconnect(&mut self, channel: &dyn PushChannel) -> Result<()> {
        loop {
            match self.reconnect_attempt(channel).await {
                Reconnect::Restored => return Ok(()),
                Reconnect::RetryAfter(delay) => tokio::time::sleep(delay).await,
                Reconnect::GaveUp => return Err(self.out_of_sync_error()),
            }
        }
    }

    /// The error local mutations get while out of sync
    pub fn out_of_sync_error(&self) -> KanbanError {
        KanbanError::OutOfSync {
            queued: self.outbox.len(),
        }
    }

    /// Start over after a reload: nothing pending, connected
    pub fn reset(&mut self) {
        self.entities.clear();
        self.outbox.clear();
        self.reconnect_failures = 0;
        self.connection = ConnectionState::Connected;
    }
}
