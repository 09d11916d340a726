//! Collaborator seams: the push channel and the persistence API.
//!
//! The engine only needs to send messages and ask for a reconnect; inbound
//! delivery arrives as runtime events. [`MemoryHub`] is an in-process
//! broadcast hub implementing the channel for tests and local simulation.

use super::message::SyncMessage;
use crate::document::BoardDocument;
use crate::error::{KanbanError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, trace};

/// Outbound side of the bidirectional push channel
#[async_trait]
pub trait PushChannel: Send + Sync {
    /// Deliver one message to the server
    async fn send(&self, message: &SyncMessage) -> Result<()>;

    /// Re-establish a dropped connection
    async fn reconnect(&self) -> Result<()>;
}

/// REST-like persistence backend
#[async_trait]
pub trait PersistenceApi: Send + Sync {
    /// Fetch the authoritative board
    async fn fetch_board(&self) -> Result<BoardDocument>;

    /// Persist one mutation; success confirms the entity as synced
    async fn persist(&self, message: &SyncMessage) -> Result<()>;
}

/// In-process fan-out of sync messages to every connected client
#[derive(Debug, Clone)]
pub struct MemoryHub {
    tx: broadcast::Sender<SyncMessage>,
}

impl MemoryHub {
    /// Create a hub buffering up to `capacity` undelivered messages per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Connect a client: its outbound channel plus its inbound stream
    pub fn connect(&self) -> (Arc<MemoryChannel>, broadcast::Receiver<SyncMessage>) {
        let channel = Arc::new(MemoryChannel {
            tx: self.tx.clone(),
            connected: AtomicBool::new(true),
            failing_reconnects: AtomicU32::new(0),
        });
        (channel, self.tx.subscribe())
    }

    /// Inject a message as if a server or another client sent it
    pub fn publish(&self, message: SyncMessage) {
        // no subscribers is not an error for a hub
        let _ = self.tx.send(message);
    }
}

impl Default for MemoryHub {
    fn default() -> Self {
        Self::new(256)
    }
}

/// One client's outbound link to a [`MemoryHub`]
#[derive(Debug)]
pub struct MemoryChannel {
    tx: broadcast::Sender<SyncMessage>,
    connected: AtomicBool,
    failing_reconnects: AtomicU32,
}

impl MemoryChannel {
    /// Simulate a dropped connection
    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    /// Make the next `attempts` reconnects fail
    pub fn fail_reconnects(&self, attempts: u32) {
        self.failing_reconnects.store(attempts, Ordering::SeqCst);
    }

    /// Check the simulated connection state
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PushChannel for MemoryChannel {
    async fn send(&self, message: &SyncMessage) -> Result<()> {
        if !self.is_connected() {
            return Err(KanbanError::channel_loss("memory channel disconnected"));
        }
        trace!(entity = %message.key(), "hub send");
        let _ = self.tx.send(message.clone());
        Ok(())
    }

    async fn reconnect(&self) -> Result<()> {
        let remaining = self.failing_reconnects.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_reconnects.store(remaining - 1, Ordering::SeqCst);
            return Err(KanbanError::channel_loss("reconnect refused"));
        }
        self.connected.store(true, Ordering::SeqCst);
        debug!("memory channel reconnected");
        Ok(())
    }
}

/// Persistence backend holding a board document in memory
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    board: Mutex<BoardDocument>,
    persisted: Mutex<Vec<SyncMessage>>,
    failing: AtomicBool,
}

impl MemoryPersistence {
    /// Serve `board` from `fetch_board`
    pub fn new(board: BoardDocument) -> Self {
        Self {
            board: Mutex::new(board),
            persisted: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
        }
    }

    /// Replace the served board
    pub async fn set_board(&self, board: BoardDocument) {
        *self.board.lock().await = board;
    }

    /// Make `persist` fail until cleared
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Messages persisted so far, oldest first
    pub async fn persisted(&self) -> Vec<SyncMessage> {
        self.persisted.lock().await.clone()
    }
}

#[async_trait]
impl PersistenceApi for MemoryPersistence {
    async fn fetch_board(&self) -> Result<BoardDocument> {
        Ok(self.board.lock().await.clone())
    }

    async fn persist(&self, message: &SyncMessage) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(KanbanError::channel_loss("persistence unavailable"));
        }
        self.persisted.lock().await.push(message.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::message::EntityPayload;
    use crate::types::ClientId;

    fn message() -> SyncMessage {
        SyncMessage::new("t1", EntityPayload::TaskDeleted, None, ClientId::from("a"))
    }

    #[tokio::test]
    async fn test_hub_fans_out() {
        let hub = MemoryHub::default();
        let (a, _a_rx) = hub.connect();
        let (_b, mut b_rx) = hub.connect();

        a.send(&message()).await.unwrap();
        let got = b_rx.recv().await.unwrap();
        assert_eq!(got.entity_id, "t1");
    }

    #[tokio::test]
    async fn test_disconnected_send_fails_until_reconnect() {
        let hub = MemoryHub::default();
        let (a, _rx) = hub.connect();
        a.disconnect();
        a.fail_reconnects(1);

        assert!(a.send(&message()).await.unwrap_err().is_retryable());
        assert!(a.reconnect().await.is_err());
        a.reconnect().await.unwrap();
        a.send(&message()).await.unwrap();
    }

    #[tokio::test]
    async fn test_memory_persistence_records() {
        let api = MemoryPersistence::default();
        api.persist(&message()).await.unwrap();
        api.set_failing(true);
        assert!(api.persist(&message()).await.is_err());
        assert_eq!(api.persisted().await.len(), 1);
    }
}
