//! Real-time synchronization: wire messages, logical time, collaborator
//! traits and the reconciler.

mod channel;
mod message;
mod reconciler;
mod stamp;

pub use channel::{MemoryChannel, MemoryHub, MemoryPersistence, PersistenceApi, PushChannel};
pub use message::{EntityKey, EntityPayload, EntityType, Placement, SyncMessage};
pub use reconciler::{ConnectionState, FlushReport, Reconnect, Resolution, SyncReconciler, SyncState};
pub use stamp::{LogicalClock, Stamp};
