//! Shared fixtures for unit tests

use crate::clock::ManualClock;
use crate::config::SyncConfig;
use crate::session::KanbanSession;
use crate::store::EntityStore;
use crate::types::ClientId;

/// A session over the default columns with a clock frozen at t=0
pub(crate) fn session() -> (ManualClock, KanbanSession) {
    let clock = ManualClock::at(0);
    let config = SyncConfig {
        client_id: ClientId::from("test-client"),
        ..SyncConfig::default()
    };
    let session = KanbanSession::with_clock(config, clock.shared())
        .with_store(EntityStore::with_default_columns());
    (clock, session)
}
