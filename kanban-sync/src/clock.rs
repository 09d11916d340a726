//! Wall-clock access.
//!
//! All reads of "now" go through [`mockable::Clock`] so timers and mutation
//! stamps can be driven deterministically.

use chrono::{DateTime, Local, TimeZone, Utc};
pub use mockable::{Clock, DefaultClock};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Shared clock handle
pub type SharedClock = Arc<dyn Clock + Send + Sync>;

/// The system clock
pub fn system_clock() -> SharedClock {
    Arc::new(DefaultClock)
}

/// A clock that only moves when told to.
///
/// Cloning shares the underlying instant.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    millis: Arc<AtomicI64>,
}

impl ManualClock {
    /// Start at `millis` since the Unix epoch
    pub fn at(millis: i64) -> Self {
        Self {
            millis: Arc::new(AtomicI64::new(millis)),
        }
    }

    /// Advance by `millis`
    pub fn advance(&self, millis: i64) {
        self.millis.fetch_add(millis, Ordering::SeqCst);
    }

    /// Jump to an absolute instant
    pub fn set(&self, millis: i64) {
        self.millis.store(millis, Ordering::SeqCst);
    }

    /// Current instant in epoch milliseconds
    pub fn millis(&self) -> i64 {
        self.millis.load(Ordering::SeqCst)
    }

    /// Shared handle to this clock
    pub fn shared(&self) -> SharedClock {
        Arc::new(self.clone())
    }
}

impl Clock for ManualClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.millis())
            .single()
            .unwrap_or_default()
    }
}
