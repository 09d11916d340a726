//! Timer subsystem - per-task elapsed time accounting and its commands.
//!
//! Starting a running timer and stopping a stopped one are no-ops. Reading
//! elapsed time is a pure function of the stored state and the current instant.

mod elapsed;
mod reset;
mod start;
mod stop;

pub use elapsed::GetElapsed;
pub use reset::ResetTimer;
pub use start::StartTimer;
pub use stop::StopTimer;

use crate::error::{KanbanError, Result};
use crate::store::EntityStore;
use crate::types::TaskId;
use chrono::{DateTime, Utc};
use tracing::debug;

/// Mutating view over the timers in an [`EntityStore`]
pub struct Timers<'a> {
    store: &'a mut EntityStore,
}

impl<'a> Timers<'a> {
    pub fn new(store: &'a mut EntityStore) -> Self {
        Self { store }
    }

    /// Start timing a live task. Returns false if it was already running.
    pub fn start(&mut self, task: &TaskId, now: DateTime<Utc>) -> Result<bool> {
        require_live(self.store, task)?;
        let started = self.store.timer_entry(task).start(now);
        debug!(task = %task, started, "start timer");
        Ok(started)
    }

    /// Stop a task's timer, committing the live delta. Returns false if it was not running.
    pub fn stop(&mut self, task: &TaskId, now: DateTime<Utc>) -> Result<bool> {
        require_known(self.store, task)?;
        let stopped = match self.store.timers.get_mut(task) {
            Some(timer) => timer.stop(now),
            None => false,
        };
        debug!(task = %task, stopped, "stop timer");
        Ok(stopped)
    }

    /// Zero a task's timer and stop it. Returns false if there was nothing to clear.
    pub fn reset(&mut self, task: &TaskId) -> Result<bool> {
        require_known(self.store, task)?;
        Ok(self.store.remove_timer(task).is_some_and(|t| t.elapsed > 0 || t.is_running()))
    }
}

/// Elapsed milliseconds for a task as of `now`.
///
/// Never mutates: a running timer reports its committed time plus the live delta.
pub fn elapsed_now(store: &EntityStore, task: &TaskId, now: DateTime<Utc>) -> Result<u64> {
    require_known(store, task)?;
    Ok(store.get_timer(task).map(|t| t.elapsed_at(now)).unwrap_or(0))
}

fn require_live(store: &EntityStore, task: &TaskId) -> Result<()> {
    match store.get_task(task) {
        Some(_) => Ok(()),
        None => Err(KanbanError::TaskNotFound {
            id: task.to_string(),
        }),
    }
}

fn require_known(store: &EntityStore, task: &TaskId) -> Result<()> {
    if store.get_task(task).is_some() || store.get_archived(task).is_some() {
        Ok(())
    } else {
        Err(KanbanError::TaskNotFound {
            id: task.to_string(),
        })
    }
}
