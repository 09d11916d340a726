//! Per-task elapsed time accounting

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Accumulated time for a task.
///
/// `elapsed` only advances when a running timer is stopped; reads compute the
/// live delta without touching state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    /// Committed milliseconds
    #[serde(default)]
    pub elapsed: u64,
    /// Set while the timer is running
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
}

impl TimerState {
    /// Check if the timer is running
    pub fn is_running(&self) -> bool {
        self.start_time.is_some()
    }

    /// Start the timer. Returns false if it was already running.
    pub fn start(&mut self, now: DateTime<Utc>) -> bool {
        if self.start_time.is_some() {
            return false;
        }
        self.start_time = Some(now);
        true
    }

    /// Stop the timer and commit the live delta. Returns false if it was not running.
    pub fn stop(&mut self, now: DateTime<Utc>) -> bool {
        match self.start_time.take() {
            Some(started) => {
                self.elapsed = self.elapsed.saturating_add(delta_ms(started, now));
                true
            }
            None => false,
        }
    }

    /// Elapsed milliseconds as of `now`, including the running delta
    pub fn elapsed_at(&self, now: DateTime<Utc>) -> u64 {
        match self.start_time {
            Some(started) => self.elapsed.saturating_add(delta_ms(started, now)),
            None => self.elapsed,
        }
    }
}

/// Milliseconds between two instants; a clock that steps backwards contributes zero.
fn delta_ms(from: DateTime<Utc>, to: DateTime<Utc>) -> u64 {
    u64::try_from(to.signed_duration_since(from).num_milliseconds()).unwrap_or(0)
}
