//! Hybrid logical timestamps for last-writer-wins ordering

use serde::{Deserialize, Serialize};
use std::fmt;

/// A mutation timestamp: wall-clock milliseconds plus a tie-breaking counter.
///
/// Stamps order by `millis`, then `counter`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Stamp {
    pub millis: i64,
    pub counter: u32,
}

impl Stamp {
    /// Create a stamp
    pub fn new(millis: i64, counter: u32) -> Self {
        Self { millis, counter }
    }
}

impl fmt::Display for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.millis, self.counter)
    }
}

/// Issues strictly increasing stamps for one client.
///
/// Each stamp is at least the wall clock and greater than every stamp issued
/// or observed before it, so local mutations made after receiving a remote
/// one always order after it.
#[derive(Debug, Clone, Default)]
pub struct LogicalClock {
    last: Stamp,
}

impl LogicalClock {
    /// Create a clock that has seen nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next stamp given the current wall time
    pub fn tick(&mut self, wall_millis: i64) -> Stamp {
        self.last = if wall_millis > self.last.millis {
            Stamp::new(wall_millis, 0)
        } else {
            Stamp::new(self.last.millis, self.last.counter.saturating_add(1))
        };
        self.last
    }

    /// Fold a remote stamp into the clock
    pub fn observe(&mut self, remote: Stamp) {
        if remote > self.last {
            self.last = remote;
        }
    }

    /// The most recent stamp issued or observed
    pub fn last(&self) -> Stamp {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_is_strictly_increasing_on_frozen_clock() {
        let mut clock = LogicalClock::new();
        let a = clock.tick(1_000);
        let b = clock.tick(1_000);
        let c = clock.tick(999);
        assert!(a < b && b < c);
        assert_eq!(c, Stamp::new(1_000, 2));
    }

    #[test]
    fn test_observe_pushes_local_clock_forward() {
        let mut clock = LogicalClock::new();
        clock.tick(100);
        clock.observe(Stamp::new(5_000, 7));
        let next = clock.tick(200);
        assert!(next > Stamp::new(5_000, 7));
    }

    #[test]
    fn test_wall_clock_resets_counter() {
        let mut clock = LogicalClock::new();
        clock.tick(10);
        clock.tick(10);
        assert_eq!(clock.tick(11), Stamp::new(11, 0));
    }
}
