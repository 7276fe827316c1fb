//! Nullable clock — deterministic time for testing.

use std::cell::Cell;
use vestlock_types::Timestamp;

/// A deterministic clock for testing.
///
/// Time only advances when you tell it to.
pub struct NullClock {
    current: Cell<u64>,
}

impl NullClock {
    pub fn new(initial_secs: u64) -> Self {
        Self {
            current: Cell::new(initial_secs),
        }
    }

    pub fn now(&self) -> Timestamp {
        Timestamp::new(self.current.get())
    }

    /// Advance time by a number of seconds, returning the new time.
    pub fn advance(&self, secs: u64) -> Timestamp {
        self.current.set(self.current.get().saturating_add(secs));
        self.now()
    }

    pub fn set(&self, secs: u64) {
        self.current.set(secs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_only_on_request() {
        let clock = NullClock::new(100);
        assert_eq!(clock.now(), Timestamp::new(100));
        assert_eq!(clock.advance(5), Timestamp::new(105));
        clock.set(7);
        assert_eq!(clock.now().as_secs(), 7);
    }
}
