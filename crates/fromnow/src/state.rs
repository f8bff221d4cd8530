// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::timers::Timers;

/// Backing state shared by every clone of a [`Clock`][crate::Clock] and its
/// driver.
#[derive(Debug, Clone)]
pub(crate) enum ClockState {
    /// Fake time controlled from tests.
    #[cfg(any(feature = "test-util", test))]
    Controlled(crate::ClockControl),
    /// Real machine time; timers are advanced by a runtime driver.
    System(SharedTimers),
}

impl ClockState {
    pub(crate) fn new_system() -> Self {
        Self::System(SharedTimers::default())
    }

    /// Number of live handles (clocks and drivers) sharing this state.
    pub(crate) fn ownership_count(&self) -> usize {
        match self {
            #[cfg(any(feature = "test-util", test))]
            Self::Controlled(control) => control.ownership_count(),
            Self::System(timers) => Arc::strong_count(&timers.timers),
        }
    }

    #[cfg(test)]
    pub(crate) fn timers_len(&self) -> usize {
        match self {
            Self::Controlled(control) => control.pending_timers(),
            Self::System(timers) => timers.with_timers(|timers| timers.len()),
        }
    }
}

/// Timer queue shared across threads.
#[derive(Debug, Clone, Default)]
pub(crate) struct SharedTimers {
    // Not a hot path: the lock is taken on registration, cancellation, and
    // the periodic driver sweep, none of which contend in practice.
    timers: Arc<Mutex<Timers>>,
}

impl SharedTimers {
    pub(crate) fn with_timers<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Timers) -> R,
    {
        let mut timers = self.timers.lock().expect("timers lock poisoned");
        f(&mut timers)
    }

    #[cfg_attr(test, mutants::skip)] // mutations here hang the test suite
    pub(crate) fn try_advance_timers(&self, now: Instant) -> Option<Instant> {
        self.with_timers(|timers| timers.advance_timers(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assert_types() {
        static_assertions::assert_impl_all!(ClockState: Send, Sync, Clone);
    }

    #[test]
    fn fresh_state_is_sole_owner() {
        let state = ClockState::new_system();
        assert_eq!(state.ownership_count(), 1);

        let clone = state.clone();
        assert_eq!(clone.ownership_count(), 2);
    }
}
