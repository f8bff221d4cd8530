// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Instant;

use crate::runtime::ClockGone;
use crate::state::ClockState;

/// Advances and fires the timers of one clock.
///
/// The owning runtime must call [`ClockDriver::advance_timers`]
/// periodically; timers fire when a sweep observes that their deadline has
/// passed, never earlier.
#[derive(Debug)]
pub struct ClockDriver(pub(crate) ClockState);

impl ClockDriver {
    pub(crate) const fn new(state: ClockState) -> Self {
        Self(state)
    }

    /// Fires every timer due at or before `now`, waking its task.
    ///
    /// Returns the firing instant of the next pending timer, if any, which
    /// a drive loop may use to sleep precisely.
    ///
    /// # Errors
    ///
    /// Returns [`ClockGone`] when every clock sharing this driver's state
    /// has been dropped and no timers remain; the drive loop can stop.
    #[cfg_attr(test, mutants::skip)] // mutations here hang the test suite
    #[expect(
        clippy::needless_pass_by_ref_mut,
        reason = "exclusive access keeps timer advancement to a single drive loop"
    )]
    pub fn advance_timers(&mut self, now: Instant) -> Result<Option<Instant>, ClockGone> {
        let next = match &self.0 {
            ClockState::System(timers) => timers.try_advance_timers(now),
            // Controlled clocks advance timers when their time is moved;
            // the driver only reports what is pending.
            #[cfg(any(feature = "test-util", test))]
            ClockState::Controlled(control) => control.next_timer(),
        };

        match next {
            Some(next) => Ok(Some(next)),
            None if self.0.ownership_count() == 1 => Err(ClockGone::new()),
            None => Ok(None),
        }
    }
}
