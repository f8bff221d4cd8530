// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::Clock;
use crate::runtime::ClockDriver;
use crate::state::ClockState;

/// A clock that is not attached to a runtime yet.
///
/// An inactive clock performs no time operations; it exists so a clock and
/// the driver that advances its timers can be created together, wherever
/// the runtime wants them. Call [`InactiveClock::activate`] to split it
/// into a working [`Clock`] and its [`ClockDriver`].
///
/// Clones share the same underlying state, exactly like clones of the
/// activated [`Clock`]. For an independent timer queue, construct a new
/// `InactiveClock` instead.
///
/// # Examples
///
/// ```
/// use fromnow::runtime::InactiveClock;
///
/// let (clock, driver) = InactiveClock::default().activate();
///
/// let now = clock.instant();
/// // The driver must be swept periodically by the runtime.
/// # let _ = (driver, now);
/// ```
#[derive(Debug, Clone)]
pub struct InactiveClock(ClockState);

impl Default for InactiveClock {
    fn default() -> Self {
        Self(ClockState::new_system())
    }
}

impl InactiveClock {
    /// Splits this inactive clock into a working [`Clock`] and the
    /// [`ClockDriver`] that advances its timers.
    #[must_use]
    pub fn activate(self) -> (Clock, ClockDriver) {
        let state = self.0;
        let clock = Clock(state.clone());
        let driver = ClockDriver::new(state);

        (clock, driver)
    }
}

#[cfg(any(feature = "test-util", test))]
impl From<crate::ClockControl> for InactiveClock {
    fn from(control: crate::ClockControl) -> Self {
        Self(ClockState::Controlled(control))
    }
}
