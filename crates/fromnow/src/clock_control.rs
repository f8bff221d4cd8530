// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::{Arc, Mutex};
use std::task::Waker;
use std::time::{Duration, Instant, SystemTime};

use crate::Clock;
use crate::timers::{TimerKey, Timers};

/// Controls the flow of time in tests.
///
/// A controlled clock stands still until explicitly advanced, so
/// time-sensitive code can be tested without waiting for real time to pass.
/// Advancing the clock also fires every timer whose deadline was reached,
/// which makes the scheduling primitives in this crate fully deterministic
/// under test.
///
/// Create a [`Clock`] from the control with [`ClockControl::to_clock`];
/// every clock created from the same control shares its time.
///
/// `ClockControl` is available when the `test-util` feature is enabled.
/// Never enable that feature for production code; keep it confined to
/// `dev-dependencies`:
///
/// ```toml
/// fromnow = { version = "*", features = ["test-util"] }
/// ```
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use fromnow::ClockControl;
///
/// let control = ClockControl::new();
/// let clock = control.to_clock();
///
/// let now = clock.system_time();
///
/// control.advance(Duration::from_secs(1));
///
/// assert_eq!(
///     clock.system_time().duration_since(now).unwrap(),
///     Duration::from_secs(1)
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct ClockControl {
    // Time must stay consistent across every clone and thread, hence the
    // shared mutex rather than per-handle state.
    state: Arc<Mutex<ControlState>>,
}

impl ClockControl {
    /// Creates a control whose clock reads the UNIX epoch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a control whose clock reads the given time.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::{Duration, SystemTime};
    ///
    /// use fromnow::ClockControl;
    ///
    /// let start = SystemTime::UNIX_EPOCH + Duration::from_secs(100);
    /// let control = ClockControl::new_at(start);
    ///
    /// assert_eq!(control.to_clock().system_time(), start);
    /// ```
    #[must_use]
    pub fn new_at(time: impl Into<SystemTime>) -> Self {
        let this = Self::new();
        this.advance_to(time);
        this
    }

    /// Creates a control whose clock reads the current system time.
    #[must_use]
    pub fn now() -> Self {
        Self::new_at(SystemTime::now())
    }

    /// Creates a [`Clock`] sharing this control's time.
    #[must_use]
    pub fn to_clock(&self) -> Clock {
        Clock::with_control(self)
    }

    /// Advances the clock by `duration`, firing every timer whose deadline
    /// is reached.
    pub fn advance(&self, duration: Duration) {
        self.with_state(|s| s.advance(duration));
    }

    /// Advances the clock by the specified number of milliseconds.
    pub fn advance_millis(&self, millis: u64) {
        self.advance(Duration::from_millis(millis));
    }

    /// Moves the clock to the given time.
    ///
    /// Moving forward fires every timer due at or before the target. Moving
    /// backward fires nothing; timers only ever fire when time moves
    /// forward.
    #[expect(
        clippy::missing_panics_doc,
        reason = "the target is either ahead of or behind the current time, so one of the two subtractions always succeeds"
    )]
    pub fn advance_to(&self, time: impl Into<SystemTime>) {
        let target = time.into();
        let now = self.system_time();

        match target.duration_since(now) {
            Ok(forward) => self.with_state(|s| s.advance(forward)),
            Err(_behind) => {
                let backward = now.duration_since(target).expect("the target is in the past here");
                self.with_state(|s| s.rewind(backward));
            }
        }
    }

    /// Number of timers currently registered with this clock.
    ///
    /// Useful for asserting that teardown left nothing armed.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.with_state(|s| s.timers.len())
    }

    pub(crate) fn system_time(&self) -> SystemTime {
        self.with_state(|s| s.system_time)
    }

    pub(crate) fn instant(&self) -> Instant {
        self.with_state(|s| s.instant)
    }

    pub(crate) fn register_timer(&self, when: Instant, waker: Waker) -> TimerKey {
        self.with_state(|s| {
            let key = s.timers.register(when, waker);
            // Timers that are already due fire at registration time.
            s.timers.advance_timers(s.instant);
            key
        })
    }

    pub(crate) fn unregister_timer(&self, key: TimerKey) {
        self.with_state(|s| s.timers.unregister(key));
    }

    pub(crate) fn next_timer(&self) -> Option<Instant> {
        self.with_state(|s| s.timers.next_timer())
    }

    pub(crate) fn ownership_count(&self) -> usize {
        Arc::strong_count(&self.state)
    }

    fn with_state<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut ControlState) -> R,
    {
        f(&mut self.state.lock().expect("clock control lock poisoned"))
    }
}

impl From<ClockControl> for Clock {
    fn from(control: ClockControl) -> Self {
        control.to_clock()
    }
}

impl From<&ClockControl> for Clock {
    fn from(control: &ClockControl) -> Self {
        control.to_clock()
    }
}

#[derive(Debug)]
struct ControlState {
    instant: Instant,
    system_time: SystemTime,
    timers: Timers,
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            instant: Instant::now(),
            system_time: SystemTime::UNIX_EPOCH,
            timers: Timers::default(),
        }
    }
}

impl ControlState {
    #[cfg_attr(test, mutants::skip)] // mutations here hang the test suite
    fn advance(&mut self, duration: Duration) {
        self.instant = self.instant.checked_add(duration).expect(RANGE_MESSAGE);
        self.system_time = self.system_time.checked_add(duration).expect(RANGE_MESSAGE);
        self.timers.advance_timers(self.instant);
    }

    fn rewind(&mut self, duration: Duration) {
        self.instant = self.instant.checked_sub(duration).expect(RANGE_MESSAGE);
        self.system_time = self.system_time.checked_sub(duration).expect(RANGE_MESSAGE);
        // Nothing to evaluate: timers never fire while moving backward.
    }
}

static RANGE_MESSAGE: &str = "the clock cannot be moved outside the representable time range";
