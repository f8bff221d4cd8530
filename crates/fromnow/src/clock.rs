// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::task::Waker;
use std::time::{Duration, Instant, SystemTime};

use crate::state::ClockState;
use crate::timers::TimerKey;

/// Source of time for every scheduling primitive in this crate.
///
/// The clock is passed explicitly wherever "now" is needed, so tests can
/// substitute controlled time instead of depending on the wall clock in real
/// time. When the `test-util` feature is enabled,
/// [`ClockControl`][crate::ClockControl] freezes and advances the clock
/// deterministically; production code pays nothing for that capability.
///
/// The clock provides:
///
/// - the current absolute time in UTC via [`system_time()`][Self::system_time],
/// - the current monotonic time via [`instant()`][Self::instant],
/// - construction of [`Delay`][crate::Delay] and [`Ticker`][crate::Ticker]
///   instances, the deferred and repeating actions used by the schedulers.
///
/// Absolute time is not monotonic and can be affected by system clock
/// changes; timers are always measured against monotonic time.
///
/// # Clock construction
///
/// A clock needs something to drive its registered timers. With the `tokio`
/// feature, [`Clock::new_tokio`] spawns a driver task on the Tokio runtime.
/// Any other event loop can drive a clock through the
/// [`runtime`][crate::runtime] module. In tests, construct the clock from a
/// [`ClockControl`][crate::ClockControl] (`test-util` feature) and advance
/// time manually.
///
/// # Cloning and shared state
///
/// Cloning is cheap and every clone shares the same underlying state,
/// including registered timers and, under `test-util`, the controlled
/// passage of time.
///
/// # Examples
///
/// ```
/// use fromnow::Clock;
///
/// # fn retrieve_time(clock: &Clock) {
/// let time1 = clock.system_time();
/// let time2 = clock.system_time();
///
/// assert!(time2 >= time1);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Clock(pub(crate) ClockState);

impl Clock {
    /// Creates a new clock driven by the Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime context.
    #[cfg(any(feature = "tokio", test))]
    #[cfg_attr(docsrs, doc(cfg(feature = "tokio")))]
    #[must_use]
    #[cfg_attr(test, mutants::skip)] // mutating the driver loop hangs the suite
    pub fn new_tokio() -> Self {
        Self::new_tokio_core().0
    }

    #[cfg(any(feature = "tokio", test))]
    fn new_tokio_core() -> (Self, tokio::task::JoinHandle<()>) {
        /// How often the driver task sweeps the timer queue.
        ///
        /// 10ms is far below the crate's coarsest-safe cadences and cheap
        /// for a background task.
        const DRIVE_PERIOD: Duration = Duration::from_millis(10);

        let (clock, mut driver) = crate::runtime::InactiveClock::default().activate();

        let handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(DRIVE_PERIOD).await;

                if driver.advance_timers(Instant::now()).is_err() {
                    break;
                }
            }
        });

        (clock, handle)
    }

    /// Used in tests that never need timers to advance.
    #[cfg(test)]
    pub(crate) fn new_system_idle() -> Self {
        Self(ClockState::new_system())
    }

    /// Creates a clock whose time never passes on its own.
    ///
    /// Equivalent to `ClockControl::new().to_clock()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::thread::sleep;
    /// use std::time::Duration;
    ///
    /// use fromnow::Clock;
    ///
    /// let clock = Clock::new_frozen();
    /// let now = clock.system_time();
    ///
    /// sleep(Duration::from_micros(1));
    ///
    /// assert_eq!(now, clock.system_time());
    /// ```
    #[cfg(any(feature = "test-util", test))]
    #[cfg_attr(docsrs, doc(cfg(feature = "test-util")))]
    #[must_use]
    pub fn new_frozen() -> Self {
        crate::ClockControl::new().to_clock()
    }

    /// Creates a frozen clock at the given timestamp.
    ///
    /// Equivalent to `ClockControl::new_at(time).to_clock()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::{Duration, SystemTime};
    ///
    /// use fromnow::Clock;
    ///
    /// let start = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000);
    /// let clock = Clock::new_frozen_at(start);
    ///
    /// assert_eq!(clock.system_time(), start);
    /// ```
    #[cfg(any(feature = "test-util", test))]
    #[cfg_attr(docsrs, doc(cfg(feature = "test-util")))]
    #[must_use]
    pub fn new_frozen_at(time: impl Into<SystemTime>) -> Self {
        crate::ClockControl::new_at(time).to_clock()
    }

    /// Retrieves the current absolute time in UTC.
    ///
    /// Not monotonic; the operating system may adjust it between calls.
    #[must_use]
    pub fn system_time(&self) -> SystemTime {
        match &self.0 {
            #[cfg(any(feature = "test-util", test))]
            ClockState::Controlled(control) => control.system_time(),
            ClockState::System(_) => SystemTime::now(),
        }
    }

    /// Retrieves the current monotonic time.
    ///
    /// Unlike [`system_time`][Self::system_time], an [`Instant`] always
    /// moves forward and is unaffected by system clock changes. When
    /// measuring elapsed time against a controlled clock, use
    /// [`Instant::duration_since`] rather than `Instant::elapsed`; the
    /// latter bypasses the clock.
    #[must_use]
    pub fn instant(&self) -> Instant {
        match &self.0 {
            #[cfg(any(feature = "test-util", test))]
            ClockState::Controlled(control) => control.instant(),
            ClockState::System(_) => Instant::now(),
        }
    }

    /// Creates a [`Delay`][crate::Delay] completing after `duration`.
    ///
    /// A [`Duration::ZERO`] delay completes immediately; a
    /// [`Duration::MAX`] delay never completes.
    #[must_use]
    pub fn delay(&self, duration: Duration) -> crate::Delay {
        crate::Delay::new(self, duration)
    }

    /// Creates a [`Ticker`][crate::Ticker] firing every `period`.
    #[must_use]
    pub fn ticker(&self, period: Duration) -> crate::Ticker {
        crate::Ticker::new(self, period)
    }

    pub(crate) fn register_timer(&self, when: Instant, waker: Waker) -> TimerKey {
        match &self.0 {
            #[cfg(any(feature = "test-util", test))]
            ClockState::Controlled(control) => control.register_timer(when, waker),
            ClockState::System(timers) => timers.with_timers(|t| t.register(when, waker)),
        }
    }

    pub(crate) fn unregister_timer(&self, key: TimerKey) {
        match &self.0 {
            #[cfg(any(feature = "test-util", test))]
            ClockState::Controlled(control) => control.unregister_timer(key),
            ClockState::System(timers) => timers.with_timers(|t| t.unregister(key)),
        }
    }

    #[cfg(any(feature = "test-util", test))]
    pub(crate) fn with_control(control: &crate::ClockControl) -> Self {
        Self(ClockState::Controlled(control.clone()))
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> &ClockState {
        &self.0
    }
}

impl AsRef<Self> for Clock {
    fn as_ref(&self) -> &Self {
        self
    }
}
