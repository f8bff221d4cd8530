// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::pin::Pin;
use std::task::{Context, Poll, Waker};
use std::time::Duration;

use super::Clock;
use super::timers::TimerKey;

/// A deferred action: a future completing once after a given duration.
///
/// The underlying timer is registered lazily on the first poll and
/// unregistered when the delay completes or is dropped, so dropping a delay
/// is a total cancellation: its callback can never run afterwards.
///
/// # Precision
///
/// Ticks are dispatched by whatever drives the clock; under load a delay
/// may complete later than requested, never earlier. A delay is not
/// affected by system clock adjustments.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use fromnow::{Clock, Delay};
///
/// # async fn delay_example(clock: &Clock) {
/// Delay::new(clock, Duration::from_millis(10)).await;
/// # }
/// ```
#[derive(Debug)]
pub struct Delay {
    // Not registered until the future is first polled.
    current_timer: Option<TimerKey>,
    clock: Clock,
    duration: Duration,
}

impl Delay {
    /// Creates a delay completing after `duration`.
    ///
    /// A [`Duration::ZERO`] delay completes immediately; a
    /// [`Duration::MAX`] delay never completes.
    ///
    /// > **Note**: [`Clock::delay()`] is a shortcut for this constructor.
    #[must_use]
    pub fn new(clock: &Clock, duration: Duration) -> Self {
        Self {
            duration,
            current_timer: None,
            clock: clock.clone(),
        }
    }

    fn register_timer(&mut self, waker: &Waker) -> Poll<()> {
        match self.clock.instant().checked_add(self.duration) {
            Some(when) => {
                self.current_timer = Some(self.clock.register_timer(when, waker.clone()));
            }
            None => {
                // Past the maximum representable instant; treat the delay
                // as one that never completes.
                self.duration = Duration::MAX;
                self.current_timer = None;
            }
        }

        Poll::Pending
    }
}

impl Future for Delay {
    type Output = ();

    #[cfg_attr(test, mutants::skip)] // some mutations never complete and hang the suite
    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        match this.current_timer {
            None if this.duration == Duration::MAX => Poll::Pending,
            None if this.duration == Duration::ZERO => Poll::Ready(()),
            None => this.register_timer(cx.waker()),
            Some(key) if key.tick() <= this.clock.instant() => {
                this.current_timer = None;

                // The poll may be explicit rather than driven by a timer
                // advance, in which case the registration is still live.
                this.clock.unregister_timer(key);

                Poll::Ready(())
            }
            Some(_) => Poll::Pending,
        }
    }
}

impl Drop for Delay {
    fn drop(&mut self) {
        if let Some(key) = self.current_timer {
            self.clock.unregister_timer(key);
        }
    }
}
