// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::pin::Pin;
use std::task::{Context, Poll, Waker};
use std::time::Duration;

use futures_core::Stream;

use super::Clock;
use super::timers::TimerKey;
use crate::timers::TIMER_RESOLUTION;

/// A repeating action: a stream yielding `()` every period until dropped.
///
/// The stream never ends on its own; dropping it cancels the pending timer,
/// so no tick can be delivered afterwards. Use stream combinators such as
/// `StreamExt::take` to bound the number of ticks.
///
/// # Precision
///
/// The next tick is scheduled when the stream is polled after the previous
/// one, so time spent handling a tick pushes later ticks back; ticks are
/// never delivered early. A ticker is not affected by system clock
/// adjustments.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use futures::StreamExt;
/// use fromnow::{Clock, Ticker};
///
/// # async fn ticker_example(clock: &Clock) {
/// let ticker = Ticker::new(clock, Duration::from_millis(10));
///
/// ticker
///     .take(3)
///     .for_each(async |()| {
///         // Runs every 10ms, three times.
///     })
///     .await;
/// # }
/// ```
#[derive(Debug)]
pub struct Ticker {
    period: Duration,
    clock: Clock,
    // Not registered until the stream is first polled.
    current_timer: Option<TimerKey>,
}

impl Ticker {
    /// Creates a ticker firing every `period`.
    ///
    /// Periods below the 1ms timer resolution are rounded up to it.
    ///
    /// > **Note**: [`Clock::ticker()`] is a shortcut for this constructor.
    #[must_use]
    pub fn new(clock: &Clock, period: Duration) -> Self {
        Self {
            period: period.max(TIMER_RESOLUTION),
            current_timer: None,
            clock: clock.clone(),
        }
    }

    fn register_timer(&mut self, waker: Waker) {
        match self.clock.instant().checked_add(self.period) {
            Some(when) => {
                self.current_timer = Some(self.clock.register_timer(when, waker));
            }
            None => {
                // The next tick lies past the maximum representable instant;
                // the ticker goes permanently silent instead.
                self.period = Duration::MAX;
            }
        }
    }
}

impl Stream for Ticker {
    type Item = ();

    #[cfg_attr(test, mutants::skip)] // some mutations never tick and hang the suite
    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if this.period == Duration::MAX {
            return Poll::Pending;
        }

        match this.current_timer {
            Some(key) if key.tick() <= this.clock.instant() => {
                this.current_timer = None;

                // The poll may be explicit rather than driven by a timer
                // advance, in which case the registration is still live.
                this.clock.unregister_timer(key);

                Poll::Ready(Some(()))
            }
            Some(_) => Poll::Pending,
            None => {
                this.register_timer(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        if let Some(key) = self.current_timer {
            self.clock.unregister_timer(key);
        }
    }
}
