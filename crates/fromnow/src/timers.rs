// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::collections::BTreeMap;
use std::mem;
use std::task::Waker;
use std::time::{Duration, Instant};

/// Identifies one registered timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct TimerKey {
    tick: Instant,

    /// Distinguishes timers registered for the same instant.
    seq: u32,
}

impl TimerKey {
    const fn new(tick: Instant, seq: u32) -> Self {
        Self { tick, seq }
    }

    /// The instant at which the timer fires.
    pub(crate) const fn tick(&self) -> Instant {
        self.tick
    }
}

/// The shortest representable timer period.
///
/// Periods below this are rounded up. A finer resolution would only add
/// queue churn without making a label's visible cadence any more accurate.
pub(crate) const TIMER_RESOLUTION: Duration = Duration::from_millis(1);

/// One-shot timer queue ordered by firing instant, inspired by the
/// [glommio reactor](https://github.com/DataDog/glommio/blob/d3f6e7a2ee7fb071ada163edcf90fc3286424c31/glommio/src/reactor.rs#L80).
///
/// A fired timer is removed from the queue; re-arming is the caller's job.
#[derive(Debug, Default)]
pub(crate) struct Timers {
    /// Registered timers in firing order; the [`Waker`] belongs to the task
    /// awaiting the timer.
    wakers: BTreeMap<TimerKey, Waker>,
    last_seq: u32,
}

impl Timers {
    pub(crate) fn len(&self) -> usize {
        self.wakers.len()
    }

    #[cfg(test)]
    fn contains(&self, key: TimerKey) -> bool {
        self.wakers.contains_key(&key)
    }

    /// Registers a timer that fires at `when`.
    ///
    /// The returned [`TimerKey`] can later unregister it.
    pub(crate) fn register(&mut self, when: Instant, waker: Waker) -> TimerKey {
        // Wrapping is fine; the sequence only disambiguates equal instants.
        self.last_seq = self.last_seq.wrapping_add(1);
        let key = TimerKey::new(when, self.last_seq);

        self.wakers.insert(key, waker);

        key
    }

    /// Removes a timer. Unknown keys are a no-op.
    pub(crate) fn unregister(&mut self, key: TimerKey) {
        self.wakers.remove(&key);
    }

    /// The instant at which the earliest pending timer fires, if any.
    pub(crate) fn next_timer(&self) -> Option<Instant> {
        self.wakers.keys().next().map(TimerKey::tick)
    }

    /// Wakes every timer due at or before `now`.
    ///
    /// Returns the firing instant of the next pending timer, or `None` when
    /// the queue is empty.
    #[cfg_attr(test, mutants::skip)] // mutations here hang the test suite
    pub(crate) fn advance_timers(&mut self, now: Instant) -> Option<Instant> {
        // BTreeMap::split_off keeps keys equal to the split point out of the
        // first half; nudging `now` by 1ns makes timers due exactly now fire.
        let cutoff = now.checked_add(Duration::from_nanos(1)).unwrap_or(now);

        match self.wakers.first_entry() {
            Some(entry) => {
                if entry.key().tick() <= cutoff {
                    let pending = self.wakers.split_off(&TimerKey::new(cutoff, 0));
                    let due = mem::replace(&mut self.wakers, pending);

                    for (_, waker) in due {
                        waker.wake();
                    }

                    return self.next_timer();
                }

                Some(entry.key().tick())
            }
            None => None,
        }
    }
}
