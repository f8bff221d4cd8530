// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll, Waker};
use std::time::{Duration, SystemTime};

use futures_core::Stream;

use crate::schedule::Schedule;
use crate::{Clock, Delay, Ticker};

/// A self-refreshing relative-time label.
///
/// Given a fixed past timestamp and a formatter turning `(timestamp, now)`
/// into text such as "3 minutes ago", the label keeps that text correct
/// with the fewest possible updates: instead of polling on a fixed
/// interval, it computes when the displayed text will next visibly change
/// and arms timers for exactly those instants. The cadence coarsens as the
/// timestamp ages; see [`Window`][crate::Window] and
/// [`Schedule`][crate::Schedule] for the derivation.
///
/// The label is a [`Stream`] of display values. Every re-render emits the
/// freshly formatted text; the current value is also always available
/// synchronously through [`value()`][Self::value].
///
/// # Lifecycle
///
/// A scheduling session exists while the label is enabled and has a
/// timestamp. Changing the timestamp, toggling
/// [`set_enabled`][Self::set_enabled], or dropping the label tears the
/// session down by cancelling every timer it armed; teardown is total, so a
/// cancelled session can never deliver a late update. Each session renews
/// itself when its window's lifetime elapses, recomputing the cadence from
/// scratch without any involvement from the caller.
///
/// While disabled, the label still shows (and emits once) the current
/// static snapshot; it just never refreshes it. A label without a
/// timestamp has no value at all, which is a valid quiescent state.
///
/// # Formatter contract
///
/// The formatter is assumed to round to the nearest unit (see
/// [`Schedule::for_elapsed`]). Panics from the formatter propagate to the
/// caller; the label neither catches nor retries them.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use fromnow::RelativeLabel;
/// use fromnow::runtime::InactiveClock;
///
/// let (clock, _driver) = InactiveClock::default().activate();
///
/// let mut label = RelativeLabel::new(&clock, |timestamp, now| {
///     let elapsed = now.duration_since(timestamp).unwrap_or_default();
///     format!("{}s ago", elapsed.as_secs())
/// });
///
/// label.set_enabled(true);
/// label.set_timestamp(Some(clock.system_time() - Duration::from_secs(30)));
///
/// assert!(label.value().is_some());
/// ```
pub struct RelativeLabel<F> {
    clock: Clock,
    format: F,
    timestamp: Option<SystemTime>,
    enabled: bool,
    value: Option<String>,
    emit_queued: bool,
    session: Option<Session>,
    waker: Option<Waker>,
}

impl<F> RelativeLabel<F>
where
    F: FnMut(SystemTime, SystemTime) -> String,
{
    /// Creates a quiescent label: no timestamp, auto-refresh disabled.
    #[must_use]
    pub fn new(clock: &Clock, format: F) -> Self {
        Self {
            clock: clock.clone(),
            format,
            timestamp: None,
            enabled: false,
            value: None,
            emit_queued: false,
            session: None,
            waker: None,
        }
    }

    /// The current display value.
    ///
    /// Updated synchronously by [`set_timestamp`][Self::set_timestamp] and
    /// [`set_enabled`][Self::set_enabled], and by every scheduled refresh.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// The source timestamp the label currently displays.
    #[must_use]
    pub fn timestamp(&self) -> Option<SystemTime> {
        self.timestamp
    }

    /// Whether the label refreshes itself.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Sets the source timestamp.
    ///
    /// A changed value tears down the running session, renders the new
    /// value immediately, and arms a fresh session when enabled. Clearing
    /// the timestamp clears the value. Setting the current value again is
    /// a no-op.
    pub fn set_timestamp(&mut self, timestamp: Option<SystemTime>) {
        if self.timestamp == timestamp {
            return;
        }

        self.timestamp = timestamp;
        self.arm();
    }

    /// Enables or disables auto-refresh.
    ///
    /// Disabling cancels every pending timer but keeps the current snapshot
    /// visible, emitting it once more. Setting the current state again is a
    /// no-op.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }

        self.enabled = enabled;
        self.arm();
    }

    /// Tears down the previous session and starts over.
    ///
    /// Every pending timer of the old session is cancelled before any new
    /// timer is created. The freshly formatted value becomes current
    /// immediately and is emitted on the next poll.
    fn arm(&mut self) {
        self.session = None;

        let Some(timestamp) = self.timestamp else {
            // Quiescent state: emit the cleared value once, and only if
            // there was something to clear.
            if self.value.take().is_some() {
                self.queue_emit();
            }
            return;
        };

        let now = self.clock.system_time();
        self.value = Some((self.format)(timestamp, now));
        self.queue_emit();

        if !self.enabled {
            return;
        }

        // A timestamp in the future clamps to zero elapsed time.
        let elapsed = now.duration_since(timestamp).unwrap_or_default();
        self.session = Some(Session::new(&self.clock, timestamp, Schedule::for_elapsed(elapsed)));
    }

    fn queue_emit(&mut self) {
        self.emit_queued = true;

        if let Some(waker) = self.waker.take() {
            waker.wake();
        }
    }
}

impl<F> Stream for RelativeLabel<F>
where
    F: FnMut(SystemTime, SystemTime) -> String + Unpin,
{
    type Item = Option<String>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        this.waker = Some(cx.waker().clone());

        loop {
            if this.emit_queued {
                this.emit_queued = false;
                return Poll::Ready(Some(this.value.clone()));
            }

            let Some(session) = this.session.as_mut() else {
                return Poll::Pending;
            };

            match session.step(cx) {
                Step::Stale => {
                    // The window outlived itself; recompute from scratch.
                    // Re-arming queues an emission, picked up next round.
                    this.arm();
                }
                Step::Tick => {
                    let timestamp = session.timestamp;
                    let now = this.clock.system_time();
                    this.value = Some((this.format)(timestamp, now));
                    return Poll::Ready(Some(this.value.clone()));
                }
                Step::Idle => return Poll::Pending,
            }
        }
    }
}

impl<F> fmt::Debug for RelativeLabel<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelativeLabel")
            .field("timestamp", &self.timestamp)
            .field("enabled", &self.enabled)
            .field("value", &self.value)
            .field("armed", &self.session.is_some())
            .finish_non_exhaustive()
    }
}

/// The live timer set of one `(timestamp, enabled)` activation.
///
/// Dropping the session drops its [`Delay`] and [`Ticker`] handles, which
/// unregister their timers; that is what makes teardown total.
#[derive(Debug)]
struct Session {
    clock: Clock,
    timestamp: SystemTime,
    /// Fires when the window's lifetime elapses and the schedule must be
    /// recomputed.
    renew: Delay,
    phase: Phase,
}

#[derive(Debug)]
enum Phase {
    /// Waiting for the midpoint-aligned first refresh.
    Starting { start: Delay, tick_interval: Duration },
    /// Refreshing once per active unit.
    Ticking { tick: Ticker },
    /// Terminal day window: nothing to do until renewal.
    Dormant,
}

/// Outcome of polling a session once.
enum Step {
    /// The window's lifetime elapsed; the owner must re-arm.
    Stale,
    /// A fresh value must be rendered and emitted.
    Tick,
    /// Nothing due yet.
    Idle,
}

impl Session {
    fn new(clock: &Clock, timestamp: SystemTime, schedule: Schedule) -> Self {
        match schedule {
            Schedule::Ticking {
                start_delay,
                tick_interval,
                window_lifetime,
            } => Self {
                clock: clock.clone(),
                timestamp,
                renew: Delay::new(clock, window_lifetime),
                phase: Phase::Starting {
                    start: Delay::new(clock, start_delay),
                    tick_interval,
                },
            },
            Schedule::Dormant { recheck } => Self {
                clock: clock.clone(),
                timestamp,
                renew: Delay::new(clock, recheck),
                phase: Phase::Dormant,
            },
        }
    }

    fn step(&mut self, cx: &mut Context<'_>) -> Step {
        // Renewal wins over ticking: once the window's lifetime has
        // elapsed, none of its ticks may be delivered.
        if Pin::new(&mut self.renew).poll(cx).is_ready() {
            return Step::Stale;
        }

        match &mut self.phase {
            Phase::Starting { start, tick_interval } => {
                let interval = *tick_interval;

                if Pin::new(start).poll(cx).is_ready() {
                    self.phase = Phase::Ticking {
                        tick: Ticker::new(&self.clock, interval),
                    };
                    Step::Tick
                } else {
                    Step::Idle
                }
            }
            Phase::Ticking { tick } => match Pin::new(tick).poll_next(cx) {
                Poll::Ready(_) => Step::Tick,
                Poll::Pending => Step::Idle,
            },
            Phase::Dormant => Step::Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures::task::ArcWake;

    use super::*;
    use crate::{ClockControl, fmt::time_ago};

    #[test]
    fn assert_types() {
        static_assertions::assert_impl_all!(
            RelativeLabel<fn(SystemTime, SystemTime) -> String>: Send, Sync, Unpin, fmt::Debug
        );
    }

    #[test]
    fn no_timestamp_is_quiescent() {
        let (control, clock) = controlled_clock();
        let mut label = RelativeLabel::new(&clock, time_ago);
        label.set_enabled(true);

        assert_eq!(label.value(), None);
        assert_eq!(control.pending_timers(), 0);
        assert_eq!(poll_label(&mut label), Poll::Pending);
    }

    #[test]
    fn clearing_timestamp_clears_value() {
        let (control, clock) = controlled_clock();
        let mut label = RelativeLabel::new(&clock, time_ago);
        label.set_enabled(true);
        label.set_timestamp(Some(clock.system_time() - Duration::from_secs(90)));

        assert!(matches!(poll_label(&mut label), Poll::Ready(Some(Some(_)))));
        assert_eq!(poll_label(&mut label), Poll::Pending);

        label.set_timestamp(None);

        assert_eq!(label.value(), None);
        assert_eq!(control.pending_timers(), 0);
        assert_eq!(poll_label(&mut label), Poll::Ready(Some(None)));
        assert_eq!(poll_label(&mut label), Poll::Pending);
    }

    #[test]
    fn disabled_label_shows_static_snapshot() {
        let (control, clock) = controlled_clock();
        let mut label = RelativeLabel::new(&clock, time_ago);
        label.set_timestamp(Some(clock.system_time() - Duration::from_secs(90)));

        assert_eq!(label.value(), Some("2 minutes ago"));
        assert_eq!(control.pending_timers(), 0);

        assert_eq!(poll_label(&mut label), Poll::Ready(Some(Some("2 minutes ago".to_owned()))));
        assert_eq!(poll_label(&mut label), Poll::Pending);
    }

    #[test]
    fn minute_window_ticks_at_text_flips() {
        let (control, clock) = controlled_clock();
        let mut label = RelativeLabel::new(&clock, time_ago);
        label.set_enabled(true);
        // 90s ago: minute window, first flip due in 1s, then every minute.
        label.set_timestamp(Some(clock.system_time() - Duration::from_secs(90)));

        assert_eq!(poll_label(&mut label), Poll::Ready(Some(Some("2 minutes ago".to_owned()))));
        assert_eq!(poll_label(&mut label), Poll::Pending);
        assert_eq!(control.pending_timers(), 2);

        control.advance(Duration::from_secs(1));
        assert_eq!(poll_label(&mut label), Poll::Ready(Some(Some("2 minutes ago".to_owned()))));
        assert_eq!(poll_label(&mut label), Poll::Pending);
        assert_eq!(control.pending_timers(), 2);

        control.advance(Duration::from_secs(60));
        assert_eq!(poll_label(&mut label), Poll::Ready(Some(Some("3 minutes ago".to_owned()))));
        assert_eq!(poll_label(&mut label), Poll::Pending);

        control.advance(Duration::from_secs(60));
        assert_eq!(poll_label(&mut label), Poll::Ready(Some(Some("4 minutes ago".to_owned()))));
    }

    #[test]
    fn rearm_cancels_previous_session() {
        let (control, clock) = controlled_clock();
        let mut label = RelativeLabel::new(&clock, time_ago);
        label.set_enabled(true);
        label.set_timestamp(Some(clock.system_time() - Duration::from_secs(90)));

        assert!(matches!(poll_label(&mut label), Poll::Ready(Some(Some(_)))));
        assert_eq!(poll_label(&mut label), Poll::Pending);
        assert_eq!(control.pending_timers(), 2);

        // A new timestamp must leave only the new session's timers pending.
        label.set_timestamp(Some(clock.system_time() - Duration::from_secs(40)));
        assert_eq!(control.pending_timers(), 0);

        assert!(matches!(poll_label(&mut label), Poll::Ready(Some(Some(_)))));
        assert_eq!(poll_label(&mut label), Poll::Pending);
        assert_eq!(control.pending_timers(), 2);
    }

    #[test]
    fn unchanged_inputs_are_no_ops() {
        let (control, clock) = controlled_clock();
        let timestamp = clock.system_time() - Duration::from_secs(90);
        let mut label = RelativeLabel::new(&clock, time_ago);
        label.set_enabled(true);
        label.set_timestamp(Some(timestamp));

        assert!(matches!(poll_label(&mut label), Poll::Ready(Some(Some(_)))));
        assert_eq!(poll_label(&mut label), Poll::Pending);
        assert_eq!(control.pending_timers(), 2);

        label.set_timestamp(Some(timestamp));
        label.set_enabled(true);

        // No emission and no timer churn.
        assert_eq!(poll_label(&mut label), Poll::Pending);
        assert_eq!(control.pending_timers(), 2);
    }

    #[test]
    fn disable_stops_ticking() {
        let (control, clock) = controlled_clock();
        let mut label = RelativeLabel::new(&clock, time_ago);
        label.set_enabled(true);
        label.set_timestamp(Some(clock.system_time() - Duration::from_secs(90)));

        assert!(matches!(poll_label(&mut label), Poll::Ready(Some(Some(_)))));
        assert_eq!(poll_label(&mut label), Poll::Pending);
        assert_eq!(control.pending_timers(), 2);

        label.set_enabled(false);
        assert_eq!(control.pending_timers(), 0);

        // Disabling re-emits the static snapshot once, then goes quiet.
        assert!(matches!(poll_label(&mut label), Poll::Ready(Some(Some(_)))));
        assert_eq!(poll_label(&mut label), Poll::Pending);

        control.advance(Duration::from_secs(86_400 * 10));
        assert_eq!(poll_label(&mut label), Poll::Pending);
    }

    #[test]
    fn second_window_ticks_every_second() {
        let (control, clock) = controlled_clock();
        let mut label = RelativeLabel::new(&clock, time_ago);
        label.set_enabled(true);
        label.set_timestamp(Some(clock.system_time() - Duration::from_secs(5)));

        assert_eq!(poll_label(&mut label), Poll::Ready(Some(Some("5 seconds ago".to_owned()))));
        // The start delay is zero, so the first scheduled refresh is
        // already due on the next poll.
        assert_eq!(poll_label(&mut label), Poll::Ready(Some(Some("5 seconds ago".to_owned()))));
        assert_eq!(poll_label(&mut label), Poll::Pending);
        assert_eq!(control.pending_timers(), 2);

        control.advance(Duration::from_secs(1));
        assert_eq!(poll_label(&mut label), Poll::Ready(Some(Some("6 seconds ago".to_owned()))));
    }

    #[test]
    fn window_renews_itself() {
        let (control, clock) = controlled_clock();
        let mut label = RelativeLabel::new(&clock, time_ago);
        label.set_enabled(true);
        // 3590s ago: the minute window goes stale in 11s, before its first
        // scheduled tick at 41s.
        label.set_timestamp(Some(clock.system_time() - Duration::from_secs(3590)));

        assert!(matches!(poll_label(&mut label), Poll::Ready(Some(Some(_)))));
        assert_eq!(poll_label(&mut label), Poll::Pending);
        assert_eq!(control.pending_timers(), 2);

        // Crossing the window boundary recomputes the schedule and emits,
        // with no re-arm from the caller.
        control.advance(Duration::from_secs(11));
        assert_eq!(poll_label(&mut label), Poll::Ready(Some(Some("1 hour ago".to_owned()))));
        assert_eq!(poll_label(&mut label), Poll::Pending);
        assert_eq!(control.pending_timers(), 2);
    }

    #[test]
    fn day_window_refreshes_daily() {
        let (control, clock) = controlled_clock();
        let mut label = RelativeLabel::new(&clock, time_ago);
        label.set_enabled(true);
        label.set_timestamp(Some(clock.system_time() - Duration::from_secs(86_400 * 3)));

        assert_eq!(poll_label(&mut label), Poll::Ready(Some(Some("3 days ago".to_owned()))));
        assert_eq!(poll_label(&mut label), Poll::Pending);
        // Terminal window: the renewal check is the only pending timer.
        assert_eq!(control.pending_timers(), 1);

        control.advance(Duration::from_secs(86_400));
        assert_eq!(poll_label(&mut label), Poll::Ready(Some(Some("4 days ago".to_owned()))));
        assert_eq!(poll_label(&mut label), Poll::Pending);
        assert_eq!(control.pending_timers(), 1);
    }

    #[test]
    fn future_timestamp_clamps_to_now() {
        let (control, clock) = controlled_clock();
        let mut label = RelativeLabel::new(&clock, time_ago);
        label.set_enabled(true);
        label.set_timestamp(Some(clock.system_time() + Duration::from_secs(30)));

        assert_eq!(label.value(), Some("just now"));
        assert_eq!(poll_label(&mut label), Poll::Ready(Some(Some("just now".to_owned()))));

        drop(label);
        assert_eq!(control.pending_timers(), 0);
    }

    #[test]
    fn drop_cancels_all_timers() {
        let (control, clock) = controlled_clock();
        let mut label = RelativeLabel::new(&clock, time_ago);
        label.set_enabled(true);
        label.set_timestamp(Some(clock.system_time() - Duration::from_secs(90)));

        assert!(matches!(poll_label(&mut label), Poll::Ready(Some(Some(_)))));
        assert_eq!(poll_label(&mut label), Poll::Pending);
        assert_eq!(control.pending_timers(), 2);

        drop(label);
        assert_eq!(control.pending_timers(), 0);
    }

    #[test]
    fn mutation_wakes_the_stream_task() {
        struct CountingWaker(AtomicUsize);

        impl ArcWake for CountingWaker {
            fn wake_by_ref(arc_self: &Arc<Self>) {
                arc_self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let (_control, clock) = controlled_clock();
        let mut label = RelativeLabel::new(&clock, time_ago);

        let wakes = Arc::new(CountingWaker(AtomicUsize::new(0)));
        let waker = futures::task::waker(Arc::clone(&wakes));
        let mut cx = Context::from_waker(&waker);

        assert_eq!(Pin::new(&mut label).poll_next(&mut cx), Poll::Pending);
        assert_eq!(wakes.0.load(Ordering::SeqCst), 0);

        label.set_timestamp(Some(clock.system_time()));
        assert_eq!(wakes.0.load(Ordering::SeqCst), 1);
    }

    #[cfg(not(miri))] // the tokio driver talks to the real OS
    #[tokio::test]
    async fn live_label_emits_immediately() {
        use futures::StreamExt;

        let clock = Clock::new_tokio();
        let mut label = RelativeLabel::new(&clock, time_ago);
        label.set_enabled(true);
        label.set_timestamp(Some(clock.system_time()));

        let first = label.next().await.unwrap();
        assert_eq!(first.as_deref(), Some("just now"));

        // The second-window start delay is zero, so another emission
        // follows without waiting for a full tick.
        let second = label.next().await.unwrap();
        assert!(second.is_some());
    }

    fn controlled_clock() -> (ClockControl, Clock) {
        let control = ClockControl::new_at(SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000));
        let clock = control.to_clock();
        (control, clock)
    }

    fn poll_label<F>(label: &mut RelativeLabel<F>) -> Poll<Option<Option<String>>>
    where
        F: FnMut(SystemTime, SystemTime) -> String + Unpin,
    {
        let mut cx = Context::from_waker(Waker::noop());
        Pin::new(label).poll_next(&mut cx)
    }
}
