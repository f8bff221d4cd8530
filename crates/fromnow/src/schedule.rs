// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use crate::unit::{Unit, Window};

/// Safety margin added to computed deadlines so a tick can never land just
/// before the text it is meant to refresh has actually changed.
const FLIP_MARGIN: Duration = Duration::from_secs(1);

/// Cadence parameters derived for one granularity window.
///
/// A schedule answers three questions: when the label's text next becomes
/// visibly wrong, how often it keeps changing while the window holds, and
/// when the window itself must be recomputed.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use fromnow::Schedule;
///
/// let schedule = Schedule::for_elapsed(Duration::from_secs(90));
/// assert_eq!(
///     schedule,
///     Schedule::Ticking {
///         start_delay: Duration::from_secs(1),
///         tick_interval: Duration::from_secs(60),
///         window_lifetime: Duration::from_millis(3_511_000),
///     }
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// Sub-day window: refresh once per active unit.
    Ticking {
        /// Delay until the first refresh, aligned to the instant the
        /// displayed text next flips.
        start_delay: Duration,
        /// Period between refreshes while the window holds.
        tick_interval: Duration,
        /// Delay after which the window is stale and the whole schedule
        /// must be recomputed.
        window_lifetime: Duration,
    },
    /// Terminal day window: the label changes at most once per day, so no
    /// tick cadence is armed at all.
    Dormant {
        /// Delay after which the window is re-evaluated.
        recheck: Duration,
    },
}

impl Schedule {
    /// Derives the cadence for the given time elapsed since the source
    /// timestamp.
    ///
    /// The formatter is assumed to round to the nearest unit, so the
    /// visible text flips at the midpoint of a unit interval rather than at
    /// the boundary; `start_delay` aligns the first refresh to land just
    /// past that midpoint. Sub-second values are rounded by the formatter
    /// as well, which makes alignment unnecessary in the
    /// [`Unit::Second`] window.
    #[must_use]
    pub fn for_elapsed(elapsed: Duration) -> Self {
        let window = Window::select(elapsed);

        if window.active == Unit::Day {
            return Self::Dormant {
                recheck: Unit::Day.duration(),
            };
        }

        let unit = window.active.duration();
        let leftover = unit - remainder(elapsed, unit);

        let start_delay = if window.active == Unit::Second {
            Duration::ZERO
        } else {
            let half = unit / 2;
            let aligned = if leftover < half { leftover + half } else { leftover - half };
            aligned + FLIP_MARGIN
        };

        Self::Ticking {
            start_delay,
            tick_interval: unit,
            window_lifetime: window.horizon.saturating_sub(elapsed) + FLIP_MARGIN,
        }
    }
}

/// `elapsed` modulo `unit`, at millisecond precision.
fn remainder(elapsed: Duration, unit: Duration) -> Duration {
    let rem = elapsed.as_millis() % unit.as_millis();
    Duration::from_millis(u64::try_from(rem).expect("the remainder is below one day of milliseconds"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assert_types() {
        static_assertions::assert_impl_all!(Schedule: Send, Sync, Copy);
    }

    #[test]
    fn second_window_starts_immediately() {
        let schedule = Schedule::for_elapsed(Duration::from_secs(5));

        assert_eq!(
            schedule,
            Schedule::Ticking {
                start_delay: Duration::ZERO,
                tick_interval: Duration::from_secs(1),
                window_lifetime: Duration::from_secs(60 - 5 + 1),
            }
        );
    }

    #[test]
    fn minute_window_aligns_to_midpoint_when_leftover_is_short() {
        // 40s elapsed: 20s left in the minute, which is under half of it.
        let schedule = Schedule::for_elapsed(Duration::from_secs(40));

        assert_eq!(
            schedule,
            Schedule::Ticking {
                start_delay: Duration::from_secs(20 + 30 + 1),
                tick_interval: Duration::from_secs(60),
                window_lifetime: Duration::from_millis(3_600_000 - 40_000 + 1_000),
            }
        );
    }

    #[test]
    fn minute_window_aligns_to_midpoint_when_leftover_is_long() {
        // 10s elapsed: 50s left in the minute, which is over half of it.
        let schedule = Schedule::for_elapsed(Duration::from_secs(10));

        assert_eq!(
            schedule,
            Schedule::Ticking {
                start_delay: Duration::from_secs(50 - 30 + 1),
                tick_interval: Duration::from_secs(60),
                window_lifetime: Duration::from_millis(3_600_000 - 10_000 + 1_000),
            }
        );
    }

    #[test]
    fn exact_unit_boundary_keeps_full_leftover() {
        // At exactly two minutes the full minute is left over.
        let schedule = Schedule::for_elapsed(Duration::from_secs(120));

        assert_eq!(
            schedule,
            Schedule::Ticking {
                start_delay: Duration::from_secs(31),
                tick_interval: Duration::from_secs(60),
                window_lifetime: Duration::from_secs(3600 - 120 + 1),
            }
        );
    }

    #[test]
    fn hour_window_ticks_hourly() {
        let schedule = Schedule::for_elapsed(Duration::from_secs(9000));

        assert_eq!(
            schedule,
            Schedule::Ticking {
                start_delay: Duration::from_secs(1800 - 1800 + 1),
                tick_interval: Duration::from_secs(3600),
                window_lifetime: Duration::from_secs(86_400 - 9000 + 1),
            }
        );
    }

    #[test]
    fn day_window_only_rechecks() {
        let schedule = Schedule::for_elapsed(Duration::from_secs(86_400 * 3));

        assert_eq!(
            schedule,
            Schedule::Dormant {
                recheck: Duration::from_secs(86_400),
            }
        );
    }

    #[test]
    fn day_boundary_is_dormant() {
        let schedule = Schedule::for_elapsed(Duration::from_secs(86_400));

        assert!(matches!(schedule, Schedule::Dormant { .. }));
    }
}
