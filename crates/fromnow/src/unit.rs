// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

/// Display granularity of a relative-time label.
///
/// Units are totally ordered by their fixed duration; a label's text is
/// assumed to change at most once per active unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Unit {
    /// One second.
    Second,
    /// One minute.
    Minute,
    /// One hour.
    Hour,
    /// One day. The coarsest unit; labels this old change at most daily.
    Day,
}

impl Unit {
    /// The fixed length of this unit.
    #[must_use]
    pub const fn duration(self) -> Duration {
        match self {
            Self::Second => Duration::from_secs(1),
            Self::Minute => Duration::from_secs(60),
            Self::Hour => Duration::from_secs(60 * 60),
            Self::Day => Duration::from_secs(24 * 60 * 60),
        }
    }
}

/// The granularity window governing a label's current cadence.
///
/// A window pairs the unit in which the label currently changes with the
/// elapsed-time bound at which that choice goes stale and must be
/// recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// Unit in which the label's text currently changes.
    pub active: Unit,
    /// Elapsed-time bound past which the window no longer applies.
    ///
    /// This is the next coarser unit's duration, except in the terminal
    /// [`Unit::Day`] window where no coarser unit exists and the bound is
    /// two days.
    pub horizon: Duration,
}

impl Window {
    /// Selects the window for the given time elapsed since the source
    /// timestamp.
    ///
    /// Boundaries are half-open: exactly one minute of elapsed time selects
    /// the [`Unit::Minute`] window, not [`Unit::Second`]. Every
    /// non-negative elapsed time maps to exactly one window.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use fromnow::{Unit, Window};
    ///
    /// let window = Window::select(Duration::from_secs(90));
    /// assert_eq!(window.active, Unit::Minute);
    /// assert_eq!(window.horizon, Duration::from_secs(3600));
    /// ```
    #[must_use]
    pub fn select(elapsed: Duration) -> Self {
        if elapsed < Unit::Minute.duration() {
            Self {
                active: Unit::Second,
                horizon: Unit::Minute.duration(),
            }
        } else if elapsed < Unit::Hour.duration() {
            Self {
                active: Unit::Minute,
                horizon: Unit::Hour.duration(),
            }
        } else if elapsed < Unit::Day.duration() {
            Self {
                active: Unit::Hour,
                horizon: Unit::Day.duration(),
            }
        } else {
            // Terminal window: there is no coarser unit to hand over to.
            Self {
                active: Unit::Day,
                horizon: Unit::Day.duration().saturating_mul(2),
            }
        }
    }
}
