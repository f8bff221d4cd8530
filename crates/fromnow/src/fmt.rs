// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Reference rendering of relative time.
//!
//! The bundled [`time_ago`] formatter produces plain English "N units ago"
//! text and rounds to the nearest unit, which is the contract the cadence
//! derivation in [`Schedule`][crate::Schedule] assumes. Applications with
//! their own locale-aware formatter inject that instead; this module exists
//! so the crate is usable end-to-end without one.

use std::time::{Duration, SystemTime};

use crate::duration_ext::DurationExt;
use crate::unit::{Unit, Window};

/// Renders `timestamp` relative to `now`, rounding to the nearest unit.
///
/// The displayed unit follows [`Window::select`], so the text changes in
/// exactly the cadence the scheduler arms timers for: once per second under
/// a minute, then at unit midpoints ("1 minute ago" becomes "2 minutes ago"
/// 90 seconds after the timestamp). A timestamp at or after `now` renders
/// as "just now".
///
/// # Examples
///
/// ```
/// use std::time::{Duration, SystemTime};
///
/// use fromnow::fmt::time_ago;
///
/// let now = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000);
///
/// assert_eq!(time_ago(now, now), "just now");
/// assert_eq!(time_ago(now - Duration::from_secs(30), now), "30 seconds ago");
/// assert_eq!(time_ago(now - Duration::from_secs(90), now), "2 minutes ago");
/// assert_eq!(time_ago(now - Duration::from_secs(86_400 * 3), now), "3 days ago");
/// ```
#[must_use]
pub fn time_ago(timestamp: SystemTime, now: SystemTime) -> String {
    let elapsed = now.duration_since(timestamp).unwrap_or_default();

    match Window::select(elapsed).active {
        Unit::Second => {
            let secs = (elapsed + Duration::from_millis(500)).as_secs();
            if secs == 0 {
                "just now".to_owned()
            } else {
                count_ago(secs, "second")
            }
        }
        Unit::Minute => count_ago((elapsed + Unit::Minute.duration() / 2).as_minutes(), "minute"),
        Unit::Hour => count_ago((elapsed + Unit::Hour.duration() / 2).as_hours(), "hour"),
        Unit::Day => count_ago((elapsed + Unit::Day.duration() / 2).as_days(), "day"),
    }
}

fn count_ago(count: u64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(elapsed: Duration) -> String {
        let now = SystemTime::UNIX_EPOCH + Duration::from_secs(10_000_000);
        time_ago(now - elapsed, now)
    }

    #[test]
    fn sub_second_rounds() {
        assert_eq!(at(Duration::ZERO), "just now");
        assert_eq!(at(Duration::from_millis(400)), "just now");
        assert_eq!(at(Duration::from_millis(600)), "1 second ago");
        assert_eq!(at(Duration::from_millis(1400)), "1 second ago");
        assert_eq!(at(Duration::from_millis(1600)), "2 seconds ago");
    }

    #[test]
    fn minutes_flip_at_midpoints() {
        assert_eq!(at(Duration::from_secs(60)), "1 minute ago");
        assert_eq!(at(Duration::from_secs(89)), "1 minute ago");
        assert_eq!(at(Duration::from_secs(90)), "2 minutes ago");
        assert_eq!(at(Duration::from_secs(149)), "2 minutes ago");
        assert_eq!(at(Duration::from_secs(150)), "3 minutes ago");
    }

    #[test]
    fn hours_flip_at_midpoints() {
        assert_eq!(at(Duration::from_secs(3600)), "1 hour ago");
        assert_eq!(at(Duration::from_secs(5399)), "1 hour ago");
        assert_eq!(at(Duration::from_secs(5400)), "2 hours ago");
    }

    #[test]
    fn days_flip_at_midpoints() {
        assert_eq!(at(Duration::from_secs(86_400)), "1 day ago");
        assert_eq!(at(Duration::from_secs(86_400 + 43_199)), "1 day ago");
        assert_eq!(at(Duration::from_secs(86_400 + 43_200)), "2 days ago");
    }

    #[test]
    fn future_timestamp_is_just_now() {
        let now = SystemTime::UNIX_EPOCH + Duration::from_secs(10_000_000);
        assert_eq!(time_ago(now + Duration::from_secs(30), now), "just now");
    }
}
