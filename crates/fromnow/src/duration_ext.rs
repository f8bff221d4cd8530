// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

/// Whole-unit conversion methods for [`Duration`].
///
/// Fractional parts are truncated, mirroring [`Duration::as_secs`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use fromnow::DurationExt;
///
/// let duration = Duration::from_secs(3661); // 1 hour, 1 minute, 1 second
/// assert_eq!(duration.as_minutes(), 61);
/// assert_eq!(duration.as_hours(), 1);
/// assert_eq!(duration.as_days(), 0);
/// ```
pub trait DurationExt {
    /// The number of whole minutes in the duration.
    fn as_minutes(&self) -> u64;

    /// The number of whole hours in the duration.
    fn as_hours(&self) -> u64;

    /// The number of whole days in the duration.
    fn as_days(&self) -> u64;
}

#[expect(clippy::integer_division, reason = "truncation is the documented behavior")]
impl DurationExt for Duration {
    fn as_minutes(&self) -> u64 {
        self.as_secs() / 60
    }

    fn as_hours(&self) -> u64 {
        self.as_minutes() / 60
    }

    fn as_days(&self) -> u64 {
        self.as_hours() / 24
    }
}
