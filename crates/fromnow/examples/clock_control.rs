// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![expect(clippy::unwrap_used, reason = "example code")]

//! Walks the scheduler through controlled time.
//!
//! Run with: `cargo run --example clock_control --features test-util,fmt`

use std::time::{Duration, SystemTime};

use futures::executor::block_on;
use futures::{StreamExt, poll};
use fromnow::{ClockControl, RelativeLabel, fmt};

fn main() {
    let control = ClockControl::new_at(SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000));
    let clock = control.to_clock();

    let mut label = RelativeLabel::new(&clock, fmt::time_ago);
    label.set_enabled(true);

    // 90 seconds old: the label sits in the minute window, where the text
    // flips at unit midpoints and only one tick per minute is needed.
    label.set_timestamp(Some(clock.system_time() - Duration::from_secs(90)));

    block_on(async {
        // The freshly formatted value is emitted immediately.
        assert_eq!(label.next().await.unwrap().unwrap(), "2 minutes ago");

        // Pump the stream once so the session's timers register.
        assert!(poll!(label.next()).is_pending());

        // The next visible flip is due one second from now (the half-minute
        // point of the timestamp's age, plus the safety margin).
        control.advance(Duration::from_secs(1));
        assert_eq!(label.next().await.unwrap().unwrap(), "2 minutes ago");
        assert!(poll!(label.next()).is_pending());

        // From here the label ticks once per minute.
        control.advance(Duration::from_secs(60));
        assert_eq!(label.next().await.unwrap().unwrap(), "3 minutes ago");
        assert!(poll!(label.next()).is_pending());
    });

    // Nothing else is scheduled: one renewal check plus one tick.
    assert_eq!(control.pending_timers(), 2);

    println!("label ended at: {}", label.value().unwrap());
}
