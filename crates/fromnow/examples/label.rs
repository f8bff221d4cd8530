// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Drives a live relative-time label on the Tokio runtime.
//!
//! Run with: `cargo run --example label --features tokio,fmt`

use std::time::Duration;

use futures::StreamExt;
use fromnow::{Clock, RelativeLabel, fmt};

#[tokio::main]
async fn main() {
    // Create a clock driven by a background task on the Tokio runtime.
    let clock = Clock::new_tokio();

    // A label showing how long ago something happened, rendered by the
    // bundled formatter.
    let mut label = RelativeLabel::new(&clock, fmt::time_ago);
    label.set_enabled(true);
    label.set_timestamp(Some(clock.system_time() - Duration::from_secs(2)));

    // The first value arrives immediately; while the timestamp is under a
    // minute old, the label then re-renders once per second.
    for _ in 0..4 {
        if let Some(value) = label.next().await {
            println!("label: {}", value.as_deref().unwrap_or("(none)"));
        }
    }
}
