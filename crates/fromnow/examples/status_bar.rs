// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Re-fetches status-bar data at the moment it goes stale.
//!
//! Run with: `cargo run --example status_bar --features test-util`

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use futures::executor::block_on;
use fromnow::{ClockControl, RefetchDeadline};

fn main() {
    let control = ClockControl::now();
    let clock = control.to_clock();

    // Upstream reports gas prices refreshed just now, valid for 30 seconds.
    let refetched = Rc::new(Cell::new(false));
    let flag = Rc::clone(&refetched);

    let mut trigger = RefetchDeadline::new(&clock, clock.system_time(), Duration::from_secs(30), move || {
        flag.set(true);
    });
    assert!(trigger.is_armed());

    // 30 seconds later the deadline passes and the refetch runs once.
    control.advance(Duration::from_secs(30));
    block_on(&mut trigger);
    assert!(refetched.get());

    // Data that is already stale on arrival arms nothing; the caller's
    // ordinary fetch path is responsible for it.
    let stale = RefetchDeadline::new(
        &clock,
        clock.system_time() - Duration::from_secs(60),
        Duration::from_secs(30),
        || {},
    );
    assert!(!stale.is_armed());

    println!("refetch fired exactly once");
}
