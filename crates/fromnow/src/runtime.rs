// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration of the timer queue with async runtimes.
//!
//! A [`Clock`][crate::Clock] needs something to advance its registered
//! timers. With the `tokio` feature, `Clock::new_tokio` takes care of this;
//! any other event loop can drive a clock itself:
//!
//! 1. Create an [`InactiveClock`] and call [`InactiveClock::activate`] to
//!    obtain a [`Clock`][crate::Clock] and its [`ClockDriver`].
//! 2. Hand the clock to the scheduling primitives.
//! 3. Call [`ClockDriver::advance_timers`] periodically from the runtime
//!    loop until it reports [`ClockGone`].
//!
//! ```
//! use std::time::Instant;
//!
//! use fromnow::runtime::InactiveClock;
//!
//! let (clock, mut driver) = InactiveClock::default().activate();
//!
//! // In the runtime loop:
//! let next_timer = driver.advance_timers(Instant::now());
//! # let _ = (clock, next_timer);
//! ```

mod clock_driver;
mod clock_gone;
mod inactive_clock;

pub use clock_driver::ClockDriver;
pub use clock_gone::ClockGone;
pub use inactive_clock::InactiveClock;
