// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(
    test,
    allow(
        clippy::arithmetic_side_effects,
        clippy::unchecked_time_subtraction,
        reason = "allow these lints in tests to improve the readability of the tests"
    )
)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Keeps relative-time labels ("3 minutes ago") fresh with the fewest
//! possible updates.
//!
//! Instead of polling on a fixed interval, the scheduler computes when the
//! displayed text will next visibly change and arms timers for exactly
//! those instants: every second while the timestamp is under a minute old,
//! once per minute after that, once per hour, and once per day at most. The
//! same compute-then-arm-an-exact-deadline idea also powers a one-shot
//! refetch trigger for data with a known validity period.
//!
//! # Quick Start
//!
//! ```
//! use std::time::Duration;
//!
//! use fromnow::RelativeLabel;
//! use fromnow::runtime::InactiveClock;
//!
//! // With the `tokio` feature, `Clock::new_tokio()` replaces this.
//! let (clock, _driver) = InactiveClock::default().activate();
//!
//! let mut label = RelativeLabel::new(&clock, |timestamp, now| {
//!     let elapsed = now.duration_since(timestamp).unwrap_or_default();
//!     format!("{}s ago", elapsed.as_secs())
//! });
//!
//! label.set_enabled(true);
//! label.set_timestamp(Some(clock.system_time() - Duration::from_secs(30)));
//!
//! // The current text is available immediately; polling the label as a
//! // `Stream` delivers every re-render from here on.
//! assert!(label.value().is_some());
//! ```
//!
//! # Why?
//!
//! A "time ago" label changes every second only during its first minute of
//! life. Refreshing it on a fixed interval either wastes work (a day-old
//! label re-rendered every second) or shows stale text (a five-second-old
//! label refreshed once a minute). This crate derives the exact update
//! cadence from the timestamp's age and re-derives it each time the age
//! crosses into a coarser unit, so every armed timer corresponds to a
//! visible change.
//!
//! Time is injected through a [`Clock`], which makes the whole pipeline
//! deterministic under test: with the `test-util` feature,
//! [`ClockControl`] advances time manually and every timer fires exactly
//! when it should, with no real waiting.
//!
//! # Overview
//!
//! - [`RelativeLabel`] - The scheduler. Owns the cadence computation and
//!   the timer lifecycle for one timestamp; emits display values as a
//!   `Stream`.
//! - [`RefetchDeadline`] - One-shot companion: fires a refetch callback at
//!   the instant upstream data is expected to go stale.
//! - [`Unit`], [`Window`], [`Schedule`] - The cadence derivation itself,
//!   exposed for inspection and testing.
//! - [`Clock`] - Injectable source of time; creates [`Delay`] (deferred
//!   action) and [`Ticker`] (repeating action) primitives.
//! - [`ClockControl`] - Controls the passage of time in tests
//!   (`test-util` feature).
//! - [`fmt`] - A bundled round-to-nearest "N units ago" formatter
//!   (`fmt` feature).
//! - [`runtime`] - Drives the timer queue from any event loop.
//!
//! # Testing
//!
//! Never enable the `test-util` feature in production code; keep it in
//! `dev-dependencies`. Code using [`Clock`] works identically in
//! production and under controlled time.
//!
//! # Features
//!
//! - **`tokio`** - `Clock::new_tokio()`, a clock driven by a background
//!   task on the Tokio runtime.
//! - **`test-util`** - [`ClockControl`] for deterministic tests.
//! - **`fmt`** - The [`fmt`] module with the bundled reference formatter.

mod clock;
#[cfg(any(feature = "test-util", test))]
mod clock_control;
mod delay;
mod duration_ext;

#[cfg(any(feature = "fmt", test))]
#[cfg_attr(docsrs, doc(cfg(feature = "fmt")))]
pub mod fmt;

mod label;
mod refetch;
pub mod runtime;
mod schedule;
mod state;
mod ticker;
mod timers;
mod unit;

pub use clock::Clock;
#[cfg(any(feature = "test-util", test))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-util")))]
pub use clock_control::ClockControl;
pub use delay::Delay;
pub use duration_ext::DurationExt;
pub use label::RelativeLabel;
pub use refetch::RefetchDeadline;
pub use schedule::Schedule;
pub use ticker::Ticker;
pub use unit::{Unit, Window};
