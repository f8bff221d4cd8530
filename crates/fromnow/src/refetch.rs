// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::{Duration, SystemTime};

use pin_project_lite::pin_project;

use crate::{Clock, Delay};

pin_project! {
    /// A one-shot refetch trigger armed for the instant upstream data is
    /// expected to go stale.
    ///
    /// Given the instant some data was last updated and how long it remains
    /// valid, the trigger computes `deadline = last_updated + valid_for`
    /// and fires its callback exactly once when the deadline is reached.
    /// When the deadline has already passed at arm time, nothing is armed
    /// and the callback never fires from that activation: the data is
    /// already possibly stale and refetching it is the caller's concern
    /// through its ordinary paths.
    ///
    /// Re-arming with [`rearm`][Self::rearm] and dropping the trigger both
    /// cancel the pending action first, so two pending refetches never
    /// coexist for one logical subscription.
    ///
    /// The trigger is a future resolving when the callback has fired; it
    /// stays pending forever while unarmed. The underlying timer is created
    /// on the first poll, measured against the absolute deadline, so the
    /// gap between arming and polling cannot skew the firing instant.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use fromnow::{Clock, RefetchDeadline};
    ///
    /// # fn deadline_example(clock: &Clock, refetch: impl FnOnce()) {
    /// // Gas prices were fetched just now and stay fresh for 30 seconds.
    /// let trigger = RefetchDeadline::new(
    ///     clock,
    ///     clock.system_time(),
    ///     Duration::from_secs(30),
    ///     refetch,
    /// );
    ///
    /// assert!(trigger.is_armed());
    /// // Await the trigger (e.g. in a spawned task) to run the refetch.
    /// # }
    /// ```
    pub struct RefetchDeadline<F> {
        clock: Clock,
        // None while unarmed; cleared once the callback has fired.
        deadline: Option<SystemTime>,
        #[pin]
        delay: Option<Delay>,
        on_deadline: Option<F>,
    }
}

impl<F> RefetchDeadline<F>
where
    F: FnOnce(),
{
    /// Arms a trigger for `last_updated + valid_for`.
    ///
    /// When that deadline is not strictly in the future, the trigger starts
    /// unarmed and `on_deadline` is never invoked.
    #[must_use]
    pub fn new(clock: &Clock, last_updated: SystemTime, valid_for: Duration, on_deadline: F) -> Self {
        Self {
            clock: clock.clone(),
            deadline: future_deadline(clock, last_updated, valid_for),
            delay: None,
            on_deadline: Some(on_deadline),
        }
    }

    /// Replaces the trigger's inputs.
    ///
    /// The previously pending action, if any, is cancelled before the new
    /// deadline is armed.
    pub fn rearm(&mut self, last_updated: SystemTime, valid_for: Duration, on_deadline: F) {
        // Dropping the delay unregisters its timer.
        self.delay = None;
        self.deadline = future_deadline(&self.clock, last_updated, valid_for);
        self.on_deadline = Some(on_deadline);
    }

    /// Whether a refetch is still going to fire.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some() && self.on_deadline.is_some()
    }
}

impl<F> Future for RefetchDeadline<F>
where
    F: FnOnce(),
{
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut this = self.project();

        let Some(deadline) = *this.deadline else {
            return Poll::Pending;
        };

        if this.delay.as_mut().as_pin_mut().is_none() {
            // A deadline that passed while nobody polled yields a zero
            // delay, which completes immediately.
            let remaining = deadline.duration_since(this.clock.system_time()).unwrap_or_default();
            this.delay.set(Some(Delay::new(this.clock, remaining)));
        }

        match this.delay.as_mut().as_pin_mut() {
            Some(delay) => match delay.poll(cx) {
                Poll::Ready(()) => {
                    *this.deadline = None;
                    this.delay.set(None);

                    if let Some(refetch) = this.on_deadline.take() {
                        refetch();
                    }

                    Poll::Ready(())
                }
                Poll::Pending => Poll::Pending,
            },
            None => Poll::Pending,
        }
    }
}

impl<F> fmt::Debug for RefetchDeadline<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefetchDeadline")
            .field("deadline", &self.deadline)
            .field("armed", &(self.deadline.is_some() && self.on_deadline.is_some()))
            .finish_non_exhaustive()
    }
}

/// `last_updated + valid_for` when that instant is strictly in the future.
fn future_deadline(clock: &Clock, last_updated: SystemTime, valid_for: Duration) -> Option<SystemTime> {
    let deadline = last_updated.checked_add(valid_for)?;

    match deadline.duration_since(clock.system_time()) {
        Ok(delay) if delay > Duration::ZERO => Some(deadline),
        _ => None,
    }
}
