// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Cancellation handles exchanged between observables and observers.

use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, Ordering};
use parking_lot::Mutex;

/// The cancel capability an observable hands to its observer in `on_subscribe`.
///
/// Cancellation is a best-effort request: a source may keep signalling for a
/// while after `cancel()` returns, and observers must tolerate that.
pub trait Subscription: Send + Sync {
    /// Requests that the source stop emitting. Idempotent.
    fn cancel(&self);

    /// Returns `true` once `cancel()` has been called.
    fn is_cancelled(&self) -> bool;
}

/// Shared handle to a type-erased subscription.
pub type SubscriptionRef = Arc<dyn Subscription>;

/// A subscription that is only a flag.
///
/// Synchronous sources poll it between emissions.
#[derive(Debug, Default)]
pub struct BooleanSubscription {
    cancelled: AtomicBool,
}

impl BooleanSubscription {
    /// Creates a subscription that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new subscription already wrapped in an `Arc`.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl Subscription for BooleanSubscription {
    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Outcome of [`SubscriptionCell::set`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum SetOutcome {
    /// The subscription is now held by the cell.
    Installed,
    /// The cell was cancelled before; the incoming subscription was cancelled.
    Cancelled,
    /// The cell already held a subscription; the incoming one was cancelled.
    Duplicate,
}

enum CellState {
    Empty,
    Held(SubscriptionRef),
    Cancelled,
}

/// A set-once holder for an upstream subscription.
///
/// Observers that accept exactly one upstream store it here. Cancelling the
/// cell before the upstream arrives makes the later `set` cancel it on arrival,
/// and a second `set` is rejected as a protocol violation without touching the
/// first subscription.
pub struct SubscriptionCell {
    state: Mutex<CellState>,
}

impl SubscriptionCell {
    /// Creates an empty cell.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CellState::Empty),
        }
    }

    /// Installs `subscription` if the cell is empty.
    ///
    /// In every other case the incoming subscription is cancelled before this
    /// method returns.
    pub fn set(&self, subscription: SubscriptionRef) -> SetOutcome {
        let outcome = {
            let mut state = self.state.lock();
            match *state {
                CellState::Empty => {
                    *state = CellState::Held(subscription.clone());
                    SetOutcome::Installed
                }
                CellState::Held(_) => SetOutcome::Duplicate,
                CellState::Cancelled => SetOutcome::Cancelled,
            }
        };

        if outcome != SetOutcome::Installed {
            subscription.cancel();
        }
        outcome
    }

    /// Returns `true` if a subscription has been installed and not cancelled.
    #[must_use]
    pub fn is_held(&self) -> bool {
        matches!(*self.state.lock(), CellState::Held(_))
    }
}

impl Default for SubscriptionCell {
    fn default() -> Self {
        Self::new()
    }
}

impl Subscription for SubscriptionCell {
    fn cancel(&self) {
        let previous = core::mem::replace(&mut *self.state.lock(), CellState::Cancelled);

        // Cancel outside the lock: the upstream may call back into us.
        if let CellState::Held(subscription) = previous {
            subscription.cancel();
        }
    }

    fn is_cancelled(&self) -> bool {
        matches!(*self.state.lock(), CellState::Cancelled)
    }
}
