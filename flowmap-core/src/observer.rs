// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The consumer side of the push-stream contract.

use crate::hooks::on_undeliverable;
use crate::subscription::{SetOutcome, Subscription, SubscriptionCell, SubscriptionRef};
use crate::FlowError;
use alloc::sync::Arc;
use core::marker::PhantomData;
use core::sync::atomic::{AtomicBool, Ordering};

/// Receives the signals of one subscription.
///
/// The protocol for a single subscription is
/// `on_subscribe (on_next)* (on_error | on_complete)?`. Signals of one
/// subscription never overlap, but they may arrive on any thread, and an observer
/// shared between several subscriptions must expect concurrent calls.
pub trait Observer<T>: Send + Sync {
    /// Hands over the cancel capability. Always the first signal.
    fn on_subscribe(&self, subscription: SubscriptionRef);

    /// Delivers the next value.
    fn on_next(&self, value: T);

    /// Terminates the subscription with an error.
    fn on_error(&self, error: FlowError);

    /// Terminates the subscription normally.
    fn on_complete(&self);
}

/// Shared handle to a type-erased observer.
pub type BoxObserver<T> = Arc<dyn Observer<T>>;

/// Observer built from three closures.
///
/// Created by [`ObservableExt::subscribe_fn`](crate::ObservableExt::subscribe_fn).
/// After the first terminal signal everything is dropped, except errors, which
/// are reported to the process-wide undeliverable hook.
pub struct LambdaObserver<T, N, E, C> {
    on_next: N,
    on_error: E,
    on_complete: C,
    upstream: Arc<SubscriptionCell>,
    done: AtomicBool,
    _marker: PhantomData<fn(T)>,
}

impl<T, N, E, C> LambdaObserver<T, N, E, C>
where
    N: Fn(T) + Send + Sync,
    E: Fn(FlowError) + Send + Sync,
    C: Fn() + Send + Sync,
{
    /// Creates the observer together with the handle that cancels its upstream.
    pub fn new(on_next: N, on_error: E, on_complete: C) -> Self {
        Self {
            on_next,
            on_error,
            on_complete,
            upstream: Arc::new(SubscriptionCell::new()),
            done: AtomicBool::new(false),
            _marker: PhantomData,
        }
    }

    /// Handle that cancels whatever upstream this observer is attached to.
    #[must_use]
    pub fn subscription(&self) -> SubscriptionRef {
        self.upstream.clone()
    }
}

impl<T, N, E, C> Observer<T> for LambdaObserver<T, N, E, C>
where
    N: Fn(T) + Send + Sync,
    E: Fn(FlowError) + Send + Sync,
    C: Fn() + Send + Sync,
{
    fn on_subscribe(&self, subscription: SubscriptionRef) {
        if self.upstream.set(subscription) == SetOutcome::Duplicate {
            on_undeliverable(FlowError::protocol_violation(
                "LambdaObserver received a second subscription",
            ));
        }
    }

    fn on_next(&self, value: T) {
        if !self.done.load(Ordering::Acquire) && !self.upstream.is_cancelled() {
            (self.on_next)(value);
        }
    }

    fn on_error(&self, error: FlowError) {
        if self.done.swap(true, Ordering::AcqRel) {
            on_undeliverable(error);
            return;
        }
        (self.on_error)(error);
    }

    fn on_complete(&self) {
        if !self.done.swap(true, Ordering::AcqRel) {
            (self.on_complete)();
        }
    }
}
