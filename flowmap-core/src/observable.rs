// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The producer side of the push-stream contract.

use crate::bridge::{into_stream, ObservableStream};
use crate::observer::{BoxObserver, LambdaObserver};
use crate::subscription::SubscriptionRef;
use crate::FlowError;
use alloc::sync::Arc;

/// A source of values that pushes them to subscribed observers.
///
/// Every call to [`subscribe`](Observable::subscribe) starts an independent
/// subscription: the observer first receives `on_subscribe` with its cancel
/// handle, then the signals of that subscription.
pub trait Observable<T>: Send + Sync {
    /// Attaches `observer` and starts emitting to it.
    fn subscribe(&self, observer: BoxObserver<T>);
}

/// Shared handle to a type-erased observable.
pub type BoxObservable<T> = Arc<dyn Observable<T>>;

impl<T, O> Observable<T> for Arc<O>
where
    O: Observable<T> + ?Sized,
{
    fn subscribe(&self, observer: BoxObserver<T>) {
        (**self).subscribe(observer);
    }
}

/// Convenience methods available on every [`Observable`].
pub trait ObservableExt<T>: Observable<T> + Sized + 'static {
    /// Erases the concrete observable type.
    fn boxed(self) -> BoxObservable<T> {
        Arc::new(self)
    }

    /// Subscribes with three closures and returns the cancel handle.
    ///
    /// ```
    /// use flowmap_core::{range, ObservableExt};
    /// use std::sync::{Arc, Mutex};
    ///
    /// let seen = Arc::new(Mutex::new(Vec::new()));
    /// let sink = seen.clone();
    ///
    /// range(1, 3).subscribe_fn(
    ///     move |v| sink.lock().unwrap().push(v),
    ///     |_err| {},
    ///     || {},
    /// );
    ///
    /// assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
    /// ```
    fn subscribe_fn<N, E, C>(&self, on_next: N, on_error: E, on_complete: C) -> SubscriptionRef
    where
        T: 'static,
        N: Fn(T) + Send + Sync + 'static,
        E: Fn(FlowError) + Send + Sync + 'static,
        C: Fn() + Send + Sync + 'static,
    {
        let observer = Arc::new(LambdaObserver::new(on_next, on_error, on_complete));
        let subscription = observer.subscription();
        self.subscribe(observer);
        subscription
    }

    /// Subscribes and exposes the signals as a `futures::Stream` of [`StreamItem`](crate::StreamItem)s.
    ///
    /// Dropping the returned stream cancels the subscription.
    fn into_stream(self) -> ObservableStream<T>
    where
        T: Send + 'static,
    {
        into_stream(&self)
    }
}

impl<T, O> ObservableExt<T> for O where O: Observable<T> + 'static {}
