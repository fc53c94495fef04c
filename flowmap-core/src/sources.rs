// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Synchronous cold sources.
//!
//! Each of these emits on the subscribing thread, inside `subscribe`, and stops
//! as soon as its subscription is cancelled.

use crate::observable::Observable;
use crate::observer::BoxObserver;
use crate::subscription::{BooleanSubscription, Subscription};
use crate::FlowError;

/// Emits one value, then completes.
#[must_use]
pub fn just<T: Clone + Send + Sync>(value: T) -> Just<T> {
    Just { value }
}

/// Completes without emitting.
#[must_use]
pub fn empty<T>() -> Empty<T> {
    Empty {
        _marker: core::marker::PhantomData,
    }
}

/// Fails immediately with `error`.
#[must_use]
pub fn throw<T>(error: FlowError) -> Throw<T> {
    Throw {
        error,
        _marker: core::marker::PhantomData,
    }
}

/// Never signals anything after `on_subscribe`.
#[must_use]
pub fn never<T>() -> Never<T> {
    Never {
        _marker: core::marker::PhantomData,
    }
}

/// Emits `count` consecutive integers starting at `start`, then completes.
///
/// A negative `count` behaves like zero; the sequence stops at `i32::MAX`.
#[must_use]
pub fn range(start: i32, count: i32) -> FromIter<core::ops::Range<i32>> {
    from_iter(start..start.saturating_add(count.max(0)))
}

/// Emits every item of `iter` (re-iterated for each subscription), then completes.
#[must_use]
pub fn from_iter<I>(iter: I) -> FromIter<I>
where
    I: IntoIterator + Clone + Send + Sync,
{
    FromIter { iter }
}

/// See [`just`].
#[derive(Debug, Clone)]
pub struct Just<T> {
    value: T,
}

impl<T: Clone + Send + Sync> Observable<T> for Just<T> {
    fn subscribe(&self, observer: BoxObserver<T>) {
        let subscription = BooleanSubscription::shared();
        observer.on_subscribe(subscription.clone());

        if subscription.is_cancelled() {
            return;
        }
        observer.on_next(self.value.clone());

        if !subscription.is_cancelled() {
            observer.on_complete();
        }
    }
}

/// See [`empty`].
#[derive(Debug, Clone, Copy)]
pub struct Empty<T> {
    _marker: core::marker::PhantomData<fn() -> T>,
}

impl<T> Observable<T> for Empty<T> {
    fn subscribe(&self, observer: BoxObserver<T>) {
        let subscription = BooleanSubscription::shared();
        observer.on_subscribe(subscription.clone());

        if !subscription.is_cancelled() {
            observer.on_complete();
        }
    }
}

/// See [`throw`].
#[derive(Debug, Clone)]
pub struct Throw<T> {
    error: FlowError,
    _marker: core::marker::PhantomData<fn() -> T>,
}

impl<T> Observable<T> for Throw<T> {
    fn subscribe(&self, observer: BoxObserver<T>) {
        let subscription = BooleanSubscription::shared();
        observer.on_subscribe(subscription.clone());

        if !subscription.is_cancelled() {
            observer.on_error(self.error.clone());
        }
    }
}

/// See [`never`].
#[derive(Debug, Clone, Copy)]
pub struct Never<T> {
    _marker: core::marker::PhantomData<fn() -> T>,
}

impl<T> Observable<T> for Never<T> {
    fn subscribe(&self, observer: BoxObserver<T>) {
        observer.on_subscribe(BooleanSubscription::shared());
    }
}

/// See [`from_iter`] and [`range`].
#[derive(Debug, Clone)]
pub struct FromIter<I> {
    iter: I,
}

impl<I> Observable<I::Item> for FromIter<I>
where
    I: IntoIterator + Clone + Send + Sync,
{
    fn subscribe(&self, observer: BoxObserver<I::Item>) {
        let subscription = BooleanSubscription::shared();
        observer.on_subscribe(subscription.clone());

        for item in self.iter.clone() {
            if subscription.is_cancelled() {
                return;
            }
            observer.on_next(item);
        }

        if !subscription.is_cancelled() {
            observer.on_complete();
        }
    }
}
