// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Sources that ignore cancellation, for exercising late-signal handling.

use flowmap_core::{
    BooleanSubscription, BoxObserver, FlowError, Observable, Subscription,
};
use parking_lot::Mutex;
use std::sync::Arc;

struct Captured<T> {
    observer: BoxObserver<T>,
    subscription: Arc<BooleanSubscription>,
}

/// Observable that captures its observers and lets the test signal them by hand.
///
/// Signals go to the most recent observer and are delivered even after it
/// cancelled, like a misbehaving source would. Clones share the captured
/// observers.
pub struct ManualSource<T> {
    captured: Arc<Mutex<Vec<Captured<T>>>>,
}

impl<T: Send + 'static> ManualSource<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            captured: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.captured.lock().len()
    }

    /// Returns `true` once the most recent observer cancelled its subscription.
    ///
    /// # Panics
    ///
    /// Panics when nothing subscribed yet.
    pub fn is_cancelled(&self) -> bool {
        self.latest().1.is_cancelled()
    }

    pub fn next(&self, value: T) {
        self.latest().0.on_next(value);
    }

    pub fn error(&self, error: FlowError) {
        self.latest().0.on_error(error);
    }

    pub fn complete(&self) {
        self.latest().0.on_complete();
    }

    /// Sends a second `on_subscribe` to the most recent observer and returns the
    /// subscription it carried.
    pub fn subscribe_again(&self) -> Arc<BooleanSubscription> {
        let subscription = BooleanSubscription::shared();
        self.latest().0.on_subscribe(subscription.clone());
        subscription
    }

    fn latest(&self) -> (BoxObserver<T>, Arc<BooleanSubscription>) {
        let captured = self.captured.lock();
        let last = captured
            .last()
            .unwrap_or_else(|| panic!("ManualSource has no subscriber"));
        (last.observer.clone(), last.subscription.clone())
    }
}

impl<T: Send + 'static> Default for ManualSource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ManualSource<T> {
    fn clone(&self) -> Self {
        Self {
            captured: self.captured.clone(),
        }
    }
}

impl<T: Send + 'static> Observable<T> for ManualSource<T> {
    fn subscribe(&self, observer: BoxObserver<T>) {
        let subscription = BooleanSubscription::shared();
        self.captured.lock().push(Captured {
            observer: observer.clone(),
            subscription: subscription.clone(),
        });
        observer.on_subscribe(subscription);
    }
}

/// One step of a [`ScriptedSource`].
#[derive(Debug, Clone)]
pub enum Step<T> {
    Next(T),
    Error(FlowError),
    Complete,
}

/// Observable replaying a fixed script on every subscription, ignoring cancellation.
///
/// ```rust
/// use flowmap_core::Observable;
/// use flowmap_test_utils::{ScriptedSource, Step, TestObserver};
///
/// let source = ScriptedSource::new(vec![Step::Next(1), Step::Complete, Step::Next(2)]);
/// let observer = TestObserver::<i32>::new();
/// source.subscribe(observer.clone());
///
/// assert_eq!(observer.values(), vec![1, 2]);
/// ```
#[derive(Debug, Clone)]
pub struct ScriptedSource<T> {
    steps: Vec<Step<T>>,
}

impl<T: Clone + Send + Sync + 'static> ScriptedSource<T> {
    #[must_use]
    pub fn new(steps: Vec<Step<T>>) -> Self {
        Self { steps }
    }
}

impl<T: Clone + Send + Sync + 'static> Observable<T> for ScriptedSource<T> {
    fn subscribe(&self, observer: BoxObserver<T>) {
        observer.on_subscribe(BooleanSubscription::shared());
        for step in &self.steps {
            match step {
                Step::Next(value) => observer.on_next(value.clone()),
                Step::Error(error) => observer.on_error(error.clone()),
                Step::Complete => observer.on_complete(),
            }
        }
    }
}
