// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Recording observer with fluent assertions.

use crate::test_error::test_error_message;
use event_listener::Event;
use flowmap_core::{
    FlowError, Observer, SetOutcome, Subscription, SubscriptionCell, SubscriptionRef,
};
use parking_lot::Mutex;
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug)]
struct Recorded<T> {
    values: Vec<T>,
    errors: Vec<FlowError>,
    completions: usize,
    subscriptions: usize,
    /// Signals received after a terminal signal or before `on_subscribe`.
    violations: Vec<String>,
}

/// Observer that records every signal it receives.
///
/// Subscribe it with `source.subscribe(observer.clone())`, drive the source, then
/// assert on what arrived:
///
/// ```rust
/// use flowmap_core::{range, Observable};
/// use flowmap_test_utils::TestObserver;
///
/// let observer = TestObserver::<i32>::new();
/// range(1, 3).subscribe(observer.clone());
///
/// observer.assert_result(&[1, 2, 3]);
/// ```
pub struct TestObserver<T> {
    recorded: Mutex<Recorded<T>>,
    upstream: SubscriptionCell,
    terminated: AtomicBool,
    done: Event,
}

impl<T: Send + 'static> TestObserver<T> {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            recorded: Mutex::new(Recorded {
                values: Vec::new(),
                errors: Vec::new(),
                completions: 0,
                subscriptions: 0,
                violations: Vec::new(),
            }),
            upstream: SubscriptionCell::new(),
            terminated: AtomicBool::new(false),
            done: Event::new(),
        })
    }

    /// Cancels the upstream subscription.
    pub fn cancel(&self) {
        self.upstream.cancel();
    }

    /// Returns `true` once [`cancel`](Self::cancel) was called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.upstream.is_cancelled()
    }

    /// Returns `true` after `on_error` or `on_complete`.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::Acquire)
    }

    /// Waits until a terminal signal arrives; `false` on timeout.
    pub async fn await_done(&self, timeout: Duration) -> bool {
        let wait = async {
            loop {
                let listener = self.done.listen();
                if self.is_terminated() {
                    return;
                }
                listener.await;
            }
        };
        tokio::time::timeout(timeout, wait).await.is_ok()
    }

    pub fn value_count(&self) -> usize {
        self.recorded.lock().values.len()
    }

    pub fn errors(&self) -> Vec<FlowError> {
        self.recorded.lock().errors.clone()
    }

    pub fn completions(&self) -> usize {
        self.recorded.lock().completions
    }

    fn terminate(&self) {
        self.terminated.store(true, Ordering::Release);
        self.done.notify(usize::MAX);
    }

    fn record_violation(recorded: &mut Recorded<T>, signal: &str) {
        if recorded.subscriptions == 0 {
            recorded
                .violations
                .push(format!("{signal} before on_subscribe"));
        }
        if recorded.completions > 0 || !recorded.errors.is_empty() {
            recorded
                .violations
                .push(format!("{signal} after a terminal signal"));
        }
    }
}

impl<T: Clone + Debug + PartialEq + Send + 'static> TestObserver<T> {
    pub fn values(&self) -> Vec<T> {
        self.recorded.lock().values.clone()
    }

    /// Asserts the received values, ignoring terminal signals.
    pub fn assert_values(&self, expected: &[T]) -> &Self {
        let recorded = self.recorded.lock();
        assert_eq!(recorded.values, expected, "unexpected values");
        self.check_protocol(&recorded);
        self
    }

    /// Asserts `expected` values followed by exactly one completion.
    pub fn assert_result(&self, expected: &[T]) -> &Self {
        let recorded = self.recorded.lock();
        assert_eq!(recorded.values, expected, "unexpected values");
        assert!(
            recorded.errors.is_empty(),
            "expected completion, got errors: {:?}",
            recorded.errors
        );
        assert_eq!(recorded.completions, 1, "expected exactly one completion");
        self.check_protocol(&recorded);
        self
    }

    /// Asserts `expected` values followed by exactly one error, which is returned.
    pub fn assert_failure(&self, expected: &[T]) -> FlowError {
        let recorded = self.recorded.lock();
        assert_eq!(recorded.values, expected, "unexpected values");
        assert_eq!(recorded.completions, 0, "expected an error, got completion");
        assert_eq!(
            recorded.errors.len(),
            1,
            "expected exactly one error, got {:?}",
            recorded.errors
        );
        self.check_protocol(&recorded);
        recorded.errors[0].clone()
    }

    /// Asserts the single error wraps a `TestError` with `message`.
    pub fn assert_error_message(&self, message: &str) -> &Self {
        let recorded = self.recorded.lock();
        assert_eq!(
            recorded.errors.len(),
            1,
            "expected exactly one error, got {:?}",
            recorded.errors
        );
        assert_eq!(
            test_error_message(&recorded.errors[0]),
            Some(message),
            "unexpected error {:?}",
            recorded.errors[0]
        );
        self
    }

    /// Asserts the observer was subscribed and received nothing else.
    pub fn assert_empty(&self) -> &Self {
        let recorded = self.recorded.lock();
        assert_eq!(recorded.subscriptions, 1, "expected one on_subscribe");
        assert!(
            recorded.values.is_empty(),
            "expected no values, got {:?}",
            recorded.values
        );
        assert!(
            recorded.errors.is_empty(),
            "expected no errors, got {:?}",
            recorded.errors
        );
        assert_eq!(recorded.completions, 0, "expected no completion");
        self
    }

    /// Asserts no terminal signal arrived yet.
    pub fn assert_not_complete(&self) -> &Self {
        let recorded = self.recorded.lock();
        assert_eq!(recorded.completions, 0, "unexpected completion");
        assert!(
            recorded.errors.is_empty(),
            "unexpected errors: {:?}",
            recorded.errors
        );
        self
    }

    fn check_protocol(&self, recorded: &Recorded<T>) {
        assert!(
            recorded.violations.is_empty(),
            "protocol violations: {:?}",
            recorded.violations
        );
        assert!(recorded.subscriptions <= 1, "on_subscribe called more than once");
    }
}

impl<T: Send + 'static> Observer<T> for TestObserver<T> {
    fn on_subscribe(&self, subscription: SubscriptionRef) {
        self.recorded.lock().subscriptions += 1;
        if self.upstream.set(subscription) == SetOutcome::Duplicate {
            self.recorded
                .lock()
                .violations
                .push("second on_subscribe".to_string());
        }
    }

    fn on_next(&self, value: T) {
        let mut recorded = self.recorded.lock();
        Self::record_violation(&mut recorded, "on_next");
        recorded.values.push(value);
    }

    fn on_error(&self, error: FlowError) {
        {
            let mut recorded = self.recorded.lock();
            Self::record_violation(&mut recorded, "on_error");
            recorded.errors.push(error);
        }
        self.terminate();
    }

    fn on_complete(&self) {
        {
            let mut recorded = self.recorded.lock();
            Self::record_violation(&mut recorded, "on_complete");
            recorded.completions += 1;
        }
        self.terminate();
    }
}
