// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Hot, multi-observer subject.
//!
//! A [`PublishSubject`] is both the entry point for pushing values by hand and an
//! [`Observable`] other operators can subscribe to.
//!
//! ## Characteristics
//!
//! - **Hot**: late observers only see signals sent after they subscribed.
//! - **Eager unsubscription**: cancelling a subscription removes the observer at
//!   once, so [`has_observers`](PublishSubject::has_observers) reflects it immediately.
//! - **Terminal replay**: observers subscribing after `error`/`complete` receive
//!   the terminal signal right away.
//! - **Cheap to clone**: all clones share the same state.
//!
//! ## Example
//!
//! ```
//! use flowmap_core::{ObservableExt, PublishSubject, Subscription};
//! use std::sync::{Arc, Mutex};
//!
//! let subject = PublishSubject::<i32>::new();
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = seen.clone();
//!
//! let subscription = subject.subscribe_fn(move |v| sink.lock().unwrap().push(v), |_| {}, || {});
//! assert!(subject.has_observers());
//!
//! subject.next(1).unwrap();
//! subscription.cancel();
//! subject.next(2).unwrap();
//!
//! assert!(!subject.has_observers());
//! assert_eq!(*seen.lock().unwrap(), vec![1]);
//! ```

use crate::observable::Observable;
use crate::observer::BoxObserver;
use crate::subscription::Subscription;
use crate::FlowError;
use alloc::sync::{Arc, Weak};
use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, Ordering};
use parking_lot::Mutex;

/// Errors returned by subject operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubjectError {
    /// The subject already completed or failed and accepts no more signals.
    #[error("Subject is terminated")]
    Terminated,
}

#[derive(Clone)]
enum Terminal {
    Completed,
    Failed(FlowError),
}

struct SubjectState<T> {
    observers: Vec<(u64, BoxObserver<T>)>,
    next_id: u64,
    terminal: Option<Terminal>,
}

/// A hot subject broadcasting every signal to its current observers.
///
/// See the [module documentation](crate::subject) for details.
pub struct PublishSubject<T> {
    state: Arc<Mutex<SubjectState<T>>>,
}

impl<T: Clone + Send + 'static> PublishSubject<T> {
    /// Creates a subject with no observers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(SubjectState {
                observers: Vec::new(),
                next_id: 0,
                terminal: None,
            })),
        }
    }

    /// Sends `value` to every current observer.
    ///
    /// # Errors
    ///
    /// Returns `SubjectError::Terminated` after `error` or `complete`.
    pub fn next(&self, value: T) -> Result<(), SubjectError> {
        // Snapshot, then call out without the lock: observers may cancel re-entrantly.
        let observers = {
            let state = self.state.lock();
            if state.terminal.is_some() {
                return Err(SubjectError::Terminated);
            }
            state.observers.clone()
        };

        for (_, observer) in observers {
            observer.on_next(value.clone());
        }
        Ok(())
    }

    /// Fails every current observer and terminates the subject.
    ///
    /// # Errors
    ///
    /// Returns `SubjectError::Terminated` if the subject already terminated.
    pub fn error(&self, error: FlowError) -> Result<(), SubjectError> {
        for observer in self.terminate(Terminal::Failed(error.clone()))? {
            observer.on_error(error.clone());
        }
        Ok(())
    }

    /// Completes every current observer and terminates the subject.
    ///
    /// # Errors
    ///
    /// Returns `SubjectError::Terminated` if the subject already terminated.
    pub fn complete(&self) -> Result<(), SubjectError> {
        for observer in self.terminate(Terminal::Completed)? {
            observer.on_complete();
        }
        Ok(())
    }

    /// Returns `true` while at least one observer is subscribed.
    #[must_use]
    pub fn has_observers(&self) -> bool {
        !self.state.lock().observers.is_empty()
    }

    /// Number of currently subscribed observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.state.lock().observers.len()
    }

    /// Returns `true` after `error` or `complete`.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.state.lock().terminal.is_some()
    }

    fn terminate(&self, terminal: Terminal) -> Result<Vec<BoxObserver<T>>, SubjectError> {
        let mut state = self.state.lock();
        if state.terminal.is_some() {
            return Err(SubjectError::Terminated);
        }
        state.terminal = Some(terminal);
        Ok(state
            .observers
            .drain(..)
            .map(|(_, observer)| observer)
            .collect())
    }
}

impl<T: Clone + Send + 'static> Observable<T> for PublishSubject<T> {
    fn subscribe(&self, observer: BoxObserver<T>) {
        let id = {
            let mut state = self.state.lock();
            state.next_id += 1;
            state.next_id
        };
        let subscription = Arc::new(SubjectSubscription {
            id,
            state: Arc::downgrade(&self.state),
            cancelled: AtomicBool::new(false),
        });
        observer.on_subscribe(subscription.clone());

        let terminal = {
            let mut state = self.state.lock();
            match state.terminal.clone() {
                Some(terminal) => Some(terminal),
                None => {
                    // Registered under the same lock cancel() takes, so a concurrent
                    // cancel either sees the entry or prevents the push.
                    if !subscription.is_cancelled() {
                        state.observers.push((id, observer.clone()));
                    }
                    None
                }
            }
        };

        match terminal {
            Some(Terminal::Completed) => observer.on_complete(),
            Some(Terminal::Failed(error)) => observer.on_error(error),
            None => {}
        }
    }
}

impl<T: Clone + Send + 'static> Default for PublishSubject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for PublishSubject<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

struct SubjectSubscription<T> {
    id: u64,
    state: Weak<Mutex<SubjectState<T>>>,
    cancelled: AtomicBool,
}

impl<T: Send> Subscription for SubjectSubscription<T> {
    fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(state) = self.state.upgrade() {
            let removed = {
                let mut state = state.lock();
                let index = state.observers.iter().position(|(id, _)| *id == self.id);
                index.map(|index| state.observers.remove(index))
            };
            // The observer may hold the last reference to something that locks
            // the subject on drop; release it outside the lock.
            drop(removed);
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
