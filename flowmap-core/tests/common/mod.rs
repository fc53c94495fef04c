// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(dead_code)]

use flowmap_core::{FlowError, Observer, SubscriptionRef};
use parking_lot::Mutex;
use std::sync::Arc;

/// One recorded signal.
#[derive(Debug, Clone, PartialEq)]
pub enum Event<T> {
    Next(T),
    Error(String),
    Complete,
}

/// Observer that records every signal it receives.
pub struct Recorder<T> {
    events: Mutex<Vec<Event<T>>>,
    subscriptions: Mutex<Vec<SubscriptionRef>>,
}

impl<T: Clone + Send> Recorder<T> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(Vec::new()),
            subscriptions: Mutex::new(Vec::new()),
        })
    }

    pub fn events(&self) -> Vec<Event<T>> {
        self.events.lock().clone()
    }

    pub fn values(&self) -> Vec<T> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                Event::Next(value) => Some(value.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.lock().len()
    }

    pub fn cancel(&self) {
        if let Some(subscription) = self.subscriptions.lock().first().cloned() {
            subscription.cancel();
        }
    }
}

impl<T: Clone + Send> Observer<T> for Recorder<T> {
    fn on_subscribe(&self, subscription: SubscriptionRef) {
        self.subscriptions.lock().push(subscription);
    }

    fn on_next(&self, value: T) {
        self.events.lock().push(Event::Next(value));
    }

    fn on_error(&self, error: FlowError) {
        self.events.lock().push(Event::Error(error.to_string()));
    }

    fn on_complete(&self) {
        self.events.lock().push(Event::Complete);
    }
}
