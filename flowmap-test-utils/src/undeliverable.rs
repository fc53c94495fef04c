// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::test_error::test_error_message;
use flowmap_core::{FlowError, UndeliverableHandler};
use parking_lot::Mutex;
use std::sync::Arc;

/// Collects the errors an operator could not deliver.
///
/// Hand [`handler`](Self::handler) to an operator's configuration; the recorder
/// keeps every error reported through it.
#[derive(Clone, Default)]
pub struct UndeliverableRecorder {
    errors: Arc<Mutex<Vec<FlowError>>>,
}

impl UndeliverableRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn handler(&self) -> UndeliverableHandler {
        let errors = self.errors.clone();
        Arc::new(move |error| errors.lock().push(error))
    }

    pub fn errors(&self) -> Vec<FlowError> {
        self.errors.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.errors.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.lock().is_empty()
    }

    /// Asserts the error at `index` wraps a `TestError` with `message`.
    pub fn assert_test_error(&self, index: usize, message: &str) {
        let errors = self.errors.lock();
        let error = errors
            .get(index)
            .unwrap_or_else(|| panic!("no undeliverable error at {index}: {errors:?}"));
        assert_eq!(
            test_error_message(error),
            Some(message),
            "unexpected undeliverable error {error:?}"
        );
    }
}
