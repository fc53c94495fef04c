// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use flowmap_core::FlowError;

/// Error raised on purpose by test sources, mappers and combiners.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TestError {
    pub message: String,
}

impl TestError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// A `TestError` wrapped as the user error of a [`FlowError`].
    pub fn flow(message: impl Into<String>) -> FlowError {
        FlowError::user_error(Self::new(message))
    }
}

impl Default for TestError {
    fn default() -> Self {
        Self::new("test error")
    }
}

/// Returns the message of `error` if it wraps a [`TestError`].
pub fn test_error_message(error: &FlowError) -> Option<&str> {
    error
        .downcast_ref::<TestError>()
        .map(|error| error.message.as_str())
}
