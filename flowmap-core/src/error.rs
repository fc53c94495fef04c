// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Error types for the flowmap push-stream library
//!
//! Every terminal failure travelling through an observable chain is a [`FlowError`].
//! User errors (mapper, combiner or source failures) are carried unchanged inside
//! [`FlowError::UserError`] so that downstream code can downcast them back.
//!
//! # Examples
//!
//! ```
//! use flowmap_core::{FlowError, Result};
//!
//! fn process_data() -> Result<()> {
//!     // Operation that might fail
//!     Err(FlowError::stream_error("Stream not ready"))
//! }
//! ```

use std::sync::Arc;

/// Root error type for all flowmap operations
///
/// The type is cheaply cloneable: a subject broadcasting one error to many
/// observers hands each of them the same underlying source error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FlowError {
    /// Stream processing encountered an error
    ///
    /// This is a general error for stream operations that don't fit
    /// other specific categories.
    #[error("Stream processing error: {context}")]
    StreamError {
        /// Description of what went wrong during stream processing
        context: String,
    },

    /// Custom error from user code
    ///
    /// Mapper, combiner and source failures are wrapped here unchanged.
    #[error("User error: {0}")]
    UserError(#[source] Arc<dyn std::error::Error + Send + Sync>),

    /// The push-stream protocol was violated
    ///
    /// Raised when an observer that supports a single upstream receives a
    /// second subscription.
    #[error("Protocol violation: {context}")]
    ProtocolViolation {
        /// What the offending caller did
        context: String,
    },

    /// An operator was built with an invalid configuration
    #[error("Invalid configuration: {context}")]
    InvalidConfig {
        /// Which parameter was rejected and why
        context: String,
    },
}

impl FlowError {
    /// Create a stream processing error with the given context
    pub fn stream_error(context: impl Into<String>) -> Self {
        Self::StreamError {
            context: context.into(),
        }
    }

    /// Wrap a user error
    pub fn user_error(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::UserError(Arc::new(error))
    }

    /// Create a protocol violation error with the given context
    pub fn protocol_violation(context: impl Into<String>) -> Self {
        Self::ProtocolViolation {
            context: context.into(),
        }
    }

    /// Create a configuration error with the given context
    pub fn invalid_config(context: impl Into<String>) -> Self {
        Self::InvalidConfig {
            context: context.into(),
        }
    }

    /// Returns the wrapped user error as `E`, if this is a `UserError` of that type.
    ///
    /// ```
    /// use flowmap_core::FlowError;
    ///
    /// let err = FlowError::user_error(std::io::Error::other("disk"));
    /// assert!(err.downcast_ref::<std::io::Error>().is_some());
    /// assert!(err.downcast_ref::<std::fmt::Error>().is_none());
    /// ```
    #[must_use]
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        match self {
            Self::UserError(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }

    /// Check if this error indicates a permanent failure
    ///
    /// Every failure is terminal for the stream that carries it; configuration
    /// and protocol errors additionally indicate a programming mistake.
    #[must_use]
    pub const fn is_permanent(&self) -> bool {
        matches!(self, Self::StreamError { .. } | Self::UserError(_))
    }

    /// Check if this error was raised by the library itself rather than user code
    #[must_use]
    pub const fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::ProtocolViolation { .. } | Self::InvalidConfig { .. }
        )
    }
}

/// Specialized Result type for flowmap operations
pub type Result<T> = std::result::Result<T, FlowError>;

/// Extension trait for converting errors into `FlowError`
///
/// Automatically implemented for every `std::error::Error + Send + Sync + 'static`.
pub trait IntoFlowError {
    /// Convert this error into a `FlowError` with additional context
    fn into_flow_error(self, context: &str) -> FlowError;

    /// Convert this error into a `FlowError` without additional context
    fn into_flow(self) -> FlowError
    where
        Self: Sized,
    {
        self.into_flow_error("")
    }
}

impl<E: std::error::Error + Send + Sync + 'static> IntoFlowError for E {
    fn into_flow_error(self, context: &str) -> FlowError {
        if context.is_empty() {
            FlowError::user_error(self)
        } else {
            FlowError::stream_error(format!("{context}: {self}"))
        }
    }
}

/// Helper trait for adding context to `Result`s
pub trait ResultExt<T> {
    /// Add context to an error
    ///
    /// # Errors
    /// Returns `Err(FlowError)` if the underlying result is `Err`.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context to an error using a closure (lazy evaluation)
    ///
    /// # Errors
    /// Returns `Err(FlowError)` if the underlying result is `Err`.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<FlowError>,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.with_context(|| context.into())
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| match e.into() {
            FlowError::UserError(inner) => FlowError::StreamError {
                context: format!("{}: {inner}", f()),
            },
            other => other,
        })
    }
}
