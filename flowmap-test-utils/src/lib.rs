// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Test utilities and fixtures for the flowmap push-stream library.
//!
//! This crate provides observers, sources and helpers for testing operators. It
//! is designed for use in development and testing only, not for production code.
//!
//! # Key Types
//!
//! - [`TestObserver`] records every signal and offers fluent assertions
//!   (`assert_result`, `assert_failure`, `assert_empty`, ...) plus
//!   [`await_done`](TestObserver::await_done) for asynchronous pipelines
//! - [`UndeliverableRecorder`] is an undeliverable-error handler that keeps
//!   what it receives
//! - [`ManualSource`] hands its observers to the test, which signals them by hand
//! - [`ScriptedSource`] replays a fixed sequence of signals, ignoring cancellation
//! - [`TestError`] is the error tests inject on purpose
//!
//! # Example
//!
//! ```rust
//! use flowmap_core::{throw, Observable};
//! use flowmap_test_utils::{TestError, TestObserver};
//!
//! let observer = TestObserver::<i32>::new();
//! throw::<i32>(TestError::flow("boom")).subscribe(observer.clone());
//!
//! observer.assert_failure(&[]);
//! observer.assert_error_message("boom");
//! ```

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
pub mod helpers;
pub mod manual_source;
pub mod test_error;
pub mod test_observer;
pub mod undeliverable;

pub use helpers::{assert_no_element_emitted, unwrap_stream};
pub use manual_source::{ManualSource, ScriptedSource, Step};
pub use test_error::{test_error_message, TestError};
pub use test_observer::TestObserver;
pub use undeliverable::UndeliverableRecorder;
