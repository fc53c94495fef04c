// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Push-based stream contracts for flowmap.
//!
//! An [`Observable`] pushes values to an [`Observer`] through the
//! `on_subscribe (on_next)* (on_error | on_complete)?` protocol, and the observer
//! can stop it at any time through the [`Subscription`] it received first.
//!
//! This crate provides those contracts plus everything operators are built from:
//! subscription primitives, the undeliverable-error [`hooks`], a [`PublishSubject`],
//! synchronous [`sources`], and a [`bridge`] to and from `futures` streams.

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]

extern crate alloc;

#[macro_use]
mod logging;

pub mod bridge;
pub mod cancellation_token;
pub mod error;
pub mod hooks;
pub mod observable;
pub mod observer;
pub mod sources;
pub mod stream_item;
pub mod subject;
pub mod subscription;
#[cfg(feature = "runtime-tokio")]
pub mod task;

pub use self::bridge::{into_stream, ObservableStream};
#[cfg(feature = "runtime-tokio")]
pub use self::bridge::{from_future, from_stream, FromFuture, FromStream};
pub use self::cancellation_token::CancellationToken;
pub use self::error::{FlowError, IntoFlowError, Result, ResultExt};
pub use self::hooks::{
    on_undeliverable, reset_undeliverable_handler, set_undeliverable_handler, Undeliverable,
    UndeliverableHandler,
};
pub use self::observable::{BoxObservable, Observable, ObservableExt};
pub use self::observer::{BoxObserver, LambdaObserver, Observer};
pub use self::sources::{empty, from_iter, just, never, range, throw};
pub use self::stream_item::StreamItem;
pub use self::subject::{PublishSubject, SubjectError};
pub use self::subscription::{
    BooleanSubscription, SetOutcome, Subscription, SubscriptionCell, SubscriptionRef,
};
#[cfg(feature = "runtime-tokio")]
pub use self::task::FlowTask;
