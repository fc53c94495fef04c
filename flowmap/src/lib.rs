// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! # Flowmap
//!
//! Push-based observables with an ordered asynchronous first-value mapping operator.
//!
//! ## Overview
//!
//! Flowmap maps every value of an [`Observable`] to a sub-stream, keeps the first
//! value each sub-stream produces and emits those values in the order of the
//! source values, even when the sub-streams finish out of order on other threads.
//!
//! The workspace is split the way its concerns are:
//!
//! - **`flowmap-core`**: the observer protocol, subscriptions, subjects, sources,
//!   the undeliverable-error hooks and the bridge to `futures` streams
//! - **`flowmap-stream`**: the [`map_async`](MapAsyncExt::map_async) operator
//!
//! ## Quick Start
//!
//! ```rust
//! use flowmap::prelude::*;
//! use futures::StreamExt;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let lengths = from_iter(vec!["a", "abc", "ab"]).map_async(|word: &&str| {
//!         let word = word.to_string();
//!         Ok(from_future(async move {
//!             // Longer words take longer
//!             tokio::time::sleep(Duration::from_millis(word.len() as u64)).await;
//!             Ok::<_, FlowError>(word.len())
//!         }))
//!     });
//!
//!     let items: Vec<_> = lengths.into_stream().collect().await;
//!     assert_eq!(
//!         items,
//!         vec![StreamItem::Value(1), StreamItem::Value(3), StreamItem::Value(2)]
//!     );
//! }
//! ```

// Re-export core types
pub use flowmap_core::{
    empty, from_iter, into_stream, just, never, range, throw, BooleanSubscription, BoxObservable,
    BoxObserver, CancellationToken, FlowError, LambdaObserver, Observable, ObservableExt,
    ObservableStream, Observer, PublishSubject, Result, StreamItem, Subscription,
    SubscriptionCell, SubscriptionRef, Undeliverable, UndeliverableHandler,
};
#[cfg(feature = "runtime-tokio")]
pub use flowmap_core::{from_future, from_stream, FlowTask};

// Re-export the hooks so applications can route undeliverable errors
pub use flowmap_core::hooks;

// Re-export the operator
pub use flowmap_stream::{Combiner, MapAsync, MapAsyncConfig, MapAsyncExt, Mapper};

/// Prelude module for convenient imports
pub mod prelude {
    pub use flowmap_core::{
        empty, from_iter, just, never, range, throw, BoxObservable, FlowError, Observable,
        ObservableExt, Observer, PublishSubject, StreamItem, Subscription,
    };
    #[cfg(feature = "runtime-tokio")]
    pub use flowmap_core::{from_future, from_stream};
    pub use flowmap_stream::{MapAsyncConfig, MapAsyncExt};
}
