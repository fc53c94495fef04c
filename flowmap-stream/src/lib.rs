// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Ordered asynchronous first-value mapping for flowmap observables.
//!
//! The crate provides one operator, [`map_async`](MapAsyncExt::map_async):
//! every source value is mapped to a sub-stream, the first value of each
//! sub-stream is taken, and the results are emitted in source order.
//!
//! # Architecture
//!
//! One subscription of the operator is made of four cooperating parts:
//!
//! - **Admission**: indexes source values and hands out at most
//!   `max_concurrency` permits, queueing the rest in arrival order
//! - **Slots**: one observer per running sub-stream, finalizing exactly once
//! - **Ordering buffer**: holds finished results until every earlier index is done
//! - **Coordinator**: a single-flight drain that owns the state above, plus the
//!   arbiter deciding which terminal signal wins
//!
//! Producers on any thread only enqueue work and try to become the drain
//! owner, so the downstream observer is never called concurrently.
//!
//! # Example
//!
//! ```
//! use flowmap_core::{empty, just, range, ObservableExt};
//! use flowmap_stream::MapAsyncExt;
//! use std::sync::{Arc, Mutex};
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = seen.clone();
//!
//! range(1, 10)
//!     .map_async(|v: &i32| Ok(if v % 2 == 0 { just(v * 2).boxed() } else { empty().boxed() }))
//!     .subscribe_fn(move |v| sink.lock().unwrap().push(v), |_| {}, || {});
//!
//! assert_eq!(*seen.lock().unwrap(), vec![4, 8, 12, 16, 20]);
//! ```
//!
//! # Errors
//!
//! The first failure among the source, the mapper, a sub-stream, and the
//! combiner terminates the operator. Anything failing afterwards is reported
//! to the [undeliverable handler](flowmap_core::hooks).

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]

#[macro_use]
mod logging;

pub mod map_async;

pub use self::map_async::{Combiner, MapAsync, MapAsyncConfig, MapAsyncExt, Mapper};
