// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Ordered asynchronous first-value mapping.
//!
//! `map_async` maps every value of a source to a sub-stream, keeps only the
//! first value each sub-stream produces (optionally combined with the source
//! value), and emits those results in the order of the source values that
//! caused them, no matter in which order the sub-streams finish.

mod admission;
mod coordinator;
mod ordering_buffer;
mod slot;
mod termination;

use self::coordinator::Coordinator;
use core::fmt;
use core::num::NonZeroUsize;
use flowmap_core::{
    BoxObservable, BoxObserver, FlowError, Observable, Result, Undeliverable,
    UndeliverableHandler,
};
use std::sync::Arc;

/// Maps a source value to the sub-stream whose first value it waits for.
pub type Mapper<T, U> = Arc<dyn Fn(&T) -> Result<BoxObservable<U>> + Send + Sync>;

/// Builds the emitted result from a source value and its sub-stream's first value.
pub type Combiner<T, U, R> = Arc<dyn Fn(T, U) -> Result<R> + Send + Sync>;

/// Per-operator settings of [`map_async`](MapAsyncExt::map_async).
///
/// ```
/// use flowmap_stream::MapAsyncConfig;
///
/// let config = MapAsyncConfig::new().with_max_concurrency(4).unwrap();
/// assert_eq!(config.max_concurrency().map(|n| n.get()), Some(4));
///
/// assert!(MapAsyncConfig::new().with_max_concurrency(0).is_err());
/// ```
#[derive(Clone, Default)]
pub struct MapAsyncConfig {
    max_concurrency: Option<NonZeroUsize>,
    undeliverable: Undeliverable,
}

impl MapAsyncConfig {
    /// Unbounded concurrency, errors routed to the process-wide handler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps the number of sub-streams subscribed at the same time.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::InvalidConfig`] when `max_concurrency` is zero.
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Result<Self> {
        let limit = NonZeroUsize::new(max_concurrency).ok_or_else(|| {
            FlowError::invalid_config("map_async max_concurrency must be at least 1")
        })?;
        self.max_concurrency = Some(limit);
        Ok(self)
    }

    /// Removes the concurrency cap.
    #[must_use]
    pub fn unbounded(mut self) -> Self {
        self.max_concurrency = None;
        self
    }

    /// Sends this operator's undeliverable errors to `handler` instead of the
    /// process-wide one.
    #[must_use]
    pub fn with_undeliverable_handler(mut self, handler: UndeliverableHandler) -> Self {
        self.undeliverable = Undeliverable::to(handler);
        self
    }

    #[must_use]
    pub fn max_concurrency(&self) -> Option<NonZeroUsize> {
        self.max_concurrency
    }

    pub(crate) fn undeliverable(&self) -> &Undeliverable {
        &self.undeliverable
    }
}

impl fmt::Debug for MapAsyncConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapAsyncConfig")
            .field("max_concurrency", &self.max_concurrency)
            .field("undeliverable", &self.undeliverable)
            .finish()
    }
}

/// Observable returned by [`MapAsyncExt`].
///
/// Cold: every subscription runs its own independent instance of the operator.
pub struct MapAsync<T, U, R> {
    source: BoxObservable<T>,
    mapper: Mapper<T, U>,
    combiner: Combiner<T, U, R>,
    config: MapAsyncConfig,
}

impl<T, U, R> MapAsync<T, U, R> {
    pub fn new(
        source: BoxObservable<T>,
        mapper: Mapper<T, U>,
        combiner: Combiner<T, U, R>,
        config: MapAsyncConfig,
    ) -> Self {
        Self {
            source,
            mapper,
            combiner,
            config,
        }
    }
}

impl<T, U, R> Observable<R> for MapAsync<T, U, R>
where
    T: Send + 'static,
    U: Send + 'static,
    R: Send + 'static,
{
    fn subscribe(&self, observer: BoxObserver<R>) {
        let coordinator = Coordinator::new(
            observer.clone(),
            self.mapper.clone(),
            self.combiner.clone(),
            &self.config,
        );

        observer.on_subscribe(coordinator.clone());
        self.source.subscribe(coordinator.outer_observer());
    }
}

/// Extension trait providing the `map_async` operator on every [`Observable`].
pub trait MapAsyncExt<T>: Observable<T> + Sized + 'static
where
    T: Send + 'static,
{
    /// Emits the first value of the sub-stream each source value maps to, in
    /// source order.
    ///
    /// # Behavior
    ///
    /// - Each source value gets an index and a sub-stream from `mapper`
    /// - The first value of a sub-stream is kept; the sub-stream is then cancelled
    /// - Results are emitted in index order; a sub-stream completing empty just
    ///   leaves a gap
    /// - The first error (source, mapper, sub-stream) terminates the operator and
    ///   cancels everything still running; later errors are undeliverable
    /// - Completes once the source completed and every sub-stream finished
    ///
    /// # Examples
    ///
    /// ```
    /// use flowmap_core::{empty, just, range, ObservableExt, StreamItem};
    /// use flowmap_stream::MapAsyncExt;
    /// use futures::StreamExt;
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let evens = range(1, 6).map_async(|v: &i32| {
    ///     Ok(if v % 2 == 0 { just(*v).boxed() } else { empty().boxed() })
    /// });
    ///
    /// let items: Vec<_> = evens.into_stream().collect().await;
    /// assert_eq!(items, vec![StreamItem::Value(2), StreamItem::Value(4), StreamItem::Value(6)]);
    /// # }
    /// ```
    fn map_async<U, O, F>(self, mapper: F) -> MapAsync<T, U, U>
    where
        U: Send + 'static,
        O: Observable<U> + 'static,
        F: Fn(&T) -> Result<O> + Send + Sync + 'static,
    {
        self.map_async_config(mapper, |_, inner| Ok(inner), MapAsyncConfig::default())
    }

    /// Like [`map_async`](MapAsyncExt::map_async), emitting `combiner(source_value, first_value)`.
    ///
    /// A failing combiner terminates the operator like a failing sub-stream.
    fn map_async_with<U, R, O, F, C>(self, mapper: F, combiner: C) -> MapAsync<T, U, R>
    where
        U: Send + 'static,
        R: Send + 'static,
        O: Observable<U> + 'static,
        F: Fn(&T) -> Result<O> + Send + Sync + 'static,
        C: Fn(T, U) -> Result<R> + Send + Sync + 'static,
    {
        self.map_async_config(mapper, combiner, MapAsyncConfig::default())
    }

    /// Fully configured form of [`map_async_with`](MapAsyncExt::map_async_with).
    fn map_async_config<U, R, O, F, C>(
        self,
        mapper: F,
        combiner: C,
        config: MapAsyncConfig,
    ) -> MapAsync<T, U, R>
    where
        U: Send + 'static,
        R: Send + 'static,
        O: Observable<U> + 'static,
        F: Fn(&T) -> Result<O> + Send + Sync + 'static,
        C: Fn(T, U) -> Result<R> + Send + Sync + 'static,
    {
        let mapper: Mapper<T, U> =
            Arc::new(move |value: &T| mapper(value).map(|inner| Arc::new(inner) as BoxObservable<U>));
        MapAsync::new(Arc::new(self), mapper, Arc::new(combiner), config)
    }
}

impl<T, O> MapAsyncExt<T> for O
where
    T: Send + 'static,
    O: Observable<T> + 'static,
{
}
