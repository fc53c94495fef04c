// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Conversions between observables and `futures` streams and futures.
//!
//! [`from_stream`] and [`from_future`] run their input on the tokio runtime, which
//! makes them the natural way to build asynchronous sub-streams. [`into_stream`]
//! goes the other way and lets async code `await` the signals of an observable.

use crate::hooks::on_undeliverable;
use crate::observable::Observable;
use crate::observer::Observer;
use crate::subscription::{SetOutcome, Subscription, SubscriptionCell, SubscriptionRef};
use crate::{FlowError, StreamItem};
use alloc::sync::Arc;
use core::pin::Pin;
use core::task::{Context, Poll};
use futures_channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use futures::Stream;

#[cfg(feature = "runtime-tokio")]
pub use self::spawned::{from_future, from_stream, FromFuture, FromStream};

#[cfg(feature = "runtime-tokio")]
mod spawned {
    use crate::observable::Observable;
    use crate::observer::BoxObserver;
    use crate::subscription::{BooleanSubscription, Subscription};
    use crate::{CancellationToken, FlowError, FlowTask, Result, StreamItem};
    use alloc::boxed::Box;
    use core::future::Future;
    use futures::future::{select, Either};
    use futures::{Stream, StreamExt};
    use parking_lot::Mutex;

    /// Observable forwarding a `Stream` of [`StreamItem`]s from a spawned task.
    ///
    /// The stream can be consumed once; a second subscriber is failed with a
    /// protocol violation. Cancelling the subscription stops the task at its next
    /// poll.
    ///
    /// ```rust
    /// use flowmap_core::{from_stream, ObservableExt, StreamItem};
    /// use futures::{stream, StreamExt};
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let source = from_stream(stream::iter(vec![StreamItem::Value(1), StreamItem::Value(2)]));
    /// let items: Vec<_> = source.into_stream().collect().await;
    /// assert_eq!(items, vec![StreamItem::Value(1), StreamItem::Value(2)]);
    /// # }
    /// ```
    pub fn from_stream<T, S>(stream: S) -> FromStream<S>
    where
        S: Stream<Item = StreamItem<T>> + Send + 'static,
        T: Send + 'static,
    {
        FromStream {
            stream: Mutex::new(Some(stream)),
        }
    }

    /// Observable emitting the output of a future computed on a spawned task.
    ///
    /// `Ok(v)` becomes `on_next(v)` followed by `on_complete`; `Err(e)` becomes
    /// `on_error(e)`. Like [`from_stream`] it can be subscribed once.
    pub fn from_future<T, F>(future: F) -> FromFuture<F>
    where
        F: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        FromFuture {
            future: Mutex::new(Some(future)),
        }
    }

    /// See [`from_stream`].
    pub struct FromStream<S> {
        stream: Mutex<Option<S>>,
    }

    /// See [`from_future`].
    pub struct FromFuture<F> {
        future: Mutex<Option<F>>,
    }

    fn reject_resubscription<T>(observer: &BoxObserver<T>, source: &str) {
        observer.on_subscribe(BooleanSubscription::shared());
        observer.on_error(FlowError::protocol_violation(format!(
            "{source} can only be subscribed once"
        )));
    }

    impl<T, S> Observable<T> for FromStream<S>
    where
        S: Stream<Item = StreamItem<T>> + Send + 'static,
        T: Send + 'static,
    {
        fn subscribe(&self, observer: BoxObserver<T>) {
            let Some(stream) = self.stream.lock().take() else {
                reject_resubscription(&observer, "from_stream");
                return;
            };

            // Publish the token before the task can emit anything.
            let token = CancellationToken::new();
            observer.on_subscribe(alloc::sync::Arc::new(token.clone()));

            let _ = FlowTask::spawn_with_token(token, |cancel| async move {
                let mut stream = Box::pin(stream);
                loop {
                    match select(stream.next(), cancel.cancelled()).await {
                        Either::Left((Some(StreamItem::Value(value)), _)) => {
                            if cancel.is_cancelled() {
                                break;
                            }
                            observer.on_next(value);
                        }
                        Either::Left((Some(StreamItem::Error(error)), _)) => {
                            observer.on_error(error);
                            break;
                        }
                        Either::Left((None, _)) => {
                            observer.on_complete();
                            break;
                        }
                        Either::Right(_) => break,
                    }
                }
            })
            .detach();
        }
    }

    impl<T, F> Observable<T> for FromFuture<F>
    where
        F: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        fn subscribe(&self, observer: BoxObserver<T>) {
            let Some(future) = self.future.lock().take() else {
                reject_resubscription(&observer, "from_future");
                return;
            };

            let token = CancellationToken::new();
            observer.on_subscribe(alloc::sync::Arc::new(token.clone()));

            let _ = FlowTask::spawn_with_token(token, |cancel| async move {
                let future = Box::pin(future);
                if let Either::Left((output, _)) = select(future, cancel.cancelled()).await {
                    if cancel.is_cancelled() {
                        return;
                    }
                    match output {
                        Ok(value) => {
                            observer.on_next(value);
                            observer.on_complete();
                        }
                        Err(error) => observer.on_error(error),
                    }
                }
            })
            .detach();
        }
    }
}

/// Stream view of an observable subscription.
///
/// Yields one [`StreamItem::Value`] per `on_next`, a final [`StreamItem::Error`]
/// on failure, and ends on completion. Dropping it cancels the subscription.
pub struct ObservableStream<T> {
    receiver: UnboundedReceiver<StreamItem<T>>,
    upstream: Arc<SubscriptionCell>,
}

impl<T> ObservableStream<T> {
    /// Cancels the underlying subscription; already buffered items stay readable.
    pub fn cancel(&self) {
        self.upstream.cancel();
    }
}

impl<T> Stream for ObservableStream<T> {
    type Item = StreamItem<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.receiver).poll_next(cx)
    }
}

impl<T> Drop for ObservableStream<T> {
    fn drop(&mut self) {
        self.upstream.cancel();
    }
}

struct ChannelObserver<T> {
    sender: UnboundedSender<StreamItem<T>>,
    upstream: Arc<SubscriptionCell>,
}

impl<T: Send> Observer<T> for ChannelObserver<T> {
    fn on_subscribe(&self, subscription: SubscriptionRef) {
        if self.upstream.set(subscription) == SetOutcome::Duplicate {
            on_undeliverable(FlowError::protocol_violation(
                "into_stream received a second subscription",
            ));
        }
    }

    fn on_next(&self, value: T) {
        // A closed channel means the stream was dropped and the upstream cancelled.
        let _ = self.sender.unbounded_send(StreamItem::Value(value));
    }

    fn on_error(&self, error: FlowError) {
        if self.sender.is_closed() {
            on_undeliverable(error);
            return;
        }
        let _ = self.sender.unbounded_send(StreamItem::Error(error));
        self.sender.close_channel();
    }

    fn on_complete(&self) {
        self.sender.close_channel();
    }
}

/// Subscribes to `source` and returns its signals as a stream.
///
/// Prefer [`ObservableExt::into_stream`](crate::ObservableExt::into_stream).
pub fn into_stream<T, O>(source: &O) -> ObservableStream<T>
where
    O: Observable<T> + ?Sized,
    T: Send + 'static,
{
    let (sender, receiver) = unbounded();
    let upstream = Arc::new(SubscriptionCell::new());

    source.subscribe(Arc::new(ChannelObserver {
        sender,
        upstream: upstream.clone(),
    }));

    ObservableStream { receiver, upstream }
}
