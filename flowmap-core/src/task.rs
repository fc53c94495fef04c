// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Background tasks with cooperative cancellation.

use crate::{CancellationToken, Subscription};
use core::future::Future;

/// Handle to a task spawned on the tokio runtime.
///
/// The spawned future receives a [`CancellationToken`] it is expected to watch.
/// Dropping the handle cancels the token unless the task was
/// [`detach`](FlowTask::detach)ed.
///
/// ```rust
/// use flowmap_core::FlowTask;
///
/// # #[tokio::main]
/// # async fn main() {
/// let task = FlowTask::spawn(|cancel| async move {
///     cancel.cancelled().await;
/// });
///
/// assert!(!task.is_cancelled());
/// drop(task);
/// # }
/// ```
#[derive(Debug)]
pub struct FlowTask {
    cancel: CancellationToken,
    cancel_on_drop: bool,
}

impl FlowTask {
    /// Spawns `f` with a fresh token.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a tokio runtime.
    pub fn spawn<F, Fut>(f: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::spawn_with_token(CancellationToken::new(), f)
    }

    /// Spawns `f` watching an existing token.
    ///
    /// Used when the token has to be published (for example handed to an
    /// observer as its subscription) before the task starts running.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a tokio runtime.
    pub fn spawn_with_token<F, Fut>(token: CancellationToken, f: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        tokio::spawn(f(token.clone()));

        Self {
            cancel: token,
            cancel_on_drop: true,
        }
    }

    /// Lets the task outlive this handle; returns the token that still stops it.
    #[must_use]
    pub fn detach(mut self) -> CancellationToken {
        self.cancel_on_drop = false;
        self.cancel.clone()
    }

    /// Signals the task to stop at its next cancellation checkpoint.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Returns `true` once cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for FlowTask {
    fn drop(&mut self) {
        if self.cancel_on_drop {
            self.cancel.cancel();
        }
    }
}
