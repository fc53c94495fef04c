// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Sink for errors that can no longer be delivered.
//!
//! Once a stream has delivered its terminal signal, any further error racing in
//! (a second source failing, a sub-stream ignoring cancellation) has no consumer.
//! Such errors are never dropped silently: they are handed to an
//! [`UndeliverableHandler`].
//!
//! Operators accept a handler of their own; when none is given they fall back to
//! the process-wide one installed with [`set_undeliverable_handler`]. Without
//! either, the error is logged.
//!
//! ```
//! use flowmap_core::{on_undeliverable, reset_undeliverable_handler, set_undeliverable_handler, FlowError};
//! use std::sync::{Arc, Mutex};
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = seen.clone();
//! set_undeliverable_handler(Arc::new(move |err| sink.lock().unwrap().push(err.to_string())));
//!
//! on_undeliverable(FlowError::stream_error("late"));
//! reset_undeliverable_handler();
//!
//! assert_eq!(*seen.lock().unwrap(), vec!["Stream processing error: late".to_string()]);
//! ```

use crate::FlowError;
use alloc::sync::Arc;
use parking_lot::RwLock;

/// Callback receiving undeliverable errors.
pub type UndeliverableHandler = Arc<dyn Fn(FlowError) + Send + Sync>;

static GLOBAL_HANDLER: RwLock<Option<UndeliverableHandler>> = parking_lot::const_rwlock(None);

/// Installs the process-wide handler and returns the one it replaces.
pub fn set_undeliverable_handler(handler: UndeliverableHandler) -> Option<UndeliverableHandler> {
    GLOBAL_HANDLER.write().replace(handler)
}

/// Removes the process-wide handler; errors are logged again afterwards.
pub fn reset_undeliverable_handler() {
    GLOBAL_HANDLER.write().take();
}

/// Reports `error` to the process-wide handler, or logs it when none is installed.
pub fn on_undeliverable(error: FlowError) {
    // Clone out of the lock so a handler may install or reset handlers itself.
    let handler = GLOBAL_HANDLER.read().clone();
    match handler {
        Some(handler) => handler(error),
        None => error!("undeliverable error: {}", error),
    }
}

/// Resolves where an operator instance sends its undeliverable errors.
#[derive(Clone, Default)]
pub struct Undeliverable {
    local: Option<UndeliverableHandler>,
}

impl Undeliverable {
    /// Routes to the process-wide handler.
    #[must_use]
    pub fn global() -> Self {
        Self::default()
    }

    /// Routes to `handler`, bypassing the process-wide one.
    #[must_use]
    pub fn to(handler: UndeliverableHandler) -> Self {
        Self {
            local: Some(handler),
        }
    }

    /// Reports an error that arrived after termination.
    pub fn report(&self, error: FlowError) {
        match &self.local {
            Some(handler) => handler(error),
            None => on_undeliverable(error),
        }
    }
}

impl core::fmt::Debug for Undeliverable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Undeliverable")
            .field("local", &self.local.is_some())
            .finish()
    }
}
