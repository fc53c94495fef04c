// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::FlowError;

/// One signal of an observable, as seen from the `futures::Stream` side.
///
/// [`into_stream`](crate::ObservableExt::into_stream) yields a `Value` per
/// `on_next` and at most one trailing `Error`; completion is the end of the
/// stream. [`from_stream`](crate::from_stream) reads them the other way round and
/// stops at the first `Error`.
#[derive(Debug, Clone)]
pub enum StreamItem<T> {
    /// Carried by `on_next`
    Value(T),
    /// Carried by `on_error`; nothing follows it
    Error(FlowError),
}

// FlowError has no equality, so two errors never compare equal.
impl<T: PartialEq> PartialEq for StreamItem<T> {
    fn eq(&self, other: &Self) -> bool {
        matches!((self, other), (StreamItem::Value(a), StreamItem::Value(b)) if a == b)
    }
}
