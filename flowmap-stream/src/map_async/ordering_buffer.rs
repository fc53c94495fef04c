// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::collections::BTreeMap;

/// Outcome of one slot: `Some` when the sub-stream produced a first value,
/// `None` when it completed empty.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ResultRecord<R> {
    pub(crate) index: u64,
    pub(crate) payload: Option<R>,
}

/// Reorders slot outcomes back into source order.
///
/// Records arrive in any order and are released strictly by index, starting at
/// zero. An empty record advances the cursor without producing a value, so a
/// gap caused by an empty sub-stream never blocks later results.
#[derive(Debug)]
pub(crate) struct OrderingBuffer<R> {
    pending: BTreeMap<u64, Option<R>>,
    next_index: u64,
}

impl<R> OrderingBuffer<R> {
    pub(crate) const fn new() -> Self {
        Self {
            pending: BTreeMap::new(),
            next_index: 0,
        }
    }

    /// Stores the outcome of a finished slot.
    pub(crate) fn store(&mut self, record: ResultRecord<R>) {
        debug_assert!(
            record.index >= self.next_index,
            "record {} arrived after the cursor passed it",
            record.index
        );
        let previous = self.pending.insert(record.index, record.payload);
        debug_assert!(previous.is_none(), "duplicate record {}", record.index);
    }

    /// Takes the record at the cursor, if it has arrived, and advances.
    ///
    /// The outer `Option` says whether anything was ready; the inner one is the
    /// record's payload.
    pub(crate) fn pop_ready(&mut self) -> Option<Option<R>> {
        let payload = self.pending.remove(&self.next_index)?;
        self.next_index += 1;
        Some(payload)
    }

    /// Lazily yields every ready value in index order, skipping empty records.
    ///
    /// Stopping the iterator early leaves the remaining records in place.
    pub(crate) fn drain(&mut self) -> impl Iterator<Item = R> + '_ {
        core::iter::from_fn(move || loop {
            if let Some(value) = self.pop_ready()? {
                return Some(value);
            }
        })
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.pending.clear();
    }
}
