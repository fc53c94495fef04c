// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use super::admission::SourceItem;
use super::ordering_buffer::ResultRecord;
use super::{Combiner, Mapper};
use core::sync::atomic::{AtomicU8, Ordering};
use flowmap_core::{
    FlowError, Observer, SetOutcome, Subscription, SubscriptionCell, SubscriptionRef,
    Undeliverable,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Receiver of slot outcomes; implemented by the coordinator.
pub(crate) trait SlotEvents<R>: Send + Sync {
    /// The slot produced its first value or completed empty.
    fn slot_finished(&self, record: ResultRecord<R>);

    /// The sub-stream or the combiner failed.
    fn slot_failed(&self, error: FlowError);
}

const RUNNING: u8 = 0;
const FINISHED: u8 = 1;
const FAILED: u8 = 2;
const CANCELLED: u8 = 3;

/// Observer of one sub-stream: captures its first value, then stops it.
///
/// A slot finalizes exactly once. Whatever arrives after that is dropped,
/// except errors, which go to the undeliverable sink.
pub(crate) struct Slot<T, U, R> {
    index: u64,
    source_value: Mutex<Option<T>>,
    combiner: Combiner<T, U, R>,
    events: Arc<dyn SlotEvents<R>>,
    undeliverable: Undeliverable,
    upstream: SubscriptionCell,
    state: AtomicU8,
}

impl<T, U, R> Slot<T, U, R>
where
    T: Send + 'static,
    U: Send + 'static,
    R: Send + 'static,
{
    fn new(
        item: SourceItem<T>,
        combiner: Combiner<T, U, R>,
        events: Arc<dyn SlotEvents<R>>,
        undeliverable: Undeliverable,
    ) -> Self {
        Self {
            index: item.index,
            source_value: Mutex::new(Some(item.value)),
            combiner,
            events,
            undeliverable,
            upstream: SubscriptionCell::new(),
            state: AtomicU8::new(RUNNING),
        }
    }

    fn finalize(&self, to: u8) -> bool {
        self.state
            .compare_exchange(RUNNING, to, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Stops the sub-stream. Signals racing with this are ignored.
    pub(crate) fn cancel(&self) {
        let _ = self.finalize(CANCELLED);
        self.upstream.cancel();
    }

    pub(crate) fn index(&self) -> u64 {
        self.index
    }
}

impl<T, U, R> Observer<U> for Slot<T, U, R>
where
    T: Send + 'static,
    U: Send + 'static,
    R: Send + 'static,
{
    fn on_subscribe(&self, subscription: SubscriptionRef) {
        if self.upstream.set(subscription) == SetOutcome::Duplicate {
            self.undeliverable.report(FlowError::protocol_violation(format!(
                "sub-stream {} received a second subscription",
                self.index
            )));
        }
    }

    fn on_next(&self, value: U) {
        if !self.finalize(FINISHED) {
            return;
        }
        let Some(source_value) = self.source_value.lock().take() else {
            return;
        };

        match (self.combiner)(source_value, value) {
            Ok(result) => self.events.slot_finished(ResultRecord {
                index: self.index,
                payload: Some(result),
            }),
            Err(error) => {
                self.state.store(FAILED, Ordering::Release);
                self.events.slot_failed(error);
            }
        }
        self.upstream.cancel();
    }

    fn on_error(&self, error: FlowError) {
        if self.finalize(FAILED) {
            self.events.slot_failed(error);
        } else {
            self.undeliverable.report(error);
        }
    }

    fn on_complete(&self) {
        if self.finalize(FINISHED) {
            self.source_value.lock().take();
            self.events.slot_finished(ResultRecord {
                index: self.index,
                payload: None,
            });
        }
    }
}

/// Creates slots for promoted values and tracks the ones still running.
pub(crate) struct SlotManager<T, U, R> {
    mapper: Mapper<T, U>,
    combiner: Combiner<T, U, R>,
    undeliverable: Undeliverable,
    running: HashMap<u64, Arc<Slot<T, U, R>>>,
}

impl<T, U, R> SlotManager<T, U, R>
where
    T: Send + 'static,
    U: Send + 'static,
    R: Send + 'static,
{
    pub(crate) fn new(
        mapper: Mapper<T, U>,
        combiner: Combiner<T, U, R>,
        undeliverable: Undeliverable,
    ) -> Self {
        Self {
            mapper,
            combiner,
            undeliverable,
            running: HashMap::new(),
        }
    }

    /// Maps `item` to its sub-stream and subscribes a new slot to it.
    ///
    /// The sub-stream may signal synchronously, before this returns.
    ///
    /// # Errors
    ///
    /// Returns the mapper's error; no slot is started in that case.
    pub(crate) fn launch(
        &mut self,
        item: SourceItem<T>,
        events: Arc<dyn SlotEvents<R>>,
    ) -> Result<(), FlowError> {
        let inner = (self.mapper)(&item.value)?;

        let slot = Arc::new(Slot::new(
            item,
            self.combiner.clone(),
            events,
            self.undeliverable.clone(),
        ));
        self.running.insert(slot.index(), slot.clone());
        inner.subscribe(slot);
        Ok(())
    }

    /// Forgets a slot that has delivered its record.
    pub(crate) fn finalize(&mut self, index: u64) {
        self.running.remove(&index);
    }

    /// Cancels and forgets every running slot.
    pub(crate) fn cancel_all(&mut self) {
        for (_, slot) in self.running.drain() {
            slot.cancel();
        }
    }

    pub(crate) fn running(&self) -> usize {
        self.running.len()
    }
}
