// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use super::admission::{Admission, Admitted, SourceItem};
use super::ordering_buffer::{OrderingBuffer, ResultRecord};
use super::slot::{SlotEvents, SlotManager};
use super::termination::{Phase, TerminationState};
use super::{Combiner, MapAsyncConfig, Mapper};
use async_channel::{Receiver, Sender};
use core::sync::atomic::{AtomicUsize, Ordering};
use flowmap_core::{
    BoxObserver, FlowError, Observer, SetOutcome, Subscription, SubscriptionCell,
    SubscriptionRef, Undeliverable,
};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};

/// Work handed to the drain by whichever thread produced it.
enum Signal<T, R> {
    Item(T),
    Finished(ResultRecord<R>),
    OuterCompleted,
    Failed(FlowError),
}

/// State only the drain owner touches.
struct DrainState<T, U, R> {
    downstream: Option<BoxObserver<R>>,
    admission: Admission<T>,
    buffer: OrderingBuffer<R>,
    slots: SlotManager<T, U, R>,
    outer_done: bool,
    failure: Option<FlowError>,
}

/// Per-subscription engine of `map_async`.
///
/// Every producer (the outer source, the slots, a cancelling downstream) only
/// enqueues a [`Signal`] and calls [`drain`](Coordinator::drain). The drain is
/// single-flight: the thread that moves `wip` from zero runs passes until no
/// work was missed, everyone else returns at once. Downstream signals are
/// therefore never concurrent and never re-entrant.
pub(crate) struct Coordinator<T, U, R> {
    this: Weak<Self>,
    inbox: Sender<Signal<T, R>>,
    outbox: Receiver<Signal<T, R>>,
    wip: AtomicUsize,
    termination: TerminationState,
    upstream: SubscriptionCell,
    undeliverable: Undeliverable,
    state: Mutex<DrainState<T, U, R>>,
}

impl<T, U, R> Coordinator<T, U, R>
where
    T: Send + 'static,
    U: Send + 'static,
    R: Send + 'static,
{
    pub(crate) fn new(
        downstream: BoxObserver<R>,
        mapper: Mapper<T, U>,
        combiner: Combiner<T, U, R>,
        config: &MapAsyncConfig,
    ) -> Arc<Self> {
        let (inbox, outbox) = async_channel::unbounded();
        let undeliverable = config.undeliverable().clone();

        Arc::new_cyclic(|this| Self {
            this: this.clone(),
            inbox,
            outbox,
            wip: AtomicUsize::new(0),
            termination: TerminationState::new(),
            upstream: SubscriptionCell::new(),
            undeliverable: undeliverable.clone(),
            state: Mutex::new(DrainState {
                downstream: Some(downstream),
                admission: Admission::new(config.max_concurrency()),
                buffer: OrderingBuffer::new(),
                slots: SlotManager::new(mapper, combiner, undeliverable),
                outer_done: false,
                failure: None,
            }),
        })
    }

    fn push(&self, signal: Signal<T, R>) {
        // Unbounded and never closed while `self` holds the receiver.
        let _ = self.inbox.try_send(signal);
        self.drain();
    }

    /// Terminal-error arbiter: the first failure wins, later ones are undeliverable.
    fn fail(&self, error: FlowError) {
        if self.termination.try_terminate() {
            debug!("map_async terminating with error: {}", error);
            self.upstream.cancel();
            self.push(Signal::Failed(error));
        } else {
            trace!("map_async dropping a late error: {}", error);
            self.undeliverable.report(error);
        }
    }

    fn drain(&self) {
        if self.wip.fetch_add(1, Ordering::AcqRel) != 0 {
            return;
        }

        let mut missed = 1;
        loop {
            // The guard drops before `wip` is handed back.
            self.drain_pass(&mut self.state.lock());

            missed = self.wip.fetch_sub(missed, Ordering::AcqRel) - missed;
            if missed == 0 {
                break;
            }
        }
    }

    fn drain_pass(&self, state: &mut DrainState<T, U, R>) {
        while let Ok(signal) = self.outbox.try_recv() {
            if state.downstream.is_none() {
                // Already torn down: discard whatever is still queued.
                continue;
            }
            match signal {
                Signal::Item(value) => {
                    if let Admitted::Promoted(item) = state.admission.admit(value) {
                        self.launch(state, item);
                    }
                }
                Signal::Finished(record) => {
                    state.slots.finalize(record.index);
                    state.buffer.store(record);
                    // Ready results go out before the freed permit maps the next value.
                    self.emit_ready(state);
                    if let Some(item) = state.admission.release() {
                        self.launch(state, item);
                    }
                }
                Signal::OuterCompleted => state.outer_done = true,
                Signal::Failed(error) => state.failure = Some(error),
            }
        }

        match self.termination.phase() {
            Phase::Active => self.emit(state),
            Phase::Terminated => {
                if let Some(error) = state.failure.take() {
                    if let Some(downstream) = Self::tear_down(state) {
                        downstream.on_error(error);
                    }
                }
                // Otherwise the winner's signal is still on its way and will
                // trigger another pass, or the terminal signal was already sent.
            }
            Phase::Cancelled => {
                let _ = Self::tear_down(state);
            }
        }
    }

    fn launch(&self, state: &mut DrainState<T, U, R>, item: SourceItem<T>) {
        if !self.termination.is_active() {
            return;
        }
        let Some(events) = self.this.upgrade() else {
            return;
        };

        let index = item.index;
        match state.slots.launch(item, events) {
            Ok(()) => trace!(
                "map_async slot {} started: {} permits taken, {} slots running, {} waiting",
                index,
                state.admission.active(),
                state.slots.running(),
                state.admission.waiting()
            ),
            Err(error) => {
                debug!("map_async mapper failed for item {}", index);
                self.fail(error);
            }
        }
    }

    /// Pushes the contiguous run of finished results downstream.
    fn emit_ready(&self, state: &mut DrainState<T, U, R>) {
        let Some(downstream) = state.downstream.clone() else {
            return;
        };

        for value in state.buffer.drain() {
            if !self.termination.is_active() {
                return;
            }
            downstream.on_next(value);
        }
    }

    fn emit(&self, state: &mut DrainState<T, U, R>) {
        self.emit_ready(state);
        if !self.termination.is_active() {
            return;
        }

        let finished = state.outer_done && state.admission.is_idle() && state.buffer.is_empty();
        if finished && self.termination.try_terminate() {
            debug!("map_async completed");
            if let Some(downstream) = Self::tear_down(state) {
                downstream.on_complete();
            }
        }
    }

    /// Releases everything the subscription holds and hands back the downstream
    /// for its terminal signal. Only the first call returns it.
    fn tear_down(state: &mut DrainState<T, U, R>) -> Option<BoxObserver<R>> {
        let downstream = state.downstream.take()?;
        state.slots.cancel_all();
        state.admission.clear();
        state.buffer.clear();
        state.outer_done = true;
        Some(downstream)
    }

    pub(crate) fn outer_observer(self: &Arc<Self>) -> BoxObserver<T> {
        Arc::new(OuterObserver {
            coordinator: self.clone(),
        })
    }
}

impl<T, U, R> SlotEvents<R> for Coordinator<T, U, R>
where
    T: Send + 'static,
    U: Send + 'static,
    R: Send + 'static,
{
    fn slot_finished(&self, record: ResultRecord<R>) {
        if self.termination.is_active() {
            self.push(Signal::Finished(record));
        }
    }

    fn slot_failed(&self, error: FlowError) {
        self.fail(error);
    }
}

impl<T, U, R> Subscription for Coordinator<T, U, R>
where
    T: Send + 'static,
    U: Send + 'static,
    R: Send + 'static,
{
    fn cancel(&self) {
        if self.termination.try_cancel() {
            debug!("map_async cancelled by downstream");
            self.upstream.cancel();
            // The pass that observes the cancelled phase tears the slots down.
            self.drain();
        }
    }

    fn is_cancelled(&self) -> bool {
        self.termination.is_cancelled()
    }
}

/// Observer handed to the outer source.
struct OuterObserver<T, U, R> {
    coordinator: Arc<Coordinator<T, U, R>>,
}

impl<T, U, R> Observer<T> for OuterObserver<T, U, R>
where
    T: Send + 'static,
    U: Send + 'static,
    R: Send + 'static,
{
    fn on_subscribe(&self, subscription: SubscriptionRef) {
        if self.coordinator.upstream.set(subscription) == SetOutcome::Duplicate {
            warn!("map_async source delivered a second subscription");
            self.coordinator
                .undeliverable
                .report(FlowError::protocol_violation(
                    "map_async source delivered a second subscription",
                ));
        }
    }

    fn on_next(&self, value: T) {
        if self.coordinator.termination.is_active() {
            self.coordinator.push(Signal::Item(value));
        }
    }

    fn on_error(&self, error: FlowError) {
        self.coordinator.fail(error);
    }

    fn on_complete(&self) {
        if self.coordinator.termination.is_active() {
            self.coordinator.push(Signal::OuterCompleted);
        }
    }
}
