// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use core::num::NonZeroUsize;
use std::collections::VecDeque;

/// A source value tagged with its arrival index.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct SourceItem<T> {
    pub(crate) index: u64,
    pub(crate) value: T,
}

/// What `admit` did with a value.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Admitted<T> {
    /// A permit was free; the caller must start a slot for it now.
    Promoted(SourceItem<T>),
    /// Parked in the FIFO queue until a permit is released.
    Queued(u64),
}

/// Assigns arrival indices and limits how many slots run at once.
///
/// With no limit every value is promoted immediately. With a limit of `n`,
/// at most `n` values hold a permit and the rest wait in arrival order.
#[derive(Debug)]
pub(crate) struct Admission<T> {
    limit: Option<NonZeroUsize>,
    next_index: u64,
    active: usize,
    waiting: VecDeque<SourceItem<T>>,
}

impl<T> Admission<T> {
    pub(crate) const fn new(limit: Option<NonZeroUsize>) -> Self {
        Self {
            limit,
            next_index: 0,
            active: 0,
            waiting: VecDeque::new(),
        }
    }

    /// Indexes `value` and promotes it if a permit is free, otherwise queues it.
    pub(crate) fn admit(&mut self, value: T) -> Admitted<T> {
        let item = SourceItem {
            index: self.next_index,
            value,
        };
        self.next_index += 1;

        if self.waiting.is_empty() && self.has_permit() {
            self.active += 1;
            Admitted::Promoted(item)
        } else {
            let index = item.index;
            self.waiting.push_back(item);
            Admitted::Queued(index)
        }
    }

    /// Returns the permit of a finished slot and promotes the oldest waiter, if any.
    pub(crate) fn release(&mut self) -> Option<SourceItem<T>> {
        debug_assert!(self.active > 0, "released a permit that was never taken");
        self.active = self.active.saturating_sub(1);

        if !self.has_permit() {
            return None;
        }
        let next = self.waiting.pop_front()?;
        self.active += 1;
        Some(next)
    }

    /// No slot running and nothing waiting.
    pub(crate) fn is_idle(&self) -> bool {
        self.active == 0 && self.waiting.is_empty()
    }

    pub(crate) fn active(&self) -> usize {
        self.active
    }

    pub(crate) fn waiting(&self) -> usize {
        self.waiting.len()
    }

    /// Drops every waiting value and forgets all permits.
    pub(crate) fn clear(&mut self) {
        self.waiting.clear();
        self.active = 0;
    }

    fn has_permit(&self) -> bool {
        self.limit.map_or(true, |limit| self.active < limit.get())
    }
}
