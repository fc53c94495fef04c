// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use core::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle of one operator subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum Phase {
    Active = 0,
    /// A terminal signal (error or completion) won the race.
    Terminated = 1,
    /// The downstream cancelled before any terminal signal.
    Cancelled = 2,
}

/// Single-winner termination flag.
///
/// Leaving `Active` is a compare-and-swap, so exactly one of "error",
/// "completion" or "cancel" ever succeeds; the losers learn it from the
/// returned `false` and route their signal elsewhere.
#[derive(Debug)]
pub(crate) struct TerminationState {
    phase: AtomicU8,
}

impl TerminationState {
    pub(crate) const fn new() -> Self {
        Self {
            phase: AtomicU8::new(Phase::Active as u8),
        }
    }

    /// Claims the terminal signal. Returns `false` if anything else got there first.
    pub(crate) fn try_terminate(&self) -> bool {
        self.leave_active(Phase::Terminated)
    }

    /// Claims cancellation. Returns `false` if already terminated or cancelled.
    pub(crate) fn try_cancel(&self) -> bool {
        self.leave_active(Phase::Cancelled)
    }

    pub(crate) fn phase(&self) -> Phase {
        match self.phase.load(Ordering::Acquire) {
            0 => Phase::Active,
            1 => Phase::Terminated,
            _ => Phase::Cancelled,
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.phase() == Phase::Active
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.phase() == Phase::Cancelled
    }

    fn leave_active(&self, to: Phase) -> bool {
        self.phase
            .compare_exchange(
                Phase::Active as u8,
                to as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }
}
