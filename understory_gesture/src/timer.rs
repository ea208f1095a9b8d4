// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timer capability.
//!
//! The state machine arms at most two timers per button: the long-click timer
//! and the double-click window. It never sleeps or spawns. It asks the host to
//! schedule a [`TimerToken`] and expects the host to hand that token back to
//! [`Dispatcher::on_timer`](crate::dispatcher::Dispatcher::on_timer) when the
//! delay elapses.
//!
//! Tokens carry the owning dispatcher's tag, a teardown generation and a
//! per-arm serial. A token whose generation or serial no longer matches the
//! button state is stale and is ignored, so a host that fails to cancel a
//! timer cannot mutate state after `rebuild` or `destroy`.

use crate::types::{Button, ListenerTag};

/// Host-assigned handle for a scheduled timer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(pub u64);

/// Which per-button timer a token belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Long-press duration; firing marks the long click ready.
    LongClick,
    /// Double-click window; firing emits the deferred single click.
    DoubleClick,
}

/// Identifies one armed timer of one dispatcher.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TimerToken {
    pub(crate) tag: ListenerTag,
    pub(crate) generation: u64,
    pub(crate) serial: u64,
    pub(crate) button: Button,
    pub(crate) kind: TimerKind,
}

impl TimerToken {
    /// Dispatcher that armed the timer.
    pub fn tag(&self) -> ListenerTag {
        self.tag
    }

    /// Button the timer belongs to.
    pub fn button(&self) -> Button {
        self.button
    }

    /// Timer kind.
    pub fn kind(&self) -> TimerKind {
        self.kind
    }
}

/// Schedules and cancels one-shot timers.
pub trait Timers {
    /// Schedule `token` to be delivered after `delay` milliseconds.
    fn schedule(&mut self, delay: u64, token: TimerToken) -> TimerHandle;

    /// Cancel a scheduled timer. Cancelling an already fired handle is a no-op.
    fn cancel(&mut self, handle: TimerHandle);
}
