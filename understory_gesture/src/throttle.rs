// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cooldown filter for high-frequency events.
//!
//! The first event passes and opens a cooldown window; events arriving inside
//! the window are dropped. The caller is expected to mark dropped raw events
//! as default-prevented.

/// Default move cooldown in milliseconds.
pub const DEFAULT_COOLDOWN: u64 = 20;

/// Timestamp-driven throttle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Throttle {
    cooldown: u64,
    open_at: Option<u64>,
}

impl Throttle {
    /// Create a throttle with a cooldown in milliseconds.
    pub const fn new(cooldown: u64) -> Self {
        Self {
            cooldown,
            open_at: None,
        }
    }

    /// Cooldown in milliseconds.
    pub const fn cooldown(&self) -> u64 {
        self.cooldown
    }

    /// Returns `true` if an event at `now` passes, starting a new window.
    pub fn admit(&mut self, now: u64) -> bool {
        if self.open_at.is_some_and(|open_at| now < open_at) {
            return false;
        }
        self.open_at = Some(now.saturating_add(self.cooldown));
        true
    }

    /// Forget the current window.
    pub fn reset(&mut self) {
        self.open_at = None;
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}
