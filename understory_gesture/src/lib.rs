// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_gesture --heading-base-level=0

//! Understory Gesture: declarative, `no_std` mouse gesture dispatch.
//!
//! ## Overview
//!
//! Describe *which* element should react to *which* mouse gesture as a tree of rules, bind the
//! rules to a root node, and feed raw pointer events in.
//! The crate synthesizes click, double-click and long-click from press/release timing, resolves
//! every gesture against the rule tree and invokes the matching handlers in a deterministic order.
//!
//! It does not own a UI tree, an event loop or a clock. Those are capabilities the host provides:
//!
//! - [`NodeTree`](crate::tree::NodeTree): parent lookup and selector matching.
//! - [`PointerSource`](crate::source::PointerSource): attach and detach tagged listeners on a root.
//! - [`Timers`](crate::timer::Timers): schedule and cancel one-shot timers; fired
//!   [`TimerToken`](crate::timer::TimerToken)s are handed back through
//!   [`Dispatcher::on_timer`](crate::dispatcher::Dispatcher::on_timer).
//!
//! ## Gestures
//!
//! [`GestureType`](crate::types::GestureType) has sixteen variants: down, up, click, double-click
//! and long-click for each of the left, center and right buttons, plus `Move`.
//!
//! - A click fires when a button is released on the node it was pressed on.
//! - If any double-click rule exists, a click is deferred until the double-click window closes;
//!   a second press inside the window emits a double-click instead of down, and no click follows.
//! - If a long-click rule exists for the button, holding it past the long-click threshold turns the
//!   release into a long-click; click and double-click are suppressed for that cycle.
//! - Windows default to 600 ms (long-click) and 200 ms (double-click); see
//!   [`GestureConfig`](crate::state::GestureConfig).
//!
//! ## Matching
//!
//! [`matcher::collect`] walks the rule tree for one gesture depth-first. A rule matches its exact
//! target or, unless it is `current_only`, an ancestor of it up to the root. Siblings stop at the
//! first match; an ancestor match is dropped in favour of a deeper one unless it is `hold_trigger`,
//! in which case it fires first. `stop_propagation` keeps the walk out of a rule's children.
//!
//! ## Lifecycle
//!
//! [`Dispatcher::new`](crate::dispatcher::Dispatcher::new) binds immediately.
//! [`rebuild`](crate::dispatcher::Dispatcher::rebuild) and
//! [`destroy`](crate::dispatcher::Dispatcher::destroy) cancel timers, reset every button and remove
//! only this dispatcher's listeners; both are idempotent. Timer tokens issued before a teardown
//! are ignored afterwards.
//!
//! ## Scopes
//!
//! [`ScopeRouter`](crate::scope::ScopeRouter) is a small companion: it routes one callback to the
//! handler of whichever named scope is current when the callback runs.
//!
//! ## Features
//!
//! - `std` *(default)*: enables `std` in `kurbo`, `log` and `thiserror`.
//! - `libm`: `no_std` floating point support for `kurbo`.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod dispatcher;
pub mod error;
pub mod matcher;
pub mod rules;
pub mod scope;
pub mod source;
pub mod state;
pub mod throttle;
pub mod timer;
pub mod tree;
pub mod types;

#[cfg(test)]
mod testing;

pub use dispatcher::Dispatcher;
pub use error::{ConfigError, Error, HandlerError, HandlerFailures};
pub use rules::{RuleNode, RuleSet};
pub use scope::{ScopeRouter, ScopeRules};
pub use types::{Button, GestureType, PointerEvent, PointerKind};
