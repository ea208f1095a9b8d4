// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer-event source capability.
//!
//! A dispatcher registers one delegated [`Listener`] per raw event kind it
//! needs, scoped to its root and tagged with its [`ListenerTag`]. The host
//! delivers matching events to [`Dispatcher::handle`](crate::dispatcher::Dispatcher::handle).
//! Teardown removes every listener sharing the tag in one call, leaving other
//! dispatchers bound to the same root untouched.

use crate::types::{ListenerTag, PointerKind};

/// A delegated listener registration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Listener<N> {
    /// Root whose subtree the listener observes (root included).
    pub root: N,
    /// Raw event kind.
    pub kind: PointerKind,
    /// Owner tag.
    pub tag: ListenerTag,
}

/// Attaches and detaches delegated pointer listeners.
pub trait PointerSource<N> {
    /// Register a listener.
    fn listen(&mut self, listener: Listener<N>);

    /// Remove every listener registered with `tag`.
    fn unlisten_all(&mut self, tag: ListenerTag);
}
