// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Test doubles for the tree, timer and pointer-source capabilities.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::error::HandlerError;
use crate::rules::Handler;
use crate::source::{Listener, PointerSource};
use crate::timer::{TimerHandle, TimerToken, Timers};
use crate::tree::NodeTree;
use crate::types::{ListenerTag, PointerEvent};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct TestNode(pub(crate) u32);

/// Parent links plus one class name per node; selectors are class names.
#[derive(Debug, Default)]
pub(crate) struct TestTree {
    nodes: Vec<(Option<TestNode>, &'static str)>,
    boundary: Option<TestNode>,
}

impl TestTree {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, parent: Option<TestNode>, class: &'static str) -> TestNode {
        let id = TestNode(u32::try_from(self.nodes.len()).unwrap());
        self.nodes.push((parent, class));
        id
    }

    pub(crate) fn set_boundary(&mut self, node: TestNode) {
        self.boundary = Some(node);
    }
}

impl NodeTree<TestNode> for TestTree {
    type Selector = &'static str;

    fn contains(&self, node: &TestNode) -> bool {
        (node.0 as usize) < self.nodes.len()
    }

    fn parent(&self, node: &TestNode) -> Option<TestNode> {
        self.nodes.get(node.0 as usize).and_then(|(p, _)| *p)
    }

    fn matches(&self, node: &TestNode, selector: &&'static str) -> bool {
        self.nodes
            .get(node.0 as usize)
            .is_some_and(|(_, class)| class == selector)
    }

    fn boundary(&self) -> Option<TestNode> {
        self.boundary
    }
}

/// Virtual clock with a pending-timer list.
#[derive(Debug, Default)]
pub(crate) struct ManualTimers {
    pub(crate) now: u64,
    next: u64,
    pending: Vec<(u64, TimerHandle, TimerToken)>,
    pub(crate) cancelled: Vec<TimerHandle>,
}

impl ManualTimers {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Advance the clock and return every token that came due, in due order.
    pub(crate) fn advance(&mut self, ms: u64) -> Vec<TimerToken> {
        self.now += ms;
        let now = self.now;
        let mut due: Vec<_> = self
            .pending
            .iter()
            .filter(|(at, ..)| *at <= now)
            .copied()
            .collect();
        self.pending.retain(|(at, ..)| *at > now);
        due.sort_by_key(|(at, handle, _)| (*at, *handle));
        due.into_iter().map(|(.., token)| token).collect()
    }

    /// Drain every pending token regardless of cancellation state.
    pub(crate) fn take_all(&mut self) -> Vec<TimerToken> {
        self.pending.drain(..).map(|(.., token)| token).collect()
    }
}

impl Timers for ManualTimers {
    fn schedule(&mut self, delay: u64, token: TimerToken) -> TimerHandle {
        self.next += 1;
        let handle = TimerHandle(self.next);
        self.pending.push((self.now + delay, handle, token));
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.pending.retain(|(_, h, _)| *h != handle);
        self.cancelled.push(handle);
    }
}

/// Pointer source that only records registrations.
#[derive(Debug, Default)]
pub(crate) struct RecordingSource {
    pub(crate) listeners: Vec<Listener<TestNode>>,
}

impl PointerSource<TestNode> for RecordingSource {
    fn listen(&mut self, listener: Listener<TestNode>) {
        self.listeners.push(listener);
    }

    fn unlisten_all(&mut self, tag: ListenerTag) {
        self.listeners.retain(|l| l.tag != tag);
    }
}

/// Shared call log: `(label, resolved target)` per handler invocation.
pub(crate) type CallLog = Rc<RefCell<Vec<(&'static str, TestNode)>>>;

pub(crate) fn call_log() -> CallLog {
    Rc::default()
}

/// Handler that appends `label` and the resolved target to `log`.
pub(crate) fn record(log: &CallLog, label: &'static str) -> Handler<TestNode> {
    let log = log.clone();
    Rc::new(
        move |_ev: &PointerEvent<TestNode>, target: TestNode| -> Result<(), HandlerError> {
            log.borrow_mut().push((label, target));
            Ok(())
        },
    )
}

/// Handler that records like [`record`] and then fails.
pub(crate) fn failing(log: &CallLog, label: &'static str) -> Handler<TestNode> {
    let log = log.clone();
    Rc::new(
        move |_ev: &PointerEvent<TestNode>, target: TestNode| -> Result<(), HandlerError> {
            log.borrow_mut().push((label, target));
            Err(HandlerError::new(label))
        },
    )
}
