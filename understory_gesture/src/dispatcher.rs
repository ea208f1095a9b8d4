// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dispatcher: bind a [`RuleSet`] to a root node and run gesture handlers.
//!
//! A [`Dispatcher`] owns one [`GestureStateMachine`] and one rule set. It
//! registers its listeners with a [`PointerSource`] on construction, turns
//! each delivered [`PointerEvent`] (and each fired timer) into gesture
//! emissions, resolves them with [`matcher::collect`](crate::matcher::collect)
//! and invokes the resolved handlers with [`run`].
//!
//! ## Semantics
//!
//! - Handlers run in match order. A failing handler does not stop the others;
//!   every failure is logged and returned as [`HandlerFailures`] after the
//!   whole event was processed.
//! - Unmatched gestures are a no-op.
//! - Move events are only observed when move rules exist. They pass through a
//!   [`Throttle`]; dropped moves are marked default-prevented. The match list
//!   is recomputed only when the move target changes.
//! - [`Dispatcher::rebuild`] and [`Dispatcher::destroy`] cancel every timer,
//!   reset every button and remove exactly this dispatcher's listeners. Both
//!   are idempotent.
//! - Handlers must not call back into the dispatcher that invoked them.
//!
//! ## Minimal example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use kurbo::Point;
//! use understory_gesture::dispatcher::Dispatcher;
//! use understory_gesture::rules::{RuleNode, RuleSet};
//! use understory_gesture::source::{Listener, PointerSource};
//! use understory_gesture::timer::{TimerHandle, TimerToken, Timers};
//! use understory_gesture::tree::NodeTree;
//! use understory_gesture::types::{Button, GestureType, ListenerTag, PointerEvent};
//!
//! // 0 = root, 1 = button inside it.
//! struct Tree;
//! impl NodeTree<u32> for Tree {
//!     type Selector = ();
//!     fn contains(&self, n: &u32) -> bool { *n <= 1 }
//!     fn parent(&self, n: &u32) -> Option<u32> { (*n == 1).then_some(0) }
//!     fn matches(&self, _: &u32, _: &()) -> bool { false }
//! }
//!
//! struct NoSource;
//! impl PointerSource<u32> for NoSource {
//!     fn listen(&mut self, _: Listener<u32>) {}
//!     fn unlisten_all(&mut self, _: ListenerTag) {}
//! }
//!
//! struct NoTimers;
//! impl Timers for NoTimers {
//!     fn schedule(&mut self, _: u64, _: TimerToken) -> TimerHandle { TimerHandle(0) }
//!     fn cancel(&mut self, _: TimerHandle) {}
//! }
//!
//! let clicks = Rc::new(Cell::new(0));
//! let counter = clicks.clone();
//! let rules: RuleSet<u32, ()> = RuleSet::builder()
//!     .on(
//!         GestureType::ClickLeft,
//!         [RuleNode::node(1).handler(move |_ev, _target| {
//!             counter.set(counter.get() + 1);
//!             Ok(())
//!         })],
//!     )
//!     .build()
//!     .unwrap();
//!
//! let mut dispatcher = Dispatcher::new(rules, 0, &Tree, &mut NoSource).unwrap();
//! let mut down = PointerEvent::press(Button::Left, 1, Point::ZERO, 0);
//! let mut up = PointerEvent::release(Button::Left, 1, Point::ZERO, 40);
//! dispatcher.handle(&mut down, &Tree, &mut NoTimers).unwrap();
//! dispatcher.handle(&mut up, &Tree, &mut NoTimers).unwrap();
//! assert_eq!(clicks.get(), 1);
//! ```

use core::fmt;

use crate::error::{Error, HandlerFailures};
use crate::matcher::{self, Match, Matches};
use crate::rules::RuleSet;
use crate::source::{Listener, PointerSource};
use crate::state::{ButtonState, Emission, GestureConfig, GestureStateMachine};
use crate::throttle::Throttle;
use crate::timer::{TimerToken, Timers};
use crate::tree::NodeTree;
use crate::types::{Button, GestureType, ListenerTag, PointerEvent, PointerKind};

/// Run every matched handler for one gesture, in order.
///
/// Matches without a handler are skipped. A handler error is logged and
/// recorded; the remaining handlers still run.
pub fn run<N: Copy>(
    gesture: GestureType,
    matches: &[Match<N>],
    event: &PointerEvent<N>,
) -> HandlerFailures {
    let mut failures = HandlerFailures::default();
    for m in matches {
        let Some(handler) = &m.handler else {
            continue;
        };
        if let Err(err) = handler(event, m.target) {
            log::warn!("{gesture} handler failed: {err}");
            failures.push(gesture, err);
        }
    }
    failures
}

/// Move-target cache: the last move target and the matches computed for it.
struct MoveCache<N> {
    throttle: Option<Throttle>,
    target: Option<N>,
    matches: Matches<N>,
}

impl<N> MoveCache<N> {
    fn new(config: &GestureConfig) -> Self {
        Self {
            throttle: config.move_throttle.map(Throttle::new),
            target: None,
            matches: Matches::new(),
        }
    }

    fn reset(&mut self) {
        if let Some(t) = &mut self.throttle {
            t.reset();
        }
        self.target = None;
        self.matches.clear();
    }
}

/// Gesture dispatcher bound to one root node.
pub struct Dispatcher<N, S> {
    rules: RuleSet<N, S>,
    root: N,
    tag: ListenerTag,
    machine: GestureStateMachine<N>,
    moves: MoveCache<N>,
    bound: bool,
}

impl<N: fmt::Debug, S: fmt::Debug> fmt::Debug for Dispatcher<N, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("root", &self.root)
            .field("tag", &self.tag)
            .field("bound", &self.bound)
            .field("machine", &self.machine)
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}

impl<N: Copy + Eq + fmt::Debug, S> Dispatcher<N, S> {
    /// Bind `rules` to `root` with default timings and start listening.
    ///
    /// Fails with [`Error::InvalidTarget`] if `root` is not a node of `tree`.
    #[cfg(target_has_atomic = "ptr")]
    pub fn new<T>(
        rules: RuleSet<N, S>,
        root: N,
        tree: &T,
        source: &mut (impl PointerSource<N> + ?Sized),
    ) -> Result<Self, Error>
    where
        T: NodeTree<N, Selector = S> + ?Sized,
    {
        Self::with_config(rules, root, GestureConfig::default(), tree, source)
    }

    /// Bind `rules` to `root` with explicit timings and start listening.
    #[cfg(target_has_atomic = "ptr")]
    pub fn with_config<T>(
        rules: RuleSet<N, S>,
        root: N,
        config: GestureConfig,
        tree: &T,
        source: &mut (impl PointerSource<N> + ?Sized),
    ) -> Result<Self, Error>
    where
        T: NodeTree<N, Selector = S> + ?Sized,
    {
        Self::with_tag(rules, root, config, ListenerTag::next(), tree, source)
    }

    /// Bind `rules` to `root` under a caller-chosen `tag` and start listening.
    ///
    /// `tag` must differ from the tag of every other dispatcher registered
    /// with `source`, otherwise teardown of one removes the other's listeners.
    pub fn with_tag<T>(
        rules: RuleSet<N, S>,
        root: N,
        config: GestureConfig,
        tag: ListenerTag,
        tree: &T,
        source: &mut (impl PointerSource<N> + ?Sized),
    ) -> Result<Self, Error>
    where
        T: NodeTree<N, Selector = S> + ?Sized,
    {
        if !tree.contains(&root) {
            return Err(Error::InvalidTarget);
        }
        let mut dispatcher = Self {
            rules,
            root,
            tag,
            machine: GestureStateMachine::new(tag, config),
            moves: MoveCache::new(&config),
            bound: false,
        };
        dispatcher.bind(source);
        Ok(dispatcher)
    }

    /// Root node.
    pub fn root(&self) -> N {
        self.root
    }

    /// Tag of this dispatcher's listeners and timers.
    pub fn tag(&self) -> ListenerTag {
        self.tag
    }

    /// Bound rules.
    pub fn rules(&self) -> &RuleSet<N, S> {
        &self.rules
    }

    /// Timing configuration.
    pub fn config(&self) -> &GestureConfig {
        self.machine.config()
    }

    /// True while listeners are attached.
    pub fn is_bound(&self) -> bool {
        self.bound
    }

    /// Read-only state of one button.
    pub fn button_state(&self, button: Button) -> &ButtonState<N> {
        self.machine.button(button)
    }

    /// True while `button` is held.
    pub fn is_pressed(&self, button: Button) -> bool {
        self.machine.button(button).pressed
    }

    /// Tear down and re-attach. State and timers are reset.
    pub fn rebuild(
        &mut self,
        source: &mut (impl PointerSource<N> + ?Sized),
        timers: &mut (impl Timers + ?Sized),
    ) {
        self.teardown(source, timers);
        self.bind(source);
    }

    /// Swap the rules, then [`rebuild`](Self::rebuild).
    pub fn replace_rules(
        &mut self,
        rules: RuleSet<N, S>,
        source: &mut (impl PointerSource<N> + ?Sized),
        timers: &mut (impl Timers + ?Sized),
    ) {
        self.teardown(source, timers);
        self.rules = rules;
        self.bind(source);
    }

    /// Tear down without re-attaching.
    pub fn destroy(
        &mut self,
        source: &mut (impl PointerSource<N> + ?Sized),
        timers: &mut (impl Timers + ?Sized),
    ) {
        self.teardown(source, timers);
    }

    /// Process a raw pointer event delivered to one of this dispatcher's listeners.
    ///
    /// Returns every handler failure raised while processing the event.
    pub fn handle<T>(
        &mut self,
        ev: &mut PointerEvent<N>,
        tree: &T,
        timers: &mut (impl Timers + ?Sized),
    ) -> Result<(), HandlerFailures>
    where
        T: NodeTree<N, Selector = S> + ?Sized,
    {
        if !self.bound {
            log::debug!("{}: dropping {:?} event after teardown", self.tag, ev.kind);
            return Ok(());
        }
        let emissions = match ev.kind {
            PointerKind::Press => self.machine.press(ev, &self.rules, timers),
            PointerKind::Release => self.machine.release(ev, &self.rules, timers),
            PointerKind::Move => return self.handle_move(ev, tree),
        };
        let mut failures = HandlerFailures::default();
        for emission in &emissions {
            failures.extend(self.emit(emission, tree));
        }
        failures.into_result()
    }

    /// Process a fired timer previously scheduled through [`Timers`].
    ///
    /// Tokens from another dispatcher, from before the last teardown, or of a
    /// timer that was since replaced are ignored.
    pub fn on_timer<T>(&mut self, token: TimerToken, tree: &T) -> Result<(), HandlerFailures>
    where
        T: NodeTree<N, Selector = S> + ?Sized,
    {
        match self.machine.fire(token) {
            Some(emission) => self.emit(&emission, tree).into_result(),
            None => Ok(()),
        }
    }

    fn handle_move<T>(&mut self, ev: &mut PointerEvent<N>, tree: &T) -> Result<(), HandlerFailures>
    where
        T: NodeTree<N, Selector = S> + ?Sized,
    {
        if !self.rules.has_move() {
            return Ok(());
        }
        if let Some(throttle) = &mut self.moves.throttle
            && !throttle.admit(ev.timestamp)
        {
            log::trace!("{}: throttled move over {:?}", self.tag, ev.target);
            ev.prevent_default();
            return Ok(());
        }
        if self.moves.target != Some(ev.target) {
            self.moves.matches =
                matcher::collect(&self.rules, GestureType::Move, ev.target, self.root, tree);
            self.moves.target = Some(ev.target);
        }
        run(GestureType::Move, &self.moves.matches, ev).into_result()
    }

    fn emit<T>(&self, emission: &Emission<N>, tree: &T) -> HandlerFailures
    where
        T: NodeTree<N, Selector = S> + ?Sized,
    {
        let matches = matcher::collect(
            &self.rules,
            emission.gesture,
            emission.event.target,
            self.root,
            tree,
        );
        log::trace!(
            "{}: {} on {:?} resolved {} match(es)",
            self.tag,
            emission.gesture,
            emission.event.target,
            matches.len()
        );
        run(emission.gesture, &matches, &emission.event)
    }

    fn bind(&mut self, source: &mut (impl PointerSource<N> + ?Sized)) {
        // Never stack a second set of listeners.
        source.unlisten_all(self.tag);
        let kinds: &[PointerKind] = if self.rules.has_move() {
            &[PointerKind::Press, PointerKind::Release, PointerKind::Move]
        } else {
            &[PointerKind::Press, PointerKind::Release]
        };
        for &kind in kinds {
            source.listen(Listener {
                root: self.root,
                kind,
                tag: self.tag,
            });
        }
        self.bound = true;
        log::debug!("{}: bound to {:?}", self.tag, self.root);
    }

    fn teardown(
        &mut self,
        source: &mut (impl PointerSource<N> + ?Sized),
        timers: &mut (impl Timers + ?Sized),
    ) {
        source.unlisten_all(self.tag);
        self.machine.reset(timers);
        self.moves.reset();
        self.bound = false;
        log::debug!("{}: torn down", self.tag);
    }
}
