// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rule trees and the validated, immutable [`RuleSet`].
//!
//! A rule tree describes which target, under which ancestor, triggers which
//! handler for one gesture type. Trees are assembled with [`RuleNode`]'s
//! builder methods and frozen into a [`RuleSet`]; changing the rules of a
//! bound dispatcher goes through
//! [`Dispatcher::replace_rules`](crate::dispatcher::Dispatcher::replace_rules).
//!
//! ```
//! use understory_gesture::rules::{RuleNode, RuleSet};
//! use understory_gesture::types::GestureType;
//!
//! let rules: RuleSet<u32, &str> = RuleSet::builder()
//!     .on(
//!         GestureType::ClickLeft,
//!         [RuleNode::selector("list")
//!             .hold_trigger()
//!             .child(RuleNode::selector("item").handler(|_ev, _target| Ok(())))],
//!     )
//!     .on(GestureType::DoubleClickLeft, [RuleNode::node(7)])
//!     .build()
//!     .unwrap();
//!
//! assert!(rules.has_double_click());
//! assert!(!rules.has_long_click());
//! assert_eq!(rules.get(GestureType::ClickLeft).len(), 1);
//! ```

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

use crate::error::{ConfigError, HandlerError};
use crate::tree::RuleTarget;
use crate::types::{Button, GestureType, PointerEvent};

/// User handler: receives the raw event and the resolved target.
pub type Handler<N> = Rc<dyn Fn(&PointerEvent<N>, N) -> Result<(), HandlerError>>;

bitflags::bitflags! {
    /// Matching flags of a rule node.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct RuleFlags: u8 {
        /// Once this node is entered, its children are not searched.
        const STOP_PROPAGATION = 0b0000_0001;
        /// Fire this node's ancestor match even when a descendant rule matches too.
        const HOLD_TRIGGER     = 0b0000_0010;
        /// Only match the event's concrete target; no ancestor search.
        const CURRENT_ONLY     = 0b0000_0100;
    }
}

/// One node of a rule tree.
pub struct RuleNode<N, S> {
    /// What this node targets.
    pub target: RuleTarget<N, S>,
    /// Handler to invoke; a node without one is a no-op match.
    pub handler: Option<Handler<N>>,
    /// Matching flags.
    pub flags: RuleFlags,
    /// Nested, more specific rules.
    pub children: Vec<Self>,
}

impl<N, S> RuleNode<N, S> {
    /// A rule targeting an exact node.
    pub fn node(node: N) -> Self {
        Self::new(RuleTarget::Node(node))
    }

    /// A rule targeting nodes that satisfy a selector.
    pub fn selector(selector: S) -> Self {
        Self::new(RuleTarget::Selector(selector))
    }

    /// A rule with no handler, flags or children.
    pub fn new(target: RuleTarget<N, S>) -> Self {
        Self {
            target,
            handler: None,
            flags: RuleFlags::empty(),
            children: Vec::new(),
        }
    }

    /// Set the handler.
    #[must_use]
    pub fn handler(
        mut self,
        f: impl Fn(&PointerEvent<N>, N) -> Result<(), HandlerError> + 'static,
    ) -> Self {
        self.handler = Some(Rc::new(f));
        self
    }

    /// Set a shared handler.
    #[must_use]
    pub fn shared_handler(mut self, f: Handler<N>) -> Self {
        self.handler = Some(f);
        self
    }

    /// Do not search this node's children.
    #[must_use]
    pub fn stop_propagation(mut self) -> Self {
        self.flags |= RuleFlags::STOP_PROPAGATION;
        self
    }

    /// Keep firing on an ancestor match when a descendant also matches.
    #[must_use]
    pub fn hold_trigger(mut self) -> Self {
        self.flags |= RuleFlags::HOLD_TRIGGER;
        self
    }

    /// Only match the concrete event target.
    #[must_use]
    pub fn current_only(mut self) -> Self {
        self.flags |= RuleFlags::CURRENT_ONLY;
        self
    }

    /// Append a child rule.
    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Append several child rules.
    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.children.extend(children);
        self
    }
}

impl<N: Clone, S: Clone> Clone for RuleNode<N, S> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
            handler: self.handler.clone(),
            flags: self.flags,
            children: self.children.clone(),
        }
    }
}

impl<N: fmt::Debug, S: fmt::Debug> fmt::Debug for RuleNode<N, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleNode")
            .field("target", &self.target)
            .field("has_handler", &self.handler.is_some())
            .field("flags", &self.flags)
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}

/// Validated rule trees for all sixteen gesture types.
pub struct RuleSet<N, S> {
    rules: [Vec<RuleNode<N, S>>; GestureType::COUNT],
    has_double_click: bool,
    has_long_click: bool,
}

impl<N, S> RuleSet<N, S> {
    /// Start building a rule set.
    pub fn builder() -> RuleSetBuilder<N, S> {
        RuleSetBuilder {
            entries: Vec::new(),
        }
    }

    /// A rule set with no rules at all.
    pub fn empty() -> Self {
        Self::from_table(core::array::from_fn(|_| Vec::new()))
    }

    /// Build from `(name, rules)` pairs using the camelCase gesture names
    /// (`"clickLeft"`, `"longClickRight"`, `"move"`…).
    pub fn from_named<'a>(
        entries: impl IntoIterator<Item = (&'a str, Vec<RuleNode<N, S>>)>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Self::builder();
        for (name, rules) in entries {
            builder = builder.on(name.parse()?, rules);
        }
        builder.build()
    }

    fn from_table(rules: [Vec<RuleNode<N, S>>; GestureType::COUNT]) -> Self {
        let configured = |g: GestureType| !rules[g.index()].is_empty();
        let has_double_click = Button::ALL.into_iter().any(|b| configured(b.double_click()));
        let has_long_click = Button::ALL.into_iter().any(|b| configured(b.long_click()));
        Self {
            rules,
            has_double_click,
            has_long_click,
        }
    }

    /// Top-level rules for a gesture type; empty if not configured.
    pub fn get(&self, gesture: GestureType) -> &[RuleNode<N, S>] {
        &self.rules[gesture.index()]
    }

    /// True if at least one rule is configured for `gesture`.
    pub fn has(&self, gesture: GestureType) -> bool {
        !self.rules[gesture.index()].is_empty()
    }

    /// True if any button has a double-click rule.
    pub fn has_double_click(&self) -> bool {
        self.has_double_click
    }

    /// True if any button has a long-click rule.
    pub fn has_long_click(&self) -> bool {
        self.has_long_click
    }

    /// True if move rules exist, which is what makes a dispatcher listen for motion.
    pub fn has_move(&self) -> bool {
        self.has(GestureType::Move)
    }
}

impl<N, S> Default for RuleSet<N, S> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<N: Clone, S: Clone> Clone for RuleSet<N, S> {
    fn clone(&self) -> Self {
        Self {
            rules: self.rules.clone(),
            has_double_click: self.has_double_click,
            has_long_click: self.has_long_click,
        }
    }
}

impl<N: fmt::Debug, S: fmt::Debug> fmt::Debug for RuleSet<N, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut m = f.debug_map();
        for g in GestureType::ALL {
            let rules = &self.rules[g.index()];
            if !rules.is_empty() {
                m.entry(&g, rules);
            }
        }
        m.finish()
    }
}

/// Collects per-gesture rule trees and validates them into a [`RuleSet`].
pub struct RuleSetBuilder<N, S> {
    entries: Vec<(GestureType, Vec<RuleNode<N, S>>)>,
}

impl<N, S> RuleSetBuilder<N, S> {
    /// Configure the top-level rules for one gesture type.
    #[must_use]
    pub fn on(
        mut self,
        gesture: GestureType,
        rules: impl IntoIterator<Item = RuleNode<N, S>>,
    ) -> Self {
        self.entries.push((gesture, rules.into_iter().collect()));
        self
    }

    /// Validate and freeze.
    pub fn build(self) -> Result<RuleSet<N, S>, ConfigError> {
        let mut table: [Option<Vec<RuleNode<N, S>>>; GestureType::COUNT] =
            core::array::from_fn(|_| None);
        for (gesture, rules) in self.entries {
            let slot = &mut table[gesture.index()];
            if slot.is_some() {
                return Err(ConfigError::DuplicateGesture(gesture));
            }
            *slot = Some(rules);
        }
        Ok(RuleSet::from_table(table.map(Option::unwrap_or_default)))
    }
}

impl<N: fmt::Debug, S: fmt::Debug> fmt::Debug for RuleSetBuilder<N, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSetBuilder")
            .field("entries", &self.entries)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    type Rules = RuleSet<u32, &'static str>;

    #[test]
    fn empty_set_has_no_derived_flags() {
        let rules = Rules::empty();
        assert!(!rules.has_double_click());
        assert!(!rules.has_long_click());
        assert!(!rules.has_move());
        for g in GestureType::ALL {
            assert!(rules.get(g).is_empty(), "{g} should be empty");
        }
    }

    #[test]
    fn any_button_variant_sets_derived_flags() {
        let rules = Rules::builder()
            .on(GestureType::DoubleClickCenter, [RuleNode::node(1)])
            .on(GestureType::LongClickRight, [RuleNode::node(2)])
            .build()
            .unwrap();
        assert!(rules.has_double_click());
        assert!(rules.has_long_click());
        assert!(rules.has(GestureType::DoubleClickCenter));
        assert!(!rules.has(GestureType::DoubleClickLeft));
    }

    #[test]
    fn empty_rule_list_does_not_count_as_configured() {
        let rules = Rules::builder()
            .on(GestureType::LongClickLeft, Vec::new())
            .build()
            .unwrap();
        assert!(!rules.has_long_click());
    }

    #[test]
    fn duplicate_gesture_is_rejected() {
        let err = Rules::builder()
            .on(GestureType::ClickLeft, [RuleNode::node(1)])
            .on(GestureType::ClickLeft, [RuleNode::node(2)])
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::DuplicateGesture(GestureType::ClickLeft));
    }

    #[test]
    fn named_construction_accepts_known_names() {
        let rules = Rules::from_named([
            ("clickLeft", vec![RuleNode::selector("a")]),
            ("move", vec![RuleNode::selector("b")]),
        ])
        .unwrap();
        assert!(rules.has(GestureType::ClickLeft));
        assert!(rules.has_move());
    }

    #[test]
    fn named_construction_rejects_unknown_names() {
        let err = Rules::from_named([("hover", vec![RuleNode::selector("a")])]).unwrap_err();
        assert_eq!(err, ConfigError::UnknownGesture("hover".into()));
    }

    #[test]
    fn builder_methods_set_flags_and_children() {
        let node: RuleNode<u32, &str> = RuleNode::selector("list")
            .stop_propagation()
            .hold_trigger()
            .current_only()
            .child(RuleNode::node(3))
            .children([RuleNode::node(4), RuleNode::node(5)]);
        assert_eq!(node.flags, RuleFlags::all());
        assert_eq!(node.children.len(), 3);
        assert!(node.handler.is_none());
    }
}
