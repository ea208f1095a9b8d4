// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rule matching: resolve which handlers fire for a concrete event target.
//!
//! ## Algorithm
//!
//! [`collect`] walks the rule tree for one gesture type depth-first. Within
//! each sibling group the first rule that matches wins and the remaining
//! siblings are skipped.
//!
//! For each rule, in order:
//!
//! 1. If the concrete target matches the rule, `(handler, target)` is recorded.
//!    Its children are not searched.
//! 2. Otherwise, unless the rule is `CURRENT_ONLY`, the ancestor chain of the
//!    target (nearest first, through the bound root to the tree's boundary) is
//!    searched for the nearest node matching the rule. That node becomes a
//!    *candidate*.
//! 3. Unless the rule is `STOP_PROPAGATION`, its children are walked with the
//!    candidate pending. If a child produces a match, the candidate is dropped
//!    unless it is `HOLD_TRIGGER`, in which case it is kept ahead of the deeper
//!    match. If nothing deeper matches, the candidate fires alone.
//!
//! The effect is DOM-like "most specific wins" without relying on platform
//! bubbling, so synthetic gestures resolve the same way as raw ones.
//!
//! ```
//! use understory_gesture::matcher::collect;
//! use understory_gesture::rules::{RuleNode, RuleSet};
//! use understory_gesture::tree::NodeTree;
//! use understory_gesture::types::GestureType;
//!
//! // 0 = root, 1 = list, 2 = item. Selectors are node ids here.
//! struct Tree;
//! impl NodeTree<u32> for Tree {
//!     type Selector = u32;
//!     fn contains(&self, n: &u32) -> bool { *n <= 2 }
//!     fn parent(&self, n: &u32) -> Option<u32> { n.checked_sub(1) }
//!     fn matches(&self, n: &u32, s: &u32) -> bool { n == s }
//! }
//!
//! let rules: RuleSet<u32, u32> = RuleSet::builder()
//!     .on(
//!         GestureType::ClickLeft,
//!         [RuleNode::node(1).hold_trigger().child(RuleNode::node(2))],
//!     )
//!     .build()
//!     .unwrap();
//!
//! let hits = collect(&rules, GestureType::ClickLeft, 2, 0, &Tree);
//! let targets: Vec<u32> = hits.iter().map(|m| m.target).collect();
//! // The held list fires first, then the item itself.
//! assert_eq!(targets, [1, 2]);
//! ```

use core::fmt;

use smallvec::SmallVec;

use crate::rules::{Handler, RuleFlags, RuleNode, RuleSet};
use crate::tree::{AncestorChain, NodeTree};
use crate::types::GestureType;

/// A resolved handler and the node it fires against.
pub struct Match<N> {
    /// Handler, or `None` for a no-op match.
    pub handler: Option<Handler<N>>,
    /// Concrete target, or the ancestor that satisfied the rule.
    pub target: N,
}

impl<N: Clone> Clone for Match<N> {
    fn clone(&self) -> Self {
        Self {
            handler: self.handler.clone(),
            target: self.target.clone(),
        }
    }
}

impl<N: fmt::Debug> fmt::Debug for Match<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Match")
            .field("target", &self.target)
            .field("has_handler", &self.handler.is_some())
            .finish_non_exhaustive()
    }
}

/// Ordered match list.
pub type Matches<N> = SmallVec<[Match<N>; 4]>;

/// Collect the handlers that fire for `gesture` on `target`, in invocation order.
///
/// `root` is the node the dispatcher is bound to; the ancestor search runs up
/// to it, then to [`NodeTree::boundary`] if the tree has one.
pub fn collect<N, S, T>(
    rules: &RuleSet<N, S>,
    gesture: GestureType,
    target: N,
    root: N,
    tree: &T,
) -> Matches<N>
where
    N: Copy + Eq,
    T: NodeTree<N, Selector = S> + ?Sized,
{
    let nodes = rules.get(gesture);
    if nodes.is_empty() {
        return Matches::new();
    }
    let mut chain: AncestorChain<N> = tree.ancestors_until(&target, &root);
    chain.push(root);
    if let Some(boundary) = tree.boundary()
        && boundary != root
    {
        chain.push(boundary);
    }
    let walker = Walker {
        tree,
        target,
        chain: &chain,
    };
    walker.walk(nodes, None).hits
}

/// Ancestor match waiting on the outcome of a deeper search.
struct Candidate<N> {
    handler: Option<Handler<N>>,
    target: N,
    hold: bool,
}

impl<N> Candidate<N> {
    fn into_match(self) -> Match<N> {
        Match {
            handler: self.handler,
            target: self.target,
        }
    }
}

/// Outcome of walking one sibling group.
struct Walk<N> {
    /// The group matched, exactly or through an ancestor.
    matched: bool,
    /// Matches produced by the group, pending candidate included.
    hits: Matches<N>,
}

struct Walker<'a, N, T: ?Sized> {
    tree: &'a T,
    target: N,
    chain: &'a [N],
}

impl<N, S, T> Walker<'_, N, T>
where
    N: Copy + Eq,
    T: NodeTree<N, Selector = S> + ?Sized,
{
    fn walk(&self, nodes: &[RuleNode<N, S>], last: Option<Candidate<N>>) -> Walk<N> {
        let mut hits = Matches::new();
        let mut matched = false;

        for node in nodes {
            if self.tree.matches_target(&self.target, &node.target) {
                hits.push(Match {
                    handler: node.handler.clone(),
                    target: self.target,
                });
                matched = true;
            } else {
                let candidate = self.ancestor_candidate(node);
                matched |= candidate.is_some();
                if node.flags.contains(RuleFlags::STOP_PROPAGATION) {
                    // A stopped rule still answers for its own ancestor match.
                    hits.extend(candidate.map(Candidate::into_match));
                } else {
                    let inner = self.walk(&node.children, candidate);
                    matched |= inner.matched;
                    hits.extend(inner.hits);
                }
            }
            if matched {
                break;
            }
        }

        if let Some(last) = last
            && (!matched || last.hold)
        {
            hits.insert(0, last.into_match());
        }
        Walk { matched, hits }
    }

    fn ancestor_candidate(&self, node: &RuleNode<N, S>) -> Option<Candidate<N>> {
        if node.flags.contains(RuleFlags::CURRENT_ONLY) {
            return None;
        }
        let ancestor = self
            .chain
            .iter()
            .find(|a| self.tree.matches_target(a, &node.target))?;
        Some(Candidate {
            handler: node.handler.clone(),
            target: *ancestor,
            hold: node.flags.contains(RuleFlags::HOLD_TRIGGER),
        })
    }
}
