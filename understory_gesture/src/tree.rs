// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree capability consumed by the matcher.
//!
//! The gesture crate never owns the UI tree. It queries it through
//! [`NodeTree`]: parent links, node-vs-selector tests and an optional fallback
//! boundary node that sits beyond the bound root (a document body, a window).
//! Node handles are small copyable keys, as in the other Understory crates.

use smallvec::SmallVec;

/// What a rule node targets: an exact node, or a selector evaluated by the tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuleTarget<N, S> {
    /// Exact node identity.
    Node(N),
    /// Selector expression understood by [`NodeTree::matches`].
    Selector(S),
}

impl<N, S> From<N> for RuleTarget<N, S> {
    fn from(node: N) -> Self {
        Self::Node(node)
    }
}

/// Ancestor chain, nearest first. Most UI trees are shallow enough to stay inline.
pub type AncestorChain<N> = SmallVec<[N; 8]>;

/// Read-only view of a UI tree.
pub trait NodeTree<N: Copy + Eq> {
    /// Selector expression type (CSS-like string, class bitmask, predicate id…).
    type Selector;

    /// True if `node` is a live node of this tree.
    fn contains(&self, node: &N) -> bool;

    /// Parent of `node`, or `None` at the top of the tree.
    fn parent(&self, node: &N) -> Option<N>;

    /// True if `node` satisfies `selector`.
    fn matches(&self, node: &N, selector: &Self::Selector) -> bool;

    /// Fallback boundary appended after the root when collecting ancestors.
    fn boundary(&self) -> Option<N> {
        None
    }

    /// True if `node` is the rule target: identity for [`RuleTarget::Node`],
    /// [`NodeTree::matches`] for [`RuleTarget::Selector`].
    fn matches_target(&self, node: &N, target: &RuleTarget<N, Self::Selector>) -> bool {
        match target {
            RuleTarget::Node(n) => n == node,
            RuleTarget::Selector(s) => self.matches(node, s),
        }
    }

    /// Ancestors of `node` strictly above it, nearest first, stopping before `boundary`.
    ///
    /// `node` itself and `boundary` are excluded. If `node` is `boundary`, the
    /// result is empty. If `boundary` is never reached the walk ends at the top
    /// of the tree.
    fn ancestors_until(&self, node: &N, boundary: &N) -> AncestorChain<N> {
        let mut out = AncestorChain::new();
        if node == boundary {
            return out;
        }
        let mut cur = self.parent(node);
        // Caller ensures acyclic ancestry.
        while let Some(p) = cur {
            if p == *boundary {
                break;
            }
            out.push(p);
            cur = self.parent(&p);
        }
        out
    }
}
