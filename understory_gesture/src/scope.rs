// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Named-scope redirection.
//!
//! A [`ScopeRouter`] holds the current scope name and an optional payload.
//! [`ScopeRouter::bind_rules`] turns a [`ScopeRules`] table into a single
//! callback that, on every call, looks up the handler for whatever scope is
//! active at that moment and invokes it with the stored payload and the
//! call's own argument.
//!
//! Lookup order: the current scope's entry, then the table's fallback
//! (explicit via [`ScopeRules::with_fallback`], otherwise the
//! [`DEFAULT_SCOPE`] entry), then nothing. An explicit fallback also stands in
//! for the [`DEFAULT_SCOPE`] entry while the router is in the default scope.
//! An empty scope name means [`DEFAULT_SCOPE`].
//!
//! Routers and rule tables are cheap handles to shared state; clones observe
//! each other's changes. A handler may switch the scope or add rules while it
//! runs; the change applies from the next call.
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use understory_gesture::scope::{ScopeRouter, ScopeRules};
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let rules = ScopeRules::new();
//! let s = seen.clone();
//! rules.add_rule("default", move |doc: Option<&u32>, key: char| {
//!     s.borrow_mut().push(("default", doc.copied(), key));
//! });
//! let s = seen.clone();
//! rules.add_rule("edit", move |doc: Option<&u32>, key: char| {
//!     s.borrow_mut().push(("edit", doc.copied(), key));
//! });
//!
//! let router = ScopeRouter::new();
//! let on_key = router.bind_rules(&rules);
//! on_key('a');
//! router.switch(Some("edit"), Some(42));
//! on_key('b');
//! router.switch(Some("unknown"), None);
//! on_key('c');
//!
//! assert_eq!(
//!     *seen.borrow(),
//!     [("default", None, 'a'), ("edit", Some(42), 'b'), ("default", None, 'c')]
//! );
//! ```

use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use hashbrown::HashMap;

/// Scope selected when none is named.
pub const DEFAULT_SCOPE: &str = "default";

/// Scope handler: receives the router's payload and the call argument.
pub type ScopeHandler<P, A> = Rc<dyn Fn(Option<&P>, A)>;

struct ScopeState<P> {
    scope: String,
    payload: Option<Rc<P>>,
}

/// Current scope plus payload, shared by every callback bound from it.
pub struct ScopeRouter<P> {
    state: Rc<RefCell<ScopeState<P>>>,
}

impl<P> ScopeRouter<P> {
    /// A router in the [`DEFAULT_SCOPE`] with no payload.
    pub fn new() -> Self {
        Self::with_scope(DEFAULT_SCOPE)
    }

    /// A router starting in `scope` with no payload.
    pub fn with_scope(scope: impl Into<String>) -> Self {
        let mut scope = scope.into();
        if scope.is_empty() {
            scope.push_str(DEFAULT_SCOPE);
        }
        Self {
            state: Rc::new(RefCell::new(ScopeState {
                scope,
                payload: None,
            })),
        }
    }

    /// Set the current scope (or [`DEFAULT_SCOPE`] when `None` or empty) and
    /// replace the payload.
    pub fn switch(&self, scope: Option<&str>, payload: Option<P>) {
        let mut state = self.state.borrow_mut();
        let scope = scope.filter(|s| !s.is_empty()).unwrap_or(DEFAULT_SCOPE);
        log::debug!("scope switch: {} -> {scope}", state.scope);
        state.scope.clear();
        state.scope.push_str(scope);
        state.payload = payload.map(Rc::new);
    }

    /// Name of the current scope.
    pub fn scope(&self) -> String {
        self.state.borrow().scope.clone()
    }

    /// Current payload, if any.
    pub fn payload(&self) -> Option<Rc<P>> {
        self.state.borrow().payload.clone()
    }

    /// Wrap `rules` into one callback routed by the scope current at call time.
    ///
    /// The callback keeps sharing `rules`: rules added later are visible to it.
    pub fn bind_rules<A>(&self, rules: &ScopeRules<P, A>) -> impl Fn(A) + use<P, A>
    where
        P: 'static,
        A: 'static,
    {
        let state = self.state.clone();
        let rules = rules.clone();
        move |arg: A| {
            // Release both borrows before the handler runs so it may re-enter.
            let (handler, payload) = {
                let state = state.borrow();
                (rules.resolve(&state.scope), state.payload.clone())
            };
            match handler {
                Some(handler) => handler(payload.as_deref(), arg),
                None => log::trace!("no scope handler for {:?}", state.borrow().scope),
            }
        }
    }
}

impl<P> Clone for ScopeRouter<P> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<P> Default for ScopeRouter<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: fmt::Debug> fmt::Debug for ScopeRouter<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ScopeRouter")
            .field("scope", &state.scope)
            .field("payload", &state.payload)
            .finish_non_exhaustive()
    }
}

struct RulesTable<P, A> {
    handlers: HashMap<String, ScopeHandler<P, A>>,
    fallback: Option<ScopeHandler<P, A>>,
}

/// Scope name to handler table.
pub struct ScopeRules<P, A> {
    table: Rc<RefCell<RulesTable<P, A>>>,
}

impl<P, A> ScopeRules<P, A> {
    /// An empty table.
    pub fn new() -> Self {
        Self {
            table: Rc::new(RefCell::new(RulesTable {
                handlers: HashMap::new(),
                fallback: None,
            })),
        }
    }

    /// Use `handler` for unmatched scopes and for [`DEFAULT_SCOPE`] itself,
    /// in place of the [`DEFAULT_SCOPE`] entry.
    #[must_use]
    pub fn with_fallback(self, handler: impl Fn(Option<&P>, A) + 'static) -> Self {
        self.table.borrow_mut().fallback = Some(Rc::new(handler));
        self
    }

    /// Add or replace the handler for `scope`.
    pub fn add_rule(&self, scope: &str, handler: impl Fn(Option<&P>, A) + 'static) {
        self.table
            .borrow_mut()
            .handlers
            .insert(scope.to_string(), Rc::new(handler));
    }

    /// Handler registered for exactly `scope`.
    pub fn get(&self, scope: &str) -> Option<ScopeHandler<P, A>> {
        self.table.borrow().handlers.get(scope).cloned()
    }

    /// Number of named entries.
    pub fn len(&self) -> usize {
        self.table.borrow().handlers.len()
    }

    /// True if no named entry exists.
    pub fn is_empty(&self) -> bool {
        self.table.borrow().handlers.is_empty()
    }

    fn resolve(&self, scope: &str) -> Option<ScopeHandler<P, A>> {
        let table = self.table.borrow();
        let named = if scope == DEFAULT_SCOPE {
            None
        } else {
            table.handlers.get(scope)
        };
        named
            .or(table.fallback.as_ref())
            .or_else(|| table.handlers.get(DEFAULT_SCOPE))
            .cloned()
    }
}

impl<P, A> Clone for ScopeRules<P, A> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
        }
    }
}

impl<P, A> Default for ScopeRules<P, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P, A> fmt::Debug for ScopeRules<P, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.table.borrow();
        f.debug_struct("ScopeRules")
            .field("scopes", &table.handlers.keys().collect::<Vec<_>>())
            .field("has_fallback", &table.fallback.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    type Log = Rc<RefCell<Vec<String>>>;

    fn recorder(log: &Log, label: &'static str) -> impl Fn(Option<&u32>, &'static str) + 'static {
        let log = log.clone();
        move |payload: Option<&u32>, arg: &'static str| {
            log.borrow_mut().push(alloc::format!("{label}:{payload:?}:{arg}"));
        }
    }

    #[test]
    fn routes_to_the_current_scope_with_payload() {
        let log = Log::default();
        let rules = ScopeRules::new();
        rules.add_rule("default", recorder(&log, "default"));
        rules.add_rule("edit", recorder(&log, "edit"));
        let router = ScopeRouter::new();
        let cb = router.bind_rules(&rules);

        router.switch(Some("edit"), Some(7));
        cb("x");
        assert_eq!(*log.borrow(), ["edit:Some(7):x"]);
        assert_eq!(router.scope(), "edit");
        assert_eq!(router.payload().as_deref(), Some(&7));
    }

    #[test]
    fn unknown_scope_falls_back_to_default_entry() {
        let log = Log::default();
        let rules = ScopeRules::new();
        rules.add_rule("default", recorder(&log, "default"));
        let router = ScopeRouter::new();
        let cb = router.bind_rules(&rules);

        router.switch(Some("missing"), None);
        cb("x");
        assert_eq!(*log.borrow(), ["default:None:x"]);
    }

    #[test]
    fn unknown_scope_without_default_is_a_no_op() {
        let log = Log::default();
        let rules = ScopeRules::new();
        rules.add_rule("edit", recorder(&log, "edit"));
        let router = ScopeRouter::<u32>::with_scope("view");
        let cb = router.bind_rules(&rules);
        cb("x");
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn explicit_fallback_wins_over_default_entry() {
        let log = Log::default();
        let rules = ScopeRules::new().with_fallback(recorder(&log, "fallback"));
        rules.add_rule("default", recorder(&log, "default"));
        rules.add_rule("edit", recorder(&log, "edit"));
        let router = ScopeRouter::new();
        let cb = router.bind_rules(&rules);

        router.switch(Some("missing"), None);
        cb("a");
        router.switch(None, None);
        cb("b");
        router.switch(Some("edit"), None);
        cb("c");
        assert_eq!(
            *log.borrow(),
            ["fallback:None:a", "fallback:None:b", "edit:None:c"]
        );
    }

    #[test]
    fn default_scope_uses_fallback_from_the_start() {
        let log = Log::default();
        let rules = ScopeRules::new().with_fallback(recorder(&log, "fallback"));
        rules.add_rule("default", recorder(&log, "default-entry"));
        let router = ScopeRouter::new();
        let cb = router.bind_rules(&rules);
        cb("x");
        assert_eq!(*log.borrow(), ["fallback:None:x"]);
        assert!(rules.get("default").is_some(), "the entry itself is kept");
    }

    #[test]
    fn empty_scope_name_means_default() {
        let log = Log::default();
        let rules = ScopeRules::new();
        rules.add_rule("default", recorder(&log, "default"));
        rules.add_rule("", recorder(&log, "empty"));
        let router = ScopeRouter::with_scope("");
        assert_eq!(router.scope(), DEFAULT_SCOPE);
        let cb = router.bind_rules(&rules);

        router.switch(Some("edit"), Some(1));
        router.switch(Some(""), Some(2));
        assert_eq!(router.scope(), DEFAULT_SCOPE);
        cb("x");
        assert_eq!(*log.borrow(), ["default:Some(2):x"]);
    }

    #[test]
    fn switch_without_arguments_returns_to_default_and_clears_payload() {
        let router = ScopeRouter::with_scope("edit");
        router.switch(Some("edit"), Some(1_u32));
        router.switch(None, None);
        assert_eq!(router.scope(), DEFAULT_SCOPE);
        assert!(router.payload().is_none());
    }

    #[test]
    fn rules_added_after_binding_are_visible() {
        let log = Log::default();
        let rules = ScopeRules::new();
        let router = ScopeRouter::new();
        let cb = router.bind_rules(&rules);
        cb("early");
        rules.add_rule("default", recorder(&log, "default"));
        cb("late");
        assert_eq!(*log.borrow(), ["default:None:late"]);
        assert_eq!(rules.len(), 1);
        assert!(rules.get("default").is_some());
        assert!(rules.get("edit").is_none());
    }

    #[test]
    fn handler_may_switch_scope_while_running() {
        let log = Log::default();
        let router: ScopeRouter<u32> = ScopeRouter::new();
        let rules = ScopeRules::new();
        let inner = router.clone();
        rules.add_rule("default", move |_: Option<&u32>, _: &'static str| {
            inner.switch(Some("edit"), Some(3));
        });
        rules.add_rule("edit", recorder(&log, "edit"));
        let cb = router.bind_rules(&rules);

        cb("first");
        cb("second");
        assert_eq!(*log.borrow(), vec![String::from("edit:Some(3):second")]);
    }
}
