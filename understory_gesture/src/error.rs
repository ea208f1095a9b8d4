// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! Construction errors ([`ConfigError`], [`Error::InvalidTarget`]) are fatal and
//! returned synchronously. Handler failures never abort dispatch: every
//! collected handler runs, and the failures are reported together as
//! [`HandlerFailures`] once the event has been fully processed.

use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::types::GestureType;

/// A rule configuration that cannot be turned into a [`RuleSet`](crate::rules::RuleSet).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A named entry used a gesture name outside the sixteen recognized ones.
    #[error("unknown gesture type `{0}`")]
    UnknownGesture(String),
    /// The same gesture type was configured more than once.
    #[error("gesture type `{0}` is configured more than once")]
    DuplicateGesture(GestureType),
}

/// Errors returned when constructing a [`Dispatcher`](crate::dispatcher::Dispatcher).
///
/// Dispatchers take an already validated [`RuleSet`](crate::rules::RuleSet), so
/// [`Error::Config`] is never produced by the dispatcher itself. It exists so a
/// function that builds rules and binds them can use `?` on both steps:
///
/// ```
/// use understory_gesture::{ConfigError, Error, GestureType, RuleNode, RuleSet};
///
/// fn rules() -> Result<RuleSet<u32, ()>, Error> {
///     let set = RuleSet::builder()
///         .on(GestureType::ClickLeft, [RuleNode::node(1)])
///         .on(GestureType::ClickLeft, [RuleNode::node(2)])
///         .build()?;
///     Ok(set)
/// }
///
/// assert_eq!(
///     rules().unwrap_err(),
///     Error::Config(ConfigError::DuplicateGesture(GestureType::ClickLeft))
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The rules failed validation; converted from [`ConfigError`] by `?`.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The root is not a node of the tree.
    #[error("bound root is not a node of the tree")]
    InvalidTarget,
}

/// Failure reported by a user handler.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct HandlerError {
    message: Cow<'static, str>,
}

impl HandlerError {
    /// Create a handler error with a message.
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The failure message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Every handler failure raised while processing one pointer event or timer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HandlerFailures {
    failures: Vec<(GestureType, HandlerError)>,
}

impl HandlerFailures {
    pub(crate) fn push(&mut self, gesture: GestureType, error: HandlerError) {
        self.failures.push((gesture, error));
    }

    pub(crate) fn extend(&mut self, other: Self) {
        self.failures.extend(other.failures);
    }

    pub(crate) fn into_result(self) -> Result<(), Self> {
        if self.failures.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// Failures in invocation order, tagged with the gesture being emitted.
    pub fn failures(&self) -> &[(GestureType, HandlerError)] {
        &self.failures
    }

    /// Number of failed handler invocations.
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// True if no handler failed.
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for HandlerFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} gesture handler(s) failed", self.failures.len())?;
        for (gesture, error) in &self.failures {
            write!(f, "; {gesture}: {error}")?;
        }
        Ok(())
    }
}

impl core::error::Error for HandlerFailures {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        self.failures.first().map(|(_, e)| e as _)
    }
}
