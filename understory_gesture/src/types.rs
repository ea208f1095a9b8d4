// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types: buttons, gesture types, raw pointer events and listener tags.

use core::fmt;
use core::str::FromStr;
#[cfg(target_has_atomic = "ptr")]
use core::sync::atomic::{AtomicUsize, Ordering};

use kurbo::Point;

use crate::error::ConfigError;

/// Mouse button tracked by the gesture state machine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Button {
    /// Primary button.
    Left,
    /// Middle button (wheel press).
    Center,
    /// Secondary button.
    Right,
}

impl Button {
    /// All buttons, in state-table order.
    pub const ALL: [Self; 3] = [Self::Left, Self::Center, Self::Right];

    /// Map a platform button number (`0` left, `1` middle, `2` right).
    ///
    /// Other buttons (back/forward) are not tracked and yield `None`.
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Left),
            1 => Some(Self::Center),
            2 => Some(Self::Right),
            _ => None,
        }
    }

    pub(crate) const fn slot(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Center => 1,
            Self::Right => 2,
        }
    }

    /// Gesture type for a press of this button.
    pub const fn down(self) -> GestureType {
        match self {
            Self::Left => GestureType::DownLeft,
            Self::Center => GestureType::DownCenter,
            Self::Right => GestureType::DownRight,
        }
    }

    /// Gesture type for a release of this button.
    pub const fn up(self) -> GestureType {
        match self {
            Self::Left => GestureType::UpLeft,
            Self::Center => GestureType::UpCenter,
            Self::Right => GestureType::UpRight,
        }
    }

    /// Gesture type for a single click of this button.
    pub const fn click(self) -> GestureType {
        match self {
            Self::Left => GestureType::ClickLeft,
            Self::Center => GestureType::ClickCenter,
            Self::Right => GestureType::ClickRight,
        }
    }

    /// Gesture type for a double click of this button.
    pub const fn double_click(self) -> GestureType {
        match self {
            Self::Left => GestureType::DoubleClickLeft,
            Self::Center => GestureType::DoubleClickCenter,
            Self::Right => GestureType::DoubleClickRight,
        }
    }

    /// Gesture type for a long click of this button.
    pub const fn long_click(self) -> GestureType {
        match self {
            Self::Left => GestureType::LongClickLeft,
            Self::Center => GestureType::LongClickCenter,
            Self::Right => GestureType::LongClickRight,
        }
    }
}

/// The sixteen recognized gesture types.
///
/// Raw gestures (`Down*`, `Up*`, `Move`) map one to one to pointer events.
/// Synthetic gestures (`Click*`, `DoubleClick*`, `LongClick*`) are produced by
/// the per-button state machine from press/release timing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GestureType {
    /// Left button pressed.
    DownLeft,
    /// Right button pressed.
    DownRight,
    /// Middle button pressed.
    DownCenter,
    /// Left button released.
    UpLeft,
    /// Right button released.
    UpRight,
    /// Middle button released.
    UpCenter,
    /// Left button clicked.
    ClickLeft,
    /// Right button clicked.
    ClickRight,
    /// Middle button clicked.
    ClickCenter,
    /// Left button double-clicked.
    DoubleClickLeft,
    /// Right button double-clicked.
    DoubleClickRight,
    /// Middle button double-clicked.
    DoubleClickCenter,
    /// Left button held past the long-click duration.
    LongClickLeft,
    /// Right button held past the long-click duration.
    LongClickRight,
    /// Middle button held past the long-click duration.
    LongClickCenter,
    /// Pointer moved.
    Move,
}

impl GestureType {
    /// Number of gesture types.
    pub const COUNT: usize = 16;

    /// All gesture types, in table order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::DownLeft,
        Self::DownRight,
        Self::DownCenter,
        Self::UpLeft,
        Self::UpRight,
        Self::UpCenter,
        Self::ClickLeft,
        Self::ClickRight,
        Self::ClickCenter,
        Self::DoubleClickLeft,
        Self::DoubleClickRight,
        Self::DoubleClickCenter,
        Self::LongClickLeft,
        Self::LongClickRight,
        Self::LongClickCenter,
        Self::Move,
    ];

    pub(crate) const fn index(self) -> usize {
        self as usize
    }

    /// The camelCase configuration name, e.g. `"doubleClickLeft"`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DownLeft => "downLeft",
            Self::DownRight => "downRight",
            Self::DownCenter => "downCenter",
            Self::UpLeft => "upLeft",
            Self::UpRight => "upRight",
            Self::UpCenter => "upCenter",
            Self::ClickLeft => "clickLeft",
            Self::ClickRight => "clickRight",
            Self::ClickCenter => "clickCenter",
            Self::DoubleClickLeft => "doubleClickLeft",
            Self::DoubleClickRight => "doubleClickRight",
            Self::DoubleClickCenter => "doubleClickCenter",
            Self::LongClickLeft => "longClickLeft",
            Self::LongClickRight => "longClickRight",
            Self::LongClickCenter => "longClickCenter",
            Self::Move => "move",
        }
    }
}

impl fmt::Display for GestureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GestureType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownGesture(s.into()))
    }
}

/// Kind of raw pointer event delivered by a [`PointerSource`](crate::source::PointerSource).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PointerKind {
    /// Button pressed.
    Press,
    /// Button released.
    Release,
    /// Pointer moved.
    Move,
}

/// A raw pointer event on the bound root or one of its descendants.
#[derive(Clone, Debug, PartialEq)]
pub struct PointerEvent<N> {
    /// Event kind.
    pub kind: PointerKind,
    /// Button for press/release; ignored for moves.
    pub button: Button,
    /// Concrete node the platform reported as the event target.
    pub target: N,
    /// Pointer position in the root's coordinate space.
    pub position: Point,
    /// Event timestamp in milliseconds.
    pub timestamp: u64,
    /// Set when the dispatcher wants the platform default action suppressed.
    pub default_prevented: bool,
}

impl<N> PointerEvent<N> {
    /// A press of `button` on `target`.
    pub fn press(button: Button, target: N, position: Point, timestamp: u64) -> Self {
        Self::new(PointerKind::Press, button, target, position, timestamp)
    }

    /// A release of `button` on `target`.
    pub fn release(button: Button, target: N, position: Point, timestamp: u64) -> Self {
        Self::new(PointerKind::Release, button, target, position, timestamp)
    }

    /// A pointer move over `target`.
    pub fn moved(target: N, position: Point, timestamp: u64) -> Self {
        Self::new(PointerKind::Move, Button::Left, target, position, timestamp)
    }

    fn new(kind: PointerKind, button: Button, target: N, position: Point, timestamp: u64) -> Self {
        Self {
            kind,
            button,
            target,
            position,
            timestamp,
            default_prevented: false,
        }
    }

    /// Ask the platform to skip its default action for this event.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }
}

/// Unique per-dispatcher identifier used to tag listeners and timers.
///
/// Tags from [`ListenerTag::next`] are allocated from a process-wide counter.
/// On targets without pointer-width atomics the counter is unavailable; pick
/// tags with [`ListenerTag::from_raw`] and pass them to
/// [`Dispatcher::with_tag`](crate::dispatcher::Dispatcher::with_tag).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerTag(u64);

impl ListenerTag {
    /// Allocate a fresh tag, distinct from every other tag this counter handed out.
    #[cfg(target_has_atomic = "ptr")]
    pub fn next() -> Self {
        static NEXT: AtomicUsize = AtomicUsize::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed) as u64)
    }

    /// Wrap a caller-chosen value. The caller keeps tags of dispatchers
    /// sharing a pointer source distinct.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw tag value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gesture-{:x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gesture_names_round_trip_for_every_type() {
        for g in GestureType::ALL {
            assert_eq!(g.as_str().parse::<GestureType>().ok(), Some(g), "{g}");
        }
    }

    #[test]
    fn unknown_gesture_name_is_rejected() {
        let err = "tripleClickLeft".parse::<GestureType>().unwrap_err();
        assert_eq!(err, ConfigError::UnknownGesture("tripleClickLeft".into()));
    }

    #[test]
    fn table_order_matches_index() {
        for (i, g) in GestureType::ALL.into_iter().enumerate() {
            assert_eq!(g.index(), i, "{g} is out of table order");
        }
    }

    #[test]
    fn button_indices_follow_platform_numbering() {
        assert_eq!(Button::from_index(0), Some(Button::Left));
        assert_eq!(Button::from_index(1), Some(Button::Center));
        assert_eq!(Button::from_index(2), Some(Button::Right));
        assert_eq!(Button::from_index(3), None);
    }

    #[test]
    fn per_button_gestures_are_distinct() {
        assert_eq!(Button::Right.double_click(), GestureType::DoubleClickRight);
        assert_eq!(Button::Center.long_click(), GestureType::LongClickCenter);
        assert_eq!(Button::Left.up(), GestureType::UpLeft);
    }

    #[test]
    fn raw_tags_keep_their_value() {
        let tag = ListenerTag::from_raw(0x2a);
        assert_eq!(tag.get(), 0x2a);
        assert_eq!(alloc::format!("{tag}"), "gesture-2a");
    }

    #[test]
    fn listener_tags_are_unique() {
        let a = ListenerTag::next();
        let b = ListenerTag::next();
        assert_ne!(a, b);
    }
}
