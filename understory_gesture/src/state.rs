// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-button gesture state machine.
//!
//! Turns raw press/release timing into `down`/`up`, `click`, `doubleClick` and
//! `longClick` emissions. Each of the three buttons is tracked independently.
//! The machine never runs handlers or matches rules; it returns the
//! [`Emission`]s an event produced, in order, and the
//! [`Dispatcher`](crate::dispatcher::Dispatcher) resolves and invokes them.
//!
//! ## Transitions
//!
//! Press:
//! - records the press target;
//! - if the double-click window is open, closes it and emits `doubleClick`
//!   only (no `down`);
//! - otherwise arms the long-click timer (when a long-click rule exists for the
//!   button) and emits `down`.
//!
//! Release:
//! - emits `up`;
//! - if the long-click timer already fired, emits `longClick` and stops;
//! - otherwise cancels the long-click timer, then either opens the
//!   double-click window (when a double-click rule exists), swallows the
//!   release that completed a double click, or emits `click` right away.
//!
//! `click` only fires when the release lands on the node the press started on.
//!
//! Timers are armed through [`Timers`] with a [`TimerToken`]; when the host
//! hands a token back, [`GestureStateMachine::fire`] ignores it unless it was
//! armed by this machine, in the current generation, and is still the armed
//! timer of its slot. [`GestureStateMachine::reset`] bumps the generation.

use core::mem;

use smallvec::SmallVec;

use crate::rules::RuleSet;
use crate::throttle::DEFAULT_COOLDOWN;
use crate::timer::{TimerHandle, TimerKind, TimerToken, Timers};
use crate::types::{Button, GestureType, ListenerTag, PointerEvent};

/// Default long-press duration in milliseconds.
pub const DEFAULT_LONG_CLICK: u64 = 600;

/// Default double-click window in milliseconds.
pub const DEFAULT_DOUBLE_CLICK: u64 = 200;

/// Timing configuration.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GestureConfig {
    /// Hold duration after which a release counts as a long click.
    pub long_click: u64,
    /// Window after a release during which a second press is a double click.
    pub double_click: u64,
    /// Cooldown between admitted move events; `None` disables throttling.
    pub move_throttle: Option<u64>,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            long_click: DEFAULT_LONG_CLICK,
            double_click: DEFAULT_DOUBLE_CLICK,
            move_throttle: Some(DEFAULT_COOLDOWN),
        }
    }
}

/// State of one per-button timer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TimerSlot {
    /// No timer pending.
    #[default]
    Inactive,
    /// Timer scheduled and not yet fired.
    Armed {
        /// Host handle, used to cancel.
        handle: TimerHandle,
        /// Serial carried by the token.
        serial: u64,
    },
    /// Long click: the hold duration elapsed. Double click: the second press
    /// was consumed and the matching release must be swallowed.
    Ready,
}

impl TimerSlot {
    /// True if a timer is scheduled.
    pub fn is_armed(&self) -> bool {
        matches!(self, Self::Armed { .. })
    }

    /// True if the slot is ready.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// True unless the slot is inactive.
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Inactive)
    }

    fn handle(&self) -> Option<TimerHandle> {
        match self {
            Self::Armed { handle, .. } => Some(*handle),
            _ => None,
        }
    }

    fn is_armed_with(&self, serial: u64) -> bool {
        matches!(self, Self::Armed { serial: s, .. } if *s == serial)
    }
}

/// Press and timer state of one button.
#[derive(Clone, Debug, PartialEq)]
pub struct ButtonState<N> {
    /// Button is currently held.
    pub pressed: bool,
    /// Long-click timer.
    pub long_click: TimerSlot,
    /// Double-click window.
    pub double_click: TimerSlot,
    /// Target of the most recent press.
    pub last_active_target: Option<N>,
    /// Release waiting for the double-click window to close.
    pending_click: Option<PointerEvent<N>>,
}

impl<N> ButtonState<N> {
    /// Idle state.
    pub const fn new() -> Self {
        Self {
            pressed: false,
            long_click: TimerSlot::Inactive,
            double_click: TimerSlot::Inactive,
            last_active_target: None,
            pending_click: None,
        }
    }

    /// True if nothing is pressed or pending.
    pub fn is_idle(&self) -> bool {
        !self.pressed && !self.long_click.is_active() && !self.double_click.is_active()
    }
}

impl<N> Default for ButtonState<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// A gesture produced by the state machine, with the raw event it reports.
#[derive(Clone, Debug, PartialEq)]
pub struct Emission<N> {
    /// Gesture to resolve against the rules.
    pub gesture: GestureType,
    /// Raw event passed to handlers; its target is the matching target.
    pub event: PointerEvent<N>,
}

/// Emissions of one transition, in invocation order.
pub type Emissions<N> = SmallVec<[Emission<N>; 2]>;

/// Three independent button state machines sharing one timer generation.
#[derive(Clone, Debug)]
pub struct GestureStateMachine<N> {
    tag: ListenerTag,
    generation: u64,
    serial: u64,
    config: GestureConfig,
    buttons: [ButtonState<N>; 3],
}

impl<N: Copy + Eq> GestureStateMachine<N> {
    /// Create an idle machine whose timers are tagged with `tag`.
    pub fn new(tag: ListenerTag, config: GestureConfig) -> Self {
        Self {
            tag,
            generation: 0,
            serial: 0,
            config,
            buttons: [ButtonState::new(), ButtonState::new(), ButtonState::new()],
        }
    }

    /// Timing configuration.
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Teardown generation; advanced by every [`reset`](Self::reset).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// State of one button.
    pub fn button(&self, button: Button) -> &ButtonState<N> {
        &self.buttons[button.slot()]
    }

    /// Process a press.
    pub fn press<S>(
        &mut self,
        ev: &PointerEvent<N>,
        rules: &RuleSet<N, S>,
        timers: &mut (impl Timers + ?Sized),
    ) -> Emissions<N> {
        let button = ev.button;
        let i = button.slot();
        let mut out = Emissions::new();

        let state = &mut self.buttons[i];
        state.pressed = true;
        state.last_active_target = Some(ev.target);

        if state.double_click.is_active() {
            if let Some(handle) = state.double_click.handle() {
                timers.cancel(handle);
            }
            state.double_click = TimerSlot::Ready;
            state.pending_click = None;
            out.push(emit(button.double_click(), ev));
            return out;
        }

        if rules.has(button.long_click()) {
            if let Some(handle) = self.buttons[i].long_click.handle() {
                timers.cancel(handle);
            }
            let delay = self.config.long_click;
            let slot = self.arm(button, TimerKind::LongClick, delay, timers);
            self.buttons[i].long_click = slot;
        }

        out.push(emit(button.down(), ev));
        out
    }

    /// Process a release.
    pub fn release<S>(
        &mut self,
        ev: &PointerEvent<N>,
        rules: &RuleSet<N, S>,
        timers: &mut (impl Timers + ?Sized),
    ) -> Emissions<N> {
        let button = ev.button;
        let i = button.slot();
        let mut out = Emissions::new();

        self.buttons[i].pressed = false;
        out.push(emit(button.up(), ev));

        match mem::take(&mut self.buttons[i].long_click) {
            TimerSlot::Ready => {
                out.push(emit(button.long_click(), ev));
                return out;
            }
            TimerSlot::Armed { handle, .. } => timers.cancel(handle),
            TimerSlot::Inactive => {}
        }

        let double_ready = self.buttons[i].double_click.is_ready();
        if !double_ready && rules.has(button.double_click()) {
            if let Some(handle) = self.buttons[i].double_click.handle() {
                timers.cancel(handle);
            }
            let delay = self.config.double_click;
            let slot = self.arm(button, TimerKind::DoubleClick, delay, timers);
            let state = &mut self.buttons[i];
            state.double_click = slot;
            state.pending_click = Some(ev.clone());
            return out;
        }

        if double_ready {
            // Second release of a double click; the press already emitted it.
            self.buttons[i].double_click = TimerSlot::Inactive;
            return out;
        }

        if self.buttons[i].last_active_target == Some(ev.target) {
            out.push(emit(button.click(), ev));
        }
        out
    }

    /// Process a fired timer. Stale tokens are ignored.
    pub fn fire(&mut self, token: TimerToken) -> Option<Emission<N>> {
        if token.tag != self.tag || token.generation != self.generation {
            log::debug!(
                "{}: ignoring stale {:?} timer for {:?}",
                self.tag,
                token.kind,
                token.button
            );
            return None;
        }
        let state = &mut self.buttons[token.button.slot()];
        let slot = match token.kind {
            TimerKind::LongClick => &mut state.long_click,
            TimerKind::DoubleClick => &mut state.double_click,
        };
        if !slot.is_armed_with(token.serial) {
            log::debug!(
                "{}: ignoring superseded {:?} timer for {:?}",
                self.tag,
                token.kind,
                token.button
            );
            return None;
        }
        match token.kind {
            TimerKind::LongClick => {
                *slot = TimerSlot::Ready;
                None
            }
            TimerKind::DoubleClick => {
                *slot = TimerSlot::Inactive;
                let ev = state.pending_click.take()?;
                (state.last_active_target == Some(ev.target))
                    .then(|| Emission {
                        gesture: token.button.click(),
                        event: ev,
                    })
            }
        }
    }

    /// Cancel every armed timer, return all buttons to idle and invalidate
    /// outstanding tokens.
    pub fn reset(&mut self, timers: &mut (impl Timers + ?Sized)) {
        for state in &mut self.buttons {
            for handle in [state.long_click.handle(), state.double_click.handle()]
                .into_iter()
                .flatten()
            {
                timers.cancel(handle);
            }
            *state = ButtonState::new();
        }
        self.generation += 1;
    }

    fn arm(
        &mut self,
        button: Button,
        kind: TimerKind,
        delay: u64,
        timers: &mut (impl Timers + ?Sized),
    ) -> TimerSlot {
        self.serial += 1;
        let token = TimerToken {
            tag: self.tag,
            generation: self.generation,
            serial: self.serial,
            button,
            kind,
        };
        let handle = timers.schedule(delay, token);
        TimerSlot::Armed {
            handle,
            serial: self.serial,
        }
    }
}

fn emit<N: Copy>(gesture: GestureType, ev: &PointerEvent<N>) -> Emission<N> {
    Emission {
        gesture,
        event: ev.clone(),
    }
}
