//! Event dispatch: table lookup, guard resolution and action interpretation.

mod transitions;

use transitions::{Action, Rule, Stamp};

use super::{DispatchContext, TapEngine, DRAG_TIMEOUT_US, TAP_TIMEOUT_US};
use crate::trace::TapTraceSample;
use crate::types::{ButtonState, TapEvent, TapState, TouchTapState};

impl TapEngine {
    /// Run one event through the machine.
    ///
    /// `touch` is the slot index of the touch the event belongs to; timer
    /// and clickpad button events carry none.
    pub(crate) fn handle_event(
        &mut self,
        ctx: &mut DispatchContext,
        touch: Option<usize>,
        event: TapEvent,
        time: u64,
    ) {
        let current = self.state;

        match transitions::rule(current, event) {
            Rule::Stay => {}
            Rule::Bug => self.log_bug(touch, event),
            Rule::To(next, actions) => {
                self.apply_actions(ctx, touch, actions, time);
                self.state = next;
            }
            Rule::SingleRelease => {
                self.notify(ctx, self.saved_press_time, 1, ButtonState::Pressed);
                if self.drag_enabled {
                    self.state = TapState::Tapped;
                    self.saved_release_time = time;
                    self.timer.set(time + TAP_TIMEOUT_US);
                } else {
                    self.notify(ctx, time, 1, ButtonState::Released);
                    self.state = TapState::Idle;
                }
            }
            Rule::Touch2ReleasePalm => {
                // Only one press time is saved and the last touch down
                // overwrote it, so this may be the palm's press time rather
                // than the surviving finger's.
                self.notify(ctx, self.saved_press_time, 1, ButtonState::Pressed);
                if self.drag_enabled {
                    self.state = TapState::Tapped;
                    self.saved_release_time = time;
                    self.timer.set(time + TAP_TIMEOUT_US);
                } else {
                    self.notify(ctx, time, 1, ButtonState::Released);
                    self.state = TapState::Idle;
                }
            }
            Rule::Touch3Release => {
                self.state = TapState::Touch2Hold;
                let candidate = touch
                    .map(|index| self.touches[index].tap_state == TouchTapState::Touch)
                    .unwrap_or(false);
                if candidate {
                    self.notify(ctx, self.saved_press_time, 3, ButtonState::Pressed);
                    self.notify(ctx, time, 3, ButtonState::Released);
                }
            }
            Rule::DraggingRelease => {
                if self.drag_lock_enabled {
                    self.state = TapState::DraggingWait;
                    self.timer.set(time + DRAG_TIMEOUT_US);
                } else {
                    self.notify(ctx, time, 1, ButtonState::Released);
                    self.state = TapState::Idle;
                }
            }
            Rule::DrainToIdle => {
                if self.nfingers_down == 0 {
                    self.state = TapState::Idle;
                }
            }
        }

        // A machine at rest or disqualified must never have a pending
        // timeout, no matter what the transition just armed.
        if matches!(self.state, TapState::Idle | TapState::Dead) {
            self.timer.cancel();
        }

        if current != self.state {
            self.record_transition(current, event, touch, time);
        }
    }

    fn apply_actions(
        &mut self,
        ctx: &mut DispatchContext,
        touch: Option<usize>,
        actions: &[Action],
        time: u64,
    ) {
        for action in actions {
            match *action {
                Action::SetTapTimer => self.timer.set(time + TAP_TIMEOUT_US),
                Action::SetDragTimer => self.timer.set(time + DRAG_TIMEOUT_US),
                Action::ClearTimer => self.timer.cancel(),
                Action::SavePress => self.saved_press_time = time,
                Action::SaveRelease => self.saved_release_time = time,
                Action::Press(nfingers, stamp) => {
                    let at = self.stamp_time(stamp, time);
                    self.notify(ctx, at, nfingers, ButtonState::Pressed);
                }
                Action::Release(nfingers, stamp) => {
                    let at = self.stamp_time(stamp, time);
                    self.notify(ctx, at, nfingers, ButtonState::Released);
                }
                Action::KillTouch => {
                    if let Some(index) = touch {
                        self.touches[index].tap_state = TouchTapState::Dead;
                    }
                }
                Action::MarkThumb => {
                    if let Some(index) = touch {
                        self.touches[index].is_thumb = true;
                        self.touches[index].tap_state = TouchTapState::Dead;
                        debug_assert!(self.nfingers_down >= 1);
                        self.nfingers_down = self.nfingers_down.saturating_sub(1);
                    }
                }
            }
        }
    }

    fn stamp_time(&self, stamp: Stamp, time: u64) -> u64 {
        match stamp {
            Stamp::Event => time,
            Stamp::SavedPress => self.saved_press_time,
            Stamp::SavedRelease => self.saved_release_time,
        }
    }

    /// Emit a button event through the active map and keep the pressed
    /// bitmask balanced. Taps above three fingers map to nothing.
    pub(super) fn notify(
        &mut self,
        ctx: &mut DispatchContext,
        time_us: u64,
        nfingers: u8,
        state: ButtonState,
    ) {
        let Some(button) = self.map.button(nfingers) else {
            return;
        };

        match state {
            ButtonState::Pressed => self.buttons_pressed |= 1 << nfingers,
            ButtonState::Released => self.buttons_pressed &= !(1 << nfingers),
        }

        ctx.emit(crate::types::ButtonEvent {
            time_us,
            button,
            state,
        });
    }

    fn log_bug(&self, _touch: Option<usize>, _event: TapEvent) {
        #[cfg(feature = "defmt")]
        defmt::warn!(
            "tap: touch {} invalid event {} in state {}",
            _touch.map(|index| index as i8).unwrap_or(-1),
            _event,
            self.state,
        );
    }

    fn record_transition(
        &mut self,
        from: TapState,
        event: TapEvent,
        touch: Option<usize>,
        time: u64,
    ) {
        self.last_transition = Some(TapTraceSample {
            time_us: time,
            touch: touch.map(|index| index as u8),
            event,
            from,
            to: self.state,
            nfingers_down: self.nfingers_down,
        });
        #[cfg(feature = "defmt")]
        defmt::debug!(
            "tap: touch {} state {} -> {} -> {}",
            touch.map(|index| index as i8).unwrap_or(-1),
            from,
            event,
            self.state,
        );
    }
}
