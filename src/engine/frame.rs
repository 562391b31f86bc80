//! Frame driver: walks every dirty touch once per input frame and feeds the
//! machine the events the frame implies, in a fixed order.

use super::{DispatchContext, FrameOutput, TapEngine, TouchSlot, MOTION_THRESHOLD_MM};
use crate::types::{FrameTouch, TapEvent, TapState, TouchFrame, TouchRawState, TouchTapState};

impl TapEngine {
    /// Process one decoded frame. Returns the emitted button events and
    /// whether pointer motion should be filtered while a tap decision is
    /// pending.
    pub fn handle_frame(&mut self, frame: &TouchFrame, time_us: u64) -> FrameOutput {
        let mut ctx = DispatchContext::default();

        if !self.tap_enabled() {
            return FrameOutput {
                filter_motion: false,
                buttons: ctx.finish(),
            };
        }

        // Physical clicks on a clickpad kill in-flight taps. Pads with
        // separate buttons keep tapping unaffected by clicks.
        if self.caps.is_clickpad && frame.button_press_queued {
            self.handle_event(&mut ctx, None, TapEvent::Button, time_us);
        }

        for (index, touch) in frame.touches.iter().enumerate() {
            if !touch.dirty || touch.raw == TouchRawState::None {
                continue;
            }

            // A new contact reuses the slot; drop the previous touch's
            // latches before classifying it.
            if touch.raw == TouchRawState::Begin {
                self.touches[index] = TouchSlot::default();
            }

            if self.caps.is_clickpad && frame.button_press_queued {
                self.touches[index].tap_state = TouchTapState::Dead;
            }

            // Once a thumb, always a thumb.
            if self.touches[index].is_thumb {
                continue;
            }

            // A palm still needs its release processed; the machine might be
            // anywhere. Everything else from it is ignored.
            if self.touches[index].is_palm {
                if touch.raw == TouchRawState::End {
                    self.handle_event(&mut ctx, Some(index), TapEvent::PalmUp, time_us);
                }
                continue;
            }

            if touch.raw == TouchRawState::Hovering {
                continue;
            }

            if touch.palm_detected {
                self.handle_event(&mut ctx, Some(index), TapEvent::Palm, time_us);
                self.touches[index].is_palm = true;
                self.touches[index].tap_state = TouchTapState::Dead;
                if touch.raw != TouchRawState::Begin {
                    debug_assert!(self.nfingers_down >= 1);
                    self.nfingers_down = self.nfingers_down.saturating_sub(1);
                }
            } else if touch.raw == TouchRawState::Begin {
                if touch.thumb_on_begin {
                    self.touches[index].is_thumb = true;
                    continue;
                }

                self.touches[index].tap_state = TouchTapState::Touch;
                self.touches[index].initial = touch.point;
                self.nfingers_down += 1;
                self.handle_event(&mut ctx, Some(index), TapEvent::Touch, time_us);

                // An initial palm-like contact is killed with a synthetic
                // motion event rather than a dedicated state.
                if touch.palm_on_begin {
                    self.handle_event(&mut ctx, Some(index), TapEvent::Motion, time_us);
                }
            } else if touch.raw == TouchRawState::End {
                if touch.was_down {
                    debug_assert!(self.nfingers_down >= 1);
                    self.nfingers_down = self.nfingers_down.saturating_sub(1);
                    self.handle_event(&mut ctx, Some(index), TapEvent::Release, time_us);
                }
                self.touches[index].tap_state = TouchTapState::Idle;
            } else if self.state != TapState::Idle && touch.thumb_in_progress {
                self.handle_event(&mut ctx, Some(index), TapEvent::Thumb, time_us);
            } else if self.state != TapState::Idle
                && self.exceeds_motion_threshold(frame, index, touch)
            {
                // One touch over the threshold disqualifies every candidate.
                for slot in self.touches.iter_mut() {
                    if slot.tap_state == TouchTapState::Touch {
                        slot.tap_state = TouchTapState::Dead;
                    }
                }

                self.handle_event(&mut ctx, Some(index), TapEvent::Motion, time_us);
            }
        }

        // While a tap decision is pending, small motion must not reach the
        // pointer; it would be replayed as a jump once the decision falls
        // the other way.
        let filter_motion = matches!(
            self.state,
            TapState::Touch
                | TapState::Tapped
                | TapState::DraggingOrDoubletap
                | TapState::DraggingOrTap
                | TapState::Touch2
                | TapState::Touch3
        );

        debug_assert!(self.nfingers_down <= frame.fingers_down);
        if frame.fingers_down == 0 {
            debug_assert_eq!(self.nfingers_down, 0);
        }

        FrameOutput {
            filter_motion,
            buttons: ctx.finish(),
        }
    }

    fn exceeds_motion_threshold(
        &self,
        frame: &TouchFrame,
        index: usize,
        touch: &FrameTouch,
    ) -> bool {
        // Serial Synaptics pads jump when tracking more fingers than slots;
        // letting that through would kill three-finger taps.
        if self.caps.synaptics_serial
            && (frame.fingers_down > 2 || frame.prev_fingers_down > 2)
            && (frame.fingers_down > self.caps.num_slots
                || frame.prev_fingers_down > self.caps.num_slots)
        {
            return false;
        }

        // Semi-mt bounding boxes move arbitrarily when a finger goes down
        // or up; ignore motion in the same frame as a finger change.
        if self.caps.semi_mt && frame.fingers_down != frame.prev_fingers_down {
            return false;
        }

        let initial = self.touches[index].initial;
        let dx = touch.point.x - initial.x;
        let dy = touch.point.y - initial.y;

        dx * dx + dy * dy > MOTION_THRESHOLD_MM * MOTION_THRESHOLD_MM
    }
}
