//! The tap-to-click engine: global machine state, per-touch slots, timer
//! ownership, configuration and lifecycle.
//!
//! The engine is pure: it consumes decoded frames and timeout wakeups and
//! returns the synthetic button events each step produced. Scheduling the
//! timer deadline and forwarding button events is the host's job (see
//! `pipeline` for the channel-based integration).

mod frame;
mod machine;


use crate::timer::TapTimer;
use crate::trace::TapTraceSample;
use crate::types::{
    ButtonEvent, ButtonMap, ButtonState, DeviceCaps, TapEvent, TapState, TouchPoint,
    TouchTapState, MAX_TOUCH_SLOTS,
};

const TAP_TIMEOUT_US: u64 = 180_000;
const DRAG_TIMEOUT_US: u64 = 300_000;
const MOTION_THRESHOLD_MM: f32 = 1.3;

/// Upper bound on button events a single step can produce (a forced
/// release-all plus a completing two-finger tap stays well below this).
pub const MAX_BUTTON_EVENTS: usize = 8;

pub type ButtonEvents = heapless::Vec<ButtonEvent, MAX_BUTTON_EVENTS>;

/// Result of one frame: the emitted button events plus whether pointer
/// motion should be suppressed while a tap decision is pending.
#[derive(Clone, Debug, Default)]
pub struct FrameOutput {
    pub filter_motion: bool,
    pub buttons: ButtonEvents,
}

/// Per-slot tap bookkeeping, separate from the global machine state: each
/// admitted touch can be disqualified on its own without the machine
/// leaving a multi-finger state.
#[derive(Clone, Copy, Debug, Default)]
struct TouchSlot {
    tap_state: TouchTapState,
    /// Latched for the touch's lifetime once set.
    is_thumb: bool,
    /// Latched for the touch's lifetime once set.
    is_palm: bool,
    /// Position at admission, for the motion threshold.
    initial: TouchPoint,
}

#[derive(Debug, Default)]
pub(crate) struct DispatchContext {
    buttons: ButtonEvents,
}

impl DispatchContext {
    fn emit(&mut self, event: ButtonEvent) {
        // Capacity covers the worst frame; dropping would unbalance the
        // pressed bitmask, so treat overflow as a driver bug in test builds.
        let overflow = self.buttons.push(event).is_err();
        debug_assert!(!overflow);
    }

    fn finish(self) -> ButtonEvents {
        self.buttons
    }
}

pub struct TapEngine {
    state: TapState,
    /// Touches currently live for tap purposes; palms and thumbs excluded.
    nfingers_down: u8,
    saved_press_time: u64,
    saved_release_time: u64,
    /// Bitmask of synthetic buttons currently held, keyed by finger count.
    buttons_pressed: u8,
    map: ButtonMap,
    want_map: ButtonMap,
    enabled: bool,
    suspended: bool,
    drag_enabled: bool,
    drag_lock_enabled: bool,
    timer: TapTimer,
    touches: [TouchSlot; MAX_TOUCH_SLOTS],
    caps: DeviceCaps,
    last_transition: Option<TapTraceSample>,
}

impl TapEngine {
    pub fn new(caps: DeviceCaps) -> Self {
        Self {
            state: TapState::Idle,
            nfingers_down: 0,
            saved_press_time: 0,
            saved_release_time: 0,
            buttons_pressed: 0,
            map: Self::default_map(),
            want_map: Self::default_map(),
            enabled: Self::default_enabled(&caps),
            suspended: false,
            drag_enabled: Self::default_drag_enabled(),
            drag_lock_enabled: Self::default_drag_lock_enabled(),
            timer: TapTimer::new(),
            touches: [TouchSlot::default(); MAX_TOUCH_SLOTS],
            caps,
            last_transition: None,
        }
    }

    /// Tapping is on by default only when the device has no other way to
    /// produce a left click.
    pub fn default_enabled(caps: &DeviceCaps) -> bool {
        !caps.has_left_button
    }

    pub const fn default_map() -> ButtonMap {
        ButtonMap::Lrm
    }

    pub const fn default_drag_enabled() -> bool {
        true
    }

    pub const fn default_drag_lock_enabled() -> bool {
        false
    }

    pub fn state(&self) -> TapState {
        self.state
    }

    /// Most recent state transition, for debugging.
    pub fn last_transition(&self) -> Option<TapTraceSample> {
        self.last_transition
    }

    /// Absolute deadline the host must wake the engine at, if any.
    pub fn timer_deadline_us(&self) -> Option<u64> {
        self.timer.deadline_us()
    }

    /// True while a tap-initiated drag holds the button.
    pub fn dragging(&self) -> bool {
        matches!(
            self.state,
            TapState::Dragging
                | TapState::Dragging2
                | TapState::DraggingWait
                | TapState::DraggingOrTap
        )
    }

    /// Number of fingers tap configuration supports on this device.
    pub fn count(&self) -> u8 {
        self.caps.num_touches.min(3)
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool, now_us: u64) -> ButtonEvents {
        self.enabled_update(self.suspended, enabled, now_us)
    }

    pub fn suspend(&mut self, now_us: u64) -> ButtonEvents {
        self.enabled_update(true, self.enabled, now_us)
    }

    pub fn resume(&mut self, now_us: u64) -> ButtonEvents {
        self.enabled_update(false, self.enabled, now_us)
    }

    /// The map as requested; it becomes active only once the machine is
    /// idle.
    pub fn map(&self) -> ButtonMap {
        self.want_map
    }

    /// The map current emissions go through.
    pub fn active_map(&self) -> ButtonMap {
        self.map
    }

    pub fn set_map(&mut self, map: ButtonMap) {
        self.want_map = map;
        self.update_map();
    }

    pub fn drag_enabled(&self) -> bool {
        self.drag_enabled
    }

    pub fn set_drag_enabled(&mut self, enabled: bool) {
        self.drag_enabled = enabled;
    }

    pub fn drag_lock_enabled(&self) -> bool {
        self.drag_lock_enabled
    }

    pub fn set_drag_lock_enabled(&mut self, enabled: bool) {
        self.drag_lock_enabled = enabled;
    }

    /// Per-frame hook after `handle_frame`: applies a deferred map switch.
    pub fn post_process(&mut self) {
        self.update_map();
    }

    /// The timer fired. Injects the timeout event, then disqualifies every
    /// touch that was still a tap candidate; a timed-out frame cannot be
    /// rescued.
    pub fn handle_timeout(&mut self, now_us: u64) -> ButtonEvents {
        let mut ctx = DispatchContext::default();
        self.handle_event(&mut ctx, None, TapEvent::Timeout, now_us);

        for slot in self.touches.iter_mut() {
            if slot.tap_state == TouchTapState::Touch {
                slot.tap_state = TouchTapState::Dead;
            }
        }

        ctx.finish()
    }

    /// Force-release any held synthetic buttons and reset the machine.
    pub fn release_all(&mut self, now_us: u64) -> ButtonEvents {
        let mut ctx = DispatchContext::default();
        self.release_all_into(&mut ctx, now_us);
        ctx.finish()
    }

    /// Cancel the timer on teardown; no further wakeups may arrive.
    pub fn teardown(&mut self) {
        self.timer.cancel();
    }

    fn tap_enabled(&self) -> bool {
        self.enabled && !self.suspended
    }

    fn update_map(&mut self) {
        if self.state != TapState::Idle {
            return;
        }

        if self.map != self.want_map {
            self.map = self.want_map;
        }
    }

    fn enabled_update(&mut self, suspended: bool, enabled: bool, now_us: u64) -> ButtonEvents {
        let was_enabled = self.tap_enabled();

        self.suspended = suspended;
        self.enabled = enabled;

        let mut ctx = DispatchContext::default();
        if self.tap_enabled() != was_enabled {
            if self.tap_enabled() {
                // The machine has no idea what the current touches were
                // doing while tapping was off; neutralize them all and
                // start over.
                self.neutralize_touches();
                self.state = TapState::Idle;
                self.nfingers_down = 0;
                self.timer.cancel();
            } else {
                self.release_all_into(&mut ctx, now_us);
            }
        }

        ctx.finish()
    }

    fn release_all_into(&mut self, ctx: &mut DispatchContext, now_us: u64) {
        for nfingers in 1..=3u8 {
            if self.buttons_pressed & (1 << nfingers) != 0 {
                self.notify(ctx, now_us, nfingers, ButtonState::Released);
            }
        }

        self.neutralize_touches();
        self.state = TapState::Idle;
        self.nfingers_down = 0;
        self.timer.cancel();
    }

    /// Treat every current touch as a palm so nothing in flight can finish
    /// a tap. A later begin on the slot resets it.
    fn neutralize_touches(&mut self) {
        for slot in self.touches.iter_mut() {
            slot.is_palm = true;
            slot.tap_state = TouchTapState::Dead;
        }
    }
}
