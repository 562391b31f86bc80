//! Shared data model for the tap-to-click engine.
//!
//! Everything here is plain `Copy` data. Positions are in millimeters; the
//! host's device layer is responsible for resolution scaling before frames
//! reach the engine. Timestamps are monotonic microseconds.

/// Upper bound on tracked touch slots per device.
pub const MAX_TOUCH_SLOTS: usize = 16;

/// Global machine state, one per touchpad.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TapState {
    #[default]
    Idle,
    Touch,
    Hold,
    Tapped,
    Touch2,
    Touch2Hold,
    Touch2Release,
    Touch3,
    Touch3Hold,
    Dragging,
    DraggingWait,
    DraggingOrDoubletap,
    DraggingOrTap,
    Dragging2,
    Dead,
}

/// Events fed into the machine, either by the frame driver or the timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TapEvent {
    Touch,
    Motion,
    Release,
    Timeout,
    Button,
    Thumb,
    Palm,
    PalmUp,
}

/// Per-touch tap state, independent of the global machine state.
///
/// `Touch` means the contact is still a tap candidate; `Dead` means it has
/// been disqualified (motion, physical button, palm, thumb) and must not
/// produce further events beyond release bookkeeping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TouchTapState {
    #[default]
    Idle,
    Touch,
    Dead,
}

/// Raw per-frame touch lifecycle as decoded by the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TouchRawState {
    #[default]
    None,
    Begin,
    Update,
    End,
    Hovering,
}

/// Touch position in millimeters.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchPoint {
    pub x: f32,
    pub y: f32,
}

/// Which button an n-finger tap maps to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonMap {
    /// 1 finger left, 2 fingers right, 3 fingers middle.
    #[default]
    Lrm,
    /// 1 finger left, 2 fingers middle, 3 fingers right.
    Lmr,
}

impl ButtonMap {
    /// Button for an n-finger tap; taps above three fingers map to nothing.
    pub const fn button(self, nfingers: u8) -> Option<PointerButton> {
        match (self, nfingers) {
            (_, 1) => Some(PointerButton::Left),
            (ButtonMap::Lrm, 2) => Some(PointerButton::Right),
            (ButtonMap::Lrm, 3) => Some(PointerButton::Middle),
            (ButtonMap::Lmr, 2) => Some(PointerButton::Middle),
            (ButtonMap::Lmr, 3) => Some(PointerButton::Right),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PointerButton {
    Left,
    Right,
    Middle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonState {
    Pressed,
    Released,
}

/// A synthetic pointer-button event.
///
/// The timestamp is the semantic time of the press or release, which for
/// buffered tap decisions lies in the past relative to the frame that
/// produced the event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonEvent {
    pub time_us: u64,
    pub button: PointerButton,
    pub state: ButtonState,
}

/// One touch's view for the current frame.
///
/// The classifier fields carry pre-computed verdicts from the host's palm
/// and thumb detectors; the engine never inspects pressure or geometry
/// itself.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameTouch {
    pub raw: TouchRawState,
    pub point: TouchPoint,
    /// Whether this touch has ever been down (hovering contacts that lift
    /// without touching report `End` with `was_down == false`).
    pub was_down: bool,
    /// Whether this touch changed during the current frame.
    pub dirty: bool,
    /// External palm detector verdict for this touch, this frame.
    pub palm_detected: bool,
    /// Thumb pre-classifier verdict, only meaningful on `Begin`.
    pub thumb_on_begin: bool,
    /// Thumb classifier verdict for an already admitted touch.
    pub thumb_in_progress: bool,
    /// Palm-tap pre-classifier verdict, only meaningful on `Begin`.
    pub palm_on_begin: bool,
}

/// A decoded input frame. Slot index is the position in `touches`.
#[derive(Clone, Debug, Default)]
pub struct TouchFrame {
    pub touches: heapless::Vec<FrameTouch, MAX_TOUCH_SLOTS>,
    /// Device-level count of fingers down this frame, palms included.
    pub fingers_down: u8,
    /// Same count for the previous frame.
    pub prev_fingers_down: u8,
    /// A physical click was queued this frame (clickpads only).
    pub button_press_queued: bool,
}

/// Static device capabilities sampled at engine construction.
#[derive(Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceCaps {
    /// Maximum number of touches the device can report.
    pub num_touches: u8,
    /// Number of independent slots (may be below `num_touches` on serial
    /// Synaptics pads).
    pub num_slots: u8,
    /// Bounding-box device reporting two fake touches.
    pub semi_mt: bool,
    /// Serial Synaptics touchpad, known to jump when fingers exceed slots.
    pub synaptics_serial: bool,
    /// The whole pad is one physical button.
    pub is_clickpad: bool,
    /// The device has a separate physical left button.
    pub has_left_button: bool,
}
