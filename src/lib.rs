#![cfg_attr(not(test), no_std)]

pub mod engine;
pub mod pipeline;
mod timer;
pub mod trace;
pub mod types;

pub use engine::{ButtonEvents, FrameOutput, TapEngine};
pub use types::{
    ButtonEvent, ButtonMap, ButtonState, DeviceCaps, FrameTouch, PointerButton, TapEvent,
    TapState, TouchFrame, TouchPoint, TouchRawState, TouchTapState, MAX_TOUCH_SLOTS,
};
