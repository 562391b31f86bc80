use crate::types::{TapEvent, TapState};

/// Snapshot of the most recent state transition, kept for debugging.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TapTraceSample {
    pub time_us: u64,
    /// Slot index of the touch that produced the event, if any.
    pub touch: Option<u8>,
    pub event: TapEvent,
    pub from: TapState,
    pub to: TapState,
    pub nfingers_down: u8,
}
