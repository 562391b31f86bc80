//! The tap state machine's transition table.
//!
//! One entry per `(state, event)` pair. Most cells are unconditional and
//! carry their action list inline; the handful of cells whose outcome
//! depends on runtime configuration or per-touch state are marked with a
//! dedicated `Rule` variant and resolved by guards in the interpreter.
//!
//! Timestamps in actions are symbolic: a press or release is emitted either
//! at the event's own time or at one of the two saved timestamps, which is
//! how buffered tap decisions end up with button events dated in the past.

use crate::types::{TapEvent, TapState};

/// Which timestamp a button emission carries.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Stamp {
    /// The current event's timestamp.
    Event,
    /// The saved press time of the most recent admitted touch.
    SavedPress,
    /// The saved release time of the pending tap.
    SavedRelease,
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum Action {
    /// Arm the timer at event time + tap timeout.
    SetTapTimer,
    /// Arm the timer at event time + drag timeout.
    SetDragTimer,
    ClearTimer,
    SavePress,
    SaveRelease,
    Press(u8, Stamp),
    Release(u8, Stamp),
    /// Mark the event's touch as dead.
    KillTouch,
    /// Latch the event's touch as a thumb: dead, excluded from the finger
    /// count, ignored for the rest of its lifetime.
    MarkThumb,
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum Rule {
    /// Stay in state, do nothing.
    Stay,
    /// Impossible sequence from the frame driver; log and do nothing.
    Bug,
    /// Unconditional transition with an ordered action list.
    To(TapState, &'static [Action]),
    /// Single-finger release: emit the buffered press, then either hold the
    /// tap open for a drag or release immediately.
    SingleRelease,
    /// Palm demotion while a two-finger tap awaits its second release; the
    /// surviving finger becomes a single-finger tap.
    Touch2ReleasePalm,
    /// Three-finger release: emits only if the released touch is still a
    /// tap candidate.
    Touch3Release,
    /// Drag release: either park in the drag-lock window or finish.
    DraggingRelease,
    /// Dead state drains back to idle once the last finger lifts.
    DrainToIdle,
}

pub(crate) fn rule(state: TapState, event: TapEvent) -> Rule {
    use Action as A;
    use TapEvent as E;
    use TapState as S;

    match (state, event) {
        (S::Idle, E::Touch) => Rule::To(S::Touch, &[A::SavePress, A::SetTapTimer]),
        (S::Idle, E::Motion) | (S::Idle, E::Thumb) => Rule::Bug,
        (S::Idle, E::Button) => Rule::To(S::Dead, &[]),
        (S::Idle, E::Palm) => Rule::To(S::Idle, &[]),
        (S::Idle, _) => Rule::Stay,

        (S::Touch, E::Touch) => Rule::To(S::Touch2, &[A::SavePress, A::SetTapTimer]),
        (S::Touch, E::Motion) => Rule::To(S::Dead, &[A::KillTouch, A::ClearTimer]),
        (S::Touch, E::Release) => Rule::SingleRelease,
        (S::Touch, E::Timeout) => Rule::To(S::Hold, &[A::ClearTimer]),
        (S::Touch, E::Button) => Rule::To(S::Dead, &[]),
        (S::Touch, E::Thumb) => Rule::To(S::Idle, &[A::MarkThumb, A::ClearTimer]),
        (S::Touch, E::Palm) => Rule::To(S::Idle, &[A::ClearTimer]),
        (S::Touch, E::PalmUp) => Rule::Stay,

        (S::Hold, E::Touch) => Rule::To(S::Touch2, &[A::SavePress, A::SetTapTimer]),
        (S::Hold, E::Motion) => Rule::To(S::Dead, &[A::KillTouch, A::ClearTimer]),
        (S::Hold, E::Release) => Rule::To(S::Idle, &[]),
        (S::Hold, E::Button) => Rule::To(S::Dead, &[]),
        (S::Hold, E::Thumb) => Rule::To(S::Idle, &[A::MarkThumb]),
        (S::Hold, E::Palm) => Rule::To(S::Idle, &[]),
        (S::Hold, _) => Rule::Stay,

        (S::Tapped, E::Touch) => {
            Rule::To(S::DraggingOrDoubletap, &[A::SavePress, A::SetTapTimer])
        }
        (S::Tapped, E::Motion) | (S::Tapped, E::Release) | (S::Tapped, E::Thumb) => Rule::Bug,
        (S::Tapped, E::Timeout) => Rule::To(S::Idle, &[A::Release(1, Stamp::SavedRelease)]),
        (S::Tapped, E::Button) => Rule::To(S::Dead, &[A::Release(1, Stamp::SavedRelease)]),
        (S::Tapped, _) => Rule::Stay,

        (S::Touch2, E::Touch) => Rule::To(S::Touch3, &[A::SavePress, A::SetTapTimer]),
        (S::Touch2, E::Motion) => Rule::To(S::Dead, &[A::KillTouch, A::ClearTimer]),
        (S::Touch2, E::Release) => {
            Rule::To(S::Touch2Release, &[A::SaveRelease, A::SetTapTimer])
        }
        (S::Touch2, E::Timeout) => Rule::To(S::Touch2Hold, &[]),
        (S::Touch2, E::Button) => Rule::To(S::Dead, &[]),
        (S::Touch2, E::Palm) => Rule::To(S::Touch, &[A::SetTapTimer]),
        (S::Touch2, _) => Rule::Stay,

        (S::Touch2Hold, E::Touch) => Rule::To(S::Touch3, &[A::SavePress, A::SetTapTimer]),
        (S::Touch2Hold, E::Motion) => Rule::To(S::Dead, &[A::KillTouch, A::ClearTimer]),
        (S::Touch2Hold, E::Release) => Rule::To(S::Hold, &[]),
        (S::Touch2Hold, E::Timeout) => Rule::To(S::Touch2Hold, &[]),
        (S::Touch2Hold, E::Button) => Rule::To(S::Dead, &[]),
        (S::Touch2Hold, E::Palm) => Rule::To(S::Hold, &[]),
        (S::Touch2Hold, _) => Rule::Stay,

        (S::Touch2Release, E::Touch) => {
            Rule::To(S::Touch2Hold, &[A::KillTouch, A::ClearTimer])
        }
        (S::Touch2Release, E::Motion) => Rule::To(S::Dead, &[A::KillTouch, A::ClearTimer]),
        (S::Touch2Release, E::Release) => Rule::To(
            S::Idle,
            &[
                A::Press(2, Stamp::SavedPress),
                A::Release(2, Stamp::SavedRelease),
            ],
        ),
        (S::Touch2Release, E::Timeout) => Rule::To(S::Hold, &[]),
        (S::Touch2Release, E::Button) => Rule::To(S::Dead, &[]),
        (S::Touch2Release, E::Palm) => Rule::Touch2ReleasePalm,
        (S::Touch2Release, _) => Rule::Stay,

        (S::Touch3, E::Touch) => Rule::To(S::Dead, &[A::ClearTimer]),
        (S::Touch3, E::Motion) => Rule::To(S::Dead, &[A::KillTouch, A::ClearTimer]),
        (S::Touch3, E::Release) => Rule::Touch3Release,
        (S::Touch3, E::Timeout) => Rule::To(S::Touch3Hold, &[A::ClearTimer]),
        (S::Touch3, E::Button) => Rule::To(S::Dead, &[]),
        (S::Touch3, E::Palm) => Rule::To(S::Touch2, &[]),
        (S::Touch3, _) => Rule::Stay,

        (S::Touch3Hold, E::Touch) => Rule::To(S::Dead, &[A::SetTapTimer]),
        (S::Touch3Hold, E::Motion) => Rule::To(S::Dead, &[A::KillTouch, A::ClearTimer]),
        (S::Touch3Hold, E::Release) => Rule::To(S::Touch2Hold, &[]),
        (S::Touch3Hold, E::Button) => Rule::To(S::Dead, &[]),
        (S::Touch3Hold, E::Palm) => Rule::To(S::Touch2Hold, &[]),
        (S::Touch3Hold, _) => Rule::Stay,

        (S::DraggingOrDoubletap, E::Touch) => Rule::To(S::Dragging2, &[]),
        (S::DraggingOrDoubletap, E::Motion) | (S::DraggingOrDoubletap, E::Timeout) => {
            Rule::To(S::Dragging, &[])
        }
        (S::DraggingOrDoubletap, E::Release) => Rule::To(
            S::Tapped,
            &[
                A::Release(1, Stamp::SavedRelease),
                A::Press(1, Stamp::SavedPress),
                A::SaveRelease,
                A::SetTapTimer,
            ],
        ),
        (S::DraggingOrDoubletap, E::Button) => {
            Rule::To(S::Dead, &[A::Release(1, Stamp::SavedRelease)])
        }
        (S::DraggingOrDoubletap, E::Palm) => Rule::To(S::Tapped, &[]),
        (S::DraggingOrDoubletap, _) => Rule::Stay,

        (S::Dragging, E::Touch) => Rule::To(S::Dragging2, &[]),
        (S::Dragging, E::Release) => Rule::DraggingRelease,
        (S::Dragging, E::Button) => Rule::To(S::Dead, &[A::Release(1, Stamp::Event)]),
        (S::Dragging, E::Palm) => Rule::To(S::Idle, &[A::Release(1, Stamp::SavedRelease)]),
        (S::Dragging, _) => Rule::Stay,

        (S::DraggingWait, E::Touch) => Rule::To(S::DraggingOrTap, &[A::SetTapTimer]),
        (S::DraggingWait, E::Timeout) => Rule::To(S::Idle, &[A::Release(1, Stamp::Event)]),
        (S::DraggingWait, E::Button) => Rule::To(S::Dead, &[A::Release(1, Stamp::Event)]),
        (S::DraggingWait, _) => Rule::Stay,

        (S::DraggingOrTap, E::Touch) => Rule::To(S::Dragging2, &[A::ClearTimer]),
        (S::DraggingOrTap, E::Motion) | (S::DraggingOrTap, E::Timeout) => {
            Rule::To(S::Dragging, &[])
        }
        (S::DraggingOrTap, E::Release) => Rule::To(S::Idle, &[A::Release(1, Stamp::Event)]),
        (S::DraggingOrTap, E::Button) => Rule::To(S::Dead, &[A::Release(1, Stamp::Event)]),
        (S::DraggingOrTap, E::Palm) => {
            Rule::To(S::Idle, &[A::Release(1, Stamp::SavedRelease)])
        }
        (S::DraggingOrTap, _) => Rule::Stay,

        (S::Dragging2, E::Touch) => Rule::To(S::Dead, &[A::Release(1, Stamp::Event)]),
        (S::Dragging2, E::Release) => Rule::To(S::Dragging, &[]),
        (S::Dragging2, E::Button) => Rule::To(S::Dead, &[A::Release(1, Stamp::Event)]),
        (S::Dragging2, E::Palm) => Rule::To(S::DraggingOrDoubletap, &[]),
        (S::Dragging2, _) => Rule::Stay,

        (S::Dead, E::Release) | (S::Dead, E::Palm) | (S::Dead, E::PalmUp) => Rule::DrainToIdle,
        (S::Dead, _) => Rule::Stay,
    }
}
