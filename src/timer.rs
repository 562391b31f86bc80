/// The single one-shot tap timer, multiplexed between the tap timeout and
/// the drag timeout depending on the state that armed it.
///
/// The engine only records the absolute deadline; the host (or the pipeline
/// module) is responsible for waking the engine once it passes. Arming
/// overwrites any previous deadline, cancelling is idempotent.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct TapTimer {
    deadline_us: Option<u64>,
}

impl TapTimer {
    pub(crate) const fn new() -> Self {
        Self { deadline_us: None }
    }

    pub(crate) fn set(&mut self, deadline_us: u64) {
        self.deadline_us = Some(deadline_us);
    }

    pub(crate) fn cancel(&mut self) {
        self.deadline_us = None;
    }

    pub(crate) fn deadline_us(&self) -> Option<u64> {
        self.deadline_us
    }
}
