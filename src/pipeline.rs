//! Channel-based integration of the engine with an async input loop.
//!
//! The host's decoder pushes frames into [`TAP_PIPELINE_INPUTS`]; the pump
//! multiplexes them with the engine's single timer deadline and forwards
//! synthetic button events through [`TAP_BUTTON_EVENTS`]. Everything runs
//! on one executor task, which is the engine's whole concurrency model.

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_futures::select::{select, Either};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Channel};
use embassy_time::{Instant, Timer};

use crate::engine::TapEngine;
use crate::types::{ButtonEvent, DeviceCaps, TouchFrame};

pub enum PipelineInput {
    Frame { time_us: u64, frame: TouchFrame },
    /// Drop all in-flight tap state and start over.
    Reset,
}

pub static TAP_PIPELINE_INPUTS: Channel<CriticalSectionRawMutex, PipelineInput, 32> =
    Channel::new();
pub static TAP_BUTTON_EVENTS: Channel<CriticalSectionRawMutex, ButtonEvent, 64> = Channel::new();

/// Latest filter-motion decision, readable by the pointer path without
/// locking.
pub static TAP_FILTER_MOTION: AtomicBool = AtomicBool::new(false);

pub async fn run_tap_pipeline(caps: DeviceCaps) {
    let mut engine = TapEngine::new(caps);

    loop {
        let input = match engine.timer_deadline_us() {
            Some(deadline_us) => {
                let deadline = Timer::at(Instant::from_micros(deadline_us));
                match select(TAP_PIPELINE_INPUTS.receive(), deadline).await {
                    Either::First(input) => input,
                    Either::Second(()) => {
                        // The wakeup carries the armed deadline, not the
                        // scheduler's (possibly later) wall time.
                        let buttons = engine.handle_timeout(deadline_us);
                        forward_buttons(&buttons).await;
                        continue;
                    }
                }
            }
            None => TAP_PIPELINE_INPUTS.receive().await,
        };

        match input {
            PipelineInput::Reset => {
                engine.teardown();
                engine = TapEngine::new(caps);
                TAP_FILTER_MOTION.store(false, Ordering::Relaxed);
                while TAP_BUTTON_EVENTS.try_receive().is_ok() {}
            }
            PipelineInput::Frame { time_us, frame } => {
                let output = engine.handle_frame(&frame, time_us);
                TAP_FILTER_MOTION.store(output.filter_motion, Ordering::Relaxed);
                forward_buttons(&output.buttons).await;
                engine.post_process();
            }
        }
    }
}

async fn forward_buttons(buttons: &[ButtonEvent]) {
    for event in buttons {
        TAP_BUTTON_EVENTS.send(*event).await;
    }
}
