//! The two-phase capture sequence: learn the input source, then the output
//! key, and install the result as the active mapping.

use std::sync::Arc;
use std::time::Duration;

use log::debug;

use crate::state::{AppState, InputSource, OutputBinding, RemapConfig};

/// Poll interval for every capture wait; each tick re-checks cancellation.
const POLL_INTERVAL: Duration = Duration::from_millis(100);
/// Delay between prompting and arming, so the operator's menu keystroke
/// settles before anything can be captured.
const ARM_DELAY: Duration = Duration::from_millis(500);
/// Delay between the two phases, letting the source key's release drain.
const PHASE_SETTLE: Duration = Duration::from_millis(1000);

/// Outcome of one capture sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// A new mapping was installed. `self_mapped` flags a keyboard source
    /// bound to itself, which the operator may want to redo.
    Completed { self_mapped: bool },
    /// Shutdown was signalled mid-sequence; nothing was installed.
    Cancelled,
}

/// Runs one full capture sequence. The mapping is installed on completion
/// even when self-mapped; redoing it is the caller's call.
pub fn run_capture_sequence(state: &Arc<AppState>) -> CaptureOutcome {
    println!("\nPress the physical key or mouse button you want to use as input...");
    if !sleep_cancellable(state, ARM_DELAY) {
        return CaptureOutcome::Cancelled;
    }
    state.begin_source_capture();

    let Some(source) = wait_for_capture(state) else {
        state.cancel_capture();
        return CaptureOutcome::Cancelled;
    };
    debug!("captured input source: {source}");

    if !sleep_cancellable(state, PHASE_SETTLE) {
        return CaptureOutcome::Cancelled;
    }

    println!("\nPress the key you want it to send (keyboard key only)...");
    if !sleep_cancellable(state, ARM_DELAY) {
        return CaptureOutcome::Cancelled;
    }
    state.begin_output_capture();

    let Some(InputSource::Keyboard(output_vk)) = wait_for_capture(state) else {
        state.cancel_capture();
        return CaptureOutcome::Cancelled;
    };

    let config = RemapConfig {
        source,
        output: OutputBinding::for_vk(output_vk as u16),
    };
    let self_mapped = config.is_self_mapping();
    state.install_mapping(config);
    debug!(
        "installed mapping: {} -> Key 0x{:02X}",
        config.source, config.output.vk
    );

    CaptureOutcome::Completed { self_mapped }
}

/// Blocks until the hook thread hands over a captured input, polling so
/// shutdown is observed within one interval. `None` means cancelled.
fn wait_for_capture(state: &Arc<AppState>) -> Option<InputSource> {
    loop {
        if state.should_exit() {
            return None;
        }
        if let Some(source) = state.recv_captured(POLL_INTERVAL) {
            return Some(source);
        }
    }
}

/// Sleeps in poll-interval slices; returns false once shutdown is signalled.
pub(crate) fn sleep_cancellable(state: &Arc<AppState>, total: Duration) -> bool {
    let mut remaining = total;
    while !remaining.is_zero() {
        if state.should_exit() {
            return false;
        }
        let step = remaining.min(POLL_INTERVAL);
        std::thread::sleep(step);
        remaining -= step;
    }
    !state.should_exit()
}
