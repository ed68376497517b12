//! Operator-facing console surface: banner, menu and key polling.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use windows::Win32::System::Console::{
    GetNumberOfConsoleInputEvents, GetStdHandle, INPUT_RECORD, KEY_EVENT, ReadConsoleInputW,
    STD_INPUT_HANDLE,
};

use crate::capture::{self, CaptureOutcome};
use crate::state::AppState;

/// Minimum interval between remap requests; a held or bouncing keypress in
/// the console buffer must not restart the sequence.
const REMAP_DEBOUNCE: Duration = Duration::from_millis(500);
const MENU_POLL: Duration = Duration::from_millis(100);

const VK_Q: u16 = 0x51;
const VK_R: u16 = 0x52;

fn print_banner() {
    println!("osu! Dual State Mapper");
    println!("----------------------");
    println!("A key mapper that treats press and release as separate trigger inputs.");
}

fn show_current_mapping(state: &Arc<AppState>) {
    if let Some(config) = state.current_mapping() {
        println!("\nCurrent mapping:");
        println!("{} -> Key 0x{:02X}", config.source, config.output.vk);
    }
}

fn show_menu() {
    println!("\nCommands:");
    println!("R - Remap keys/buttons");
    println!("Q - Quit");
    println!("\nMapper is only active when the osu! window is focused!");
}

/// Runs the console surface until quit or cancellation: the mandatory
/// startup capture, then the R/Q menu loop.
pub fn run(state: &Arc<AppState>) -> Result<()> {
    print_banner();

    if run_capture_with_retry(state)? == CaptureOutcome::Cancelled {
        return Ok(());
    }
    show_current_mapping(state);
    show_menu();

    let mut last_remap_request: Option<Instant> = None;

    while !state.should_exit() {
        if let Some(vk) = try_read_key()? {
            match vk {
                VK_R => {
                    let debounced = last_remap_request
                        .map(|at| at.elapsed() < REMAP_DEBOUNCE)
                        .unwrap_or(false);
                    if !debounced {
                        last_remap_request = Some(Instant::now());
                        if run_capture_with_retry(state)? == CaptureOutcome::Cancelled {
                            break;
                        }
                        show_current_mapping(state);
                        show_menu();
                    }
                }
                VK_Q => state.exit(),
                _ => {}
            }
        }
        std::thread::sleep(MENU_POLL);
    }

    Ok(())
}

/// Runs capture sequences until the operator is satisfied: a self-mapping
/// gets a warning and the choice to redo with different keys.
fn run_capture_with_retry(state: &Arc<AppState>) -> Result<CaptureOutcome> {
    loop {
        match capture::run_capture_sequence(state) {
            CaptureOutcome::Completed { self_mapped: true } => {
                println!("\nWarning: Mapping a key to itself may cause issues.");
                println!(
                    "Press 'R' to try again with different keys, or any other key to continue anyway."
                );
                match wait_key(state)? {
                    Some(VK_R) => continue,
                    Some(_) => return Ok(CaptureOutcome::Completed { self_mapped: true }),
                    None => return Ok(CaptureOutcome::Cancelled),
                }
            }
            outcome => return Ok(outcome),
        }
    }
}

/// Non-blocking read of the next console key-down; `None` when the input
/// buffer holds no key events.
fn try_read_key() -> Result<Option<u16>> {
    unsafe {
        let handle = GetStdHandle(STD_INPUT_HANDLE)?;

        let mut pending = 0u32;
        GetNumberOfConsoleInputEvents(handle, &mut pending)?;

        while pending > 0 {
            let mut records = [INPUT_RECORD::default(); 1];
            let mut read = 0u32;
            ReadConsoleInputW(handle, &mut records, &mut read)?;
            if read == 0 {
                break;
            }
            pending = pending.saturating_sub(read);

            let record = &records[0];
            if record.EventType == KEY_EVENT as u16 && record.Event.KeyEvent.bKeyDown.as_bool() {
                return Ok(Some(record.Event.KeyEvent.wVirtualKeyCode));
            }
        }
    }

    Ok(None)
}

/// Waits for the next console key-down, observing shutdown at every poll.
fn wait_key(state: &Arc<AppState>) -> Result<Option<u16>> {
    loop {
        if state.should_exit() {
            return Ok(None);
        }
        if let Some(vk) = try_read_key()? {
            return Ok(Some(vk));
        }
        std::thread::sleep(MENU_POLL);
    }
}
