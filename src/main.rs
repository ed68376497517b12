use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use windows::Win32::Foundation::{LPARAM, WPARAM};
use windows::Win32::UI::WindowsAndMessaging::{PostThreadMessageA, WM_QUIT};

use dualtap::console;
use dualtap::focus::{ForegroundTitleProbe, TARGET_WINDOW_TITLE};
use dualtap::keyboard::KeyboardHook;
use dualtap::mouse::MouseHook;
use dualtap::signal;
use dualtap::state::simulation::SendInputInjector;
use dualtap::state::{self, AppState};

fn main() -> Result<()> {
    env_logger::init();

    signal::set_console_ctrl_handler().context("failed to register console control handler")?;

    let app_state = Arc::new(AppState::new());
    app_state.set_injector(Arc::new(SendInputInjector));
    app_state.set_focus_probe(Arc::new(ForegroundTitleProbe::new(TARGET_WINDOW_TITLE)));

    state::set_global_state(app_state.clone())
        .map_err(|_| anyhow::anyhow!("global state already set"))?;

    // Both hooks must be live before the first capture; the tool is
    // nonfunctional without either, so startup aborts on a failed install.
    let (keyboard_ready_tx, keyboard_ready_rx) = crossbeam_channel::bounded(1);
    let keyboard_thread = KeyboardHook::spawn(app_state.clone(), keyboard_ready_tx);

    let (mouse_ready_tx, mouse_ready_rx) = crossbeam_channel::bounded(1);
    let mouse_thread = MouseHook::spawn(app_state.clone(), mouse_ready_tx);

    keyboard_ready_rx
        .recv_timeout(Duration::from_secs(5))
        .context("keyboard hook thread did not report readiness")?
        .context("failed to install keyboard hook")?;
    mouse_ready_rx
        .recv_timeout(Duration::from_secs(5))
        .context("mouse hook thread did not report readiness")?
        .context("failed to install mouse hook")?;

    let menu_result = console::run(&app_state);
    app_state.exit();

    // Wake the hook message loops so they unhook and wind down.
    let (keyboard_id, mouse_id) = app_state.hook_thread_ids();
    for thread_id in [keyboard_id, mouse_id] {
        if thread_id != 0 {
            unsafe {
                let _ = PostThreadMessageA(thread_id, WM_QUIT, WPARAM(0), LPARAM(0));
            }
        }
    }
    let _ = keyboard_thread.join();
    let _ = mouse_thread.join();

    menu_result
}
