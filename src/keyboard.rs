use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::Sender;
use log::warn;
use windows::Win32::Foundation::{LPARAM, LRESULT, WPARAM};
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::WindowsAndMessaging::*;

use crate::state::{self, AppState, SIMULATED_EVENT_MARKER};

unsafe impl Send for KeyboardHook {}

pub struct KeyboardHook {
    state: Arc<AppState>,
    hook_handle: HHOOK,
}

impl KeyboardHook {
    /// Installs the low-level keyboard hook. Must run on the thread that
    /// will pump the message loop.
    pub fn new(state: Arc<AppState>) -> anyhow::Result<Self> {
        unsafe {
            let hook = SetWindowsHookExA(WH_KEYBOARD_LL, Some(Self::keyboard_proc), None, 0)?;

            if hook.0.is_null() {
                anyhow::bail!("Failed to set keyboard hook.");
            }

            Ok(Self {
                state,
                hook_handle: hook,
            })
        }
    }

    /// Installs the hook on a fresh thread, reports the install result
    /// through `ready`, then pumps messages until WM_QUIT.
    pub fn spawn(state: Arc<AppState>, ready: Sender<anyhow::Result<()>>) -> JoinHandle<()> {
        std::thread::Builder::new()
            .name("keyboard_hook".into())
            .spawn(move || match Self::new(state) {
                Ok(hook) => {
                    let _ = ready.send(Ok(()));
                    hook.run_message_loop();
                }
                Err(e) => {
                    let _ = ready.send(Err(e));
                }
            })
            .expect("Failed to spawn keyboard hook thread")
    }

    pub fn run_message_loop(self) {
        self.state
            .register_keyboard_thread(unsafe { GetCurrentThreadId() });

        unsafe {
            // Force create message queue
            let mut msg = MSG::default();
            let _ = PeekMessageA(&mut msg, None, WM_USER, WM_USER, PM_NOREMOVE);

            loop {
                let result = GetMessageA(&mut msg, None, 0, 0);

                if result.0 == 0 || result.0 == -1 {
                    break;
                }

                let _ = TranslateMessage(&msg);
                DispatchMessageA(&msg);
            }
        }
        // Hook is released by Drop once the loop winds down.
    }

    unsafe extern "system" fn keyboard_proc(
        code: i32,
        w_param: WPARAM,
        l_param: LPARAM,
    ) -> LRESULT {
        if code < 0 {
            return unsafe { CallNextHookEx(None, code, w_param, l_param) };
        }

        let kb_struct = unsafe { &*(l_param.0 as *const KBDLLHOOKSTRUCT) };

        // Skip simulated key events
        if kb_struct.dwExtraInfo == SIMULATED_EVENT_MARKER {
            return unsafe { CallNextHookEx(None, code, w_param, l_param) };
        }

        if let Some(state) = state::get_global_state() {
            let decision = state.handle_key_event(w_param.0 as u32, kb_struct.vkCode);
            if decision.should_block() {
                return LRESULT(1); // swallow the raw key event
            }
        }

        unsafe { CallNextHookEx(None, code, w_param, l_param) }
    }
}

impl Drop for KeyboardHook {
    fn drop(&mut self) {
        unsafe {
            if let Err(e) = UnhookWindowsHookEx(self.hook_handle) {
                warn!("keyboard hook release failed: {e}");
            }
        }
    }
}
