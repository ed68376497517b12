use log::warn;
use windows::Win32::Foundation::GetLastError;
use windows::Win32::UI::Input::KeyboardAndMouse::*;

use super::AppState;
use super::types::*;

impl AppState {
    /// Fires one output tap: a synthetic release immediately followed by a
    /// synthetic press. Releasing first guarantees the target sees a fresh
    /// down transition even when the output key is still logically held from
    /// a previous tap.
    #[inline(always)]
    pub fn emit_output_tap(&self, output: &OutputBinding) {
        if let Some(injector) = self.injector.get() {
            injector.inject_key(output.vk, output.scan, true);
            injector.inject_key(output.vk, output.scan, false);
        }
    }
}

/// `KeyInjector` backed by `SendInput`.
pub struct SendInputInjector;

impl KeyInjector for SendInputInjector {
    fn inject_key(&self, vk: u16, scan: u16, key_up: bool) {
        let flags = if key_up {
            KEYEVENTF_KEYUP
        } else {
            KEYBD_EVENT_FLAGS(0)
        };

        let input = INPUT {
            r#type: INPUT_KEYBOARD,
            Anonymous: INPUT_0 {
                ki: KEYBDINPUT {
                    wVk: VIRTUAL_KEY(vk),
                    wScan: scan,
                    dwFlags: flags,
                    time: 0,
                    dwExtraInfo: SIMULATED_EVENT_MARKER,
                },
            },
        };

        let sent = unsafe { SendInput(&[input], std::mem::size_of::<INPUT>() as i32) };
        if sent != 1 {
            // The hook callback must survive injection failures.
            warn!(
                "key injection failed for vk 0x{vk:02X} (error {})",
                unsafe { GetLastError().0 }
            );
        }
    }
}
