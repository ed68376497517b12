use windows::Win32::UI::WindowsAndMessaging::{GetForegroundWindow, GetWindowTextW};

use crate::state::FocusProbe;

/// Title substring identifying the target application's window.
pub const TARGET_WINDOW_TITLE: &str = "osu!";

/// `FocusProbe` matching the foreground window title against a substring,
/// case-insensitively. The title is queried fresh on every call; it can
/// change between any two input events.
pub struct ForegroundTitleProbe {
    needle: String,
}

impl ForegroundTitleProbe {
    pub fn new(needle: &str) -> Self {
        Self {
            needle: needle.to_lowercase(),
        }
    }
}

impl FocusProbe for ForegroundTitleProbe {
    fn is_target_focused(&self) -> bool {
        unsafe {
            let hwnd = GetForegroundWindow();
            if hwnd.0.is_null() {
                return false;
            }

            let mut buffer = [0u16; 256];
            let len = GetWindowTextW(hwnd, &mut buffer);
            if len <= 0 {
                return false;
            }

            let title = String::from_utf16_lossy(&buffer[..len as usize]);
            title.to_lowercase().contains(&self.needle)
        }
    }
}
