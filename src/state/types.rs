//! Type definitions for input classification and remapping.

use std::fmt;

/// Marker value stamped into `dwExtraInfo` of injected events so the hooks
/// recognize and skip input this process generated itself.
pub const SIMULATED_EVENT_MARKER: usize = 0x4454;

/// Mouse button types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    X1,
    X2,
}

/// The physical input being watched: a keyboard key or a mouse button.
///
/// Replaced wholesale by each capture sequence, never mutated in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputSource {
    /// Keyboard input with virtual key code
    Keyboard(u32),
    /// Mouse button input
    Mouse(MouseButton),
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSource::Keyboard(vk) => write!(f, "Key 0x{vk:02X}"),
            InputSource::Mouse(button) => {
                let name = match button {
                    MouseButton::Left => "Left Mouse",
                    MouseButton::Right => "Right Mouse",
                    MouseButton::Middle => "Middle Mouse",
                    MouseButton::X1 => "Extra Mouse 1",
                    MouseButton::X2 => "Extra Mouse 2",
                };
                write!(f, "{name}")
            }
        }
    }
}

/// Transition direction of a classified input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Down,
    Up,
}

/// The keyboard key synthesized on each trigger edge.
///
/// `scan` is the hardware scan code carried alongside the virtual key; zero
/// for every key without an override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputBinding {
    pub vk: u16,
    pub scan: u16,
}

impl OutputBinding {
    pub fn for_vk(vk: u16) -> Self {
        Self {
            vk,
            scan: scan_code_override(vk),
        }
    }
}

/// Hardware scan code override for keys some games refuse to accept as
/// VK-only injection. Z and X carry their scan codes; everything else goes
/// out with zero.
pub fn scan_code_override(vk: u16) -> u16 {
    match vk {
        0x5A => 0x2C, // Z
        0x58 => 0x2D, // X
        _ => 0,
    }
}

/// The single active mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemapConfig {
    pub source: InputSource,
    pub output: OutputBinding,
}

impl RemapConfig {
    /// A keyboard key bound to itself re-enters the hook as its own trigger.
    pub fn is_self_mapping(&self) -> bool {
        matches!(self.source, InputSource::Keyboard(vk) if vk == self.output.vk as u32)
    }
}

/// Capture sequence progress, encoded to u8 for atomic storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapturePhase {
    Idle,
    AwaitingSource,
    AwaitingOutput,
}

impl CapturePhase {
    #[inline(always)]
    pub const fn to_u8(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::AwaitingSource => 1,
            Self::AwaitingOutput => 2,
        }
    }

    #[inline(always)]
    pub const fn from_u8(val: u8) -> Self {
        match val {
            1 => Self::AwaitingSource,
            2 => Self::AwaitingOutput,
            _ => Self::Idle,
        }
    }
}

/// Hook callback verdict for a raw input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Hand the event on to the next hook in the chain.
    PassThrough,
    /// Swallow the event; the target application never sees it.
    Suppress,
}

impl Decision {
    #[inline(always)]
    pub fn should_block(self) -> bool {
        matches!(self, Decision::Suppress)
    }
}

/// Seam for synthetic keyboard event injection.
///
/// Implementations must not block and must not panic; the hook callback
/// survives injection failures, which are reported through the log.
pub trait KeyInjector: Send + Sync {
    fn inject_key(&self, vk: u16, scan: u16, key_up: bool);
}

/// Seam for the foreground-window focus query.
pub trait FocusProbe: Send + Sync {
    fn is_target_focused(&self) -> bool;
}
