use std::sync::atomic::Ordering;

use scc::Guard;

use windows::Win32::UI::WindowsAndMessaging::*;

use crate::util::{likely, unlikely};

use super::AppState;
use super::types::*;

/// Classifies a raw keyboard hook message into an edge.
#[inline(always)]
pub fn classify_key_message(message: u32) -> Option<Edge> {
    match message {
        WM_KEYDOWN | WM_SYSKEYDOWN => Some(Edge::Down),
        WM_KEYUP | WM_SYSKEYUP => Some(Edge::Up),
        _ => None,
    }
}

/// Classifies a raw mouse hook message into a button and an edge. Movement
/// and wheel messages are not button transitions and classify as `None`.
#[inline(always)]
pub fn classify_mouse_message(message: u32, mouse_data: u32) -> Option<(MouseButton, Edge)> {
    let button = match message {
        WM_LBUTTONDOWN | WM_LBUTTONUP => MouseButton::Left,
        WM_RBUTTONDOWN | WM_RBUTTONUP => MouseButton::Right,
        WM_MBUTTONDOWN | WM_MBUTTONUP => MouseButton::Middle,
        WM_XBUTTONDOWN | WM_XBUTTONUP => {
            // X button identity lives in the high word of mouseData
            match (mouse_data >> 16) & 0xFFFF {
                1 => MouseButton::X1,
                2 => MouseButton::X2,
                _ => return None,
            }
        }
        _ => return None,
    };

    let edge = match message {
        WM_LBUTTONDOWN | WM_RBUTTONDOWN | WM_MBUTTONDOWN | WM_XBUTTONDOWN => Edge::Down,
        _ => Edge::Up,
    };

    Some((button, edge))
}

impl AppState {
    /// Decides the fate of a raw keyboard event.
    #[inline(always)]
    pub fn handle_key_event(&self, message: u32, vk_code: u32) -> Decision {
        match classify_key_message(message) {
            Some(edge) => self.process_event(InputSource::Keyboard(vk_code), edge),
            None => Decision::PassThrough,
        }
    }

    /// Decides the fate of a raw mouse event.
    #[inline(always)]
    pub fn handle_mouse_event(&self, message: u32, mouse_data: u32) -> Decision {
        match classify_mouse_message(message, mouse_data) {
            Some((button, edge)) => self.process_event(InputSource::Mouse(button), edge),
            None => Decision::PassThrough,
        }
    }

    #[inline(always)]
    fn process_event(&self, source: InputSource, edge: Edge) -> Decision {
        let phase = self.capture_phase();
        if likely(phase == CapturePhase::Idle) {
            return self.remap(source, edge);
        }
        self.consume_for_capture(phase, source, edge)
    }

    /// Capture acceptance. An accepted event is swallowed so the target
    /// application never sees it; everything else keeps flowing normally.
    fn consume_for_capture(&self, phase: CapturePhase, source: InputSource, edge: Edge) -> Decision {
        match phase {
            // Any keyboard event or a mouse button press becomes the source.
            CapturePhase::AwaitingSource => match source {
                InputSource::Keyboard(_) => {
                    self.accept_capture(source);
                    Decision::Suppress
                }
                InputSource::Mouse(_) if edge == Edge::Down => {
                    self.accept_capture(source);
                    Decision::Suppress
                }
                InputSource::Mouse(_) => Decision::PassThrough,
            },
            // The output must be a keyboard key; mouse input is not consumed.
            CapturePhase::AwaitingOutput => match source {
                InputSource::Keyboard(_) => {
                    self.accept_capture(source);
                    Decision::Suppress
                }
                InputSource::Mouse(_) => Decision::PassThrough,
            },
            CapturePhase::Idle => Decision::PassThrough,
        }
    }

    /// The edge-triggered core: one output tap per genuine press or release
    /// of the configured source, only while the target window is focused.
    #[inline(always)]
    fn remap(&self, source: InputSource, edge: Edge) -> Decision {
        let guard = Guard::new();
        let mapping = self.mapping.load(Ordering::Acquire, &guard);
        let Some(config) = mapping.as_ref() else {
            return Decision::PassThrough;
        };

        if likely(config.source != source) {
            return Decision::PassThrough;
        }

        // Press bookkeeping runs regardless of focus so a down/up pair that
        // straddles a focus change is not miscounted later.
        let genuine_edge = match edge {
            Edge::Down => self
                .source_pressed
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_ok(),
            Edge::Up => self
                .source_pressed
                .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
                .is_ok(),
        };

        if unlikely(!self.is_target_focused()) {
            return Decision::PassThrough;
        }

        if genuine_edge {
            self.emit_output_tap(&config.output);
        }
        // Redundant repeats (auto-repeat downs, duplicate ups) are swallowed
        // without re-firing the output.
        Decision::Suppress
    }
}
