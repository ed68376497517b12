//! Application state management.

pub mod handlers;
pub mod simulation;
pub mod types;

use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use scc::{AtomicShared, Guard, Shared, Tag};

pub use types::*;

static GLOBAL_STATE: OnceLock<Arc<AppState>> = OnceLock::new();

/// Process-wide controller: the active mapping, capture progress, press
/// bookkeeping and the seams the hook threads reach through.
///
/// Exactly one instance exists for the process lifetime. The hook threads
/// read it on every input event, so every field they touch is an atomic or a
/// lock-free container.
pub struct AppState {
    pub should_exit: Arc<AtomicBool>,
    capture_phase: AtomicU8,
    source_pressed: AtomicBool,
    mapping: AtomicShared<RemapConfig>,
    captured_tx: Sender<InputSource>,
    captured_rx: Receiver<InputSource>,
    injector: OnceLock<Arc<dyn KeyInjector>>,
    focus_probe: OnceLock<Arc<dyn FocusProbe>>,
    keyboard_thread_id: AtomicU32,
    mouse_thread_id: AtomicU32,
}

impl AppState {
    pub fn new() -> Self {
        let (captured_tx, captured_rx) = crossbeam_channel::unbounded();

        Self {
            should_exit: Arc::new(AtomicBool::new(false)),
            capture_phase: AtomicU8::new(CapturePhase::Idle.to_u8()),
            source_pressed: AtomicBool::new(false),
            mapping: AtomicShared::null(),
            captured_tx,
            captured_rx,
            injector: OnceLock::new(),
            focus_probe: OnceLock::new(),
            keyboard_thread_id: AtomicU32::new(0),
            mouse_thread_id: AtomicU32::new(0),
        }
    }

    /// Signals the application to exit.
    pub fn exit(&self) {
        self.should_exit.store(true, Ordering::Relaxed);
    }

    /// Checks if the application should exit (hot path - inlined)
    #[inline(always)]
    pub fn should_exit(&self) -> bool {
        self.should_exit.load(Ordering::Relaxed)
    }

    /// Sets the synthetic-output backend. First caller wins.
    pub fn set_injector(&self, injector: Arc<dyn KeyInjector>) {
        let _ = self.injector.set(injector);
    }

    /// Sets the focus-gate backend. First caller wins.
    pub fn set_focus_probe(&self, probe: Arc<dyn FocusProbe>) {
        let _ = self.focus_probe.set(probe);
    }

    /// True iff the target application owns the foreground window. With no
    /// probe installed nothing counts as focused.
    #[inline(always)]
    pub(crate) fn is_target_focused(&self) -> bool {
        self.focus_probe
            .get()
            .map(|probe| probe.is_target_focused())
            .unwrap_or(false)
    }

    #[inline(always)]
    pub fn capture_phase(&self) -> CapturePhase {
        CapturePhase::from_u8(self.capture_phase.load(Ordering::Acquire))
    }

    #[inline(always)]
    fn set_capture_phase(&self, phase: CapturePhase) {
        self.capture_phase.store(phase.to_u8(), Ordering::Release);
    }

    /// Arms capture of the input source. Stale captures from an earlier,
    /// cancelled sequence are drained first.
    pub fn begin_source_capture(&self) {
        while self.captured_rx.try_recv().is_ok() {}
        self.set_capture_phase(CapturePhase::AwaitingSource);
    }

    /// Arms capture of the output key.
    pub fn begin_output_capture(&self) {
        while self.captured_rx.try_recv().is_ok() {}
        self.set_capture_phase(CapturePhase::AwaitingOutput);
    }

    /// Resets an in-flight capture without installing anything.
    pub fn cancel_capture(&self) {
        self.set_capture_phase(CapturePhase::Idle);
    }

    /// Hook-side acceptance: disarms the capture, then hands the input over
    /// to the waiting capture driver.
    #[inline]
    pub(crate) fn accept_capture(&self, source: InputSource) {
        self.set_capture_phase(CapturePhase::Idle);
        let _ = self.captured_tx.send(source);
    }

    /// Waits up to `timeout` for the hook thread to hand over a captured
    /// input. Callers loop on this with short timeouts so cancellation is
    /// observed promptly.
    pub fn recv_captured(&self, timeout: Duration) -> Option<InputSource> {
        self.captured_rx.recv_timeout(timeout).ok()
    }

    /// Installs a new mapping, replacing the previous one wholesale. Press
    /// tracking restarts from released.
    pub fn install_mapping(&self, config: RemapConfig) {
        self.source_pressed.store(false, Ordering::Relaxed);
        let _ = self
            .mapping
            .swap((Some(Shared::new(config)), Tag::None), Ordering::Release);
    }

    /// Returns the active mapping, or `None` before the first capture
    /// completes.
    pub fn current_mapping(&self) -> Option<RemapConfig> {
        let guard = Guard::new();
        self.mapping
            .load(Ordering::Acquire, &guard)
            .as_ref()
            .copied()
    }

    /// Whether the mapped source is currently considered held down.
    #[inline(always)]
    pub fn is_source_pressed(&self) -> bool {
        self.source_pressed.load(Ordering::Relaxed)
    }

    pub(crate) fn register_keyboard_thread(&self, thread_id: u32) {
        self.keyboard_thread_id.store(thread_id, Ordering::Release);
    }

    pub(crate) fn register_mouse_thread(&self, thread_id: u32) {
        self.mouse_thread_id.store(thread_id, Ordering::Release);
    }

    /// Thread ids of the hook message loops, zero for a loop that never
    /// started. Shutdown posts `WM_QUIT` to these.
    pub fn hook_thread_ids(&self) -> (u32, u32) {
        (
            self.keyboard_thread_id.load(Ordering::Acquire),
            self.mouse_thread_id.load(Ordering::Acquire),
        )
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn set_global_state(state: Arc<AppState>) -> Result<(), Arc<AppState>> {
    GLOBAL_STATE.set(state)
}

pub fn get_global_state() -> Option<&'static Arc<AppState>> {
    GLOBAL_STATE.get()
}
