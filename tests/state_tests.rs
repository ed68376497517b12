//! Tests for controller state and the capture lifecycle.

use std::sync::Arc;
use std::time::Duration;

use dualtap::state::{
    AppState, CapturePhase, Decision, InputSource, MouseButton, OutputBinding, RemapConfig,
};
use windows::Win32::UI::WindowsAndMessaging::{WM_KEYDOWN, WM_LBUTTONUP, WM_RBUTTONDOWN};

const RECV_TIMEOUT: Duration = Duration::from_millis(50);

#[test]
fn test_state_defaults() {
    let state = AppState::new();

    assert!(state.current_mapping().is_none());
    assert_eq!(state.capture_phase(), CapturePhase::Idle);
    assert!(!state.is_source_pressed());
    assert!(!state.should_exit());
}

#[test]
fn test_exit_flag() {
    let state = AppState::new();

    assert!(!state.should_exit());
    state.exit();
    assert!(state.should_exit());
}

#[test]
fn test_install_and_read_mapping() {
    let state = AppState::new();
    let config = RemapConfig {
        source: InputSource::Mouse(MouseButton::Left),
        output: OutputBinding::for_vk(0x5A),
    };

    state.install_mapping(config);

    let current = state.current_mapping().expect("mapping should be installed");
    assert_eq!(current, config);
    assert_eq!(current.output.scan, 0x2C);
}

#[test]
fn test_mapping_replaced_wholesale() {
    let state = AppState::new();

    state.install_mapping(RemapConfig {
        source: InputSource::Keyboard(0x41),
        output: OutputBinding::for_vk(0x42),
    });
    state.install_mapping(RemapConfig {
        source: InputSource::Mouse(MouseButton::X1),
        output: OutputBinding::for_vk(0x58),
    });

    let current = state.current_mapping().expect("mapping should be installed");
    assert_eq!(current.source, InputSource::Mouse(MouseButton::X1));
    assert_eq!(current.output.vk, 0x58);
    assert_eq!(current.output.scan, 0x2D);
}

#[test]
fn test_source_capture_through_hook_path() {
    let state = Arc::new(AppState::new());

    state.begin_source_capture();
    assert_eq!(state.capture_phase(), CapturePhase::AwaitingSource);

    assert_eq!(state.handle_key_event(WM_KEYDOWN, 0x41), Decision::Suppress);
    assert_eq!(state.capture_phase(), CapturePhase::Idle);
    assert_eq!(
        state.recv_captured(RECV_TIMEOUT),
        Some(InputSource::Keyboard(0x41))
    );
}

#[test]
fn test_mouse_release_not_captured_as_source() {
    let state = Arc::new(AppState::new());

    state.begin_source_capture();
    assert_eq!(
        state.handle_mouse_event(WM_LBUTTONUP, 0),
        Decision::PassThrough
    );
    assert_eq!(state.capture_phase(), CapturePhase::AwaitingSource);
    assert_eq!(state.recv_captured(RECV_TIMEOUT), None);
}

#[test]
fn test_cancel_capture_resets_phase() {
    let state = AppState::new();

    state.begin_output_capture();
    assert_eq!(state.capture_phase(), CapturePhase::AwaitingOutput);

    state.cancel_capture();
    assert_eq!(state.capture_phase(), CapturePhase::Idle);
}

#[test]
fn test_stale_captures_drained_on_rearm() {
    let state = Arc::new(AppState::new());

    // A capture completes in the hook but is never collected
    state.begin_source_capture();
    assert_eq!(
        state.handle_mouse_event(WM_RBUTTONDOWN, 0),
        Decision::Suppress
    );

    // Re-arming must not let the stale entry satisfy the new wait
    state.begin_source_capture();
    assert_eq!(state.recv_captured(RECV_TIMEOUT), None);

    assert_eq!(state.handle_key_event(WM_KEYDOWN, 0x20), Decision::Suppress);
    assert_eq!(
        state.recv_captured(RECV_TIMEOUT),
        Some(InputSource::Keyboard(0x20))
    );
}

#[test]
fn test_capture_idempotence() {
    let state = Arc::new(AppState::new());
    let mut configs = Vec::new();

    for _ in 0..2 {
        state.begin_source_capture();
        assert_eq!(state.handle_key_event(WM_KEYDOWN, 0x41), Decision::Suppress);
        let source = state
            .recv_captured(RECV_TIMEOUT)
            .expect("source should be captured");

        state.begin_output_capture();
        assert_eq!(state.handle_key_event(WM_KEYDOWN, 0x5A), Decision::Suppress);
        let Some(InputSource::Keyboard(output_vk)) = state.recv_captured(RECV_TIMEOUT) else {
            panic!("output should be a keyboard capture");
        };

        let config = RemapConfig {
            source,
            output: OutputBinding::for_vk(output_vk as u16),
        };
        state.install_mapping(config);
        configs.push(config);
    }

    assert_eq!(configs[0], configs[1]);
    assert_eq!(state.current_mapping(), Some(configs[1]));
}
