//! Core modules for the dualtap input remapper.
//!
//! This library exposes internal modules for testing purposes.
//! It is not intended for external use as a library.

pub mod capture;
pub mod console;
pub mod focus;
pub mod keyboard;
pub mod mouse;
pub mod signal;
pub mod state;
pub mod util;

// Re-export core types for test modules
pub use state::{
    AppState, CapturePhase, Decision, Edge, InputSource, MouseButton, OutputBinding, RemapConfig,
};
