//! Rehab Web - stroke rehabilitation exercise tracker
//!
//! Entry point for WASM module. Only contains:
//! - Module declarations
//! - Console logging and the panic hook
//! - Re-exports of the public API

use wasm_bindgen::prelude::*;

// ============================================================================
// CONSOLE LOGGING
// ============================================================================

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);
}

#[doc(hidden)]
pub fn console_write(s: &str) {
    log(s);
}

#[macro_export]
macro_rules! console_log {
    ($($t:tt)*) => ($crate::console_write(&format_args!($($t)*).to_string()))
}

// ============================================================================
// MODULES
// ============================================================================

pub mod bridge;
pub mod config;
pub mod error;
pub mod exercise;
pub mod kinematics;
pub mod session;

pub use bridge::{exercise_catalog, Landmark, LandmarkFrame, RehabSession};
pub use config::{QualityConfig, TrackerConfig};
pub use error::RehabError;
pub use exercise::{ExerciseDefinition, Phase, SessionCounters, EXERCISES};
pub use kinematics::{angle_at, is_valid, JointAngleSet, Side, SideQuality};
pub use session::{ExerciseSession, FrameOutcome, SessionEvent, SessionSummary, Severity};

// ============================================================================
// WASM ENTRY POINTS
// ============================================================================

/// Called automatically when WASM module loads
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}
