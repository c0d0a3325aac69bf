//! Bridge module - JS ↔ Rust communication
//!
//! All #[wasm_bindgen] entry points live here.
//! Re-exports only in mod.rs, logic in submodules.

mod landmarks;
mod session;

pub use landmarks::{
    Landmark,
    LandmarkFrame,
    // Constants
    LANDMARK_COUNT, VALUES_PER_LANDMARK,
    NOSE, LEFT_EAR, RIGHT_EAR,
    LEFT_SHOULDER, RIGHT_SHOULDER,
    LEFT_ELBOW, RIGHT_ELBOW,
    LEFT_WRIST, RIGHT_WRIST,
    LEFT_INDEX, RIGHT_INDEX,
    LEFT_HIP, RIGHT_HIP,
    LEFT_KNEE, RIGHT_KNEE,
    LEFT_ANKLE, RIGHT_ANKLE,
    LEFT_SIDE_LANDMARKS, RIGHT_SIDE_LANDMARKS,
};

pub use session::{exercise_catalog, RehabSession};
