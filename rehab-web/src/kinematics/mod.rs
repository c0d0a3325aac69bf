//! Kinematics module - angles, landmark gating and side selection
//!
//! Re-exports only. All logic in submodules.

mod angles;
mod confidence_gate;
mod joints;
mod side_quality;

pub use angles::{angle_at, midpoint, standard_deviation};
pub use confidence_gate::{is_valid, ConfidenceGate, DEFAULT_MIN_VISIBILITY};
pub use joints::{
    AngleStatistics, Joint, JointAngleCalculator, JointAngleSet, Side, Tilt, TiltDirection,
    NECK_TILT_MAX, NECK_TILT_SCALE, TRUNK_TILT_MAX, TRUNK_TILT_SCALE,
};
pub use side_quality::{SideQuality, SideQualityScorer, SideSelector};
