//! Exercise module - definitions, phase machine and counting
//!
//! Re-exports only. All logic in submodules.

mod aggregator;
mod definition;
mod hold_timer;
mod phase;

pub use aggregator::{RepetitionAggregator, SessionCounters};
pub use definition::{
    arm_elevation, find, identity, AngleBand, AngleSource, ExerciseDefinition, Measurement,
    PhaseLabels, PhaseThresholds, SideMode, ARM_RAISE_FORWARD, EXERCISES, KNEE_EXTENSION,
    NECK_TILT, TRUNK_SWAY,
};
pub use hold_timer::{HoldTimer, HoldToken};
pub use phase::{CompletedRepetition, Phase, PhaseStateMachine};
