//! Exercise definitions
//!
//! One immutable record per supported exercise, looked up by key. Adding an
//! exercise means adding a row to `EXERCISES`; the phase machine reads
//! everything it needs from the record.

use crate::bridge::{
    LandmarkFrame, LEFT_ELBOW, LEFT_SHOULDER, LEFT_WRIST, RIGHT_ELBOW, RIGHT_SHOULDER, RIGHT_WRIST,
};
use crate::error::RehabError;
use crate::kinematics::{Joint, JointAngleCalculator, Side, TiltDirection};
use super::phase::Phase;

/// Where an exercise's angle comes from
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AngleSource {
    /// Three-point joint angle on the active side
    Joint(Joint),
    /// Shoulder midline offset over the hip midline
    TrunkSway { scale: f32, cap: f32, direction_threshold: f32 },
    /// Vertical offset between the ears
    NeckTilt { scale: f32, cap: f32, direction_threshold: f32 },
}

/// How the exercise decides which side it measures
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SideMode {
    /// Left and right take turns; each half-cycle counts for its side
    Alternating,
    /// Follow the side quality selector
    Auto,
    /// Midline measurement, no side
    Central,
}

/// Inclusive angle range
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AngleBand {
    pub min: f32,
    pub max: f32,
}

impl AngleBand {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, angle: f32) -> bool {
        angle >= self.min && angle <= self.max
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseThresholds {
    /// Angle of the resting position
    pub rest: f32,
    /// Movement beyond `rest` needed before a repetition starts
    pub start_deadband: f32,
    pub target: f32,
    /// Fraction of `target` that counts as reaching it
    pub hold_ratio: f32,
    /// Distance above `rest` that counts as back at rest
    pub return_tolerance: f32,
    /// Warn above this while moving
    pub safe_max: Option<f32>,
    /// Frame-to-frame change below this counts as a plateau
    pub plateau_tolerance: f32,
}

/// Exercise-specific names for the non-rest phases
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseLabels {
    pub moving: &'static str,
    pub holding: &'static str,
    pub returning: &'static str,
}

/// One measurement of the exercise angle
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Measurement {
    pub angle: f32,
    pub direction: TiltDirection,
}

#[derive(Clone, Debug)]
pub struct ExerciseDefinition {
    pub key: &'static str,
    pub name: &'static str,
    pub instructions: &'static str,
    pub source: AngleSource,
    /// Converts the raw source angle into progress toward the target
    pub normalize: fn(f32) -> f32,
    pub side_mode: SideMode,
    pub thresholds: PhaseThresholds,
    /// Position the patient must be in before starting and after returning
    pub ready_band: Option<AngleBand>,
    /// Range the angle must stay in while holding
    pub hold_band: Option<AngleBand>,
    /// Start and return need a lean direction (off-centre, then centred)
    pub requires_direction: bool,
    /// Extra landmarks that must be visible before measuring
    pub required_landmarks: &'static [usize],
    pub hold_ms: f64,
    pub labels: PhaseLabels,
}

/// Raw joint angle used as-is
pub fn identity(angle: f32) -> f32 {
    angle
}

/// Arm elevation: 0 with the arm straight, growing as it flexes toward the target
pub fn arm_elevation(raw: f32) -> f32 {
    (180.0 - raw).max(0.0)
}

pub const ARM_RAISE_FORWARD: ExerciseDefinition = ExerciseDefinition {
    key: "arm-raise-forward",
    name: "Arm raise forward",
    instructions: "Raise one arm forward, hold, lower it slowly, then switch arms",
    source: AngleSource::Joint(Joint::Elbow),
    normalize: arm_elevation,
    side_mode: SideMode::Alternating,
    thresholds: PhaseThresholds {
        rest: 10.0,
        start_deadband: 3.0,
        target: 50.0,
        hold_ratio: 0.95,
        return_tolerance: 5.0,
        safe_max: None,
        plateau_tolerance: 1.0,
    },
    ready_band: None,
    hold_band: None,
    requires_direction: false,
    required_landmarks: &[
        LEFT_SHOULDER, RIGHT_SHOULDER, LEFT_ELBOW, RIGHT_ELBOW, LEFT_WRIST, RIGHT_WRIST,
    ],
    hold_ms: 1500.0,
    labels: PhaseLabels {
        moving: "raising_forward",
        holding: "holding",
        returning: "lowering",
    },
};

pub const KNEE_EXTENSION: ExerciseDefinition = ExerciseDefinition {
    key: "knee-extension",
    name: "Seated knee extension",
    instructions: "Sit on a chair, straighten one knee and hold for a moment",
    source: AngleSource::Joint(Joint::Knee),
    normalize: identity,
    side_mode: SideMode::Auto,
    thresholds: PhaseThresholds {
        rest: 150.1,
        start_deadband: 5.0,
        target: 165.0,
        hold_ratio: 0.95,
        return_tolerance: 10.0,
        safe_max: Some(174.0),
        plateau_tolerance: 1.0,
    },
    ready_band: Some(AngleBand::new(110.0, 179.0)),
    hold_band: Some(AngleBand::new(155.0, 169.0)),
    requires_direction: false,
    required_landmarks: &[],
    hold_ms: 1500.0,
    labels: PhaseLabels {
        moving: "extending",
        holding: "holding",
        returning: "flexing",
    },
};

pub const TRUNK_SWAY: ExerciseDefinition = ExerciseDefinition {
    key: "trunk-sway",
    name: "Trunk sway",
    instructions: "Sit steady and lean the trunk to one side from the hips, then return upright",
    source: AngleSource::TrunkSway {
        scale: 100.0,
        cap: 10.0,
        direction_threshold: 0.01,
    },
    normalize: identity,
    side_mode: SideMode::Central,
    thresholds: PhaseThresholds {
        rest: 1.0,
        start_deadband: 1.0,
        target: 4.6,
        hold_ratio: 1.0,
        return_tolerance: 0.5,
        safe_max: Some(8.0),
        plateau_tolerance: 0.5,
    },
    ready_band: None,
    hold_band: None,
    requires_direction: true,
    required_landmarks: &[],
    hold_ms: 2000.0,
    labels: PhaseLabels {
        moving: "swaying",
        holding: "sway_hold",
        returning: "returning",
    },
};

pub const NECK_TILT: ExerciseDefinition = ExerciseDefinition {
    key: "neck-tilt",
    name: "Neck side tilt",
    instructions: "Tilt the head toward one shoulder, hold, then return upright",
    source: AngleSource::NeckTilt {
        scale: 150.0,
        cap: 45.0,
        direction_threshold: 0.012,
    },
    normalize: identity,
    side_mode: SideMode::Central,
    thresholds: PhaseThresholds {
        rest: 0.0,
        start_deadband: 3.0,
        target: 10.0,
        hold_ratio: 0.8,
        return_tolerance: 3.0,
        safe_max: Some(30.0),
        plateau_tolerance: 2.0,
    },
    ready_band: None,
    hold_band: None,
    requires_direction: true,
    required_landmarks: &[],
    hold_ms: 1000.0,
    labels: PhaseLabels {
        moving: "tilting",
        holding: "tilt_hold",
        returning: "returning",
    },
};

/// Every supported exercise
pub static EXERCISES: [ExerciseDefinition; 4] = [ARM_RAISE_FORWARD, KNEE_EXTENSION, TRUNK_SWAY, NECK_TILT];

/// Resolve an exercise key
pub fn find(key: &str) -> Result<&'static ExerciseDefinition, RehabError> {
    EXERCISES
        .iter()
        .find(|def| def.key == key)
        .ok_or_else(|| RehabError::UnknownExercise(key.to_string()))
}

impl ExerciseDefinition {
    pub fn start_threshold(&self) -> f32 {
        self.thresholds.rest + self.thresholds.start_deadband
    }

    pub fn hold_threshold(&self) -> f32 {
        self.thresholds.target * self.thresholds.hold_ratio
    }

    pub fn return_threshold(&self) -> f32 {
        self.thresholds.rest + self.thresholds.return_tolerance
    }

    pub fn label(&self, phase: Phase) -> &'static str {
        match phase {
            Phase::Rest => "rest",
            Phase::Moving => self.labels.moving,
            Phase::Holding => self.labels.holding,
            Phase::Returning => self.labels.returning,
        }
    }

    /// Whether the patient is in the starting position
    pub fn is_ready(&self, angle: f32) -> bool {
        match self.ready_band {
            Some(band) => band.contains(angle),
            None => angle <= self.thresholds.rest,
        }
    }

    /// Measure the exercise angle on `side`. `None` = unmeasurable this frame.
    pub fn measure(
        &self,
        calc: &JointAngleCalculator,
        frame: &LandmarkFrame,
        side: Side,
    ) -> Option<Measurement> {
        if !calc.gate().accepts(frame, self.required_landmarks) {
            return None;
        }

        let (raw, direction) = match self.source {
            AngleSource::Joint(joint) => (calc.joint_angle(frame, joint, side)?, TiltDirection::Center),
            AngleSource::TrunkSway { scale, cap, direction_threshold } => {
                let tilt = calc.trunk_sway(frame, scale, cap, direction_threshold)?;
                (tilt.angle, tilt.direction)
            }
            AngleSource::NeckTilt { scale, cap, direction_threshold } => {
                let tilt = calc.neck_tilt(frame, scale, cap, direction_threshold)?;
                (tilt.angle, tilt.direction)
            }
        };

        let angle = (self.normalize)(raw);
        if !angle.is_finite() {
            return None;
        }
        Some(Measurement {
            angle: angle.clamp(0.0, 180.0),
            direction,
        })
    }

    /// Display accuracy (0-95) for the current phase; never gates counting
    pub fn accuracy(&self, phase: Phase, angle: f32) -> f32 {
        let t = &self.thresholds;
        let span = (t.target - t.rest).max(f32::EPSILON);
        let value = match phase {
            Phase::Rest if self.is_ready(angle) => 95.0,
            Phase::Rest => 50.0,
            Phase::Moving => 50.0 + ((angle - t.rest) / span).clamp(0.0, 1.0) * 45.0,
            Phase::Holding => 95.0,
            Phase::Returning => 50.0 + ((t.target - angle) / span).clamp(0.0, 1.0) * 45.0,
        };
        value.clamp(0.0, 95.0).round()
    }
}
