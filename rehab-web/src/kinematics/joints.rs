//! Joint angle calculation for both body sides
//!
//! Maps named joints to landmark triples (mirrored left/right) and measures
//! them with `angle_at`. Neck and trunk tilt are displacement based rather
//! than three-point angles.

use serde::{Deserialize, Serialize};

use super::angles::{angle_at, midpoint};
use super::confidence_gate::ConfidenceGate;
use crate::bridge::{
    LandmarkFrame, LEFT_ANKLE, LEFT_EAR, LEFT_ELBOW, LEFT_HIP, LEFT_INDEX, LEFT_KNEE,
    LEFT_SHOULDER, LEFT_WRIST, NOSE, RIGHT_ANKLE, RIGHT_EAR, RIGHT_ELBOW, RIGHT_HIP,
    RIGHT_INDEX, RIGHT_KNEE, RIGHT_SHOULDER, RIGHT_WRIST,
};

/// Display scale for neck tilt: ear height difference → degrees
pub const NECK_TILT_SCALE: f32 = 200.0;
pub const NECK_TILT_MAX: f32 = 45.0;
/// Display scale for trunk tilt: shoulder/hip midline offset → degrees
pub const TRUNK_TILT_SCALE: f32 = 100.0;
pub const TRUNK_TILT_MAX: f32 = 30.0;

/// Body side. `Both` is only produced by side selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
    Both,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
            Side::Both => "both",
        }
    }

    /// The other single side; `Both` stays `Both`
    pub fn opposite(&self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
            Side::Both => Side::Both,
        }
    }
}

/// Joints measured on each side
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Joint {
    Shoulder,
    Elbow,
    Knee,
    Hip,
    Wrist,
}

impl Joint {
    pub const ALL: [Joint; 5] = [Joint::Shoulder, Joint::Elbow, Joint::Knee, Joint::Hip, Joint::Wrist];

    /// Landmark triple (a, vertex, c) for this joint on `side`.
    /// `Both` resolves to the left side.
    pub fn landmarks(&self, side: Side) -> [usize; 3] {
        let left = side != Side::Right;
        match (self, left) {
            (Joint::Shoulder, true) => [LEFT_HIP, LEFT_SHOULDER, LEFT_ELBOW],
            (Joint::Shoulder, false) => [RIGHT_HIP, RIGHT_SHOULDER, RIGHT_ELBOW],
            (Joint::Elbow, true) => [LEFT_SHOULDER, LEFT_ELBOW, LEFT_WRIST],
            (Joint::Elbow, false) => [RIGHT_SHOULDER, RIGHT_ELBOW, RIGHT_WRIST],
            (Joint::Knee, true) => [LEFT_HIP, LEFT_KNEE, LEFT_ANKLE],
            (Joint::Knee, false) => [RIGHT_HIP, RIGHT_KNEE, RIGHT_ANKLE],
            (Joint::Hip, true) => [LEFT_SHOULDER, LEFT_HIP, LEFT_KNEE],
            (Joint::Hip, false) => [RIGHT_SHOULDER, RIGHT_HIP, RIGHT_KNEE],
            (Joint::Wrist, true) => [LEFT_ELBOW, LEFT_WRIST, LEFT_INDEX],
            (Joint::Wrist, false) => [RIGHT_ELBOW, RIGHT_WRIST, RIGHT_INDEX],
        }
    }
}

/// Which way the head or trunk leans
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TiltDirection {
    Left,
    Right,
    Center,
}

impl TiltDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TiltDirection::Left => "left",
            TiltDirection::Right => "right",
            TiltDirection::Center => "center",
        }
    }
}

/// Displacement-based tilt with its direction
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tilt {
    pub angle: f32,
    pub direction: TiltDirection,
}

/// Per-frame joint angles in whole degrees; 0 means unmeasurable
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JointAngleSet {
    pub left_shoulder: f32,
    pub right_shoulder: f32,
    pub left_elbow: f32,
    pub right_elbow: f32,
    pub left_knee: f32,
    pub right_knee: f32,
    pub left_hip: f32,
    pub right_hip: f32,
    pub left_wrist: f32,
    pub right_wrist: f32,
    pub neck_tilt: f32,
    pub trunk_tilt: f32,
}

impl JointAngleSet {
    pub fn get(&self, joint: Joint, side: Side) -> f32 {
        let left = side != Side::Right;
        match (joint, left) {
            (Joint::Shoulder, true) => self.left_shoulder,
            (Joint::Shoulder, false) => self.right_shoulder,
            (Joint::Elbow, true) => self.left_elbow,
            (Joint::Elbow, false) => self.right_elbow,
            (Joint::Knee, true) => self.left_knee,
            (Joint::Knee, false) => self.right_knee,
            (Joint::Hip, true) => self.left_hip,
            (Joint::Hip, false) => self.right_hip,
            (Joint::Wrist, true) => self.left_wrist,
            (Joint::Wrist, false) => self.right_wrist,
        }
    }

    /// The five joint angles of one side, in `Joint::ALL` order
    pub fn side_angles(&self, side: Side) -> [f32; 5] {
        Joint::ALL.map(|joint| self.get(joint, side))
    }

    fn all(&self) -> [f32; 12] {
        [
            self.left_shoulder, self.right_shoulder,
            self.left_elbow, self.right_elbow,
            self.left_knee, self.right_knee,
            self.left_hip, self.right_hip,
            self.left_wrist, self.right_wrist,
            self.neck_tilt, self.trunk_tilt,
        ]
    }

    /// Summary over the measurable (non-zero) angles
    pub fn statistics(&self) -> AngleStatistics {
        let active: Vec<f32> = self.all().into_iter().filter(|a| *a > 0.0).collect();
        if active.is_empty() {
            return AngleStatistics::default();
        }
        let max = active.iter().copied().fold(f32::MIN, f32::max);
        let min = active.iter().copied().fold(f32::MAX, f32::min);
        let mean = active.iter().sum::<f32>() / active.len() as f32;
        AngleStatistics {
            mean: mean.round(),
            max,
            min,
            range: max - min,
            active_joints: active.len(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AngleStatistics {
    pub mean: f32,
    pub max: f32,
    pub min: f32,
    pub range: f32,
    pub active_joints: usize,
}

/// Computes joint angles behind a confidence gate
#[derive(Clone, Copy, Debug, Default)]
pub struct JointAngleCalculator {
    gate: ConfidenceGate,
}

impl JointAngleCalculator {
    pub fn new(gate: ConfidenceGate) -> Self {
        Self { gate }
    }

    pub fn gate(&self) -> &ConfidenceGate {
        &self.gate
    }

    /// Raw (unrounded) joint angle, `None` when any landmark fails the gate
    pub fn joint_angle(&self, frame: &LandmarkFrame, joint: Joint, side: Side) -> Option<f32> {
        let [a, b, c] = self.gate.points(frame, joint.landmarks(side))?;
        Some(angle_at(a, b, c))
    }

    /// Head tilt from the vertical offset between the ears
    pub fn neck_tilt(
        &self,
        frame: &LandmarkFrame,
        scale: f32,
        cap: f32,
        direction_threshold: f32,
    ) -> Option<Tilt> {
        let [_, left_ear, right_ear] = self.gate.points(frame, [NOSE, LEFT_EAR, RIGHT_EAR])?;
        let angle = ((left_ear.1 - right_ear.1).abs() * scale).clamp(0.0, cap);

        // Smaller y is higher in the image
        let direction = if left_ear.1 < right_ear.1 - direction_threshold {
            TiltDirection::Left
        } else if right_ear.1 < left_ear.1 - direction_threshold {
            TiltDirection::Right
        } else {
            TiltDirection::Center
        };
        Some(Tilt { angle, direction })
    }

    /// Trunk lean from the horizontal offset of the shoulder midpoint over the hip midpoint
    pub fn trunk_sway(
        &self,
        frame: &LandmarkFrame,
        scale: f32,
        cap: f32,
        direction_threshold: f32,
    ) -> Option<Tilt> {
        let [ls, rs, lh, rh] =
            self.gate.points(frame, [LEFT_SHOULDER, RIGHT_SHOULDER, LEFT_HIP, RIGHT_HIP])?;
        let shoulder_center = midpoint(ls, rs);
        let hip_center = midpoint(lh, rh);
        let delta_x = shoulder_center.0 - hip_center.0;
        let angle = (delta_x.abs() * scale).clamp(0.0, cap);

        let direction = if delta_x > direction_threshold {
            TiltDirection::Right
        } else if delta_x < -direction_threshold {
            TiltDirection::Left
        } else {
            TiltDirection::Center
        };
        Some(Tilt { angle, direction })
    }

    /// Full joint angle set for one frame, rounded to whole degrees
    pub fn compute(&self, frame: &LandmarkFrame) -> JointAngleSet {
        let joint = |joint: Joint, side: Side| {
            self.joint_angle(frame, joint, side).map(f32::round).unwrap_or(0.0)
        };
        let neck = self
            .neck_tilt(frame, NECK_TILT_SCALE, NECK_TILT_MAX, 0.0)
            .map(|t| t.angle.round())
            .unwrap_or(0.0);
        let trunk = self
            .trunk_sway(frame, TRUNK_TILT_SCALE, TRUNK_TILT_MAX, 0.0)
            .map(|t| t.angle.round())
            .unwrap_or(0.0);

        JointAngleSet {
            left_shoulder: joint(Joint::Shoulder, Side::Left),
            right_shoulder: joint(Joint::Shoulder, Side::Right),
            left_elbow: joint(Joint::Elbow, Side::Left),
            right_elbow: joint(Joint::Elbow, Side::Right),
            left_knee: joint(Joint::Knee, Side::Left),
            right_knee: joint(Joint::Knee, Side::Right),
            left_hip: joint(Joint::Hip, Side::Left),
            right_hip: joint(Joint::Hip, Side::Right),
            left_wrist: joint(Joint::Wrist, Side::Left),
            right_wrist: joint(Joint::Wrist, Side::Right),
            neck_tilt: neck,
            trunk_tilt: trunk,
        }
    }
}
