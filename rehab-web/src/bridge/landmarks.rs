//! Landmark frame model
//!
//! Receives MediaPipe pose landmarks from JavaScript as a flat array
//! and turns them into an immutable per-frame snapshot.

use serde::{Deserialize, Serialize};
use crate::error::RehabError;

// ============================================================================
// LANDMARK INDICES (MediaPipe Pose - 33 total)
// ============================================================================

pub const LANDMARK_COUNT: usize = 33;

/// Values per landmark in the flat JS array: x, y, visibility
pub const VALUES_PER_LANDMARK: usize = 3;

pub const NOSE: usize = 0;
pub const LEFT_EAR: usize = 7;
pub const RIGHT_EAR: usize = 8;
pub const LEFT_SHOULDER: usize = 11;
pub const RIGHT_SHOULDER: usize = 12;
pub const LEFT_ELBOW: usize = 13;
pub const RIGHT_ELBOW: usize = 14;
pub const LEFT_WRIST: usize = 15;
pub const RIGHT_WRIST: usize = 16;
pub const LEFT_INDEX: usize = 19;
pub const RIGHT_INDEX: usize = 20;
pub const LEFT_HIP: usize = 23;
pub const RIGHT_HIP: usize = 24;
pub const LEFT_KNEE: usize = 25;
pub const RIGHT_KNEE: usize = 26;
pub const LEFT_ANKLE: usize = 27;
pub const RIGHT_ANKLE: usize = 28;

/// Landmarks scored for side selection (shoulder, elbow, wrist, hip, knee, ankle)
pub const LEFT_SIDE_LANDMARKS: [usize; 6] = [
    LEFT_SHOULDER, LEFT_ELBOW, LEFT_WRIST, LEFT_HIP, LEFT_KNEE, LEFT_ANKLE,
];
pub const RIGHT_SIDE_LANDMARKS: [usize; 6] = [
    RIGHT_SHOULDER, RIGHT_ELBOW, RIGHT_WRIST, RIGHT_HIP, RIGHT_KNEE, RIGHT_ANKLE,
];

// ============================================================================
// LANDMARK DATA STRUCTURE
// ============================================================================

/// A single 2D landmark point (normalized coordinates)
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,          // 0-1 normalized
    pub y: f32,          // 0-1 normalized
    pub visibility: f32, // 0-1 confidence
}

impl Landmark {
    pub fn new(x: f32, y: f32, visibility: f32) -> Self {
        Self { x, y, visibility }
    }

    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}

/// One detection cycle's worth of landmarks
#[derive(Clone, Debug, PartialEq)]
pub struct LandmarkFrame {
    landmarks: [Landmark; LANDMARK_COUNT],
}

impl Default for LandmarkFrame {
    fn default() -> Self {
        Self {
            landmarks: [Landmark::default(); LANDMARK_COUNT],
        }
    }
}

impl LandmarkFrame {
    pub fn new(landmarks: [Landmark; LANDMARK_COUNT]) -> Self {
        Self { landmarks }
    }

    /// Build from the flat Float32Array layout used by the JS side
    /// (33 landmarks × 3 values: x, y, visibility)
    pub fn from_flat(data: &[f32]) -> Result<Self, RehabError> {
        let expected = LANDMARK_COUNT * VALUES_PER_LANDMARK;
        if data.len() != expected {
            return Err(RehabError::InvalidFrameLength {
                expected,
                actual: data.len(),
            });
        }

        let mut landmarks = [Landmark::default(); LANDMARK_COUNT];
        for (i, chunk) in data.chunks_exact(VALUES_PER_LANDMARK).enumerate() {
            landmarks[i] = Landmark {
                x: chunk[0],
                y: chunk[1],
                visibility: chunk[2],
            };
        }
        Ok(Self { landmarks })
    }

    /// Get a specific landmark by index
    pub fn get(&self, index: usize) -> Option<&Landmark> {
        self.landmarks.get(index)
    }

    /// Position of a landmark, `None` when the index is out of range
    pub fn point(&self, index: usize) -> Option<(f32, f32)> {
        self.get(index).map(Landmark::position)
    }

    pub fn landmarks(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.landmarks
    }

    /// Replace one landmark, returning the modified frame
    pub fn with(mut self, index: usize, landmark: Landmark) -> Self {
        if index < LANDMARK_COUNT {
            self.landmarks[index] = landmark;
        }
        self
    }
}
