//! Confidence Gate - guards every angle computation
//!
//! A joint is only measured when all of its landmarks exist and were
//! detected with visibility above the threshold. Otherwise the angle is
//! unmeasurable for this frame; no stale position is substituted.

use crate::bridge::LandmarkFrame;

/// Default minimum visibility for a landmark to be trusted
pub const DEFAULT_MIN_VISIBILITY: f32 = 0.5;

/// True only if every index exists and its visibility exceeds `min_visibility`
pub fn is_valid(frame: &LandmarkFrame, indices: &[usize], min_visibility: f32) -> bool {
    indices.iter().all(|&index| {
        frame
            .get(index)
            .map(|lm| lm.visibility > min_visibility && lm.x.is_finite() && lm.y.is_finite())
            .unwrap_or(false)
    })
}

/// Visibility gate with a configurable threshold
#[derive(Clone, Copy, Debug)]
pub struct ConfidenceGate {
    /// Minimum confidence to accept raw data
    threshold: f32,
}

impl ConfidenceGate {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn accepts(&self, frame: &LandmarkFrame, indices: &[usize]) -> bool {
        is_valid(frame, indices, self.threshold)
    }

    /// Positions of the requested landmarks, or `None` if any fails the gate
    pub fn points<const N: usize>(
        &self,
        frame: &LandmarkFrame,
        indices: [usize; N],
    ) -> Option<[(f32, f32); N]> {
        if !self.accepts(frame, &indices) {
            return None;
        }
        let mut points = [(0.0, 0.0); N];
        for (slot, index) in points.iter_mut().zip(indices) {
            *slot = frame.point(index)?;
        }
        Some(points)
    }
}

impl Default for ConfidenceGate {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_VISIBILITY)
    }
}
