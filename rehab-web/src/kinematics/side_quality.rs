//! Side quality scoring and hysteresis side selection
//!
//! Each frame both body sides get a composite quality score (visibility +
//! movement + position + angle variation). The selector only moves away
//! from the current side when the other side leads by more than the
//! configured margin, so near-equal scores never make the selection flap.

use serde::Serialize;
use tracing::debug;

use super::angles::standard_deviation;
use super::joints::{JointAngleSet, Side};
use crate::bridge::{LandmarkFrame, LEFT_SIDE_LANDMARKS, RIGHT_SIDE_LANDMARKS};
use crate::config::QualityConfig;

/// Quality breakdown for one side in one frame
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SideQuality {
    pub angle: f32,
    pub visibility_score: f32,
    pub movement_score: f32,
    pub position_score: f32,
    pub variation_score: f32,
    pub total_quality: f32,
    pub visible_count: usize,
    pub angle_variation: f32,
}

/// Hysteresis decision over two quality totals
#[derive(Clone, Debug)]
pub struct SideSelector {
    selected: Side,
    margin: f32,
    confirm_frames: u32,
    /// Challenger and how many consecutive frames it has led by the margin
    pending: Option<(Side, u32)>,
}

impl SideSelector {
    pub fn new(margin: f32, confirm_frames: u32) -> Self {
        Self {
            selected: Side::Both,
            margin,
            confirm_frames: confirm_frames.max(1),
            pending: None,
        }
    }

    pub fn selected(&self) -> Side {
        self.selected
    }

    /// Feed one frame's totals; returns the (possibly unchanged) selection
    pub fn update(&mut self, left: f32, right: f32) -> Side {
        let challenger = match self.selected {
            Side::Left if right > left + self.margin => Some(Side::Right),
            Side::Right if left > right + self.margin => Some(Side::Left),
            Side::Both if left > right + self.margin => Some(Side::Left),
            Side::Both if right > left + self.margin => Some(Side::Right),
            _ => None,
        };

        let Some(challenger) = challenger else {
            self.pending = None;
            return self.selected;
        };

        let count = match self.pending {
            Some((side, count)) if side == challenger => count + 1,
            _ => 1,
        };

        if count >= self.confirm_frames {
            debug!(from = self.selected.as_str(), to = challenger.as_str(), "side switched");
            self.selected = challenger;
            self.pending = None;
        } else {
            self.pending = Some((challenger, count));
        }
        self.selected
    }

    pub fn reset(&mut self) {
        self.selected = Side::Both;
        self.pending = None;
    }
}

/// Per-side quality scoring with memory of the previous frame
#[derive(Clone, Debug)]
pub struct SideQualityScorer {
    config: QualityConfig,
    min_visibility: f32,
    left: SideQuality,
    right: SideQuality,
    selector: SideSelector,
}

impl SideQualityScorer {
    pub fn new(config: QualityConfig, min_visibility: f32) -> Self {
        let selector = SideSelector::new(config.switch_margin, config.confirm_frames);
        Self {
            config,
            min_visibility,
            left: SideQuality::default(),
            right: SideQuality::default(),
            selector,
        }
    }

    pub fn selected(&self) -> Side {
        self.selector.selected()
    }

    pub fn quality(&self, side: Side) -> &SideQuality {
        match side {
            Side::Right => &self.right,
            _ => &self.left,
        }
    }

    /// Side with the higher total this frame (left on ties)
    pub fn stronger_side(&self) -> Side {
        if self.right.total_quality > self.left.total_quality {
            Side::Right
        } else {
            Side::Left
        }
    }

    /// Score one side against its previous frame
    pub fn score_side(
        &self,
        frame: &LandmarkFrame,
        side: Side,
        angle: f32,
        angles: &JointAngleSet,
    ) -> SideQuality {
        let q = &self.config;
        let indices = match side {
            Side::Right => &RIGHT_SIDE_LANDMARKS,
            _ => &LEFT_SIDE_LANDMARKS,
        };

        let mut visibility_score = 0.0;
        let mut visible_count = 0;
        for lm in indices.iter().filter_map(|&i| frame.get(i)) {
            if lm.visibility > self.min_visibility {
                visibility_score += (lm.visibility * q.visibility_weight).min(q.visibility_cap);
                visible_count += 1;
            }
        }

        let previous = self.quality(side).angle;
        let movement_score = if previous > 0.0 {
            ((angle - previous).abs() * q.movement_weight).min(q.movement_cap)
        } else {
            0.0
        };

        let (low, high) = q.position_band;
        let position_score = if angle > low && angle < high {
            q.position_bonus
        } else {
            0.0
        };

        let measured: Vec<f32> = angles
            .side_angles(side)
            .into_iter()
            .filter(|a| *a > 0.0)
            .collect();
        let angle_variation = standard_deviation(&measured);
        let variation_score = (angle_variation * q.variation_weight).min(q.variation_cap);

        SideQuality {
            angle,
            visibility_score,
            movement_score,
            position_score,
            variation_score,
            total_quality: visibility_score + movement_score + position_score + variation_score,
            visible_count,
            angle_variation,
        }
    }

    /// Rescore both sides and run the selector. Returns the selected side.
    pub fn update(
        &mut self,
        frame: &LandmarkFrame,
        left_angle: f32,
        right_angle: f32,
        angles: &JointAngleSet,
    ) -> Side {
        let left = self.score_side(frame, Side::Left, left_angle, angles);
        let right = self.score_side(frame, Side::Right, right_angle, angles);
        self.left = left;
        self.right = right;
        self.selector.update(left.total_quality, right.total_quality)
    }

    pub fn reset(&mut self) {
        self.left = SideQuality::default();
        self.right = SideQuality::default();
        self.selector.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::Landmark;

    fn frame(left_vis: f32, right_vis: f32) -> LandmarkFrame {
        let mut frame = LandmarkFrame::default();
        for (i, (&l, &r)) in LEFT_SIDE_LANDMARKS.iter().zip(RIGHT_SIDE_LANDMARKS.iter()).enumerate() {
            let y = 0.2 + i as f32 * 0.1;
            frame = frame
                .with(l, Landmark::new(0.6, y, left_vis))
                .with(r, Landmark::new(0.4, y, right_vis));
        }
        frame
    }

    #[test]
    fn test_near_equal_scores_never_flap() {
        let mut selector = SideSelector::new(15.0, 1);
        for _ in 0..20 {
            assert_eq!(selector.update(40.0, 38.0), Side::Both);
        }

        selector.update(60.0, 20.0);
        assert_eq!(selector.selected(), Side::Left);
        for _ in 0..20 {
            assert_eq!(selector.update(40.0, 38.0), Side::Left);
            assert_eq!(selector.update(38.0, 40.0), Side::Left);
        }
    }

    #[test]
    fn test_sustained_lead_switches() {
        let mut selector = SideSelector::new(15.0, 1);
        assert_eq!(selector.update(60.0, 20.0), Side::Left);
        // Right must lead by more than the margin, not just lead
        assert_eq!(selector.update(60.0, 74.0), Side::Left);
        assert_eq!(selector.update(20.0, 60.0), Side::Right);
    }

    #[test]
    fn test_confirm_frames_delay_switch() {
        let mut selector = SideSelector::new(15.0, 3);
        assert_eq!(selector.update(60.0, 20.0), Side::Both);
        assert_eq!(selector.update(60.0, 20.0), Side::Both);
        assert_eq!(selector.update(60.0, 20.0), Side::Left);

        // An interrupted streak starts over
        selector.update(20.0, 60.0);
        selector.update(20.0, 60.0);
        selector.update(40.0, 40.0);
        assert_eq!(selector.update(20.0, 60.0), Side::Left);
        selector.update(20.0, 60.0);
        assert_eq!(selector.update(20.0, 60.0), Side::Right);
    }

    #[test]
    fn test_visibility_and_position_scores() {
        let scorer = SideQualityScorer::new(QualityConfig::default(), 0.5);
        let quality = scorer.score_side(&frame(1.0, 0.2), Side::Left, 90.0, &JointAngleSet::default());
        assert_eq!(quality.visible_count, 6);
        assert!((quality.visibility_score - 90.0).abs() < 1e-4);
        assert_eq!(quality.position_score, 20.0);
        assert_eq!(quality.movement_score, 0.0);

        let hidden = scorer.score_side(&frame(1.0, 0.2), Side::Right, 5.0, &JointAngleSet::default());
        assert_eq!(hidden.visible_count, 0);
        assert_eq!(hidden.position_score, 0.0);
        assert_eq!(hidden.total_quality, 0.0);
    }

    #[test]
    fn test_movement_score_uses_previous_angle() {
        let mut scorer = SideQualityScorer::new(QualityConfig::default(), 0.5);
        let f = frame(0.9, 0.9);
        let angles = JointAngleSet::default();
        scorer.update(&f, 40.0, 40.0, &angles);
        scorer.update(&f, 50.0, 100.0, &angles);
        assert!((scorer.quality(Side::Left).movement_score - 15.0).abs() < 1e-4);
        assert_eq!(scorer.quality(Side::Right).movement_score, 25.0);
    }

    #[test]
    fn test_variation_score_capped() {
        let scorer = SideQualityScorer::new(QualityConfig::default(), 0.5);
        let angles = JointAngleSet {
            left_shoulder: 20.0,
            left_elbow: 170.0,
            left_knee: 90.0,
            ..JointAngleSet::default()
        };
        let quality = scorer.score_side(&frame(0.9, 0.9), Side::Left, 0.0, &angles);
        assert!(quality.angle_variation > 20.0);
        assert_eq!(quality.variation_score, 10.0);
    }

    #[test]
    fn test_active_side_wins_selection() {
        let mut scorer = SideQualityScorer::new(QualityConfig::default(), 0.5);
        let f = frame(0.95, 0.55);
        let angles = JointAngleSet::default();
        let mut side = Side::Both;
        for step in 0..5 {
            side = scorer.update(&f, 20.0 + step as f32 * 10.0, 0.0, &angles);
        }
        assert_eq!(side, Side::Left);
    }
}
