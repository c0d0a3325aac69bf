//! Exercise phase state machine
//!
//! `Rest -> Moving -> Holding -> Returning -> Rest`, one repetition per full
//! cycle. Angle thresholds drive every transition except `Holding ->
//! Returning`, which fires when the hold timer comes due. The timer is
//! polled on each frame and on explicit ticks.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::definition::{ExerciseDefinition, Measurement, SideMode};
use super::hold_timer::{HoldTimer, HoldToken};
use crate::kinematics::{Side, TiltDirection};
use crate::session::{SessionEvent, Severity};

/// Samples needed before a plateau can be called
const PLATEAU_WINDOW: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Rest,
    Moving,
    Holding,
    Returning,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Rest => "rest",
            Phase::Moving => "moving",
            Phase::Holding => "holding",
            Phase::Returning => "returning",
        }
    }
}

/// A cycle that made it back to rest
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompletedRepetition {
    pub side: Side,
    pub duration_ms: f64,
    /// Mean per-frame accuracy over the cycle
    pub accuracy: f32,
}

pub struct PhaseStateMachine {
    definition: ExerciseDefinition,
    phase: Phase,
    timer: HoldTimer,
    hold_token: Option<HoldToken>,
    /// Side being exercised (alternating exercises only)
    active_side: Side,
    /// Side the current cycle is measured on
    cycle_side: Side,
    history: VecDeque<f32>,
    history_len: usize,
    accuracy: f32,
    cycle_started_ms: f64,
    cycle_accuracy_sum: f32,
    cycle_frames: u32,
    countdown_secs: Option<u32>,
    plateau_reported: bool,
}

impl PhaseStateMachine {
    pub fn new(definition: ExerciseDefinition, history_len: usize) -> Self {
        let active_side = match definition.side_mode {
            SideMode::Alternating => Side::Left,
            _ => Side::Both,
        };
        Self {
            definition,
            phase: Phase::Rest,
            timer: HoldTimer::new(),
            hold_token: None,
            active_side,
            cycle_side: active_side,
            history: VecDeque::with_capacity(history_len.max(1)),
            history_len: history_len.max(1),
            accuracy: 0.0,
            cycle_started_ms: 0.0,
            cycle_accuracy_sum: 0.0,
            cycle_frames: 0,
            countdown_secs: None,
            plateau_reported: false,
        }
    }

    pub fn definition(&self) -> &ExerciseDefinition {
        &self.definition
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn label(&self) -> &'static str {
        self.definition.label(self.phase)
    }

    /// Side an alternating exercise expects next; `Both` otherwise
    pub fn active_side(&self) -> Side {
        self.active_side
    }

    /// Side the running cycle started on. Fixed from `Moving` until back at `Rest`.
    pub fn cycle_side(&self) -> Side {
        self.cycle_side
    }

    /// Accuracy of the last evaluated frame
    pub fn accuracy(&self) -> f32 {
        self.accuracy
    }

    pub fn history(&self) -> &VecDeque<f32> {
        &self.history
    }

    pub fn hold_remaining_ms(&self, now_ms: f64) -> Option<f64> {
        self.timer.remaining_ms(now_ms)
    }

    /// Back to `Rest`, invalidating any pending hold
    pub fn reset(&mut self) {
        self.cancel_hold();
        self.phase = Phase::Rest;
        self.active_side = match self.definition.side_mode {
            SideMode::Alternating => Side::Left,
            _ => Side::Both,
        };
        self.cycle_side = self.active_side;
        self.history.clear();
        self.accuracy = 0.0;
        self.reset_cycle(0.0);
    }

    /// Fire a due hold timer. Returns true if the phase changed.
    pub fn tick(&mut self, now_ms: f64, out: &mut Vec<SessionEvent>) -> bool {
        let Some(token) = self.hold_token else {
            return false;
        };
        self.on_hold_elapsed(token, now_ms, out)
    }

    /// Hold deadline reached for `token`; stale or early tokens are ignored
    pub fn on_hold_elapsed(
        &mut self,
        token: HoldToken,
        now_ms: f64,
        out: &mut Vec<SessionEvent>,
    ) -> bool {
        if self.phase != Phase::Holding || self.hold_token != Some(token) {
            trace!(generation = token.generation(), "stale hold timer discarded");
            return false;
        }
        if !self.timer.claim(token, now_ms) {
            return false;
        }
        self.hold_token = None;
        self.countdown_secs = None;
        self.transition(Phase::Returning, "Well held, now return slowly", out);
        true
    }

    /// Evaluate one frame. `None` measurement skips evaluation.
    pub fn update(
        &mut self,
        measurement: Option<Measurement>,
        side: Side,
        now_ms: f64,
        out: &mut Vec<SessionEvent>,
    ) -> Option<CompletedRepetition> {
        self.tick(now_ms, out);

        let measurement = measurement?;
        let angle = measurement.angle;

        if self.history.len() >= self.history_len {
            self.history.pop_front();
        }
        self.history.push_back(angle);

        self.accuracy = self.definition.accuracy(self.phase, angle);
        if self.phase != Phase::Rest {
            self.cycle_accuracy_sum += self.accuracy;
            self.cycle_frames += 1;
        }

        match self.phase {
            Phase::Rest => {
                self.update_rest(measurement, side, now_ms, out);
                None
            }
            Phase::Moving => {
                self.update_moving(angle, now_ms, out);
                None
            }
            Phase::Holding => {
                self.update_holding(angle, now_ms, out);
                None
            }
            Phase::Returning => self.update_returning(measurement, now_ms, out),
        }
    }

    fn update_rest(
        &mut self,
        measurement: Measurement,
        side: Side,
        now_ms: f64,
        out: &mut Vec<SessionEvent>,
    ) {
        let def = &self.definition;
        let angle = measurement.angle;

        if let Some(band) = def.ready_band {
            if !band.contains(angle) {
                out.push(SessionEvent::feedback(
                    "Get into the starting position",
                    Severity::Info,
                ));
                return;
            }
        }

        if angle <= def.start_threshold() {
            return;
        }
        if def.requires_direction && measurement.direction == TiltDirection::Center {
            return;
        }

        self.reset_cycle(now_ms);
        self.cycle_side = side;
        self.cycle_accuracy_sum = self.accuracy;
        self.cycle_frames = 1;
        self.transition(Phase::Moving, "Good, keep going", out);
    }

    fn update_moving(&mut self, angle: f32, now_ms: f64, out: &mut Vec<SessionEvent>) {
        let hold_threshold = self.definition.hold_threshold();
        let start_threshold = self.definition.start_threshold();
        let hold_band = self.definition.hold_band;

        if let Some(max) = self.definition.thresholds.safe_max {
            if angle > max {
                out.push(SessionEvent::feedback(
                    "That's far enough, ease back a little",
                    Severity::Warning,
                ));
                return;
            }
        }

        if angle >= hold_threshold {
            match hold_band {
                Some(band) if angle > band.max => {
                    out.push(SessionEvent::feedback("Ease back slightly", Severity::Info));
                }
                Some(band) if angle < band.min => {}
                _ => {
                    self.enter_hold(now_ms, out);
                }
            }
            return;
        }

        if self.is_plateau() && angle > start_threshold {
            if !self.plateau_reported {
                self.plateau_reported = true;
                out.push(SessionEvent::feedback(
                    "Nearly there, try to go a little further",
                    Severity::Info,
                ));
            }
        } else {
            self.plateau_reported = false;
        }
    }

    fn update_holding(&mut self, angle: f32, now_ms: f64, out: &mut Vec<SessionEvent>) {
        if let Some(band) = self.definition.hold_band {
            if !band.contains(angle) {
                self.cancel_hold();
                self.transition(Phase::Moving, "Keep the position steady", out);
                return;
            }
        }

        if let Some(remaining) = self.timer.remaining_ms(now_ms) {
            let secs = (remaining / 1000.0).ceil() as u32;
            if secs > 0 && self.countdown_secs != Some(secs) {
                self.countdown_secs = Some(secs);
                out.push(SessionEvent::feedback(
                    format!("Hold... {secs} s left"),
                    Severity::Info,
                ));
            }
        }
    }

    fn update_returning(
        &mut self,
        measurement: Measurement,
        now_ms: f64,
        out: &mut Vec<SessionEvent>,
    ) -> Option<CompletedRepetition> {
        let def = &self.definition;
        if measurement.angle > def.return_threshold() {
            return None;
        }
        if let Some(band) = def.ready_band {
            if !band.contains(measurement.angle) {
                return None;
            }
        }
        if def.requires_direction && measurement.direction != TiltDirection::Center {
            return None;
        }

        let accuracy = if self.cycle_frames > 0 {
            (self.cycle_accuracy_sum / self.cycle_frames as f32).round()
        } else {
            self.accuracy
        };
        let repetition = CompletedRepetition {
            side: self.cycle_side,
            duration_ms: (now_ms - self.cycle_started_ms).max(0.0),
            accuracy,
        };

        self.transition(Phase::Rest, "Repetition complete", out);

        if self.definition.side_mode == SideMode::Alternating {
            self.active_side = self.active_side.opposite();
            self.cycle_side = self.active_side;
        }
        self.reset_cycle(now_ms);

        Some(repetition)
    }

    fn enter_hold(&mut self, now_ms: f64, out: &mut Vec<SessionEvent>) {
        let token = self.timer.arm(now_ms, self.definition.hold_ms);
        self.hold_token = Some(token);
        self.countdown_secs = None;
        self.transition(Phase::Holding, "Hold the position", out);
        if self.definition.hold_ms <= 0.0 {
            self.tick(now_ms, out);
        }
    }

    fn cancel_hold(&mut self) {
        if self.hold_token.take().is_some() {
            trace!("hold timer cancelled");
        }
        self.timer.cancel();
        self.countdown_secs = None;
    }

    fn transition(&mut self, to: Phase, message: &str, out: &mut Vec<SessionEvent>) {
        debug!(
            exercise = self.definition.key,
            from = self.phase.as_str(),
            to = to.as_str(),
            "phase transition"
        );
        self.phase = to;
        if to == Phase::Moving {
            self.plateau_reported = false;
        }
        out.push(SessionEvent::PhaseChanged {
            phase: to,
            label: self.definition.label(to).to_string(),
            message: message.to_string(),
        });
    }

    fn is_plateau(&self) -> bool {
        if self.history.len() < PLATEAU_WINDOW {
            return false;
        }
        let recent = self.history.iter().rev().take(PLATEAU_WINDOW);
        let (min, max) = recent.fold((f32::MAX, f32::MIN), |(lo, hi), &a| (lo.min(a), hi.max(a)));
        max - min < self.definition.thresholds.plateau_tolerance
    }

    fn reset_cycle(&mut self, now_ms: f64) {
        self.cycle_started_ms = now_ms;
        self.cycle_accuracy_sum = 0.0;
        self.cycle_frames = 0;
        self.countdown_secs = None;
        self.plateau_reported = false;
    }
}
