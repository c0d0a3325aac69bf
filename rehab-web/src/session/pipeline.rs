//! Exercise session pipeline
//!
//! Owns one exercise's whole per-frame flow: throttle, joint angles, side
//! selection, phase machine, counting and the event queue. The caller keeps
//! the session and feeds it frames with their timestamps.

use tracing::{debug, info, trace, warn};

use super::events::{EventQueue, SessionEvent, Severity};
use super::summary::{LogKind, SessionLog, SessionSummary};
use super::throttle::FrameThrottle;
use crate::bridge::LandmarkFrame;
use crate::config::TrackerConfig;
use crate::error::{RehabError, Result};
use crate::exercise::{
    find, AngleSource, CompletedRepetition, ExerciseDefinition, Measurement, Phase,
    PhaseStateMachine, RepetitionAggregator, SessionCounters, SideMode,
};
use crate::kinematics::{
    AngleStatistics, ConfidenceGate, Joint, JointAngleCalculator, JointAngleSet, Side,
    SideQualityScorer,
};

/// What happened to one submitted frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FrameOutcome {
    /// Arrived inside the throttle interval; not processed
    Throttled,
    /// Angles refreshed, no exercise running
    Idle,
    Evaluated(FrameReport),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameReport {
    pub phase: Phase,
    /// Side the exercise was measured on
    pub side: Side,
    /// `None` when the exercise angle was unmeasurable
    pub angle: Option<f32>,
    pub accuracy: f32,
    pub repetition_counted: bool,
}

pub struct ExerciseSession {
    config: TrackerConfig,
    calculator: JointAngleCalculator,
    scorer: SideQualityScorer,
    machine: Option<PhaseStateMachine>,
    aggregator: RepetitionAggregator,
    throttle: FrameThrottle,
    events: EventQueue,
    log: SessionLog,
    angles: JointAngleSet,
    reported_side: Side,
    /// Side the exercise angle was last taken from
    measured_side: Side,
    running: bool,
    last_summary: Option<SessionSummary>,
}

impl ExerciseSession {
    pub fn new(config: TrackerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: TrackerConfig) -> Self {
        let gate = ConfidenceGate::new(config.min_visibility);
        Self {
            calculator: JointAngleCalculator::new(gate),
            scorer: SideQualityScorer::new(config.quality.clone(), config.min_visibility),
            machine: None,
            aggregator: RepetitionAggregator::new(config.target_reps, config.target_sets),
            throttle: FrameThrottle::new(config.frame_interval_ms),
            events: EventQueue::new(config.event_capacity),
            log: SessionLog::new(),
            angles: JointAngleSet::default(),
            reported_side: Side::Both,
            measured_side: Side::Both,
            running: false,
            last_summary: None,
            config,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Select an exercise by key. Unknown keys leave no exercise selected.
    pub fn select_exercise(&mut self, key: &str) -> Result<()> {
        match find(key) {
            Ok(definition) => {
                self.select_definition(definition.clone());
                Ok(())
            }
            Err(err) => {
                warn!(key, "unknown exercise");
                self.clear_exercise();
                self.events
                    .push(SessionEvent::feedback(err.to_string(), Severity::Error));
                Err(err)
            }
        }
    }

    /// Select a custom exercise definition
    pub fn select_definition(&mut self, definition: ExerciseDefinition) {
        debug!(exercise = definition.key, "exercise selected");
        self.clear_exercise();
        self.events
            .push(SessionEvent::feedback(definition.instructions, Severity::Info));
        self.machine = Some(PhaseStateMachine::new(definition, self.config.history_len));
    }

    pub fn set_targets(&mut self, target_reps: u32, target_sets: u32) -> Result<()> {
        let mut config = self.config.clone();
        config.target_reps = target_reps;
        config.target_sets = target_sets;
        config.validate()?;
        self.config = config;
        self.aggregator.set_targets(target_reps, target_sets);
        Ok(())
    }

    pub fn start(&mut self, now_ms: f64) -> Result<()> {
        let Some(machine) = self.machine.as_mut() else {
            let err = RehabError::NoExerciseSelected;
            self.events
                .push(SessionEvent::feedback(err.to_string(), Severity::Error));
            return Err(err);
        };

        machine.reset();
        self.aggregator.reset();
        self.scorer.reset();
        self.throttle.reset();
        self.reported_side = Side::Both;
        self.measured_side = Side::Both;
        self.last_summary = None;
        self.log.start(now_ms, machine.definition().key);
        self.running = true;

        info!(exercise = machine.definition().key, "session started");
        self.events.push(SessionEvent::PhaseChanged {
            phase: Phase::Rest,
            label: machine.label().to_string(),
            message: "Get ready".to_string(),
        });
        Ok(())
    }

    /// Stop the session; returns its summary if one was running
    pub fn stop(&mut self, now_ms: f64) -> Option<SessionSummary> {
        if !self.running {
            return self.last_summary.take();
        }
        self.finish(now_ms);
        self.last_summary.take()
    }

    /// Back to the state right after exercise selection
    pub fn reset(&mut self) {
        if let Some(machine) = self.machine.as_mut() {
            machine.reset();
        }
        self.aggregator.reset();
        self.scorer.reset();
        self.throttle.reset();
        self.events.clear();
        self.log.clear();
        self.angles = JointAngleSet::default();
        self.reported_side = Side::Both;
        self.measured_side = Side::Both;
        self.running = false;
        self.last_summary = None;
    }

    /// Submit one frame taken at `now_ms`
    pub fn process_frame(&mut self, frame: &LandmarkFrame, now_ms: f64) -> FrameOutcome {
        if !self.throttle.accept(now_ms) {
            trace!(now_ms, "frame throttled");
            self.tick(now_ms);
            return FrameOutcome::Throttled;
        }

        self.angles = self.calculator.compute(frame);

        if !self.running {
            return FrameOutcome::Idle;
        }
        let Some(machine) = self.machine.as_mut() else {
            return FrameOutcome::Idle;
        };
        let definition = machine.definition();
        let side_mode = definition.side_mode;

        let left = side_angle(definition, &self.calculator, frame, Side::Left, &self.angles);
        let right = side_angle(definition, &self.calculator, frame, Side::Right, &self.angles);
        let selected = self.scorer.update(frame, left, right, &self.angles);

        let mut out = Vec::new();
        if side_mode == SideMode::Auto && selected != self.reported_side {
            self.reported_side = selected;
            out.push(SessionEvent::SideChanged { side: selected });
        }

        // A cycle stays on the side it started on; only Rest may re-pick
        let side = match side_mode {
            SideMode::Alternating => machine.active_side(),
            SideMode::Central => Side::Both,
            SideMode::Auto if machine.phase() != Phase::Rest => machine.cycle_side(),
            SideMode::Auto if selected != Side::Both => selected,
            SideMode::Auto if self.measured_side != Side::Both => self.measured_side,
            SideMode::Auto => self.scorer.stronger_side(),
        };
        self.measured_side = side;

        let measurement: Option<Measurement> = definition.measure(&self.calculator, frame, side);
        if measurement.is_none() {
            out.push(SessionEvent::feedback(
                "Make sure your whole body is visible to the camera",
                Severity::Info,
            ));
        }

        let repetition = machine.update(measurement, side, now_ms, &mut out);
        let phase = machine.phase();
        let accuracy = machine.accuracy();
        let next_side = machine.active_side();
        if let Some(repetition) = repetition.as_ref() {
            self.count_repetition(repetition, now_ms, &mut out);
            if side_mode == SideMode::Alternating && self.running && next_side != repetition.side {
                out.push(SessionEvent::SideChanged { side: next_side });
                out.push(SessionEvent::feedback(
                    format!("Now switch to your {} side", next_side.as_str()),
                    Severity::Info,
                ));
            }
        }
        self.events.extend(out);

        FrameOutcome::Evaluated(FrameReport {
            phase,
            side,
            angle: measurement.map(|m| m.angle),
            accuracy,
            repetition_counted: repetition.is_some(),
        })
    }

    /// Fire a due hold timer without a frame. Returns true if the phase changed.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        if !self.running {
            return false;
        }
        let Some(machine) = self.machine.as_mut() else {
            return false;
        };
        let mut out = Vec::new();
        let changed = machine.tick(now_ms, &mut out);
        self.events.extend(out);
        changed
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        self.events.drain()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn exercise(&self) -> Option<&ExerciseDefinition> {
        self.machine.as_ref().map(|m| m.definition())
    }

    pub fn phase(&self) -> Phase {
        self.machine.as_ref().map(|m| m.phase()).unwrap_or(Phase::Rest)
    }

    pub fn phase_label(&self) -> &'static str {
        self.machine.as_ref().map(|m| m.label()).unwrap_or("rest")
    }

    pub fn selected_side(&self) -> Side {
        self.scorer.selected()
    }

    pub fn angles(&self) -> &JointAngleSet {
        &self.angles
    }

    pub fn statistics(&self) -> AngleStatistics {
        self.angles.statistics()
    }

    pub fn counters(&self) -> &SessionCounters {
        self.aggregator.counters()
    }

    /// Accuracy of the last evaluated frame
    pub fn accuracy(&self) -> f32 {
        self.machine.as_ref().map(|m| m.accuracy()).unwrap_or(0.0)
    }

    pub fn progress_percent(&self) -> f32 {
        self.aggregator.progress_percent()
    }

    /// Seconds left on a running hold
    pub fn hold_remaining_secs(&self, now_ms: f64) -> Option<f64> {
        let machine = self.machine.as_ref()?;
        if machine.phase() != Phase::Holding {
            return None;
        }
        machine.hold_remaining_ms(now_ms).map(|ms| ms / 1000.0)
    }

    /// Summary of the session so far
    pub fn summary(&self, now_ms: f64) -> Option<SessionSummary> {
        let definition = self.machine.as_ref()?.definition();
        let counters = self.aggregator.counters();
        let completed = self.aggregator.is_completed();
        Some(SessionSummary {
            exercise: definition.key.to_string(),
            exercise_name: definition.name.to_string(),
            repetitions: counters.total_repetitions,
            sets: if completed { counters.sets } else { counters.sets - 1 },
            left_reps: counters.left_reps,
            right_reps: counters.right_reps,
            duration_secs: self.log.elapsed_secs(now_ms),
            accuracy: self.aggregator.mean_accuracy(),
            completed,
            events: self.log.entries().to_vec(),
        })
    }

    fn count_repetition(
        &mut self,
        repetition: &CompletedRepetition,
        now_ms: f64,
        out: &mut Vec<SessionEvent>,
    ) {
        let set_before = self.aggregator.counters().sets;
        let completed = self.aggregator.record(repetition, out);
        let counters = *self.aggregator.counters();

        self.log.record(
            now_ms,
            LogKind::Repetition,
            format!(
                "Repetition {} ({}, {:.1} s)",
                counters.total_repetitions,
                repetition.side.as_str(),
                repetition.duration_ms / 1000.0
            ),
        );

        if completed {
            self.log.record(now_ms, LogKind::SetCompleted, format!("Set {set_before} done"));
            self.log.record(now_ms, LogKind::ProgramCompleted, "All sets done");
            out.push(SessionEvent::feedback(
                "Excellent work, all sets complete!",
                Severity::Success,
            ));
            self.finish(now_ms);
        } else if counters.sets != set_before {
            self.log.record(now_ms, LogKind::SetCompleted, format!("Set {set_before} done"));
            out.push(SessionEvent::feedback(
                format!("Set {set_before} complete, take a short rest"),
                Severity::Success,
            ));
        }
    }

    fn finish(&mut self, now_ms: f64) {
        self.log.record(now_ms, LogKind::Stop, "Stopped");
        self.last_summary = self.summary(now_ms);
        if let Some(machine) = self.machine.as_mut() {
            machine.reset();
        }
        self.running = false;
        info!(
            repetitions = self.aggregator.counters().total_repetitions,
            "session stopped"
        );
    }

    fn clear_exercise(&mut self) {
        self.machine = None;
        self.running = false;
        self.aggregator.reset();
        self.scorer.reset();
        self.log.clear();
        self.reported_side = Side::Both;
        self.measured_side = Side::Both;
        self.last_summary = None;
    }
}

impl Default for ExerciseSession {
    fn default() -> Self {
        Self::build(TrackerConfig::default())
    }
}

/// Angle the side scorer sees for `side`; 0 when unmeasurable
fn side_angle(
    definition: &ExerciseDefinition,
    calculator: &JointAngleCalculator,
    frame: &LandmarkFrame,
    side: Side,
    angles: &JointAngleSet,
) -> f32 {
    match definition.source {
        AngleSource::Joint(_) => definition
            .measure(calculator, frame, side)
            .map(|m| m.angle)
            .unwrap_or(0.0),
        _ => angles.get(Joint::Shoulder, side),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{
        Landmark, LEFT_ELBOW, LEFT_HIP, LEFT_ANKLE, LEFT_KNEE, LEFT_SHOULDER, RIGHT_ANKLE,
        RIGHT_ELBOW, RIGHT_HIP, RIGHT_KNEE, RIGHT_SHOULDER,
    };
    use crate::exercise::{identity, PhaseThresholds, ARM_RAISE_FORWARD, KNEE_EXTENSION};

    /// Place `anchor`, `vertex`, `end` so the angle at `vertex` is `angle_deg`
    fn bend(
        frame: LandmarkFrame,
        [anchor, vertex, end]: [usize; 3],
        at: (f32, f32),
        toward_anchor: (f32, f32),
        angle_deg: f32,
        visibility: f32,
    ) -> LandmarkFrame {
        let (sin, cos) = angle_deg.to_radians().sin_cos();
        let (ux, uy) = toward_anchor;
        let end_dir = (ux * cos - uy * sin, ux * sin + uy * cos);
        frame
            .with(anchor, Landmark::new(at.0 + ux * 0.2, at.1 + uy * 0.2, visibility))
            .with(vertex, Landmark::new(at.0, at.1, visibility))
            .with(end, Landmark::new(at.0 + end_dir.0 * 0.2, at.1 + end_dir.1 * 0.2, visibility))
    }

    /// Seated patient, left knee at `left_deg`, right leg barely visible
    fn knee_frame(left_deg: f32) -> LandmarkFrame {
        let frame = bend(
            LandmarkFrame::default(),
            [LEFT_HIP, LEFT_KNEE, LEFT_ANKLE],
            (0.6, 0.7),
            (0.0, -1.0),
            left_deg,
            0.95,
        );
        bend(frame, [RIGHT_HIP, RIGHT_KNEE, RIGHT_ANKLE], (0.4, 0.7), (0.0, -1.0), 90.0, 0.3)
    }

    /// Seated patient with both legs in full view
    fn knee_pair_frame(left_deg: f32, right_deg: f32) -> LandmarkFrame {
        let frame = bend(
            LandmarkFrame::default(),
            [LEFT_HIP, LEFT_KNEE, LEFT_ANKLE],
            (0.6, 0.7),
            (0.0, -1.0),
            left_deg,
            0.95,
        );
        bend(frame, [RIGHT_HIP, RIGHT_KNEE, RIGHT_ANKLE], (0.4, 0.7), (0.0, -1.0), right_deg, 0.95)
    }

    fn evaluated(outcome: FrameOutcome) -> FrameReport {
        match outcome {
            FrameOutcome::Evaluated(report) => report,
            other => panic!("frame not evaluated: {other:?}"),
        }
    }

    fn phases(events: &[SessionEvent]) -> Vec<Phase> {
        events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::PhaseChanged { phase, .. } => Some(*phase),
                _ => None,
            })
            .collect()
    }

    /// Both shoulders visible, hips below
    fn shoulder_frame(left_deg: f32, right_deg: f32) -> LandmarkFrame {
        let frame = bend(
            LandmarkFrame::default(),
            [LEFT_HIP, LEFT_SHOULDER, LEFT_ELBOW],
            (0.6, 0.4),
            (0.0, 1.0),
            left_deg,
            0.9,
        );
        bend(frame, [RIGHT_HIP, RIGHT_SHOULDER, RIGHT_ELBOW], (0.4, 0.4), (0.0, 1.0), right_deg, 0.9)
    }

    fn two_sided() -> ExerciseDefinition {
        ExerciseDefinition {
            key: "two-sided-raise",
            name: "Two-sided raise",
            source: AngleSource::Joint(Joint::Shoulder),
            normalize: identity,
            thresholds: PhaseThresholds {
                rest: 10.0,
                start_deadband: 3.0,
                target: 160.0,
                hold_ratio: 0.95,
                return_tolerance: 5.0,
                safe_max: None,
                plateau_tolerance: 1.0,
            },
            required_landmarks: &[],
            hold_ms: 100.0,
            ..ARM_RAISE_FORWARD
        }
    }

    fn has_error_feedback(events: &[SessionEvent]) -> bool {
        events.iter().any(|e| {
            matches!(e, SessionEvent::Feedback { severity: Severity::Error, .. })
        })
    }

    #[test]
    fn test_unknown_exercise_is_config_error() {
        let mut session = ExerciseSession::default();
        let err = session.select_exercise("cartwheel").unwrap_err();
        assert!(matches!(err, RehabError::UnknownExercise(_)));
        assert!(session.exercise().is_none());
        assert!(has_error_feedback(&session.drain_events()));

        assert!(matches!(session.start(0.0), Err(RehabError::NoExerciseSelected)));
        assert!(!session.is_running());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = TrackerConfig::with_targets(0, 2);
        assert!(matches!(
            ExerciseSession::new(config),
            Err(RehabError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_frames_ignored_until_started() {
        let mut session = ExerciseSession::default();
        session.select_exercise("knee-extension").unwrap();
        assert_eq!(session.process_frame(&knee_frame(140.0), 0.0), FrameOutcome::Idle);
        assert_eq!(session.angles().left_knee, 140.0);
        assert_eq!(session.phase(), Phase::Rest);
    }

    #[test]
    fn test_frames_throttled() {
        let mut session = ExerciseSession::default();
        session.select_definition(KNEE_EXTENSION);
        session.start(0.0).unwrap();
        assert!(matches!(
            session.process_frame(&knee_frame(140.0), 0.0),
            FrameOutcome::Evaluated(_)
        ));
        assert_eq!(session.process_frame(&knee_frame(140.0), 40.0), FrameOutcome::Throttled);
        assert!(matches!(
            session.process_frame(&knee_frame(140.0), 100.0),
            FrameOutcome::Evaluated(_)
        ));
    }

    #[test]
    fn test_knee_extension_repetition() {
        let mut session = ExerciseSession::default();
        session.select_exercise("knee-extension").unwrap();
        session.start(0.0).unwrap();

        session.process_frame(&knee_frame(140.0), 0.0);
        assert_eq!(session.selected_side(), Side::Left);
        session.process_frame(&knee_frame(160.0), 100.0);
        assert_eq!(session.phase(), Phase::Moving);
        session.process_frame(&knee_frame(166.0), 200.0);
        assert_eq!(session.phase(), Phase::Holding);
        assert!(session.hold_remaining_secs(700.0).is_some());

        assert!(!session.tick(1000.0));
        assert!(session.tick(1700.0));
        assert_eq!(session.phase(), Phase::Returning);

        let outcome = session.process_frame(&knee_frame(140.0), 1800.0);
        let FrameOutcome::Evaluated(report) = outcome else {
            panic!("frame not evaluated: {outcome:?}");
        };
        assert!(report.repetition_counted);
        assert_eq!(report.side, Side::Left);
        assert_eq!(session.phase(), Phase::Rest);
        assert_eq!(session.counters().repetitions, 1);
        assert_eq!(session.counters().left_reps, 1);

        let events = session.drain_events();
        assert!(events.contains(&SessionEvent::SideChanged { side: Side::Left }));
        assert!(events.contains(&SessionEvent::RepetitionCompleted { count: 1, side: Side::Left }));
    }

    #[test]
    fn test_idle_leg_wobble_keeps_hold() {
        let mut session = ExerciseSession::default();
        session.select_exercise("knee-extension").unwrap();
        session.start(0.0).unwrap();

        let frames = [
            (140.0, 140.0),
            (148.0, 140.0),
            (156.0, 140.0),
            (160.0, 140.0),
            (160.0, 142.0),
            (160.0, 142.0),
        ];
        let mut sides = Vec::new();
        for (i, (left, right)) in frames.into_iter().enumerate() {
            let now = i as f64 * 100.0;
            let report = evaluated(session.process_frame(&knee_pair_frame(left, right), now));
            sides.push(report.side);
        }
        assert_eq!(session.selected_side(), Side::Both);
        assert_eq!(session.phase(), Phase::Holding);

        assert!(session.tick(1800.0));
        assert_eq!(session.phase(), Phase::Returning);
        let report = evaluated(session.process_frame(&knee_pair_frame(140.0, 142.0), 1900.0));
        sides.push(report.side);
        assert!(report.repetition_counted);

        assert!(sides.iter().all(|&side| side == Side::Left), "{sides:?}");
        assert_eq!(session.counters().left_reps, 1);
        assert_eq!(
            phases(&session.drain_events()),
            vec![Phase::Rest, Phase::Moving, Phase::Holding, Phase::Returning, Phase::Rest]
        );
    }

    #[test]
    fn test_rest_keeps_measured_side_within_margin() {
        let mut session = ExerciseSession::default();
        session.select_exercise("knee-extension").unwrap();
        session.start(0.0).unwrap();

        let first = evaluated(session.process_frame(&knee_pair_frame(140.0, 140.0), 0.0));
        assert_eq!(first.side, Side::Left);
        // Right leg scores higher on this frame, but not by the switch margin
        let second = evaluated(session.process_frame(&knee_pair_frame(140.0, 146.0), 100.0));
        assert_eq!(session.selected_side(), Side::Both);
        assert_eq!(second.side, Side::Left);
    }

    #[test]
    fn test_two_sided_counts_each_half() {
        let mut session = ExerciseSession::default();
        session.select_definition(two_sided());
        session.start(0.0).unwrap();

        let mut now = 0.0;
        for angle in [5.0, 160.0, 160.0, 5.0] {
            session.process_frame(&shoulder_frame(angle, 5.0), now);
            now += 100.0;
        }
        assert_eq!(session.counters().repetitions, 1);
        for angle in [5.0, 160.0, 160.0, 5.0] {
            session.process_frame(&shoulder_frame(5.0, angle), now);
            now += 100.0;
        }

        let counters = session.counters();
        assert_eq!(counters.repetitions, 2);
        assert_eq!((counters.left_reps, counters.right_reps), (1, 1));
        let events = session.drain_events();
        assert!(events.contains(&SessionEvent::SideChanged { side: Side::Right }));
    }

    #[test]
    fn test_program_completion_stops_session() {
        let mut session = ExerciseSession::new(TrackerConfig::with_targets(1, 1)).unwrap();
        session.select_definition(two_sided());
        session.start(1000.0).unwrap();

        let mut now = 1000.0;
        for angle in [5.0, 160.0, 160.0, 5.0] {
            session.process_frame(&shoulder_frame(angle, 5.0), now);
            now += 100.0;
        }
        assert!(!session.is_running());
        let events = session.drain_events();
        assert!(events.contains(&SessionEvent::SetCompleted { set_number: 1 }));
        assert!(events.contains(&SessionEvent::ProgramCompleted));

        let summary = session.stop(now).expect("summary kept after completion");
        assert!(summary.completed);
        assert_eq!(summary.repetitions, 1);
        assert_eq!(summary.sets, 1);
        assert_eq!(summary.exercise, "two-sided-raise");
        assert!(summary.events.iter().any(|e| e.kind == LogKind::ProgramCompleted));
        assert!(session.stop(now).is_none());
    }

    #[test]
    fn test_unmeasurable_frame_skips_evaluation() {
        let mut session = ExerciseSession::default();
        session.select_exercise("knee-extension").unwrap();
        session.start(0.0).unwrap();
        session.drain_events();

        let outcome = session.process_frame(&LandmarkFrame::default(), 0.0);
        let FrameOutcome::Evaluated(report) = outcome else {
            panic!("frame not evaluated: {outcome:?}");
        };
        assert_eq!(report.angle, None);
        assert_eq!(session.phase(), Phase::Rest);
        let events = session.drain_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, SessionEvent::Feedback { severity: Severity::Info, .. })));
        assert!(!has_error_feedback(&events));
    }

    #[test]
    fn test_stop_cancels_pending_hold() {
        let mut session = ExerciseSession::default();
        session.select_exercise("knee-extension").unwrap();
        session.start(0.0).unwrap();
        session.process_frame(&knee_frame(140.0), 0.0);
        session.process_frame(&knee_frame(160.0), 100.0);
        session.process_frame(&knee_frame(166.0), 200.0);
        assert_eq!(session.phase(), Phase::Holding);

        let summary = session.stop(300.0).expect("running session has a summary");
        assert!(!summary.completed);
        assert_eq!(summary.repetitions, 0);
        assert!(!session.tick(5000.0));
        assert_eq!(session.phase(), Phase::Rest);
    }

    #[test]
    fn test_reselect_resets_counters() {
        let mut session = ExerciseSession::default();
        session.select_definition(two_sided());
        session.start(0.0).unwrap();
        let mut now = 0.0;
        for angle in [5.0, 160.0, 160.0, 5.0] {
            session.process_frame(&shoulder_frame(angle, 5.0), now);
            now += 100.0;
        }
        assert_eq!(session.counters().repetitions, 1);

        session.select_exercise("neck-tilt").unwrap();
        assert_eq!(session.counters().repetitions, 0);
        assert_eq!(session.phase(), Phase::Rest);
        assert!(!session.is_running());
    }
}
