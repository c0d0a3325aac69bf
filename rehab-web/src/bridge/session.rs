//! JS-facing session object
//!
//! Thin `#[wasm_bindgen]` wrapper over `ExerciseSession`. Structured data
//! crosses the boundary as JSON strings.
//!
//! The core logs through `tracing`, which stays silent unless the host
//! installs a subscriber. Phase changes, counted repetitions and side
//! switches are mirrored to the browser console here.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use super::landmarks::LandmarkFrame;
use crate::config::TrackerConfig;
use crate::error::RehabError;
use crate::exercise::{Phase, EXERCISES};
use crate::kinematics::Side;
use crate::session::{ExerciseSession, FrameOutcome};

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| RehabError::from(e).into())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExerciseInfo {
    key: &'static str,
    name: &'static str,
    instructions: &'static str,
    hold_ms: f64,
}

/// JSON list of the supported exercises
#[wasm_bindgen]
pub fn exercise_catalog() -> Result<String, JsValue> {
    let catalog: Vec<ExerciseInfo> = EXERCISES
        .iter()
        .map(|def| ExerciseInfo {
            key: def.key,
            name: def.name,
            instructions: def.instructions,
            hold_ms: def.hold_ms,
        })
        .collect();
    to_json(&catalog)
}

/// State the console mirror compares against after each call
#[derive(Clone, Copy, Debug, PartialEq)]
struct Snapshot {
    phase: Phase,
    side: Side,
    total_repetitions: u32,
}

impl Snapshot {
    fn of(session: &ExerciseSession) -> Self {
        Self {
            phase: session.phase(),
            side: session.selected_side(),
            total_repetitions: session.counters().total_repetitions,
        }
    }

    /// Console lines for what changed between `self` and `after`
    fn changes(&self, after: &Snapshot) -> Vec<String> {
        let mut lines = Vec::new();
        if after.phase != self.phase {
            lines.push(format!("Phase: {} -> {}", self.phase.as_str(), after.phase.as_str()));
        }
        if after.total_repetitions > self.total_repetitions {
            lines.push(format!("Repetition {} counted", after.total_repetitions));
        }
        if after.side != self.side {
            lines.push(format!("Tracking {} side", after.side.as_str()));
        }
        lines
    }
}

#[wasm_bindgen]
pub struct RehabSession {
    inner: ExerciseSession,
}

impl RehabSession {
    fn mirror(&self, before: Snapshot) {
        for line in before.changes(&Snapshot::of(&self.inner)) {
            crate::console_log!("{}", line);
        }
    }
}

#[wasm_bindgen]
impl RehabSession {
    #[wasm_bindgen(constructor)]
    pub fn new(target_reps: Option<u32>, target_sets: Option<u32>) -> Result<RehabSession, JsValue> {
        let defaults = TrackerConfig::default();
        let config = TrackerConfig::with_targets(
            target_reps.unwrap_or(defaults.target_reps),
            target_sets.unwrap_or(defaults.target_sets),
        );
        Ok(Self {
            inner: ExerciseSession::new(config)?,
        })
    }

    /// Build from a JSON `TrackerConfig`; missing fields take defaults
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config_json: &str) -> Result<RehabSession, JsValue> {
        let config = TrackerConfig::from_json_str(config_json)?;
        Ok(Self {
            inner: ExerciseSession::new(config)?,
        })
    }

    pub fn select_exercise(&mut self, key: &str) -> Result<(), JsValue> {
        self.inner.select_exercise(key)?;
        crate::console_log!("Exercise selected: {}", key);
        Ok(())
    }

    pub fn set_targets(&mut self, target_reps: u32, target_sets: u32) -> Result<(), JsValue> {
        Ok(self.inner.set_targets(target_reps, target_sets)?)
    }

    pub fn start(&mut self, now_ms: f64) -> Result<(), JsValue> {
        Ok(self.inner.start(now_ms)?)
    }

    /// Stop and return the session summary as JSON, if a session ran
    pub fn stop(&mut self, now_ms: f64) -> Result<Option<String>, JsValue> {
        match self.inner.stop(now_ms) {
            Some(summary) => {
                crate::console_log!(
                    "Session finished: {} reps in {} s",
                    summary.repetitions,
                    summary.duration_secs
                );
                Ok(Some(to_json(&summary)?))
            }
            None => Ok(None),
        }
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }

    /// Feed a flat [x, y, visibility] * 33 array. Returns true if the frame was evaluated.
    pub fn update_landmarks(&mut self, data: &[f32], now_ms: f64) -> bool {
        let frame = match LandmarkFrame::from_flat(data) {
            Ok(frame) => frame,
            Err(err) => {
                web_sys::console::warn_1(&err.to_string().into());
                return false;
            }
        };
        let before = Snapshot::of(&self.inner);
        let outcome = self.inner.process_frame(&frame, now_ms);
        self.mirror(before);
        matches!(outcome, FrameOutcome::Evaluated(_))
    }

    /// Drive the hold timer between frames (e.g. from `setInterval`)
    pub fn tick(&mut self, now_ms: f64) -> bool {
        let before = Snapshot::of(&self.inner);
        let changed = self.inner.tick(now_ms);
        self.mirror(before);
        changed
    }

    /// Pending events as a JSON array, oldest first
    pub fn drain_events(&mut self) -> Result<String, JsValue> {
        to_json(&self.inner.drain_events())
    }

    pub fn selected_side(&self) -> String {
        self.inner.selected_side().as_str().to_string()
    }

    pub fn phase(&self) -> String {
        self.inner.phase().as_str().to_string()
    }

    pub fn phase_label(&self) -> String {
        self.inner.phase_label().to_string()
    }

    pub fn angles_json(&self) -> Result<String, JsValue> {
        to_json(self.inner.angles())
    }

    pub fn statistics_json(&self) -> Result<String, JsValue> {
        to_json(&self.inner.statistics())
    }

    pub fn counters_json(&self) -> Result<String, JsValue> {
        to_json(self.inner.counters())
    }

    pub fn repetitions(&self) -> u32 {
        self.inner.counters().repetitions
    }

    pub fn current_set(&self) -> u32 {
        self.inner.counters().sets
    }

    pub fn accuracy(&self) -> f32 {
        self.inner.accuracy()
    }

    pub fn progress(&self) -> f32 {
        self.inner.progress_percent()
    }

    pub fn hold_remaining_secs(&self, now_ms: f64) -> Option<f64> {
        self.inner.hold_remaining_secs(now_ms)
    }

    pub fn is_running(&self) -> bool {
        self.inner.is_running()
    }
}
