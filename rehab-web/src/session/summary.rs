//! Session log and end-of-session summary

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LogKind {
    Start,
    Repetition,
    SetCompleted,
    ProgramCompleted,
    Stop,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Milliseconds since session start
    pub at_ms: f64,
    pub kind: LogKind,
    pub detail: String,
}

/// Timestamped record of one session
#[derive(Clone, Debug, Default)]
pub struct SessionLog {
    started_ms: Option<f64>,
    entries: Vec<LogEntry>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, now_ms: f64, exercise: &str) {
        self.entries.clear();
        self.started_ms = Some(now_ms);
        self.record(now_ms, LogKind::Start, format!("Started {exercise}"));
    }

    pub fn record(&mut self, now_ms: f64, kind: LogKind, detail: impl Into<String>) {
        let at_ms = self.started_ms.map(|s| (now_ms - s).max(0.0)).unwrap_or(0.0);
        self.entries.push(LogEntry {
            at_ms,
            kind,
            detail: detail.into(),
        });
    }

    pub fn started_ms(&self) -> Option<f64> {
        self.started_ms
    }

    pub fn elapsed_secs(&self, now_ms: f64) -> f64 {
        self.started_ms
            .map(|s| ((now_ms - s).max(0.0) / 1000.0).round())
            .unwrap_or(0.0)
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.started_ms = None;
        self.entries.clear();
    }
}

/// Plain record handed to the host when a session ends
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub exercise: String,
    pub exercise_name: String,
    pub repetitions: u32,
    pub sets: u32,
    pub left_reps: u32,
    pub right_reps: u32,
    pub duration_secs: f64,
    pub accuracy: f32,
    pub completed: bool,
    pub events: Vec<LogEntry>,
}

impl SessionSummary {
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
