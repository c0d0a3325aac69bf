//! Repetition and set counting

use serde::{Deserialize, Serialize};
use tracing::info;

use super::phase::CompletedRepetition;
use crate::kinematics::Side;
use crate::session::SessionEvent;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCounters {
    /// Repetitions in the current set
    pub repetitions: u32,
    /// Current set, starting at 1
    pub sets: u32,
    pub target_reps: u32,
    pub target_sets: u32,
    pub left_reps: u32,
    pub right_reps: u32,
    /// Repetitions over every set
    pub total_repetitions: u32,
}

impl SessionCounters {
    pub fn new(target_reps: u32, target_sets: u32) -> Self {
        Self {
            repetitions: 0,
            sets: 1,
            target_reps: target_reps.max(1),
            target_sets: target_sets.max(1),
            left_reps: 0,
            right_reps: 0,
            total_repetitions: 0,
        }
    }
}

impl Default for SessionCounters {
    fn default() -> Self {
        Self::new(10, 2)
    }
}

pub struct RepetitionAggregator {
    counters: SessionCounters,
    accuracy_sum: f32,
    completed: bool,
}

impl RepetitionAggregator {
    pub fn new(target_reps: u32, target_sets: u32) -> Self {
        Self {
            counters: SessionCounters::new(target_reps, target_sets),
            accuracy_sum: 0.0,
            completed: false,
        }
    }

    pub fn counters(&self) -> &SessionCounters {
        &self.counters
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Mean accuracy of counted repetitions, 0 before the first one
    pub fn mean_accuracy(&self) -> f32 {
        match self.counters.total_repetitions {
            0 => 0.0,
            n => (self.accuracy_sum / n as f32).round(),
        }
    }

    /// Progress through the current set, 0-100
    pub fn progress_percent(&self) -> f32 {
        let c = &self.counters;
        (c.repetitions as f32 / c.target_reps as f32 * 100.0).min(100.0)
    }

    /// Count one repetition. Returns true once the whole program is done.
    pub fn record(&mut self, repetition: &CompletedRepetition, out: &mut Vec<SessionEvent>) -> bool {
        if self.completed {
            return true;
        }

        let c = &mut self.counters;
        c.repetitions += 1;
        c.total_repetitions += 1;
        match repetition.side {
            Side::Left => c.left_reps += 1,
            Side::Right => c.right_reps += 1,
            Side::Both => {}
        }
        self.accuracy_sum += repetition.accuracy;

        info!(
            count = c.repetitions,
            set = c.sets,
            side = repetition.side.as_str(),
            "repetition completed"
        );
        out.push(SessionEvent::RepetitionCompleted {
            count: c.repetitions,
            side: repetition.side,
        });

        if c.repetitions < c.target_reps {
            return false;
        }

        info!(set = c.sets, "set completed");
        out.push(SessionEvent::SetCompleted { set_number: c.sets });

        if c.sets >= c.target_sets {
            info!(total = c.total_repetitions, "program completed");
            out.push(SessionEvent::ProgramCompleted);
            self.completed = true;
        } else {
            c.sets += 1;
            c.repetitions = 0;
        }
        self.completed
    }

    /// Start over with the same targets
    pub fn reset(&mut self) {
        self.counters = SessionCounters::new(self.counters.target_reps, self.counters.target_sets);
        self.accuracy_sum = 0.0;
        self.completed = false;
    }

    pub fn set_targets(&mut self, target_reps: u32, target_sets: u32) {
        self.counters = SessionCounters::new(target_reps, target_sets);
        self.accuracy_sum = 0.0;
        self.completed = false;
    }
}
