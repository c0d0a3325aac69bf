//! Session events
//!
//! Fire-and-forget notifications for the UI and audio layers. The queue is
//! bounded: when full the oldest event is dropped.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::exercise::Phase;
use crate::kinematics::Side;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionEvent {
    PhaseChanged {
        phase: Phase,
        label: String,
        message: String,
    },
    RepetitionCompleted {
        count: u32,
        side: Side,
    },
    SetCompleted {
        #[serde(rename = "setNumber")]
        set_number: u32,
    },
    ProgramCompleted,
    Feedback {
        message: String,
        severity: Severity,
    },
    SideChanged {
        side: Side,
    },
}

impl SessionEvent {
    pub fn feedback(message: impl Into<String>, severity: Severity) -> Self {
        SessionEvent::Feedback {
            message: message.into(),
            severity,
        }
    }
}

/// Bounded event queue that collapses repeated feedback
#[derive(Clone, Debug)]
pub struct EventQueue {
    events: VecDeque<SessionEvent>,
    capacity: usize,
    /// Last feedback pushed with no other event since
    last_feedback: Option<String>,
    dropped: u64,
}

impl EventQueue {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
            last_feedback: None,
            dropped: 0,
        }
    }

    pub fn push(&mut self, event: SessionEvent) {
        match &event {
            SessionEvent::Feedback { message, .. } => {
                if self.last_feedback.as_deref() == Some(message.as_str()) {
                    return;
                }
                self.last_feedback = Some(message.clone());
            }
            _ => self.last_feedback = None,
        }

        if self.events.len() >= self.capacity {
            self.events.pop_front();
            self.dropped += 1;
            trace!(dropped = self.dropped, "event queue full, oldest dropped");
        }
        self.events.push_back(event);
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = SessionEvent>) {
        for event in events {
            self.push(event);
        }
    }

    /// Take every queued event, oldest first
    pub fn drain(&mut self) -> Vec<SessionEvent> {
        self.events.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events lost to overflow since creation
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.last_feedback = None;
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new(64)
    }
}
