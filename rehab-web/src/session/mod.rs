//! Session module - per-frame pipeline, events and summaries
//!
//! Re-exports only. All logic in submodules.

mod events;
mod pipeline;
mod summary;
mod throttle;

pub use events::{EventQueue, SessionEvent, Severity};
pub use pipeline::{ExerciseSession, FrameOutcome, FrameReport};
pub use summary::{LogEntry, LogKind, SessionLog, SessionSummary};
pub use throttle::FrameThrottle;
