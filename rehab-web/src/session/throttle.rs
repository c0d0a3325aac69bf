//! Frame throttle
//!
//! Accepts at most one frame per interval. Frames arriving early are
//! skipped, never queued.

#[derive(Clone, Debug)]
pub struct FrameThrottle {
    interval_ms: f64,
    last_accepted_ms: Option<f64>,
}

impl FrameThrottle {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms: interval_ms.max(0.0),
            last_accepted_ms: None,
        }
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    /// True if a frame at `now_ms` should be processed
    pub fn accept(&mut self, now_ms: f64) -> bool {
        let due = match self.last_accepted_ms {
            // A clock that went backwards restarts the interval
            Some(last) if now_ms >= last => now_ms - last >= self.interval_ms,
            _ => true,
        };
        if due {
            self.last_accepted_ms = Some(now_ms);
        }
        due
    }

    pub fn reset(&mut self) {
        self.last_accepted_ms = None;
    }
}

impl Default for FrameThrottle {
    fn default() -> Self {
        Self::new(100.0)
    }
}
