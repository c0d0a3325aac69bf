//! Cancellable hold timer
//!
//! Entering a hold schedules a deadline tagged with a generation number.
//! Every cancel or re-arm bumps the generation, so a token handed out
//! earlier can be recognised as stale and dropped when it comes due.

/// Identifies one scheduled hold
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HoldToken(u64);

impl HoldToken {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

#[derive(Clone, Copy, Debug)]
struct ScheduledHold {
    token: HoldToken,
    due_at_ms: f64,
}

#[derive(Clone, Debug, Default)]
pub struct HoldTimer {
    generation: u64,
    pending: Option<ScheduledHold>,
}

impl HoldTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a hold ending `duration_ms` after `now_ms`, replacing any pending one
    pub fn arm(&mut self, now_ms: f64, duration_ms: f64) -> HoldToken {
        self.generation = self.generation.wrapping_add(1);
        let token = HoldToken(self.generation);
        self.pending = Some(ScheduledHold {
            token,
            due_at_ms: now_ms + duration_ms.max(0.0),
        });
        token
    }

    /// Invalidate the pending hold, if any
    pub fn cancel(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.pending = None;
    }

    /// Consume `token` if it is the current one and due; stale or early tokens are refused
    pub fn claim(&mut self, token: HoldToken, now_ms: f64) -> bool {
        match self.pending {
            Some(p) if p.token == token && now_ms >= p.due_at_ms => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    pub fn remaining_ms(&self, now_ms: f64) -> Option<f64> {
        self.pending.map(|p| (p.due_at_ms - now_ms).max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_after_deadline() {
        let mut timer = HoldTimer::new();
        let token = timer.arm(1000.0, 1500.0);
        assert!(!timer.claim(token, 2000.0));
        assert_eq!(timer.remaining_ms(2000.0), Some(500.0));
        assert!(timer.claim(token, 2500.0));
        assert_eq!(timer.remaining_ms(2500.0), None);
        assert!(!timer.claim(token, 9000.0));
    }

    #[test]
    fn test_cancel_invalidates_token() {
        let mut timer = HoldTimer::new();
        let token = timer.arm(0.0, 100.0);
        timer.cancel();
        assert_eq!(timer.remaining_ms(0.0), None);
        assert!(!timer.claim(token, 500.0));
    }

    #[test]
    fn test_rearm_makes_old_token_stale() {
        let mut timer = HoldTimer::new();
        let first = timer.arm(0.0, 100.0);
        let second = timer.arm(50.0, 100.0);
        assert_ne!(first, second);
        assert!(second.generation() > first.generation());
        assert!(!timer.claim(first, 500.0));
        assert!(timer.claim(second, 500.0));
    }

    #[test]
    fn test_claim_refuses_early() {
        let mut timer = HoldTimer::new();
        let token = timer.arm(0.0, 100.0);
        assert!(!timer.claim(token, 99.0));
        assert_eq!(timer.remaining_ms(99.0), Some(1.0));
        assert!(timer.claim(token, 100.0));
    }
}
