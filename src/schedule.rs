//! Deferred Restore Scheduling
//!
//! Extraction runs on the old surface before it is torn down, but restoration
//! may only run once the new surface is mounted and connected to the visible
//! tree. Callers poll this state machine while the target surface comes up:
//! it stays *pending* for a bounded number of attempts, reports *ready* the
//! moment the surface does, and silently *abandons* the restore when the cap
//! is exhausted. The explicit states keep the cap and cancellation conditions
//! auditable, instead of burying them in recursive timer callbacks.

use log::debug;

use crate::config::SyncConfig;

// ─────────────────────────────────────────────────────────────────────────────
// Restore Phase
// ─────────────────────────────────────────────────────────────────────────────

/// Lifecycle of one deferred restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestorePhase {
    /// Waiting for the target surface to report readiness
    #[default]
    Pending,
    /// The surface is up; the caller should run the restore now
    Ready,
    /// The attempt cap was exhausted; the restore is dropped without error
    Abandoned,
}

// ─────────────────────────────────────────────────────────────────────────────
// Restore Scheduler
// ─────────────────────────────────────────────────────────────────────────────

/// Bounded-retry state machine for one representation switch.
#[derive(Debug)]
pub struct RestoreScheduler {
    phase: RestorePhase,
    attempts: u32,
    max_attempts: u32,
}

impl Default for RestoreScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl RestoreScheduler {
    /// Create a scheduler with the default attempt cap.
    pub fn new() -> Self {
        Self::with_max_attempts(SyncConfig::default().max_restore_attempts)
    }

    /// Create a scheduler with an explicit attempt cap.
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            phase: RestorePhase::Pending,
            attempts: 0,
            max_attempts,
        }
    }

    /// Record one readiness poll and return the resulting phase.
    ///
    /// Once the scheduler leaves `Pending` it stays settled; further polls
    /// are no-ops.
    pub fn poll(&mut self, surface_ready: bool) -> RestorePhase {
        if self.phase != RestorePhase::Pending {
            return self.phase;
        }

        if surface_ready {
            self.phase = RestorePhase::Ready;
            return self.phase;
        }

        self.attempts += 1;
        if self.attempts >= self.max_attempts {
            debug!(
                "surface not ready after {} polls; abandoning cursor restore",
                self.attempts
            );
            self.phase = RestorePhase::Abandoned;
        }
        self.phase
    }

    /// Current phase without recording a poll.
    pub fn phase(&self) -> RestorePhase {
        self.phase
    }

    /// Readiness polls recorded so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Whether the scheduler has left the pending state.
    pub fn is_settled(&self) -> bool {
        self.phase != RestorePhase::Pending
    }

    /// Re-arm for the next representation switch.
    pub fn reset(&mut self) {
        self.phase = RestorePhase::Pending;
        self.attempts = 0;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_scheduler_is_pending() {
        let scheduler = RestoreScheduler::new();
        assert_eq!(scheduler.phase(), RestorePhase::Pending);
        assert!(!scheduler.is_settled());
        assert_eq!(scheduler.attempts(), 0);
    }

    #[test]
    fn test_becomes_ready_when_surface_is() {
        let mut scheduler = RestoreScheduler::new();
        assert_eq!(scheduler.poll(false), RestorePhase::Pending);
        assert_eq!(scheduler.poll(true), RestorePhase::Ready);
        assert!(scheduler.is_settled());
    }

    #[test]
    fn test_abandons_at_cap() {
        let mut scheduler = RestoreScheduler::with_max_attempts(3);
        assert_eq!(scheduler.poll(false), RestorePhase::Pending);
        assert_eq!(scheduler.poll(false), RestorePhase::Pending);
        assert_eq!(scheduler.poll(false), RestorePhase::Abandoned);
        // Settled: a late readiness signal no longer matters
        assert_eq!(scheduler.poll(true), RestorePhase::Abandoned);
    }

    #[test]
    fn test_ready_stays_ready() {
        let mut scheduler = RestoreScheduler::with_max_attempts(2);
        assert_eq!(scheduler.poll(true), RestorePhase::Ready);
        assert_eq!(scheduler.poll(false), RestorePhase::Ready);
    }

    #[test]
    fn test_reset_rearms() {
        let mut scheduler = RestoreScheduler::with_max_attempts(1);
        assert_eq!(scheduler.poll(false), RestorePhase::Abandoned);

        scheduler.reset();
        assert_eq!(scheduler.phase(), RestorePhase::Pending);
        assert_eq!(scheduler.attempts(), 0);
        assert_eq!(scheduler.poll(true), RestorePhase::Ready);
    }
}
