//! Monotonic counter replay guard
//!
//! Pure comparison; the previous counter is supplied by the caller from its
//! own scan history.

use crate::domain::ReplayOutcome;

/// Compares a tag counter against the last value observed for the same
/// identity.
pub struct ReplayGuard;

impl ReplayGuard {
    pub fn check(current: Option<u64>, previous: Option<u64>) -> ReplayOutcome {
        match (current, previous) {
            (Some(current), Some(previous)) if current < previous => ReplayOutcome::Rollback,
            (Some(current), Some(previous)) if current == previous => ReplayOutcome::Stalled,
            (Some(_), Some(_)) => ReplayOutcome::Advanced,
            _ => ReplayOutcome::NotCompared,
        }
    }
}
