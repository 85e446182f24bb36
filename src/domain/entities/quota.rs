//! Snapshots of a client's quota window.

use std::time::Duration;

/// Outcome of the pre-flight quota check.
///
/// `remaining` is the budget left *before* the gated operation is charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaCheck {
    pub allowed: bool,
    pub remaining: i64,
    pub reset_after: Duration,
}

impl QuotaCheck {
    /// Whole minutes until the window resets, truncated toward zero.
    pub fn reset_minutes(&self) -> i64 {
        whole_minutes(self.reset_after)
    }

    /// Best-effort status to report when the post-operation commit fails.
    pub fn estimated_after_commit(&self) -> QuotaStatus {
        QuotaStatus {
            remaining: self.remaining - 1,
            reset_minutes: self.reset_minutes(),
        }
    }
}

/// Quota state reported back to the client after a charged operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaStatus {
    pub remaining: i64,
    pub reset_minutes: i64,
}

pub(crate) fn whole_minutes(d: Duration) -> i64 {
    (d.as_secs() / 60) as i64
}
