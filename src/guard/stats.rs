//! Guard decision counters
//!
//! Tallies every `defend` outcome. Updated in the same lock scope as the
//! decision but never read by it.

use serde::{Deserialize, Serialize};

/// Counts of `defend` outcomes since the guard was created
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardStats {
    /// Accepted inside a protection window (state committed)
    pub admitted: u64,
    /// Accepted because the window had ended (no state change)
    pub passed_through: u64,
    /// Soft `false`: size ceiling or per-block limits in plain mode
    pub soft_rejected: u64,
    /// Soft `false`: both reserves zero
    pub no_liquidity: u64,
    /// Anti-MEV hard failures
    pub reverted: u64,
    /// Callers that were not registered pairs
    pub permission_denied: u64,
}

impl GuardStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_calls(&self) -> u64 {
        self.admitted
            + self.passed_through
            + self.soft_rejected
            + self.no_liquidity
            + self.reverted
            + self.permission_denied
    }

    /// Share of evaluated calls that were allowed to trade, in percent
    pub fn acceptance_rate(&self) -> f64 {
        let evaluated = self.total_calls() - self.permission_denied;
        if evaluated == 0 {
            return 0.0;
        }
        (self.admitted + self.passed_through) as f64 / evaluated as f64 * 100.0
    }
}
