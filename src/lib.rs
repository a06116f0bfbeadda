//! MEV Protection Guard Library
//!
//! Admission control consulted by an AMM trading pair before every swap.
//! Inside a pair's post-creation protection window the guard caps trade size
//! and allows one trade per block, to blunt front-running and sandwich attacks.
//!
//! Entry point: [`MevGuard`].

pub mod config;
pub mod error;
pub mod guard;
pub mod scenario;
pub mod snapshot;
pub mod types;

// Re-export commonly used types
pub use config::{load_config_from_file, GuardSettings};
pub use error::GuardError;
pub use guard::{GuardStats, MevGuard, RejectReason, Verdict};
pub use snapshot::GuardSnapshot;
pub use types::{BlockNumber, DefendRequest, GuardConfig, PairRecord, Role};
