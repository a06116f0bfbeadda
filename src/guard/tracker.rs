//! Protection Window Tracker
//!
//! Plain storage for per-pair windows and per-(pair, user) request blocks.
//! No validation here; the admission engine owns every invariant.
//!
//! Design:
//!     - Pair key: pair address → PairRecord (end block fixed at registration)
//!     - Request key: (pair, user) → last requested block
//!     - `cleanup` drops request entries older than a block, to bound memory

use alloy::primitives::Address;
use std::collections::HashMap;
use tracing::debug;

use crate::types::{BlockNumber, PairRecord};

/// Unique identifier for a user's request on a pair: (pair, user)
type RequestKey = (Address, Address);

#[derive(Debug, Default)]
pub struct ProtectionWindowTracker {
    pairs: HashMap<Address, PairRecord>,
    user_requests: HashMap<RequestKey, BlockNumber>,
}

impl ProtectionWindowTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_pair(&mut self, pair: Address, record: PairRecord) {
        self.pairs.insert(pair, record);
    }

    pub fn get_pair_record(&self, pair: Address) -> Option<PairRecord> {
        self.pairs.get(&pair).copied()
    }

    /// Update the last admitted block. Unknown pairs are ignored.
    pub fn set_last_admitted_block(&mut self, pair: Address, block: BlockNumber) {
        if let Some(record) = self.pairs.get_mut(&pair) {
            record.last_admitted_block = Some(block);
        }
    }

    pub fn get_user_last_request(&self, pair: Address, user: Address) -> Option<BlockNumber> {
        self.user_requests.get(&(pair, user)).copied()
    }

    pub fn set_user_last_request(&mut self, pair: Address, user: Address, block: BlockNumber) {
        self.user_requests.insert((pair, user), block);
    }

    /// Drop request entries from blocks before `current_block`; they can no
    /// longer block anything. Returns how many were removed.
    pub fn cleanup(&mut self, current_block: BlockNumber) -> usize {
        let before = self.user_requests.len();
        self.user_requests.retain(|_key, block| *block >= current_block);
        let removed = before - self.user_requests.len();
        if removed > 0 {
            debug!("Request tracker cleanup: removed {} stale entries", removed);
        }
        removed
    }

    pub fn request_count(&self) -> usize {
        self.user_requests.len()
    }
}
