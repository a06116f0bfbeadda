//! MEV protection guard
//!
//! `MevGuard` is the surface a trading pair, its factory, the owner and the
//! frontend talk to. All state sits behind one mutex: each call is a single
//! decide-then-commit step, so two `defend` calls for the same pair and block
//! are applied in lock order and only the first can claim the block.
//!
//! Cloning a `MevGuard` shares the same state.

pub mod config_store;
pub mod engine;
pub mod registry;
pub mod stats;
pub mod tracker;

pub use config_store::ConfigStore;
pub use engine::{AdmissionEngine, RejectReason, Verdict};
pub use registry::AccessRegistry;
pub use stats::GuardStats;
pub use tracker::ProtectionWindowTracker;

use alloy::primitives::{Address, U256};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::GuardError;
use crate::types::{BlockNumber, DefendRequest, GuardConfig, PairRecord};

#[derive(Clone)]
pub struct MevGuard {
    engine: Arc<Mutex<AdmissionEngine>>,
}

impl MevGuard {
    /// Create a guard from its constructor parameters
    pub fn new(config: GuardConfig) -> Result<Self, GuardError> {
        Ok(Self {
            engine: Arc::new(Mutex::new(AdmissionEngine::new(config)?)),
        })
    }

    // Writes only happen once a decision is complete, so a poisoned lock
    // never holds half-applied state.
    fn lock(&self) -> MutexGuard<'_, AdmissionEngine> {
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` against a consistent view of the whole guard
    pub fn read<R>(&self, f: impl FnOnce(&AdmissionEngine) -> R) -> R {
        let engine = self.lock();
        f(&*engine)
    }

    // ------------------------------------------------------------------
    // Pair
    // ------------------------------------------------------------------

    /// Called by the pair `caller` once per swap attempt
    pub fn defend(
        &self,
        caller: Address,
        request: &DefendRequest,
        current_block: BlockNumber,
    ) -> Result<bool, GuardError> {
        self.lock().defend(caller, request, current_block)
    }

    // ------------------------------------------------------------------
    // Factory
    // ------------------------------------------------------------------

    pub fn register_pair(
        &self,
        caller: Address,
        pair: Address,
        current_block: BlockNumber,
    ) -> Result<PairRecord, GuardError> {
        self.lock().register_pair(caller, pair, current_block)
    }

    pub fn is_registered_pair(&self, pair: Address) -> bool {
        self.lock().registry().is_registered_pair(pair)
    }

    // ------------------------------------------------------------------
    // Owner
    // ------------------------------------------------------------------

    pub fn set_factory_authorized(
        &self,
        caller: Address,
        factory: Address,
        enabled: bool,
    ) -> Result<(), GuardError> {
        self.lock().set_factory_authorized(caller, factory, enabled)
    }

    pub fn is_factory_authorized(&self, factory: Address) -> bool {
        self.lock().registry().is_factory_authorized(factory)
    }

    pub fn set_protection_window_blocks(&self, caller: Address, blocks: u64) -> Result<(), GuardError> {
        self.lock().config_mut().set_protection_window_blocks(caller, blocks)
    }

    pub fn set_mev_fee_bps(&self, caller: Address, bps: u16) -> Result<(), GuardError> {
        self.lock().config_mut().set_mev_fee_bps(caller, bps)
    }

    pub fn set_min_trade_rate_bps(&self, caller: Address, bps: u16) -> Result<(), GuardError> {
        self.lock().config_mut().set_min_trade_rate_bps(caller, bps)
    }

    pub fn transfer_ownership(&self, caller: Address, new_owner: Address) -> Result<(), GuardError> {
        self.lock().config_mut().transfer_ownership(caller, new_owner)
    }

    // ------------------------------------------------------------------
    // User (self-service)
    // ------------------------------------------------------------------

    /// `user` is the caller acting for itself
    pub fn set_user_mev_preference(&self, user: Address, enabled: bool) {
        self.lock().set_user_mev_preference(user, enabled)
    }

    pub fn user_mev_preference(&self, user: Address) -> bool {
        self.lock().registry().user_mev_preference(user)
    }

    // ------------------------------------------------------------------
    // Read-only
    // ------------------------------------------------------------------

    pub fn config(&self) -> GuardConfig {
        self.lock().config().get()
    }

    pub fn protection_end_block_of(&self, pair: Address) -> Option<BlockNumber> {
        self.lock().protection_end_block_of(pair)
    }

    pub fn pair_record(&self, pair: Address) -> Option<PairRecord> {
        self.lock().tracker().get_pair_record(pair)
    }

    pub fn quote_mev_fee(&self, amount: U256) -> U256 {
        self.lock().config().quote_mev_fee(amount)
    }

    pub fn stats(&self) -> GuardStats {
        self.lock().stats().clone()
    }

    /// Drop per-user request entries older than `current_block`
    pub fn prune_requests(&self, current_block: BlockNumber) -> usize {
        self.lock().prune_requests(current_block)
    }
}
