//! Admission Engine: the `defend` decision procedure
//!
//! Purpose:
//!     Decides, once per swap attempt, whether a registered pair may execute
//!     the swap. Inside a pair's protection window two policies apply:
//!     - plain mode: soft filter, violations return `Ok(false)`
//!     - Anti-MEV mode: hard filter, violations return an error that must
//!       abort the caller's trade
//!
//! Design:
//!     - `decide` reads committed state only and yields a `Verdict`
//!     - `defend` commits `last_admitted_block` and the user's request block
//!       only for `Verdict::Admit`; every other path leaves state untouched
//!     - The caller is the pair; `DefendRequest::user` is the trader

use alloy::primitives::{Address, U256};
use tracing::{debug, info, warn};

use super::config_store::ConfigStore;
use super::registry::AccessRegistry;
use super::stats::GuardStats;
use super::tracker::ProtectionWindowTracker;
use crate::error::GuardError;
use crate::types::{apply_bps, BlockNumber, DefendRequest, GuardConfig, PairRecord, Role, FRONT_RUN_MAX_DIVISOR};

/// Why a plain-mode request was turned away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Evaluated amount above reserve0 / 200
    AboveMaxSize,
    /// Pair already admitted a trade this block
    PairBlockLimit,
    /// User already requested on this pair this block
    UserBlockLimit,
}

/// Outcome of evaluating a request against committed state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Both reserves zero
    NoLiquidity,
    /// Protection window over: allowed, nothing recorded
    OutsideWindow,
    /// Allowed inside the window: record the block
    Admit,
    /// Plain-mode rejection
    SoftReject(RejectReason),
}

impl Verdict {
    pub fn allows_trade(&self) -> bool {
        matches!(self, Verdict::OutsideWindow | Verdict::Admit)
    }
}

/// Owns all guard state. Not synchronized; `MevGuard` serializes access.
pub struct AdmissionEngine {
    config: ConfigStore,
    registry: AccessRegistry,
    tracker: ProtectionWindowTracker,
    stats: GuardStats,
}

impl AdmissionEngine {
    pub fn new(config: GuardConfig) -> Result<Self, GuardError> {
        Ok(Self {
            config: ConfigStore::new(config)?,
            registry: AccessRegistry::new(),
            tracker: ProtectionWindowTracker::new(),
            stats: GuardStats::new(),
        })
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ConfigStore {
        &mut self.config
    }

    pub fn registry(&self) -> &AccessRegistry {
        &self.registry
    }

    pub fn tracker(&self) -> &ProtectionWindowTracker {
        &self.tracker
    }

    pub fn stats(&self) -> &GuardStats {
        &self.stats
    }

    /// Resolve `caller` against `required` using the current owner
    pub fn authorize(&self, caller: Address, required: Role) -> Result<Role, GuardError> {
        self.registry.resolve_role(caller, required, self.config.owner())
    }

    /// Owner-only factory toggle
    pub fn set_factory_authorized(
        &mut self,
        caller: Address,
        factory: Address,
        enabled: bool,
    ) -> Result<(), GuardError> {
        self.authorize(caller, Role::Owner)?;
        self.registry.set_factory_authorized(factory, enabled);
        Ok(())
    }

    /// Factory-only. The window end is fixed here from the current window length.
    pub fn register_pair(
        &mut self,
        caller: Address,
        pair: Address,
        current_block: BlockNumber,
    ) -> Result<PairRecord, GuardError> {
        self.authorize(caller, Role::Factory)?;
        self.registry.register_pair(pair, current_block)?;

        let record = PairRecord::new(current_block, self.config.get().protection_window_blocks);
        self.tracker.insert_pair(pair, record);
        info!(
            "Pair {} registered by {} at block {} | protected until block {}",
            pair, caller, current_block, record.protection_end_block
        );
        Ok(record)
    }

    pub fn set_user_mev_preference(&mut self, caller: Address, enabled: bool) {
        self.registry.set_user_mev_preference(caller, enabled);
    }

    pub fn protection_end_block_of(&self, pair: Address) -> Option<BlockNumber> {
        self.tracker.get_pair_record(pair).map(|r| r.protection_end_block)
    }

    pub fn prune_requests(&mut self, current_block: BlockNumber) -> usize {
        self.tracker.cleanup(current_block)
    }

    /// Admission decision for one swap attempt by the pair `caller`.
    ///
    /// `Ok(true)`: execute. `Ok(false)`: do not execute (soft).
    /// `Err(..)`: permission failure or Anti-MEV hard failure.
    pub fn defend(
        &mut self,
        caller: Address,
        request: &DefendRequest,
        current_block: BlockNumber,
    ) -> Result<bool, GuardError> {
        if let Err(e) = self.authorize(caller, Role::Pair) {
            self.stats.permission_denied += 1;
            return Err(e);
        }

        let verdict = match self.decide(caller, request, current_block) {
            Ok(v) => v,
            Err(e) => {
                warn!("Anti-MEV revert for pair {} at block {}: {}", caller, current_block, e);
                self.stats.reverted += 1;
                return Err(e);
            }
        };

        debug!(
            "defend: pair={} user={} anti_mev={} block={} amount0_out={} -> {:?}",
            caller, request.user, request.anti_mev, current_block, request.amount0_out, verdict
        );

        match verdict {
            Verdict::NoLiquidity => self.stats.no_liquidity += 1,
            Verdict::OutsideWindow => self.stats.passed_through += 1,
            Verdict::SoftReject(_) => self.stats.soft_rejected += 1,
            Verdict::Admit => {
                self.tracker.set_last_admitted_block(caller, current_block);
                self.tracker.set_user_last_request(caller, request.user, current_block);
                self.stats.admitted += 1;
            }
        }

        Ok(verdict.allows_trade())
    }

    /// Evaluate `request` against committed state without writing anything.
    /// The caller must already be a registered pair.
    pub fn decide(
        &self,
        pair: Address,
        request: &DefendRequest,
        current_block: BlockNumber,
    ) -> Result<Verdict, GuardError> {
        if request.has_no_liquidity() {
            return Ok(Verdict::NoLiquidity);
        }

        let record = match self.tracker.get_pair_record(pair) {
            Some(r) => r,
            None => {
                return Err(GuardError::PermissionDenied {
                    caller: pair,
                    required: Role::Pair,
                })
            }
        };

        if !record.is_protected_at(current_block) {
            return Ok(Verdict::OutsideWindow);
        }

        let amount = request.evaluated_amount();

        if request.anti_mev {
            let min_amount = apply_bps(request.reserve0, self.config.get().min_trade_rate_bps);
            if amount < min_amount {
                return Err(GuardError::TransactionSizeTooSmall { amount, min_amount });
            }
            if record.admitted_in(current_block) {
                return Err(GuardError::BlockLimit {
                    pair,
                    block: current_block,
                });
            }
            return Ok(Verdict::Admit);
        }

        let max_amount = request.reserve0 / U256::from(FRONT_RUN_MAX_DIVISOR);
        if amount > max_amount {
            return Ok(Verdict::SoftReject(RejectReason::AboveMaxSize));
        }
        if record.admitted_in(current_block) {
            return Ok(Verdict::SoftReject(RejectReason::PairBlockLimit));
        }
        if self.tracker.get_user_last_request(pair, request.user) == Some(current_block) {
            return Ok(Verdict::SoftReject(RejectReason::UserBlockLimit));
        }
        Ok(Verdict::Admit)
    }
}
