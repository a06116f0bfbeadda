//! Config Store: owner-controlled guard parameters
//!
//! Setters take effect on the very next `defend` call; nothing is
//! grandfathered. Only `min_trade_rate_bps` is range-checked.

use alloy::primitives::{Address, U256};
use tracing::{info, warn};

use crate::error::GuardError;
use crate::types::{apply_bps, GuardConfig, BPS_DENOMINATOR};

pub struct ConfigStore {
    config: GuardConfig,
}

impl ConfigStore {
    /// Build from initial parameters. Rejects an out-of-range min trade rate.
    pub fn new(config: GuardConfig) -> Result<Self, GuardError> {
        validate_min_trade_rate(config.min_trade_rate_bps)?;
        Ok(Self { config })
    }

    /// Snapshot of the current parameters
    pub fn get(&self) -> GuardConfig {
        self.config.clone()
    }

    pub fn owner(&self) -> Address {
        self.config.owner
    }

    pub fn require_owner(&self, caller: Address) -> Result<(), GuardError> {
        if caller != self.config.owner {
            warn!("Owner-only call rejected for {}", caller);
            return Err(GuardError::NotOwner);
        }
        Ok(())
    }

    pub fn set_protection_window_blocks(&mut self, caller: Address, blocks: u64) -> Result<(), GuardError> {
        self.require_owner(caller)?;
        info!(
            "Protection window: {} -> {} blocks",
            self.config.protection_window_blocks, blocks
        );
        self.config.protection_window_blocks = blocks;
        Ok(())
    }

    pub fn set_mev_fee_bps(&mut self, caller: Address, bps: u16) -> Result<(), GuardError> {
        self.require_owner(caller)?;
        info!("MEV fee: {} -> {} bps", self.config.mev_fee_bps, bps);
        self.config.mev_fee_bps = bps;
        Ok(())
    }

    pub fn set_min_trade_rate_bps(&mut self, caller: Address, bps: u16) -> Result<(), GuardError> {
        self.require_owner(caller)?;
        validate_min_trade_rate(bps)?;
        info!("Min trade rate: {} -> {} bps", self.config.min_trade_rate_bps, bps);
        self.config.min_trade_rate_bps = bps;
        Ok(())
    }

    pub fn transfer_ownership(&mut self, caller: Address, new_owner: Address) -> Result<(), GuardError> {
        self.require_owner(caller)?;
        info!("Ownership transferred: {} -> {}", self.config.owner, new_owner);
        self.config.owner = new_owner;
        Ok(())
    }

    /// Anti-MEV fee owed on `amount` at the current rate
    pub fn quote_mev_fee(&self, amount: U256) -> U256 {
        apply_bps(amount, self.config.mev_fee_bps)
    }
}

fn validate_min_trade_rate(bps: u16) -> Result<(), GuardError> {
    if bps > BPS_DENOMINATOR {
        return Err(GuardError::InvalidParameter {
            name: "min_trade_rate_bps",
            value: bps as u64,
            max: BPS_DENOMINATOR as u64,
        });
    }
    Ok(())
}
