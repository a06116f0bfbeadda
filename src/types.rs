// Core data structures for the MEV guard

use alloy::primitives::{Address, U256};
use rust_decimal::Decimal;
use std::fmt;

/// Ledger block height
pub type BlockNumber = u64;

/// 10000 bps = 100%
pub const BPS_DENOMINATOR: u16 = 10_000;

/// Default post-creation protection window (blocks)
pub const DEFAULT_PROTECTION_WINDOW_BLOCKS: u64 = 100;

/// Default Anti-MEV fee: 1.00%
pub const DEFAULT_MEV_FEE_BPS: u16 = 100;

/// Default Anti-MEV minimum trade size: 0.50% of reserve0
pub const DEFAULT_MIN_TRADE_RATE_BPS: u16 = 50;

/// Plain-mode ceiling divisor: a trade may take at most reserve0 / 200 (0.5%)
pub const FRONT_RUN_MAX_DIVISOR: u64 = 200;

/// Permission tiers recognised by the guard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Owner,
    Factory,
    Pair,
    User,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Role::Owner => write!(f, "owner"),
            Role::Factory => write!(f, "factory"),
            Role::Pair => write!(f, "pair"),
            Role::User => write!(f, "user"),
        }
    }
}

/// Owner-controlled global parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardConfig {
    pub owner: Address,
    /// Length of the post-registration protection window
    pub protection_window_blocks: u64,
    /// Anti-MEV fee rate, in bps
    pub mev_fee_bps: u16,
    /// Anti-MEV minimum trade size as a share of reserve0, in bps (<= 10000)
    pub min_trade_rate_bps: u16,
}

impl GuardConfig {
    /// Config with the default rates
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            protection_window_blocks: DEFAULT_PROTECTION_WINDOW_BLOCKS,
            mev_fee_bps: DEFAULT_MEV_FEE_BPS,
            min_trade_rate_bps: DEFAULT_MIN_TRADE_RATE_BPS,
        }
    }

    pub fn mev_fee_percent(&self) -> Decimal {
        bps_to_percent(self.mev_fee_bps)
    }

    pub fn min_trade_rate_percent(&self) -> Decimal {
        bps_to_percent(self.min_trade_rate_bps)
    }
}

/// Per-pair protection state. Only `last_admitted_block` changes after registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairRecord {
    pub protection_end_block: BlockNumber,
    pub last_admitted_block: Option<BlockNumber>,
}

impl PairRecord {
    pub fn new(registered_at: BlockNumber, window_blocks: u64) -> Self {
        Self {
            protection_end_block: registered_at.saturating_add(window_blocks),
            last_admitted_block: None,
        }
    }

    /// Protection is active up to and including `protection_end_block`
    pub fn is_protected_at(&self, block: BlockNumber) -> bool {
        block <= self.protection_end_block
    }

    pub fn admitted_in(&self, block: BlockNumber) -> bool {
        self.last_admitted_block == Some(block)
    }
}

/// One swap attempt as seen by the guard.
///
/// `user` is the trader the pair swaps for; the pair itself is the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefendRequest {
    pub anti_mev: bool,
    pub reserve0: U256,
    pub reserve1: U256,
    pub amount0_out: U256,
    pub amount1_out: U256,
    pub user: Address,
}

impl DefendRequest {
    /// Plain front-run-protection request
    pub fn plain(reserve0: U256, reserve1: U256, amount0_out: U256, user: Address) -> Self {
        Self {
            anti_mev: false,
            reserve0,
            reserve1,
            amount0_out,
            amount1_out: U256::ZERO,
            user,
        }
    }

    /// Anti-MEV request
    pub fn anti_mev(reserve0: U256, reserve1: U256, amount0_out: U256, user: Address) -> Self {
        Self {
            anti_mev: true,
            ..Self::plain(reserve0, reserve1, amount0_out, user)
        }
    }

    pub fn with_amount1_out(mut self, amount1_out: U256) -> Self {
        self.amount1_out = amount1_out;
        self
    }

    /// Size compared against the thresholds: the first leg
    pub fn evaluated_amount(&self) -> U256 {
        self.amount0_out
    }

    pub fn has_no_liquidity(&self) -> bool {
        self.reserve0.is_zero() && self.reserve1.is_zero()
    }
}

/// floor(amount * bps / 10000) without intermediate overflow.
///
/// amount = q*d + r, so amount*bps/d = q*bps + r*bps/d and q*bps <= amount when bps <= d.
pub fn apply_bps(amount: U256, bps: u16) -> U256 {
    let d = U256::from(BPS_DENOMINATOR);
    let k = U256::from(bps);
    let q = amount / d;
    let r = amount % d;
    q.saturating_mul(k).saturating_add(r * k / d)
}

/// 50 bps -> 0.50
pub fn bps_to_percent(bps: u16) -> Decimal {
    Decimal::new(bps as i64, 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_apply_bps_floors() {
        assert_eq!(apply_bps(U256::from(1000), 50), U256::from(5));
        assert_eq!(apply_bps(U256::from(999), 50), U256::from(4));
        assert_eq!(apply_bps(U256::from(12345), 10_000), U256::from(12345));
        assert_eq!(apply_bps(U256::from(12345), 0), U256::ZERO);
    }

    #[test]
    fn test_apply_bps_does_not_overflow() {
        // MAX * 50 would overflow a naive multiply
        let expected = U256::MAX / U256::from(200);
        assert_eq!(apply_bps(U256::MAX, 50), expected);
        assert_eq!(apply_bps(U256::MAX, 10_000), U256::MAX);
    }

    #[test]
    fn test_bps_to_percent() {
        assert_eq!(bps_to_percent(50), dec!(0.50));
        assert_eq!(bps_to_percent(100), dec!(1.00));
        assert_eq!(bps_to_percent(10_000), dec!(100));
    }

    #[test]
    fn test_pair_record_window() {
        let record = PairRecord::new(1000, 100);
        assert_eq!(record.protection_end_block, 1100);
        assert!(record.is_protected_at(1050));
        assert!(record.is_protected_at(1100));
        assert!(!record.is_protected_at(1101));
        assert!(!record.admitted_in(1050));
    }

    #[test]
    fn test_request_builders() {
        let user = Address::repeat_byte(0x11);
        let req = DefendRequest::anti_mev(U256::from(10), U256::from(20), U256::from(3), user)
            .with_amount1_out(U256::from(7));
        assert!(req.anti_mev);
        assert_eq!(req.evaluated_amount(), U256::from(3));
        assert_eq!(req.amount1_out, U256::from(7));
        assert!(!req.has_no_liquidity());
        assert!(DefendRequest::plain(U256::ZERO, U256::ZERO, U256::ZERO, user).has_no_liquidity());
    }
}
