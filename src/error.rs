//! Guard errors
//!
//! Every failure the guard can raise. A soft rejection is never an error:
//! it is `Ok(false)` from `defend`.

use crate::types::{BlockNumber, Role};
use alloy::primitives::{Address, U256};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardError {
    #[error("caller is not the owner")]
    NotOwner,

    #[error("permission denied: {caller} is not an authorized {required}")]
    PermissionDenied { caller: Address, required: Role },

    #[error("invalid parameter {name}: {value} exceeds {max}")]
    InvalidParameter {
        name: &'static str,
        value: u64,
        max: u64,
    },

    #[error("pair {0} is already registered")]
    AlreadyRegistered(Address),

    #[error("transaction size too small: {amount} < {min_amount}")]
    TransactionSizeTooSmall { amount: U256, min_amount: U256 },

    #[error("block limit: pair {pair} already admitted a trade in block {block}")]
    BlockLimit { pair: Address, block: BlockNumber },
}

impl GuardError {
    /// Anti-MEV failures that must abort the caller's enclosing trade
    pub fn is_hard_revert(&self) -> bool {
        matches!(
            self,
            GuardError::TransactionSizeTooSmall { .. } | GuardError::BlockLimit { .. }
        )
    }

    /// Authorization failures (owner, factory, pair)
    pub fn is_permission(&self) -> bool {
        matches!(
            self,
            GuardError::NotOwner | GuardError::PermissionDenied { .. }
        )
    }
}
