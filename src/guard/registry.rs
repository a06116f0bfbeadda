//! Access Registry
//!
//! Authorization tables consulted before any state change:
//! - factories allowed to register pairs (owner-managed)
//! - registered pairs (append-only, the only callers of `defend`)
//! - per-user MEV opt-in flags (self-service, informational only)

use alloy::primitives::Address;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

use crate::error::GuardError;
use crate::types::{BlockNumber, Role};

#[derive(Debug, Default)]
pub struct AccessRegistry {
    factories: HashSet<Address>,
    /// pair -> block it was registered in
    pairs: HashMap<Address, BlockNumber>,
    user_mev_preferences: HashMap<Address, bool>,
}

impl AccessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check that `caller` holds `required`, returning the resolved role.
    ///
    /// `owner` comes from the config store; `User` is held by everyone.
    pub fn resolve_role(
        &self,
        caller: Address,
        required: Role,
        owner: Address,
    ) -> Result<Role, GuardError> {
        let holds = match required {
            Role::Owner => caller == owner,
            Role::Factory => self.factories.contains(&caller),
            Role::Pair => self.pairs.contains_key(&caller),
            Role::User => true,
        };

        if !holds {
            warn!("Permission denied: {} is not a {}", caller, required);
            return Err(match required {
                Role::Owner => GuardError::NotOwner,
                _ => GuardError::PermissionDenied { caller, required },
            });
        }
        Ok(required)
    }

    /// Owner-only; caller must already be resolved as `Role::Owner`
    pub fn set_factory_authorized(&mut self, factory: Address, enabled: bool) {
        let changed = if enabled {
            self.factories.insert(factory)
        } else {
            self.factories.remove(&factory)
        };
        if changed {
            info!("Factory {} authorized={}", factory, enabled);
        }
    }

    pub fn is_factory_authorized(&self, factory: Address) -> bool {
        self.factories.contains(&factory)
    }

    /// Record a new pair. Re-registration is rejected, never a no-op.
    pub fn register_pair(&mut self, pair: Address, block: BlockNumber) -> Result<(), GuardError> {
        if self.pairs.contains_key(&pair) {
            warn!("Pair {} already registered (block {})", pair, self.pairs[&pair]);
            return Err(GuardError::AlreadyRegistered(pair));
        }
        self.pairs.insert(pair, block);
        Ok(())
    }

    pub fn is_registered_pair(&self, pair: Address) -> bool {
        self.pairs.contains_key(&pair)
    }

    pub fn registered_at(&self, pair: Address) -> Option<BlockNumber> {
        self.pairs.get(&pair).copied()
    }

    /// Self-service: the caller acts as `user`
    pub fn set_user_mev_preference(&mut self, user: Address, enabled: bool) {
        debug!("User {} MEV preference -> {}", user, enabled);
        self.user_mev_preferences.insert(user, enabled);
    }

    /// Unset users read as opted out
    pub fn user_mev_preference(&self, user: Address) -> bool {
        self.user_mev_preferences.get(&user).copied().unwrap_or(false)
    }

    /// Authorized factories, sorted for stable output
    pub fn factories(&self) -> Vec<Address> {
        let mut out: Vec<Address> = self.factories.iter().copied().collect();
        out.sort();
        out
    }

    /// Registered pairs, sorted for stable output
    pub fn pairs(&self) -> Vec<Address> {
        let mut out: Vec<Address> = self.pairs.keys().copied().collect();
        out.sort();
        out
    }

    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }
}
