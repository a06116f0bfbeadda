//! Guard Snapshot
//!
//! JSON read model of the guard for the frontend: parameters, authorized
//! factories, registered pairs and their windows, and decision counters.
//! Producing a snapshot takes the guard lock once and writes nothing.
//!
//! Addresses and amounts are stored as strings, percentages as decimals.

use crate::guard::{GuardStats, MevGuard};
use crate::types::{bps_to_percent, BlockNumber};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Serializable guard parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigView {
    pub owner: String,
    pub protection_window_blocks: u64,
    pub mev_fee_bps: u16,
    pub mev_fee_percent: String,
    pub min_trade_rate_bps: u16,
    pub min_trade_rate_percent: String,
}

/// Serializable pair record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairView {
    pub address: String,
    pub registered_at: BlockNumber,
    pub protection_end_block: BlockNumber,
    pub last_admitted_block: Option<BlockNumber>,
}

impl PairView {
    pub fn is_protected_at(&self, block: BlockNumber) -> bool {
        block <= self.protection_end_block
    }
}

/// Complete guard snapshot for JSON storage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardSnapshot {
    pub generated_at: DateTime<Utc>,
    pub config: ConfigView,
    pub factories: Vec<String>,
    pub pairs: Vec<PairView>,
    pub stats: GuardStats,
}

impl GuardSnapshot {
    /// Capture the guard's current state
    pub fn capture(guard: &MevGuard) -> Self {
        guard.read(|engine| {
            let cfg = engine.config().get();
            let registry = engine.registry();

            let pairs = registry
                .pairs()
                .into_iter()
                .filter_map(|pair| {
                    let record = engine.tracker().get_pair_record(pair)?;
                    Some(PairView {
                        address: format!("{:?}", pair),
                        registered_at: registry.registered_at(pair)?,
                        protection_end_block: record.protection_end_block,
                        last_admitted_block: record.last_admitted_block,
                    })
                })
                .collect();

            Self {
                generated_at: Utc::now(),
                config: ConfigView {
                    owner: format!("{:?}", cfg.owner),
                    protection_window_blocks: cfg.protection_window_blocks,
                    mev_fee_bps: cfg.mev_fee_bps,
                    mev_fee_percent: bps_to_percent(cfg.mev_fee_bps).to_string(),
                    min_trade_rate_bps: cfg.min_trade_rate_bps,
                    min_trade_rate_percent: bps_to_percent(cfg.min_trade_rate_bps).to_string(),
                },
                factories: registry
                    .factories()
                    .iter()
                    .map(|f| format!("{:?}", f))
                    .collect(),
                pairs,
                stats: engine.stats().clone(),
            }
        })
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize guard snapshot")
    }

    /// Write to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = self.to_json()?;
        std::fs::write(path.as_ref(), json)
            .with_context(|| format!("Failed to write snapshot: {}", path.as_ref().display()))?;
        info!(
            "Snapshot written to {} ({} pairs)",
            path.as_ref().display(),
            self.pairs.len()
        );
        Ok(())
    }

    /// Read from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read snapshot: {}", path.as_ref().display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse snapshot JSON: {}", path.as_ref().display()))
    }

    pub fn pair(&self, address: &str) -> Option<&PairView> {
        let needle = address.to_lowercase();
        self.pairs.iter().find(|p| p.address.to_lowercase() == needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DefendRequest, GuardConfig};
    use alloy::primitives::{Address, U256};

    const OWNER: Address = Address::repeat_byte(0x01);
    const FACTORY: Address = Address::repeat_byte(0x0f);
    const PAIR: Address = Address::repeat_byte(0xaa);

    fn guard() -> MevGuard {
        let guard = MevGuard::new(GuardConfig::new(OWNER)).unwrap();
        guard.set_factory_authorized(OWNER, FACTORY, true).unwrap();
        guard.register_pair(FACTORY, PAIR, 1000).unwrap();
        let r = U256::from(1000);
        guard
            .defend(PAIR, &DefendRequest::plain(r, r, U256::from(2), Address::repeat_byte(0x11)), 1001)
            .unwrap();
        guard
    }

    #[test]
    fn test_capture() {
        let snap = GuardSnapshot::capture(&guard());
        assert_eq!(snap.config.mev_fee_percent, "1.00");
        assert_eq!(snap.config.min_trade_rate_percent, "0.50");
        assert_eq!(snap.factories.len(), 1);

        let pair = snap.pair(&format!("{:?}", PAIR)).unwrap();
        assert_eq!(pair.registered_at, 1000);
        assert_eq!(pair.protection_end_block, 1100);
        assert_eq!(pair.last_admitted_block, Some(1001));
        assert!(pair.is_protected_at(1100));
        assert!(!pair.is_protected_at(1101));
        assert_eq!(snap.stats.admitted, 1);
    }

    #[test]
    fn test_capture_does_not_mutate() {
        let g = guard();
        let before = g.stats();
        let _ = GuardSnapshot::capture(&g);
        assert_eq!(g.stats(), before);
        assert_eq!(g.pair_record(PAIR).unwrap().last_admitted_block, Some(1001));
    }

    #[test]
    fn test_save_and_load() {
        let snap = GuardSnapshot::capture(&guard());
        let path = std::env::temp_dir().join(format!("mev_guard_snapshot_{}.json", std::process::id()));
        snap.save(&path).unwrap();

        let loaded = GuardSnapshot::load(&path).unwrap();
        assert_eq!(loaded.config, snap.config);
        assert_eq!(loaded.pairs, snap.pairs);
        assert_eq!(loaded.stats, snap.stats);

        std::fs::remove_file(&path).ok();
    }
}
