//! Configuration management
//!
//! Reads the guard's constructor parameters and initial factory list from
//! a TOML file.

use crate::guard::MevGuard;
use crate::types::{
    GuardConfig, BPS_DENOMINATOR, DEFAULT_MEV_FEE_BPS, DEFAULT_MIN_TRADE_RATE_BPS,
    DEFAULT_PROTECTION_WINDOW_BLOCKS,
};
use alloy::primitives::Address;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Top-level TOML configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct GuardSettings {
    pub guard: GuardSection,
}

/// `[guard]` table
#[derive(Debug, Clone, Deserialize)]
pub struct GuardSection {
    pub owner: String,
    #[serde(default = "default_protection_window")]
    pub protection_window_blocks: u64,
    #[serde(default = "default_mev_fee")]
    pub mev_fee_bps: u16,
    #[serde(default = "default_min_trade_rate")]
    pub min_trade_rate_bps: u16,
    /// Factories authorized at startup
    #[serde(default)]
    pub factories: Vec<String>,
}

fn default_protection_window() -> u64 { DEFAULT_PROTECTION_WINDOW_BLOCKS }
fn default_mev_fee() -> u16 { DEFAULT_MEV_FEE_BPS }
fn default_min_trade_rate() -> u16 { DEFAULT_MIN_TRADE_RATE_BPS }

impl GuardSettings {
    /// Parse from a TOML string and validate
    pub fn from_toml(content: &str) -> Result<Self> {
        let settings: Self = toml::from_str(content)
            .with_context(|| "Failed to parse guard TOML configuration")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        self.owner()?;
        self.factories()?;
        if self.guard.min_trade_rate_bps > BPS_DENOMINATOR {
            bail!(
                "min_trade_rate_bps {} exceeds {}",
                self.guard.min_trade_rate_bps,
                BPS_DENOMINATOR
            );
        }
        Ok(())
    }

    pub fn owner(&self) -> Result<Address> {
        parse_address(&self.guard.owner).context("Invalid owner address")
    }

    pub fn factories(&self) -> Result<Vec<Address>> {
        self.guard
            .factories
            .iter()
            .map(|f| parse_address(f).with_context(|| format!("Invalid factory address: {}", f)))
            .collect()
    }

    pub fn guard_config(&self) -> Result<GuardConfig> {
        Ok(GuardConfig {
            owner: self.owner()?,
            protection_window_blocks: self.guard.protection_window_blocks,
            mev_fee_bps: self.guard.mev_fee_bps,
            min_trade_rate_bps: self.guard.min_trade_rate_bps,
        })
    }
}

/// Load guard settings from a TOML file
pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> Result<GuardSettings> {
    let content = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
    GuardSettings::from_toml(&content)
}

/// Parse a hex address, tolerating surrounding whitespace
pub fn parse_address(s: &str) -> Result<Address> {
    s.trim()
        .parse::<Address>()
        .with_context(|| format!("not a valid address: '{}'", s))
}

impl MevGuard {
    /// Build a guard and authorize the configured factories
    pub fn from_settings(settings: &GuardSettings) -> Result<Self> {
        let config = settings.guard_config()?;
        let owner = config.owner;
        let guard = MevGuard::new(config)?;
        for factory in settings.factories()? {
            guard.set_factory_authorized(owner, factory, true)?;
        }
        info!(
            "Guard ready: owner={} window={} blocks fee={}bps min_trade={}bps factories={}",
            owner,
            settings.guard.protection_window_blocks,
            settings.guard.mev_fee_bps,
            settings.guard.min_trade_rate_bps,
            settings.guard.factories.len()
        );
        Ok(guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: &str = "0x0101010101010101010101010101010101010101";
    const FACTORY: &str = "0x0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f";

    #[test]
    fn test_parse_toml() {
        let toml_str = format!(
            r#"
[guard]
owner = "{OWNER}"
protection_window_blocks = 100
mev_fee_bps = 100
min_trade_rate_bps = 50
factories = ["{FACTORY}"]
"#
        );

        let settings = GuardSettings::from_toml(&toml_str).unwrap();
        let cfg = settings.guard_config().unwrap();
        assert_eq!(cfg.owner, Address::repeat_byte(0x01));
        assert_eq!(cfg.protection_window_blocks, 100);
        assert_eq!(settings.factories().unwrap(), vec![Address::repeat_byte(0x0f)]);
    }

    #[test]
    fn test_defaults_applied() {
        let settings = GuardSettings::from_toml(&format!("[guard]\nowner = \"{OWNER}\"\n")).unwrap();
        let cfg = settings.guard_config().unwrap();
        assert_eq!(cfg, GuardConfig::new(Address::repeat_byte(0x01)));
        assert!(settings.factories().unwrap().is_empty());
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(GuardSettings::from_toml("[guard]\nowner = \"nope\"\n").is_err());
        assert!(GuardSettings::from_toml(&format!(
            "[guard]\nowner = \"{OWNER}\"\nmin_trade_rate_bps = 10001\n"
        ))
        .is_err());
        assert!(GuardSettings::from_toml(&format!(
            "[guard]\nowner = \"{OWNER}\"\nfactories = [\"0x12\"]\n"
        ))
        .is_err());
        assert!(GuardSettings::from_toml("[other]\n").is_err());
    }

    #[test]
    fn test_guard_from_settings() {
        let settings = GuardSettings::from_toml(&format!(
            "[guard]\nowner = \"{OWNER}\"\nprotection_window_blocks = 7\nfactories = [\"{FACTORY}\"]\n"
        ))
        .unwrap();
        let guard = MevGuard::from_settings(&settings).unwrap();
        assert!(guard.is_factory_authorized(Address::repeat_byte(0x0f)));
        assert_eq!(guard.config().protection_window_blocks, 7);
    }

    #[test]
    fn test_missing_file() {
        assert!(load_config_from_file("/nonexistent/guard.toml").is_err());
    }
}
