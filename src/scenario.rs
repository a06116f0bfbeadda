//! Scenario Replay
//!
//! Drives a guard through a scripted sequence of calls read from TOML.
//! Each `[[step]]` names the caller, the block, and an action. Guard errors
//! are recorded in the step outcome and replay continues.
//!
//! ```toml
//! [[step]]
//! action = "defend"
//! caller = "0xaaaa...aaaa"
//! block = 1050
//! user = "0x1111...1111"
//! anti_mev = false
//! reserve0 = "1000"
//! reserve1 = "1000"
//! amount0_out = "5"
//! ```

use crate::config::parse_address;
use crate::error::GuardError;
use crate::guard::MevGuard;
use crate::types::{BlockNumber, DefendRequest};
use alloy::primitives::U256;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// Top-level scenario file
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "step", default)]
    pub steps: Vec<Step>,
}

/// One scripted call
#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    pub caller: String,
    #[serde(default)]
    pub block: BlockNumber,
    #[serde(flatten)]
    pub action: Action,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    SetFactory {
        factory: String,
        #[serde(default = "default_true")]
        enabled: bool,
    },
    RegisterPair {
        pair: String,
    },
    Defend {
        user: String,
        #[serde(default)]
        anti_mev: bool,
        reserve0: String,
        reserve1: String,
        amount0_out: String,
        #[serde(default = "default_zero")]
        amount1_out: String,
    },
    SetProtectionWindow {
        blocks: u64,
    },
    SetMevFee {
        bps: u16,
    },
    SetMinTradeRate {
        bps: u16,
    },
    SetUserPreference {
        #[serde(default = "default_true")]
        enabled: bool,
    },
    TransferOwnership {
        new_owner: String,
    },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::SetFactory { .. } => "set_factory",
            Action::RegisterPair { .. } => "register_pair",
            Action::Defend { anti_mev: true, .. } => "defend(anti_mev)",
            Action::Defend { .. } => "defend",
            Action::SetProtectionWindow { .. } => "set_protection_window",
            Action::SetMevFee { .. } => "set_mev_fee",
            Action::SetMinTradeRate { .. } => "set_min_trade_rate",
            Action::SetUserPreference { .. } => "set_user_preference",
            Action::TransferOwnership { .. } => "transfer_ownership",
        }
    }
}

fn default_true() -> bool { true }
fn default_zero() -> String { "0".to_string() }

/// Result of replaying one step
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum StepOutcome {
    /// `defend` answered true/false
    Decision(bool),
    /// Administrative call succeeded
    Done,
    /// Guard rejected the call
    Failed(String),
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StepOutcome::Decision(true) => write!(f, "ADMITTED"),
            StepOutcome::Decision(false) => write!(f, "REJECTED"),
            StepOutcome::Done => write!(f, "ok"),
            StepOutcome::Failed(e) => write!(f, "FAILED: {}", e),
        }
    }
}

impl From<Result<bool, GuardError>> for StepOutcome {
    fn from(r: Result<bool, GuardError>) -> Self {
        match r {
            Ok(b) => StepOutcome::Decision(b),
            Err(e) => StepOutcome::Failed(e.to_string()),
        }
    }
}

impl From<Result<(), GuardError>> for StepOutcome {
    fn from(r: Result<(), GuardError>) -> Self {
        match r {
            Ok(()) => StepOutcome::Done,
            Err(e) => StepOutcome::Failed(e.to_string()),
        }
    }
}

impl Scenario {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| "Failed to parse scenario TOML")
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read scenario file: {}", path.as_ref().display()))?;
        Self::from_toml(&content)
    }
}

/// Replay every step in order. Malformed steps (bad address or amount)
/// abort the replay; guard errors do not.
pub fn run_scenario(guard: &MevGuard, scenario: &Scenario) -> Result<Vec<StepOutcome>> {
    info!(
        "Replaying scenario '{}' ({} steps)",
        scenario.name.as_deref().unwrap_or("unnamed"),
        scenario.steps.len()
    );

    let mut outcomes = Vec::with_capacity(scenario.steps.len());
    for (i, step) in scenario.steps.iter().enumerate() {
        let outcome = run_step(guard, step).with_context(|| format!("Step {} is malformed", i + 1))?;
        debug!("Step {} @ block {}: {} -> {}", i + 1, step.block, step.action.name(), outcome);
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

fn run_step(guard: &MevGuard, step: &Step) -> Result<StepOutcome> {
    let caller = parse_address(&step.caller)?;

    let outcome: StepOutcome = match &step.action {
        Action::SetFactory { factory, enabled } => guard
            .set_factory_authorized(caller, parse_address(factory)?, *enabled)
            .into(),
        Action::RegisterPair { pair } => guard
            .register_pair(caller, parse_address(pair)?, step.block)
            .map(|_| ())
            .into(),
        Action::Defend {
            user,
            anti_mev,
            reserve0,
            reserve1,
            amount0_out,
            amount1_out,
        } => {
            let request = DefendRequest {
                anti_mev: *anti_mev,
                reserve0: parse_amount(reserve0)?,
                reserve1: parse_amount(reserve1)?,
                amount0_out: parse_amount(amount0_out)?,
                amount1_out: parse_amount(amount1_out)?,
                user: parse_address(user)?,
            };
            guard.defend(caller, &request, step.block).into()
        }
        Action::SetProtectionWindow { blocks } => {
            guard.set_protection_window_blocks(caller, *blocks).into()
        }
        Action::SetMevFee { bps } => guard.set_mev_fee_bps(caller, *bps).into(),
        Action::SetMinTradeRate { bps } => guard.set_min_trade_rate_bps(caller, *bps).into(),
        Action::SetUserPreference { enabled } => {
            guard.set_user_mev_preference(caller, *enabled);
            StepOutcome::Done
        }
        Action::TransferOwnership { new_owner } => guard
            .transfer_ownership(caller, parse_address(new_owner)?)
            .into(),
    };
    Ok(outcome)
}

/// Decimal integer amount (no decimals applied)
fn parse_amount(s: &str) -> Result<U256> {
    s.trim()
        .parse::<U256>()
        .with_context(|| format!("not a valid amount: '{}'", s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GuardConfig;
    use alloy::primitives::Address;

    const OWNER: &str = "0x0101010101010101010101010101010101010101";
    const FACTORY: &str = "0x0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f";
    const PAIR: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const USER: &str = "0x1111111111111111111111111111111111111111";

    fn defend_step(block: u64, anti_mev: bool, amount: u64) -> String {
        format!(
            r#"
[[step]]
action = "defend"
caller = "{PAIR}"
block = {block}
user = "{USER}"
anti_mev = {anti_mev}
reserve0 = "1000"
reserve1 = "1000"
amount0_out = "{amount}"
"#
        )
    }

    fn setup_steps() -> String {
        format!(
            r#"
name = "test"

[[step]]
action = "set_factory"
caller = "{OWNER}"
factory = "{FACTORY}"

[[step]]
action = "register_pair"
caller = "{FACTORY}"
pair = "{PAIR}"
block = 1000
"#
        )
    }

    fn guard() -> MevGuard {
        MevGuard::new(GuardConfig::new(Address::repeat_byte(0x01))).unwrap()
    }

    #[test]
    fn test_replay_front_run_scenario() {
        let toml_str = setup_steps()
            + &defend_step(1050, false, 6)
            + &defend_step(1050, false, 5)
            + &defend_step(1150, false, 900);
        let scenario = Scenario::from_toml(&toml_str).unwrap();
        assert_eq!(scenario.steps.len(), 5);

        let outcomes = run_scenario(&guard(), &scenario).unwrap();
        assert_eq!(
            outcomes,
            vec![
                StepOutcome::Done,
                StepOutcome::Done,
                StepOutcome::Decision(false),
                StepOutcome::Decision(true),
                StepOutcome::Decision(true),
            ]
        );
    }

    #[test]
    fn test_replay_records_failures() {
        let toml_str = setup_steps()
            + &defend_step(1050, true, 4)
            + &defend_step(1050, true, 5)
            + &defend_step(1050, true, 5)
            + &format!(
                r#"
[[step]]
action = "set_mev_fee"
caller = "{USER}"
bps = 1
"#
            );
        let outcomes = run_scenario(&guard(), &Scenario::from_toml(&toml_str).unwrap()).unwrap();

        assert!(matches!(&outcomes[2], StepOutcome::Failed(e) if e.contains("too small")));
        assert_eq!(outcomes[3], StepOutcome::Decision(true));
        assert!(matches!(&outcomes[4], StepOutcome::Failed(e) if e.contains("block limit")));
        assert_eq!(outcomes[5], StepOutcome::Failed("caller is not the owner".to_string()));
    }

    #[test]
    fn test_malformed_step_aborts() {
        let toml_str = format!(
            r#"
[[step]]
action = "register_pair"
caller = "not-an-address"
pair = "{PAIR}"
"#
        );
        let scenario = Scenario::from_toml(&toml_str).unwrap();
        assert!(run_scenario(&guard(), &scenario).is_err());
    }

    #[test]
    fn test_unknown_action_rejected() {
        let toml_str = format!("[[step]]\naction = \"swap\"\ncaller = \"{OWNER}\"\n");
        assert!(Scenario::from_toml(&toml_str).is_err());
    }

    #[test]
    fn test_bundled_scenario() {
        let settings = crate::config::GuardSettings::from_toml(include_str!("../config/guard.toml")).unwrap();
        let guard = MevGuard::from_settings(&settings).unwrap();
        let scenario = Scenario::from_toml(include_str!("../config/scenario.toml")).unwrap();

        let outcomes = run_scenario(&guard, &scenario).unwrap();
        let decisions: Vec<Option<bool>> = outcomes
            .iter()
            .map(|o| match o {
                StepOutcome::Decision(b) => Some(*b),
                _ => None,
            })
            .collect();
        assert_eq!(
            decisions,
            vec![None, None, Some(false), Some(true), Some(false), None, Some(true), None, Some(true), None]
        );
        assert!(matches!(outcomes[5], StepOutcome::Failed(_)));
        assert!(matches!(outcomes[7], StepOutcome::Failed(_)));
        assert_eq!(outcomes[9], StepOutcome::Failed("caller is not the owner".to_string()));
        assert!(guard.user_mev_preference(Address::repeat_byte(0x11)));
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(StepOutcome::Decision(true).to_string(), "ADMITTED");
        assert_eq!(StepOutcome::Decision(false).to_string(), "REJECTED");
        assert_eq!(StepOutcome::Done.to_string(), "ok");
        let scenario = Scenario::from_toml(&defend_step(1, true, 1)).unwrap();
        assert_eq!(scenario.steps[0].action.name(), "defend(anti_mev)");
    }
}
