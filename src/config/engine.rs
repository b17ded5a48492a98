// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::errors::{FeeEngineError, Result};
use crate::fees::{DiscountTier, FeeSchedule, ServiceKind};
use crate::revenue::RevenueAllocation;
use crate::validation::AmountLimits;
use ethers::types::U256;
use ethers::utils::parse_ether;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Transaction bounds, expressed in ether.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LimitsConfig {
    pub min_transaction: String,
    pub max_transaction: String,
    pub oracle_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            min_transaction: "0.01".to_string(),
            max_transaction: "100".to_string(),
            oracle_timeout_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TierConfig {
    /// Ether amount at which the discount starts to apply
    pub volume_threshold: String,
    pub discount_rate_bps: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleConfig {
    pub service: ServiceKind,
    pub base_rate_bps: u32,
    #[serde(default)]
    pub tiers: Vec<TierConfig>,
}

impl ScheduleConfig {
    fn tiered(service: ServiceKind, base_rate_bps: u32, tiers: &[(&str, u32)]) -> Self {
        Self {
            service,
            base_rate_bps,
            tiers: tiers
                .iter()
                .map(|(threshold, discount)| TierConfig {
                    volume_threshold: threshold.to_string(),
                    discount_rate_bps: *discount,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LedgerConfig {
    /// JSON-lines file for captured fees; in-memory when unset
    pub path: Option<PathBuf>,
}

/// Startup configuration for the fee engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub allocation: RevenueAllocation,
    #[serde(default = "default_schedules")]
    pub schedules: Vec<ScheduleConfig>,
    #[serde(default)]
    pub ledger: LedgerConfig,
}

fn default_schedules() -> Vec<ScheduleConfig> {
    vec![
        ScheduleConfig::tiered(ServiceKind::Swap, 30, &[("10000", 2_000), ("50000", 1_000)]),
        ScheduleConfig::tiered(ServiceKind::Lending, 20, &[("5000", 1_500), ("25000", 500)]),
        ScheduleConfig::tiered(ServiceKind::Staking, 10, &[("1000", 500)]),
        ScheduleConfig::tiered(ServiceKind::Bridging, 50, &[]),
        ScheduleConfig::tiered(ServiceKind::Liquidity, 15, &[]),
    ]
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            limits: LimitsConfig::default(),
            allocation: RevenueAllocation::default(),
            schedules: default_schedules(),
            ledger: LedgerConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            FeeEngineError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;

        let config = Self::from_toml_str(&content)?;
        info!("[CONFIG] Loaded fee engine configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| FeeEngineError::InvalidConfig(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    /// File named by `FEE_ENGINE_CONFIG` (defaults otherwise), then env overrides.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var("FEE_ENGINE_CONFIG") {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };

        config.apply_env_overrides();
        config.check()?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("MIN_TRANSACTION_AMOUNT") {
            debug!("[CONFIG] MIN_TRANSACTION_AMOUNT={}", val);
            self.limits.min_transaction = val;
        }

        if let Ok(val) = std::env::var("MAX_TRANSACTION_AMOUNT") {
            debug!("[CONFIG] MAX_TRANSACTION_AMOUNT={}", val);
            self.limits.max_transaction = val;
        }

        if let Ok(val) = std::env::var("ORACLE_TIMEOUT_MS") {
            if let Ok(ms) = val.parse() {
                self.limits.oracle_timeout_ms = ms;
            }
        }

        if let Ok(val) = std::env::var("LEDGER_PATH") {
            self.ledger.path = Some(PathBuf::from(val));
        }
    }

    /// Check every derived value converts cleanly.
    pub fn check(&self) -> Result<()> {
        self.amount_limits()?;
        self.fee_schedules()?;
        self.allocation
            .validate()
            .map_err(|e| FeeEngineError::InvalidConfig(e.to_string()))?;
        Ok(())
    }

    pub fn amount_limits(&self) -> Result<AmountLimits> {
        let min = parse_ether_amount("limits.min_transaction", &self.limits.min_transaction)?;
        let max = parse_ether_amount("limits.max_transaction", &self.limits.max_transaction)?;
        if min > max {
            return Err(FeeEngineError::InvalidConfig(format!(
                "min_transaction {} exceeds max_transaction {}",
                self.limits.min_transaction, self.limits.max_transaction
            )));
        }
        Ok(AmountLimits::new(min, max))
    }

    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_millis(self.limits.oracle_timeout_ms)
    }

    pub fn fee_schedules(&self) -> Result<Vec<FeeSchedule>> {
        let mut seen = HashSet::new();
        let mut schedules = Vec::with_capacity(self.schedules.len());

        for entry in &self.schedules {
            if !seen.insert(entry.service) {
                return Err(FeeEngineError::InvalidConfig(format!(
                    "service {} configured more than once",
                    entry.service
                )));
            }

            let tiers = entry
                .tiers
                .iter()
                .map(|tier| {
                    let field = format!("{} tier threshold", entry.service);
                    parse_ether_amount(&field, &tier.volume_threshold)
                        .map(|threshold| DiscountTier::new(threshold, tier.discount_rate_bps))
                })
                .collect::<Result<Vec<_>>>()?;

            let schedule = FeeSchedule::new(entry.service, entry.base_rate_bps, tiers);
            schedule.validate()?;
            schedules.push(schedule);
        }

        Ok(schedules)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| FeeEngineError::InvalidConfig(e.to_string()))
    }
}

fn parse_ether_amount(field: &str, value: &str) -> Result<U256> {
    parse_ether(value.trim())
        .map_err(|e| FeeEngineError::InvalidConfig(format!("{} = {:?}: {}", field, value, e)))
}
