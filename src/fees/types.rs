// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::errors::FeeEngineError;
use ethers::types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 100% expressed in basis points
pub const BPS_DENOMINATOR: u32 = 10_000;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    Swap,
    Lending,
    Staking,
    Bridging,
    Liquidity,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 5] = [
        ServiceKind::Swap,
        ServiceKind::Lending,
        ServiceKind::Staking,
        ServiceKind::Bridging,
        ServiceKind::Liquidity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::Swap => "swap",
            ServiceKind::Lending => "lending",
            ServiceKind::Staking => "staking",
            ServiceKind::Bridging => "bridging",
            ServiceKind::Liquidity => "liquidity",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceKind {
    type Err = FeeEngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ServiceKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FeeEngineError::UnknownService(s.to_string()))
    }
}

/// Volume discount applied once a transaction reaches `volume_threshold`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiscountTier {
    pub volume_threshold: U256,
    pub discount_rate_bps: u32,
}

impl DiscountTier {
    pub fn new(volume_threshold: U256, discount_rate_bps: u32) -> Self {
        Self {
            volume_threshold,
            discount_rate_bps,
        }
    }

    pub fn qualifies(&self, gross_amount: U256) -> bool {
        self.volume_threshold <= gross_amount
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeeSchedule {
    pub service: ServiceKind,
    pub base_rate_bps: u32,
    pub tiers: Vec<DiscountTier>,
}

impl FeeSchedule {
    pub fn new(service: ServiceKind, base_rate_bps: u32, tiers: Vec<DiscountTier>) -> Self {
        Self {
            service,
            base_rate_bps,
            tiers,
        }
    }

    pub fn flat(service: ServiceKind, base_rate_bps: u32) -> Self {
        Self::new(service, base_rate_bps, Vec::new())
    }

    /// Checks every rate is within [0, 10000] bps.
    pub fn validate(&self) -> Result<(), FeeEngineError> {
        if self.base_rate_bps > BPS_DENOMINATOR {
            return Err(FeeEngineError::InvalidSchedule {
                service: self.service,
                reason: format!(
                    "base rate {} bps exceeds {} bps",
                    self.base_rate_bps, BPS_DENOMINATOR
                ),
            });
        }

        if let Some(tier) = self
            .tiers
            .iter()
            .find(|tier| tier.discount_rate_bps > BPS_DENOMINATOR)
        {
            return Err(FeeEngineError::InvalidSchedule {
                service: self.service,
                reason: format!(
                    "discount {} bps at threshold {} exceeds {} bps",
                    tier.discount_rate_bps, tier.volume_threshold, BPS_DENOMINATOR
                ),
            });
        }

        Ok(())
    }

    /// Orders tiers by ascending threshold, dropping exact duplicates.
    pub fn normalized(mut self) -> Self {
        self.tiers.sort_by(|a, b| {
            a.volume_threshold
                .cmp(&b.volume_threshold)
                .then(a.discount_rate_bps.cmp(&b.discount_rate_bps))
        });
        self.tiers.dedup();
        self
    }

    /// Largest discount among tiers whose threshold the amount reaches.
    pub fn best_discount_bps(&self, gross_amount: U256) -> u32 {
        self.tiers
            .iter()
            .filter(|tier| tier.qualifies(gross_amount))
            .map(|tier| tier.discount_rate_bps)
            .max()
            .unwrap_or(0)
    }
}

/// Result of a fee computation for a single transaction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeeQuote {
    pub service: ServiceKind,
    pub gross_amount: U256,
    pub fee_amount: U256,
    pub effective_rate_bps: u32,
    pub discount_bps: u32,
}
