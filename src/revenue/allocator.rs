// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::errors::{FeeEngineError, Result};
use crate::fees::bps::apply_bps;
use crate::fees::{ServiceKind, BPS_DENOMINATOR};
use crate::ledger::FeeTotals;
use ethers::types::U256;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RevenueAllocation {
    pub treasury_share_bps: u32,
    pub development_share_bps: u32,
    pub staking_share_bps: u32,
}

impl RevenueAllocation {
    pub fn new(treasury_share_bps: u32, development_share_bps: u32, staking_share_bps: u32) -> Self {
        Self {
            treasury_share_bps,
            development_share_bps,
            staking_share_bps,
        }
    }

    pub fn total_bps(&self) -> u64 {
        u64::from(self.treasury_share_bps)
            + u64::from(self.development_share_bps)
            + u64::from(self.staking_share_bps)
    }

    pub fn validate(&self) -> Result<()> {
        let total = self.total_bps();
        if total != u64::from(BPS_DENOMINATOR) {
            return Err(FeeEngineError::InvalidAllocation {
                total: total.min(u64::from(u32::MAX)) as u32,
            });
        }
        Ok(())
    }
}

impl Default for RevenueAllocation {
    fn default() -> Self {
        Self::new(5_000, 3_000, 2_000)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AllocationSplit {
    pub treasury_amount: U256,
    pub development_amount: U256,
    pub staking_amount: U256,
}

impl AllocationSplit {
    pub fn total(&self) -> U256 {
        self.treasury_amount + self.development_amount + self.staking_amount
    }
}

/// Splits collected fees between treasury, development fund and staking rewards.
pub struct RevenueAllocator {
    active: RwLock<Arc<RevenueAllocation>>,
}

impl RevenueAllocator {
    pub fn new(allocation: RevenueAllocation) -> Result<Self> {
        allocation.validate()?;
        Ok(Self {
            active: RwLock::new(Arc::new(allocation)),
        })
    }

    pub fn current(&self) -> RevenueAllocation {
        *self.snapshot()
    }

    fn snapshot(&self) -> Arc<RevenueAllocation> {
        self.active.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Replace the active allocation, or reject and keep the current one.
    pub fn update_allocation(&self, allocation: RevenueAllocation) -> Result<RevenueAllocation> {
        if let Err(e) = allocation.validate() {
            warn!("[REVENUE] Rejected allocation {:?}: {}", allocation, e);
            return Err(e);
        }

        let previous = std::mem::replace(
            &mut *self.active.write().unwrap_or_else(|e| e.into_inner()),
            Arc::new(allocation),
        );

        info!(
            "[REVENUE] Allocation updated: treasury {} -> {}, development {} -> {}, staking {} -> {} bps",
            previous.treasury_share_bps,
            allocation.treasury_share_bps,
            previous.development_share_bps,
            allocation.development_share_bps,
            previous.staking_share_bps,
            allocation.staking_share_bps
        );

        Ok(allocation)
    }

    /// Split `fee_amount`; the flooring remainder goes to the treasury.
    pub fn allocate(&self, fee_amount: U256) -> AllocationSplit {
        split_with(&self.snapshot(), fee_amount)
    }

    /// Split every service total under one allocation snapshot.
    pub fn allocate_totals(&self, totals: &FeeTotals) -> BTreeMap<ServiceKind, AllocationSplit> {
        let allocation = self.snapshot();
        let splits: BTreeMap<_, _> = totals
            .iter()
            .map(|(service, amount)| (*service, split_with(&allocation, *amount)))
            .collect();

        debug!("[REVENUE] Allocated totals for {} services", splits.len());
        splits
    }
}

fn split_with(allocation: &RevenueAllocation, fee_amount: U256) -> AllocationSplit {
    let treasury = apply_bps(fee_amount, allocation.treasury_share_bps);
    let development = apply_bps(fee_amount, allocation.development_share_bps);
    let staking = apply_bps(fee_amount, allocation.staking_share_bps);

    // Shares sum to 10000, so the floored parts never exceed the fee.
    let remainder = fee_amount - treasury - development - staking;

    AllocationSplit {
        treasury_amount: treasury + remainder,
        development_amount: development,
        staking_amount: staking,
    }
}
