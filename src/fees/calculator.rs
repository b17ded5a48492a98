// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use super::bps::{apply_bps, discounted_rate};
use super::registry::FeeScheduleRegistry;
use super::types::{FeeQuote, FeeSchedule, ServiceKind};
use crate::errors::Result;
use ethers::types::U256;
use std::sync::Arc;
use tracing::debug;

/// Computes per-transaction service fees from the active schedules.
#[derive(Clone)]
pub struct FeeCalculator {
    registry: Arc<FeeScheduleRegistry>,
}

impl FeeCalculator {
    pub fn new(registry: Arc<FeeScheduleRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<FeeScheduleRegistry> {
        &self.registry
    }

    pub fn compute_fee(&self, service: ServiceKind, gross_amount: U256) -> Result<FeeQuote> {
        let schedule = self.registry.get(service)?;
        let quote = quote_schedule(&schedule, gross_amount);

        debug!(
            "[FEE-CALC] {} gross={} discount={}bps effective={}bps fee={}",
            service, gross_amount, quote.discount_bps, quote.effective_rate_bps, quote.fee_amount
        );

        Ok(quote)
    }

    pub fn compute_fee_by_name(&self, service_name: &str, gross_amount: U256) -> Result<FeeQuote> {
        self.compute_fee(service_name.parse()?, gross_amount)
    }
}

/// Apply a schedule to an amount.
///
/// The discount is the largest one among qualifying tiers, whichever
/// threshold produced it.
pub fn quote_schedule(schedule: &FeeSchedule, gross_amount: U256) -> FeeQuote {
    let discount_bps = schedule.best_discount_bps(gross_amount);
    let effective_rate_bps = discounted_rate(schedule.base_rate_bps, discount_bps);
    let fee_amount = apply_bps(gross_amount, effective_rate_bps);

    FeeQuote {
        service: schedule.service,
        gross_amount,
        fee_amount,
        effective_rate_bps,
        discount_bps,
    }
}
