// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Transaction Admission Module
//!
//! Decides whether a transaction may proceed to execution: the amount must
//! sit inside the configured bounds and the sender must cover the amount plus
//! the estimated gas cost. Balance and gas figures come from an external
//! oracle; its failures are reported as `EstimationError` and never retried.

use super::oracle::BalanceOracle;
use super::types::{AmountLimits, PendingTransaction, ValidationResult};
use crate::errors::FeeEngineError;
use ethers::types::U256;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Metrics for admission checks
#[derive(Debug, Clone, Default)]
pub struct ValidatorMetrics {
    validations_total: Arc<AtomicU64>,
    validations_passed: Arc<AtomicU64>,
    rejected_amount: Arc<AtomicU64>,
    rejected_balance: Arc<AtomicU64>,
    estimation_errors: Arc<AtomicU64>,
    validation_duration_ms: Arc<AtomicU64>,
}

impl ValidatorMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, result: &ValidationResult, duration_ms: u64) {
        self.validations_total.fetch_add(1, Ordering::Relaxed);
        self.validation_duration_ms
            .fetch_add(duration_ms, Ordering::Relaxed);

        let counter = match result {
            ValidationResult::Pass => &self.validations_passed,
            ValidationResult::Fail(FeeEngineError::AmountOutOfRange { .. }) => {
                &self.rejected_amount
            }
            ValidationResult::Fail(FeeEngineError::InsufficientBalance { .. }) => {
                &self.rejected_balance
            }
            ValidationResult::Fail(_) => &self.estimation_errors,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn validations_total(&self) -> u64 {
        self.validations_total.load(Ordering::Relaxed)
    }

    pub fn validations_passed(&self) -> u64 {
        self.validations_passed.load(Ordering::Relaxed)
    }

    /// Counters are read independently, so a pass recorded between the two
    /// loads can briefly make `passed` exceed `total`.
    pub fn validations_failed(&self) -> u64 {
        self.validations_total()
            .saturating_sub(self.validations_passed())
    }

    pub fn rejected_amount(&self) -> u64 {
        self.rejected_amount.load(Ordering::Relaxed)
    }

    pub fn rejected_balance(&self) -> u64 {
        self.rejected_balance.load(Ordering::Relaxed)
    }

    pub fn estimation_errors(&self) -> u64 {
        self.estimation_errors.load(Ordering::Relaxed)
    }

    pub fn avg_validation_ms(&self) -> f64 {
        let total_ms = self.validation_duration_ms.load(Ordering::Relaxed);
        let count = self.validations_total();
        if count == 0 {
            0.0
        } else {
            total_ms as f64 / count as f64
        }
    }
}

/// Pure admission rule.
///
/// The required balance is `amount + gas_estimate * gas_price`; a requirement
/// that overflows 256 bits can never be covered.
pub fn validate(
    amount: U256,
    sender_balance: U256,
    gas_estimate: U256,
    gas_price: U256,
    min_amount: U256,
    max_amount: U256,
) -> ValidationResult {
    if amount < min_amount || amount > max_amount {
        return ValidationResult::Fail(FeeEngineError::AmountOutOfRange {
            amount,
            min: min_amount,
            max: max_amount,
        });
    }

    let required = gas_estimate
        .checked_mul(gas_price)
        .and_then(|gas_cost| gas_cost.checked_add(amount));

    match required {
        Some(required) if sender_balance >= required => ValidationResult::Pass,
        Some(required) => ValidationResult::Fail(FeeEngineError::InsufficientBalance {
            required,
            balance: sender_balance,
        }),
        None => ValidationResult::Fail(FeeEngineError::InsufficientBalance {
            required: U256::MAX,
            balance: sender_balance,
        }),
    }
}

/// Pre-flight validator with configured bounds and oracle timeout.
pub struct TransactionValidator {
    limits: AmountLimits,
    oracle_timeout: Duration,
    metrics: ValidatorMetrics,
}

impl TransactionValidator {
    pub fn new(limits: AmountLimits, oracle_timeout: Duration) -> Self {
        Self {
            limits,
            oracle_timeout,
            metrics: ValidatorMetrics::new(),
        }
    }

    pub fn limits(&self) -> AmountLimits {
        self.limits
    }

    /// Apply the admission rule to figures the caller already holds.
    pub fn check(
        &self,
        amount: U256,
        sender_balance: U256,
        gas_estimate: U256,
        gas_price: U256,
    ) -> ValidationResult {
        let start = Instant::now();
        let result = validate(
            amount,
            sender_balance,
            gas_estimate,
            gas_price,
            self.limits.min_amount,
            self.limits.max_amount,
        );
        self.metrics
            .record(&result, start.elapsed().as_millis() as u64);
        result
    }

    /// Look up balance and gas through the oracle, then apply the admission rule.
    pub async fn preflight(
        &self,
        oracle: &dyn BalanceOracle,
        tx: &PendingTransaction,
    ) -> ValidationResult {
        let start = Instant::now();
        debug!(
            "[VALIDATOR] Pre-flight {} transaction from {:?}, amount {}",
            tx.service, tx.sender, tx.amount
        );

        let result = self.run_preflight(oracle, tx).await;
        let duration = start.elapsed().as_millis() as u64;
        self.metrics.record(&result, duration);

        match &result {
            ValidationResult::Pass => info!(
                "[VALIDATOR] Admitted {} transaction from {:?} ({} ms)",
                tx.service, tx.sender, duration
            ),
            ValidationResult::Fail(e) => warn!(
                "[VALIDATOR] Rejected {} transaction from {:?}: {} [{}]",
                tx.service,
                tx.sender,
                e,
                e.reason_code()
            ),
        }

        result
    }

    async fn run_preflight(
        &self,
        oracle: &dyn BalanceOracle,
        tx: &PendingTransaction,
    ) -> ValidationResult {
        // Range check needs no oracle round-trip.
        if !self.limits.contains(tx.amount) {
            return validate(
                tx.amount,
                U256::zero(),
                U256::zero(),
                U256::zero(),
                self.limits.min_amount,
                self.limits.max_amount,
            );
        }

        let lookups = async {
            let gas_estimate = oracle.estimate_gas(tx).await?;
            let gas_price = match tx.gas_price {
                Some(price) => price,
                None => oracle.gas_price().await?,
            };
            let balance = oracle.balance_of(tx.sender).await?;
            Ok::<_, anyhow::Error>((gas_estimate, gas_price, balance))
        };

        let (gas_estimate, gas_price, balance) =
            match tokio::time::timeout(self.oracle_timeout, lookups).await {
                Ok(Ok(figures)) => figures,
                Ok(Err(e)) => {
                    return ValidationResult::Fail(FeeEngineError::EstimationError(e.to_string()))
                }
                Err(_) => {
                    return ValidationResult::Fail(FeeEngineError::EstimationError(format!(
                        "oracle did not respond within {} ms",
                        self.oracle_timeout.as_millis()
                    )))
                }
            };

        validate(
            tx.amount,
            balance,
            gas_estimate,
            gas_price,
            self.limits.min_amount,
            self.limits.max_amount,
        )
    }

    pub fn metrics(&self) -> ValidatorMetrics {
        self.metrics.clone()
    }
}
