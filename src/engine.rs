// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::admin::FeeAdmin;
use crate::config::EngineConfig;
use crate::errors::Result;
use crate::fees::{FeeCalculator, FeeQuote, FeeSchedule, FeeScheduleRegistry, ServiceKind};
use crate::ledger::{FeeCaptureLedger, FeeRecord, FeeTotals, JsonLinesLedgerStore, LedgerStore};
use crate::revenue::{AllocationSplit, RevenueAllocation, RevenueAllocator};
use crate::validation::{BalanceOracle, PendingTransaction, TransactionValidator};
use ethers::types::{H256, U256};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

/// All engine components built from one configuration.
///
/// Schedules and the revenue allocation are read-only through the engine;
/// changing them goes through [`FeeEngine::admin`], which checks the caller's
/// grant and audits the attempt.
pub struct FeeEngine {
    registry: Arc<FeeScheduleRegistry>,
    calculator: FeeCalculator,
    validator: Arc<TransactionValidator>,
    ledger: Arc<FeeCaptureLedger>,
    allocator: Arc<RevenueAllocator>,
    admin: Arc<FeeAdmin>,
}

impl FeeEngine {
    /// Build the engine; the ledger is file-backed when `ledger.path` is set.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let store: Option<Arc<dyn LedgerStore>> = match &config.ledger.path {
            Some(path) => Some(Arc::new(JsonLinesLedgerStore::open(path)?)),
            None => None,
        };
        Self::build(config, store)
    }

    pub fn with_store(config: &EngineConfig, store: Arc<dyn LedgerStore>) -> Result<Self> {
        Self::build(config, Some(store))
    }

    fn build(config: &EngineConfig, store: Option<Arc<dyn LedgerStore>>) -> Result<Self> {
        let registry = Arc::new(FeeScheduleRegistry::with_schedules(config.fee_schedules()?)?);
        let calculator = FeeCalculator::new(registry.clone());
        let validator = Arc::new(TransactionValidator::new(
            config.amount_limits()?,
            config.oracle_timeout(),
        ));
        let ledger = Arc::new(match store {
            Some(store) => FeeCaptureLedger::open(calculator.clone(), store)?,
            None => FeeCaptureLedger::new(calculator.clone()),
        });
        let allocator = Arc::new(RevenueAllocator::new(config.allocation)?);
        let admin = Arc::new(FeeAdmin::new(registry.clone(), allocator.clone()));

        info!(
            "[FEE-ENGINE] Ready: {} services, allocation {}/{}/{} bps",
            registry.services().len(),
            config.allocation.treasury_share_bps,
            config.allocation.development_share_bps,
            config.allocation.staking_share_bps
        );

        Ok(Self {
            registry,
            calculator,
            validator,
            ledger,
            allocator,
            admin,
        })
    }

    pub fn admin(&self) -> &FeeAdmin {
        &self.admin
    }

    pub fn validator(&self) -> &TransactionValidator {
        &self.validator
    }

    pub fn ledger(&self) -> &FeeCaptureLedger {
        &self.ledger
    }

    pub fn schedule(&self, service: ServiceKind) -> Result<FeeSchedule> {
        self.registry.get(service).map(|s| s.as_ref().clone())
    }

    pub fn allocation(&self) -> RevenueAllocation {
        self.allocator.current()
    }

    pub fn compute_fee(&self, service: ServiceKind, gross_amount: U256) -> Result<FeeQuote> {
        self.calculator.compute_fee(service, gross_amount)
    }

    pub fn compute_fee_by_name(&self, service: &str, gross_amount: U256) -> Result<FeeQuote> {
        self.calculator.compute_fee_by_name(service, gross_amount)
    }

    pub fn allocate(&self, fee_amount: U256) -> AllocationSplit {
        self.allocator.allocate(fee_amount)
    }

    pub fn totals(&self) -> FeeTotals {
        self.ledger.get_total_fees_collected()
    }

    /// Split the current per-service totals under the active allocation.
    pub fn distribute(&self) -> BTreeMap<ServiceKind, AllocationSplit> {
        self.allocator.allocate_totals(&self.totals())
    }

    /// Pre-flight the transaction, then capture its fee.
    pub async fn process(
        &self,
        oracle: &dyn BalanceOracle,
        tx: &PendingTransaction,
        transaction_id: H256,
    ) -> Result<FeeRecord> {
        self.validator.preflight(oracle, tx).await.into_result()?;
        self.ledger
            .capture(transaction_id, tx.service, tx.sender, tx.amount)
    }
}
