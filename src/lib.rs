// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod admin;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod fees;
pub mod ledger;
pub mod revenue;
pub mod validation;

// Re-export main types
pub use admin::{AdminGrant, AuditEntry, FeeAdmin};
pub use config::EngineConfig;
pub use engine::FeeEngine;
pub use errors::{ErrorKind, FeeEngineError, ReasonCode, Result};
pub use fees::{DiscountTier, FeeCalculator, FeeQuote, FeeSchedule, FeeScheduleRegistry, ServiceKind};
pub use ledger::{FeeCaptureLedger, FeeCaptured, FeeRecord, FeeTotals, LedgerStore};
pub use revenue::{AllocationSplit, RevenueAllocation, RevenueAllocator};
pub use validation::{
    validate, AmountLimits, BalanceOracle, PendingTransaction, TransactionValidator,
    ValidationResult,
};
