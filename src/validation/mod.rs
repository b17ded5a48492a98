// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod oracle;
pub mod types;
pub mod validator;

pub use oracle::{BalanceOracle, ProviderOracle};
pub use types::{AmountLimits, PendingTransaction, ValidationResult};
pub use validator::{validate, TransactionValidator, ValidatorMetrics};
