// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::errors::{FeeEngineError, ReasonCode};
use crate::fees::types::ServiceKind;
use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};

/// Inclusive bounds on a single transaction's value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AmountLimits {
    pub min_amount: U256,
    pub max_amount: U256,
}

impl AmountLimits {
    pub fn new(min_amount: U256, max_amount: U256) -> Self {
        Self {
            min_amount,
            max_amount,
        }
    }

    pub fn contains(&self, amount: U256) -> bool {
        amount >= self.min_amount && amount <= self.max_amount
    }
}

/// A transaction awaiting admission, as seen by the settlement layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingTransaction {
    pub service: ServiceKind,
    pub sender: Address,
    pub recipient: Option<Address>,
    pub amount: U256,
    /// Gas price quoted on the transaction; the oracle is asked when absent.
    pub gas_price: Option<U256>,
}

impl PendingTransaction {
    pub fn new(service: ServiceKind, sender: Address, amount: U256) -> Self {
        Self {
            service,
            sender,
            recipient: None,
            amount,
            gas_price: None,
        }
    }

    pub fn with_recipient(mut self, recipient: Address) -> Self {
        self.recipient = Some(recipient);
        self
    }

    pub fn with_gas_price(mut self, gas_price: U256) -> Self {
        self.gas_price = Some(gas_price);
        self
    }
}

/// Outcome of a pre-flight admission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Pass,
    Fail(FeeEngineError),
}

impl ValidationResult {
    pub fn is_pass(&self) -> bool {
        matches!(self, ValidationResult::Pass)
    }

    pub fn reason_code(&self) -> Option<ReasonCode> {
        match self {
            ValidationResult::Pass => None,
            ValidationResult::Fail(err) => Some(err.reason_code()),
        }
    }

    pub fn into_result(self) -> Result<(), FeeEngineError> {
        match self {
            ValidationResult::Pass => Ok(()),
            ValidationResult::Fail(err) => Err(err),
        }
    }
}
