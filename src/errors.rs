// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Error types shared by every fee engine component.
//!
//! Each variant belongs to one [`ErrorKind`] so callers can decide whether a
//! failure is caller-correctable, an admin misuse, or a flaky collaborator.

use crate::fees::types::ServiceKind;
use ethers::types::{H256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type for fee engine operations
pub type Result<T> = std::result::Result<T, FeeEngineError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeeEngineError {
    #[error("Amount {amount} outside allowed range [{min}, {max}]")]
    AmountOutOfRange { amount: U256, min: U256, max: U256 },

    #[error("Unknown service: {0}")]
    UnknownService(String),

    #[error("Invalid fee schedule for {service}: {reason}")]
    InvalidSchedule { service: ServiceKind, reason: String },

    #[error("Invalid revenue allocation: shares sum to {total} bps, expected 10000")]
    InvalidAllocation { total: u32 },

    #[error("Fee already captured for transaction {0:?}")]
    DuplicateCapture(H256),

    #[error("Balance or gas estimation failed: {0}")]
    EstimationError(String),

    #[error("Insufficient balance: need {required}, have {balance}")]
    InsufficientBalance { required: U256, balance: U256 },

    #[error("Admin action not authorized: {0}")]
    Unauthorized(String),

    #[error("Ledger storage failure: {0}")]
    Storage(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Coarse classification used by the calling layer for retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    Validation,
    State,
    Transient,
    Authorization,
}

/// Stable machine-readable reason codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    AmountOutOfRange,
    UnknownService,
    InvalidSchedule,
    InvalidAllocation,
    DuplicateCapture,
    EstimationError,
    InsufficientBalance,
    Unauthorized,
    Storage,
    InvalidConfig,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::AmountOutOfRange => "AMOUNT_OUT_OF_RANGE",
            ReasonCode::UnknownService => "UNKNOWN_SERVICE",
            ReasonCode::InvalidSchedule => "INVALID_SCHEDULE",
            ReasonCode::InvalidAllocation => "INVALID_ALLOCATION",
            ReasonCode::DuplicateCapture => "DUPLICATE_CAPTURE",
            ReasonCode::EstimationError => "ESTIMATION_ERROR",
            ReasonCode::InsufficientBalance => "INSUFFICIENT_BALANCE",
            ReasonCode::Unauthorized => "UNAUTHORIZED",
            ReasonCode::Storage => "STORAGE",
            ReasonCode::InvalidConfig => "INVALID_CONFIG",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FeeEngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FeeEngineError::AmountOutOfRange { .. } => ErrorKind::Validation,
            FeeEngineError::UnknownService(_)
            | FeeEngineError::InvalidSchedule { .. }
            | FeeEngineError::InvalidAllocation { .. }
            | FeeEngineError::DuplicateCapture(_)
            | FeeEngineError::InvalidConfig(_) => ErrorKind::State,
            FeeEngineError::EstimationError(_)
            | FeeEngineError::InsufficientBalance { .. }
            | FeeEngineError::Storage(_) => ErrorKind::Transient,
            FeeEngineError::Unauthorized(_) => ErrorKind::Authorization,
        }
    }

    pub fn reason_code(&self) -> ReasonCode {
        match self {
            FeeEngineError::AmountOutOfRange { .. } => ReasonCode::AmountOutOfRange,
            FeeEngineError::UnknownService(_) => ReasonCode::UnknownService,
            FeeEngineError::InvalidSchedule { .. } => ReasonCode::InvalidSchedule,
            FeeEngineError::InvalidAllocation { .. } => ReasonCode::InvalidAllocation,
            FeeEngineError::DuplicateCapture(_) => ReasonCode::DuplicateCapture,
            FeeEngineError::EstimationError(_) => ReasonCode::EstimationError,
            FeeEngineError::InsufficientBalance { .. } => ReasonCode::InsufficientBalance,
            FeeEngineError::Unauthorized(_) => ReasonCode::Unauthorized,
            FeeEngineError::Storage(_) => ReasonCode::Storage,
            FeeEngineError::InvalidConfig(_) => ReasonCode::InvalidConfig,
        }
    }
}
