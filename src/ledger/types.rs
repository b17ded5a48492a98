// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::fees::types::ServiceKind;
use chrono::{DateTime, Utc};
use ethers::types::{Address, H256, U256};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cumulative captured fees per service.
pub type FeeTotals = BTreeMap<ServiceKind, U256>;

/// One captured fee. Written once, never changed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeeRecord {
    pub transaction_id: H256,
    pub service: ServiceKind,
    pub payer: Address,
    pub gross_amount: U256,
    pub fee_amount: U256,
    pub effective_rate_bps: u32,
    pub timestamp: DateTime<Utc>,
}

/// Emitted after a capture commits, for audit and observability consumers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeeCaptured {
    pub transaction_id: H256,
    pub service: ServiceKind,
    pub payer: Address,
    pub gross_amount: U256,
    pub fee_amount: U256,
    pub effective_rate_bps: u32,
    pub timestamp: DateTime<Utc>,
}

impl From<&FeeRecord> for FeeCaptured {
    fn from(record: &FeeRecord) -> Self {
        Self {
            transaction_id: record.transaction_id,
            service: record.service,
            payer: record.payer,
            gross_amount: record.gross_amount,
            fee_amount: record.fee_amount,
            effective_rate_bps: record.effective_rate_bps,
            timestamp: record.timestamp,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerStats {
    pub record_count: u64,
    pub captures: u64,
    pub duplicate_rejections: u64,
    pub totals: FeeTotals,
}
