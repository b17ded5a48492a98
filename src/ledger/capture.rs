// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use super::store::{LedgerStore, MemoryLedgerStore};
use super::types::{FeeCaptured, FeeRecord, FeeTotals, LedgerStats};
use crate::errors::{FeeEngineError, Result};
use crate::fees::{FeeCalculator, ServiceKind};
use chrono::Utc;
use ethers::types::{Address, H256, U256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

const EVENT_CHANNEL_CAPACITY: usize = 1024;

#[derive(Default)]
struct LedgerRecords {
    index: HashMap<H256, usize>,
    records: Vec<FeeRecord>,
}

/// Records captured fees exactly once per transaction and keeps per-service totals.
///
/// Writers serialize on `records`. Totals are published as an immutable
/// snapshot while the writer still holds that lock, so readers always see a
/// state produced by some serial order of completed captures.
pub struct FeeCaptureLedger {
    calculator: FeeCalculator,
    store: Arc<dyn LedgerStore>,
    records: Mutex<LedgerRecords>,
    totals: RwLock<Arc<FeeTotals>>,
    events: broadcast::Sender<FeeCaptured>,
    captures: AtomicU64,
    duplicate_rejections: AtomicU64,
}

impl FeeCaptureLedger {
    /// In-memory ledger.
    pub fn new(calculator: FeeCalculator) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            calculator,
            store: Arc::new(MemoryLedgerStore::new()),
            records: Mutex::new(LedgerRecords::default()),
            totals: RwLock::new(Arc::new(FeeTotals::new())),
            events,
            captures: AtomicU64::new(0),
            duplicate_rejections: AtomicU64::new(0),
        }
    }

    /// Ledger backed by `store`, rebuilding records and totals from its contents.
    pub fn open(calculator: FeeCalculator, store: Arc<dyn LedgerStore>) -> Result<Self> {
        let mut state = LedgerRecords::default();
        let mut totals = FeeTotals::new();

        for record in store.load()? {
            if state.index.contains_key(&record.transaction_id) {
                return Err(FeeEngineError::Storage(format!(
                    "ledger store holds transaction {:?} twice",
                    record.transaction_id
                )));
            }
            let total = totals.entry(record.service).or_insert_with(U256::zero);
            *total = total.checked_add(record.fee_amount).ok_or_else(|| {
                FeeEngineError::Storage(format!("{} total overflows", record.service))
            })?;
            state
                .index
                .insert(record.transaction_id, state.records.len());
            state.records.push(record);
        }

        info!(
            "[FEE-LEDGER] Replayed {} fee records across {} services",
            state.records.len(),
            totals.len()
        );

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            calculator,
            store,
            records: Mutex::new(state),
            totals: RwLock::new(Arc::new(totals)),
            events,
            captures: AtomicU64::new(0),
            duplicate_rejections: AtomicU64::new(0),
        })
    }

    /// Compute and record the fee for an already-validated transaction.
    pub fn capture(
        &self,
        transaction_id: H256,
        service: ServiceKind,
        payer: Address,
        gross_amount: U256,
    ) -> Result<FeeRecord> {
        let mut state = self.records.lock().unwrap_or_else(|e| e.into_inner());

        if state.index.contains_key(&transaction_id) {
            self.duplicate_rejections.fetch_add(1, Ordering::Relaxed);
            warn!(
                "[FEE-LEDGER] Duplicate capture for transaction {:?} rejected",
                transaction_id
            );
            return Err(FeeEngineError::DuplicateCapture(transaction_id));
        }

        let quote = self.calculator.compute_fee(service, gross_amount)?;

        let current = self.totals_snapshot();
        let mut next = current.as_ref().clone();
        let total = next.entry(service).or_insert_with(U256::zero);
        *total = total
            .checked_add(quote.fee_amount)
            .ok_or_else(|| FeeEngineError::Storage(format!("{} total overflows", service)))?;

        let record = FeeRecord {
            transaction_id,
            service,
            payer,
            gross_amount,
            fee_amount: quote.fee_amount,
            effective_rate_bps: quote.effective_rate_bps,
            timestamp: Utc::now(),
        };

        // Nothing is visible until the store accepts the record.
        self.store.append(&record)?;

        let position = state.records.len();
        state.index.insert(transaction_id, position);
        state.records.push(record.clone());
        *self.totals.write().unwrap_or_else(|e| e.into_inner()) = Arc::new(next);
        drop(state);

        self.captures.fetch_add(1, Ordering::Relaxed);
        info!(
            "[FEE-LEDGER] Captured {} fee {} ({} bps of {}) for {:?}",
            service, record.fee_amount, record.effective_rate_bps, gross_amount, transaction_id
        );

        if self.events.send(FeeCaptured::from(&record)).is_err() {
            debug!("[FEE-LEDGER] No FeeCaptured subscribers");
        }

        Ok(record)
    }

    /// Point-in-time totals per service.
    pub fn get_total_fees_collected(&self) -> FeeTotals {
        self.totals_snapshot().as_ref().clone()
    }

    pub fn total_for(&self, service: ServiceKind) -> U256 {
        self.totals_snapshot()
            .get(&service)
            .copied()
            .unwrap_or_default()
    }

    fn totals_snapshot(&self) -> Arc<FeeTotals> {
        self.totals
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn record(&self, transaction_id: H256) -> Option<FeeRecord> {
        let state = self.records.lock().unwrap_or_else(|e| e.into_inner());
        state
            .index
            .get(&transaction_id)
            .map(|&i| state.records[i].clone())
    }

    pub fn records(&self) -> Vec<FeeRecord> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .records
            .clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FeeCaptured> {
        self.events.subscribe()
    }

    pub fn stats(&self) -> LedgerStats {
        let record_count = self
            .records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .records
            .len() as u64;

        LedgerStats {
            record_count,
            captures: self.captures.load(Ordering::Relaxed),
            duplicate_rejections: self.duplicate_rejections.load(Ordering::Relaxed),
            totals: self.get_total_fees_collected(),
        }
    }
}
