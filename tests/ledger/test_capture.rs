// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use ethers::types::{Address, H256, U256};
use platform_fee_engine::ledger::{LedgerStore, MemoryLedgerStore};
use platform_fee_engine::{
    DiscountTier, FeeCalculator, FeeCaptureLedger, FeeEngineError, FeeRecord, FeeSchedule,
    FeeScheduleRegistry, ServiceKind,
};
use std::sync::Arc;
use tokio_test::assert_err;

fn calculator() -> FeeCalculator {
    let registry = FeeScheduleRegistry::with_schedules(vec![
        FeeSchedule::new(
            ServiceKind::Swap,
            30,
            vec![
                DiscountTier::new(U256::from(1000), 2000),
                DiscountTier::new(U256::from(5000), 1000),
            ],
        ),
        FeeSchedule::flat(ServiceKind::Lending, 20),
    ])
    .unwrap();
    FeeCalculator::new(Arc::new(registry))
}

fn payer() -> Address {
    Address::repeat_byte(0x22)
}

/// Store that refuses every append
struct BrokenStore;

impl LedgerStore for BrokenStore {
    fn append(&self, _record: &FeeRecord) -> platform_fee_engine::Result<()> {
        Err(FeeEngineError::Storage("disk full".to_string()))
    }

    fn load(&self) -> platform_fee_engine::Result<Vec<FeeRecord>> {
        Ok(Vec::new())
    }
}

#[test]
fn test_capture_records_quote() {
    let ledger = FeeCaptureLedger::new(calculator());
    let tx = H256::from_low_u64_be(1);

    let record = ledger
        .capture(tx, ServiceKind::Swap, payer(), U256::from(6000))
        .unwrap();

    assert_eq!(record.transaction_id, tx);
    assert_eq!(record.service, ServiceKind::Swap);
    assert_eq!(record.payer, payer());
    assert_eq!(record.gross_amount, U256::from(6000));
    assert_eq!(record.fee_amount, U256::from(14));
    assert_eq!(record.effective_rate_bps, 24);
    assert_eq!(ledger.record(tx), Some(record));
}

#[test]
fn test_second_capture_with_same_id_fails() {
    let ledger = FeeCaptureLedger::new(calculator());
    let tx = H256::from_low_u64_be(42);

    ledger
        .capture(tx, ServiceKind::Lending, payer(), U256::from(100_000))
        .unwrap();
    let before = ledger.get_total_fees_collected();

    // Different service and amount: the id alone decides
    let err = assert_err!(ledger.capture(tx, ServiceKind::Swap, payer(), U256::from(9_999)));
    assert_eq!(err, FeeEngineError::DuplicateCapture(tx));

    assert_eq!(ledger.get_total_fees_collected(), before);
    assert_eq!(ledger.total_for(ServiceKind::Lending), U256::from(200));
    assert_eq!(ledger.total_for(ServiceKind::Swap), U256::zero());
    assert_eq!(ledger.records().len(), 1);
}

#[test]
fn test_totals_match_sum_of_records() {
    let ledger = FeeCaptureLedger::new(calculator());

    for i in 0..50u64 {
        let service = if i % 3 == 0 {
            ServiceKind::Lending
        } else {
            ServiceKind::Swap
        };
        ledger
            .capture(H256::from_low_u64_be(i), service, payer(), U256::from(777 * (i + 1)))
            .unwrap();
    }

    let totals = ledger.get_total_fees_collected();
    for service in [ServiceKind::Swap, ServiceKind::Lending] {
        let sum = ledger
            .records()
            .iter()
            .filter(|r| r.service == service)
            .fold(U256::zero(), |acc, r| acc + r.fee_amount);
        assert_eq!(totals.get(&service).copied().unwrap_or_default(), sum);
    }
}

#[test]
fn test_failed_store_append_leaves_nothing_visible() {
    let ledger = FeeCaptureLedger::open(calculator(), Arc::new(BrokenStore)).unwrap();
    let tx = H256::from_low_u64_be(5);

    let err = ledger
        .capture(tx, ServiceKind::Swap, payer(), U256::from(10_000))
        .unwrap_err();

    assert!(matches!(err, FeeEngineError::Storage(_)));
    assert!(ledger.record(tx).is_none());
    assert!(ledger.get_total_fees_collected().is_empty());
}

#[test]
fn test_ledgers_sharing_store_replay() {
    let store = Arc::new(MemoryLedgerStore::new());
    let first = FeeCaptureLedger::open(calculator(), store.clone()).unwrap();
    first
        .capture(H256::from_low_u64_be(1), ServiceKind::Swap, payer(), U256::from(10_000))
        .unwrap();

    let second = FeeCaptureLedger::open(calculator(), store).unwrap();
    assert_eq!(second.total_for(ServiceKind::Swap), U256::from(24));
    assert!(second
        .capture(H256::from_low_u64_be(1), ServiceKind::Swap, payer(), U256::from(10_000))
        .is_err());
}

#[tokio::test]
async fn test_subscribers_receive_fee_captured() {
    let ledger = FeeCaptureLedger::new(calculator());
    let mut events = ledger.subscribe();

    ledger
        .capture(H256::from_low_u64_be(3), ServiceKind::Lending, payer(), U256::from(50_000))
        .unwrap();
    let _ = ledger.capture(H256::from_low_u64_be(3), ServiceKind::Lending, payer(), U256::from(50_000));

    let event = events.recv().await.unwrap();
    assert_eq!(event.service, ServiceKind::Lending);
    assert_eq!(event.payer, payer());
    assert_eq!(event.fee_amount, U256::from(100));
    assert_eq!(event.effective_rate_bps, 20);

    // The rejected duplicate emits nothing
    assert!(events.try_recv().is_err());
}
