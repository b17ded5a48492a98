// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use ethers::types::{Address, H256, U256};
use platform_fee_engine::admin::{AdminAction, AuditOutcome};
use platform_fee_engine::{
    AdminGrant, DiscountTier, EngineConfig, FeeEngine, FeeEngineError, FeeSchedule, ReasonCode,
    RevenueAllocation, ServiceKind,
};

fn engine() -> FeeEngine {
    FeeEngine::from_config(&EngineConfig::default()).unwrap()
}

fn operator() -> Address {
    Address::repeat_byte(0xad)
}

#[test]
fn test_fee_update_applies_to_later_captures() {
    let engine = engine();
    let grant = AdminGrant::authorized(operator());

    engine
        .ledger()
        .capture(H256::from_low_u64_be(1), ServiceKind::Bridging, Address::zero(), U256::from(10_000))
        .unwrap();

    engine
        .admin()
        .update_fee_structure(
            &grant,
            ServiceKind::Bridging,
            FeeSchedule::new(
                ServiceKind::Bridging,
                40,
                vec![DiscountTier::new(U256::from(5_000), 2_500)],
            ),
        )
        .unwrap();

    let record = engine
        .ledger()
        .capture(H256::from_low_u64_be(2), ServiceKind::Bridging, Address::zero(), U256::from(10_000))
        .unwrap();

    // 40 bps less 25% is 30 bps
    assert_eq!(record.effective_rate_bps, 30);
    assert_eq!(record.fee_amount, U256::from(30));
    // Earlier record keeps the rate it was captured with
    assert_eq!(
        engine.ledger().record(H256::from_low_u64_be(1)).unwrap().effective_rate_bps,
        50
    );
}

#[test]
fn test_unauthorized_caller_changes_nothing() {
    let engine = engine();
    let grant = AdminGrant::denied(Address::repeat_byte(0x66));

    let err = engine
        .admin()
        .update_fee_structure(&grant, ServiceKind::Swap, FeeSchedule::flat(ServiceKind::Swap, 1))
        .unwrap_err();
    assert!(matches!(err, FeeEngineError::Unauthorized(_)));

    let err = engine
        .admin()
        .update_revenue_allocation(&grant, RevenueAllocation::new(10_000, 0, 0))
        .unwrap_err();
    assert_eq!(err.reason_code(), ReasonCode::Unauthorized);

    assert_eq!(engine.schedule(ServiceKind::Swap).unwrap().base_rate_bps, 30);
    assert_eq!(engine.allocation(), RevenueAllocation::default());
}

#[test]
fn test_engine_changes_only_through_granted_admin() {
    let engine = engine();
    let swap = U256::from(10_000);
    let before = engine.compute_fee(ServiceKind::Swap, swap).unwrap();

    let denied = AdminGrant::denied(Address::repeat_byte(0x66));
    assert!(engine
        .admin()
        .update_fee_structure(&denied, ServiceKind::Swap, FeeSchedule::flat(ServiceKind::Swap, 10_000))
        .is_err());
    assert!(engine
        .admin()
        .update_revenue_allocation(&denied, RevenueAllocation::new(0, 10_000, 0))
        .is_err());

    assert_eq!(engine.compute_fee(ServiceKind::Swap, swap).unwrap(), before);
    assert_eq!(engine.allocate(U256::from(100)).development_amount, U256::from(30));

    let granted = AdminGrant::authorized(operator());
    engine
        .admin()
        .update_fee_structure(&granted, ServiceKind::Swap, FeeSchedule::flat(ServiceKind::Swap, 100))
        .unwrap();
    engine
        .admin()
        .update_revenue_allocation(&granted, RevenueAllocation::new(0, 10_000, 0))
        .unwrap();

    assert_eq!(engine.compute_fee(ServiceKind::Swap, swap).unwrap().fee_amount, U256::from(100));
    assert_eq!(engine.allocate(U256::from(100)).development_amount, U256::from(100));

    // Every attempt through the engine left an audit entry
    let outcomes: Vec<_> = engine.admin().audit_log().into_iter().map(|e| e.outcome).collect();
    assert_eq!(
        outcomes,
        vec![
            AuditOutcome::Rejected(ReasonCode::Unauthorized),
            AuditOutcome::Rejected(ReasonCode::Unauthorized),
            AuditOutcome::Applied,
            AuditOutcome::Applied,
        ]
    );
}

#[test]
fn test_invalid_schedule_is_rejected_and_audited() {
    let engine = engine();
    let grant = AdminGrant::authorized(operator());

    let err = engine
        .admin()
        .update_fee_structure(&grant, ServiceKind::Staking, FeeSchedule::flat(ServiceKind::Staking, 10_001))
        .unwrap_err();
    assert!(matches!(err, FeeEngineError::InvalidSchedule { .. }));

    // Payload aimed at another service
    let err = engine
        .admin()
        .update_fee_structure(&grant, ServiceKind::Staking, FeeSchedule::flat(ServiceKind::Lending, 5))
        .unwrap_err();
    assert!(matches!(err, FeeEngineError::InvalidSchedule { .. }));

    assert_eq!(engine.schedule(ServiceKind::Staking).unwrap().base_rate_bps, 10);

    let log = engine.admin().audit_log();
    assert_eq!(log.len(), 2);
    for entry in &log {
        assert_eq!(entry.subject, operator());
        assert_eq!(
            entry.action,
            AdminAction::UpdateFeeStructure {
                service: "staking".to_string()
            }
        );
        assert_eq!(entry.outcome, AuditOutcome::Rejected(ReasonCode::InvalidSchedule));
    }
    assert!(log[0].payload.contains("10001"));
}

#[test]
fn test_allocation_update_drives_distribution() {
    let engine = engine();
    let grant = AdminGrant::authorized(operator());

    engine
        .ledger()
        .capture(H256::from_low_u64_be(1), ServiceKind::Liquidity, Address::zero(), U256::from(100_000))
        .unwrap();

    engine
        .admin()
        .update_revenue_allocation(&grant, RevenueAllocation::new(2_000, 2_000, 6_000))
        .unwrap();

    let splits = engine.distribute();
    let liquidity = splits[&ServiceKind::Liquidity];

    // 15 bps of 100,000 is 150
    assert_eq!(liquidity.treasury_amount, U256::from(30));
    assert_eq!(liquidity.development_amount, U256::from(30));
    assert_eq!(liquidity.staking_amount, U256::from(90));

    let log = engine.admin().audit_log();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].action, AdminAction::UpdateRevenueAllocation);
    assert_eq!(log[0].outcome, AuditOutcome::Applied);
}
