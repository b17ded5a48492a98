// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use ethers::types::U256;
use platform_fee_engine::{
    AllocationSplit, FeeEngineError, FeeTotals, RevenueAllocation, RevenueAllocator, ServiceKind,
};
use rand::Rng;
use std::sync::Arc;
use std::thread;

#[test]
fn test_remainder_scenario() {
    let allocator = RevenueAllocator::new(RevenueAllocation::new(5000, 3000, 2000)).unwrap();

    let split = allocator.allocate(U256::from(101));

    assert_eq!(
        split,
        AllocationSplit {
            treasury_amount: U256::from(51),
            development_amount: U256::from(30),
            staking_amount: U256::from(20),
        }
    );
}

#[test]
fn test_invalid_update_keeps_prior_allocation() {
    let allocator = RevenueAllocator::new(RevenueAllocation::new(5000, 3000, 2000)).unwrap();

    let err = allocator
        .update_allocation(RevenueAllocation::new(6000, 3000, 2000))
        .unwrap_err();
    assert_eq!(err, FeeEngineError::InvalidAllocation { total: 11_000 });

    let err = allocator
        .update_allocation(RevenueAllocation::new(4000, 3000, 2000))
        .unwrap_err();
    assert_eq!(err, FeeEngineError::InvalidAllocation { total: 9_000 });

    assert_eq!(allocator.current(), RevenueAllocation::new(5000, 3000, 2000));
    assert_eq!(allocator.allocate(U256::from(101)).treasury_amount, U256::from(51));
}

#[test]
fn test_valid_update_applies() {
    let allocator = RevenueAllocator::new(RevenueAllocation::default()).unwrap();
    allocator
        .update_allocation(RevenueAllocation::new(0, 5000, 5000))
        .unwrap();

    let split = allocator.allocate(U256::from(3));
    // 1.5 / 1.5 floored to 1 / 1, remainder 1 to treasury
    assert_eq!(split.treasury_amount, U256::one());
    assert_eq!(split.development_amount, U256::one());
    assert_eq!(split.staking_amount, U256::one());
}

#[test]
fn test_parts_always_sum_to_fee() {
    let mut rng = rand::thread_rng();

    for _ in 0..500 {
        let treasury = rng.gen_range(0..=10_000u32);
        let development = rng.gen_range(0..=(10_000 - treasury));
        let staking = 10_000 - treasury - development;
        let allocator =
            RevenueAllocator::new(RevenueAllocation::new(treasury, development, staking)).unwrap();

        let mut bytes = [0u8; 32];
        rng.fill(&mut bytes[..]);
        let fee = U256::from_big_endian(&bytes);

        assert_eq!(allocator.allocate(fee).total(), fee);
        let small = U256::from(rng.gen_range(0u64..10_000));
        assert_eq!(allocator.allocate(small).total(), small);
    }
}

#[test]
fn test_allocate_totals_per_service() {
    let allocator = RevenueAllocator::new(RevenueAllocation::default()).unwrap();
    let mut totals = FeeTotals::new();
    totals.insert(ServiceKind::Swap, U256::from(101));
    totals.insert(ServiceKind::Lending, U256::from(1_000));

    let splits = allocator.allocate_totals(&totals);

    assert_eq!(splits.len(), 2);
    assert_eq!(splits[&ServiceKind::Swap].treasury_amount, U256::from(51));
    assert_eq!(splits[&ServiceKind::Lending].development_amount, U256::from(300));
    assert_eq!(splits[&ServiceKind::Lending].staking_amount, U256::from(200));
}

#[test]
fn test_concurrent_updates_never_expose_invalid_allocation() {
    let allocator = Arc::new(RevenueAllocator::new(RevenueAllocation::default()).unwrap());

    let writer = {
        let allocator = allocator.clone();
        thread::spawn(move || {
            for i in 0..500u32 {
                let treasury = (i * 17) % 10_001;
                let _ = allocator.update_allocation(RevenueAllocation::new(
                    treasury,
                    10_000 - treasury,
                    0,
                ));
                let _ = allocator.update_allocation(RevenueAllocation::new(9_000, 9_000, 9_000));
            }
        })
    };

    for _ in 0..2_000 {
        assert_eq!(allocator.current().total_bps(), 10_000);
        assert_eq!(allocator.allocate(U256::from(12_345)).total(), U256::from(12_345));
    }

    writer.join().unwrap();
}
