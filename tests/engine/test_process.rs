// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use ethers::types::{Address, H256, U256};
use ethers::utils::parse_ether;
use platform_fee_engine::config::LedgerConfig;
use platform_fee_engine::{
    BalanceOracle, EngineConfig, FeeEngine, FeeEngineError, PendingTransaction, ServiceKind,
};

struct FixedOracle {
    balance: U256,
}

impl FixedOracle {
    fn with_ether(balance: &str) -> Self {
        Self {
            balance: parse_ether(balance).unwrap(),
        }
    }
}

#[async_trait::async_trait]
impl BalanceOracle for FixedOracle {
    async fn balance_of(&self, _account: Address) -> Result<U256> {
        Ok(self.balance)
    }

    async fn estimate_gas(&self, _tx: &PendingTransaction) -> Result<U256> {
        Ok(U256::from(21_000))
    }

    async fn gas_price(&self) -> Result<U256> {
        // 1 gwei
        Ok(U256::from(1_000_000_000u64))
    }
}

fn swap(amount: &str) -> PendingTransaction {
    PendingTransaction::new(
        ServiceKind::Swap,
        Address::repeat_byte(0x5e),
        parse_ether(amount).unwrap(),
    )
}

#[tokio::test]
async fn test_validated_transaction_is_captured() {
    let engine = FeeEngine::from_config(&EngineConfig::default()).unwrap();
    let oracle = FixedOracle::with_ether("2");
    let tx_id = H256::from_low_u64_be(1);

    let record = engine.process(&oracle, &swap("1"), tx_id).await.unwrap();

    // 30 bps of 1 ETH
    assert_eq!(record.fee_amount, parse_ether("0.003").unwrap());
    assert_eq!(record.payer, Address::repeat_byte(0x5e));
    assert_eq!(engine.ledger().total_for(ServiceKind::Swap), record.fee_amount);
    assert_eq!(engine.validator().metrics().validations_passed(), 1);
}

#[tokio::test]
async fn test_rejected_transaction_captures_nothing() {
    let engine = FeeEngine::from_config(&EngineConfig::default()).unwrap();

    let err = engine
        .process(&FixedOracle::with_ether("10"), &swap("0.001"), H256::from_low_u64_be(1))
        .await
        .unwrap_err();
    assert!(matches!(err, FeeEngineError::AmountOutOfRange { .. }));

    let err = engine
        .process(&FixedOracle::with_ether("0.5"), &swap("1"), H256::from_low_u64_be(2))
        .await
        .unwrap_err();
    assert!(matches!(err, FeeEngineError::InsufficientBalance { .. }));

    assert!(engine.ledger().records().is_empty());
    assert!(engine.ledger().get_total_fees_collected().is_empty());
}

#[tokio::test]
async fn test_resubmitted_transaction_is_not_charged_twice() {
    let engine = FeeEngine::from_config(&EngineConfig::default()).unwrap();
    let oracle = FixedOracle::with_ether("5");
    let tx_id = H256::from_low_u64_be(77);

    engine.process(&oracle, &swap("1"), tx_id).await.unwrap();
    let err = engine.process(&oracle, &swap("1"), tx_id).await.unwrap_err();

    assert_eq!(err, FeeEngineError::DuplicateCapture(tx_id));
    assert_eq!(engine.ledger().records().len(), 1);
}

#[tokio::test]
async fn test_file_backed_engine_restores_totals() {
    let dir = tempfile::tempdir().unwrap();
    let config = EngineConfig {
        ledger: LedgerConfig {
            path: Some(dir.path().join("ledger").join("fees.jsonl")),
        },
        ..EngineConfig::default()
    };
    let oracle = FixedOracle::with_ether("100");

    {
        let engine = FeeEngine::from_config(&config).unwrap();
        engine
            .process(&oracle, &swap("10"), H256::from_low_u64_be(1))
            .await
            .unwrap();
    }

    let engine = FeeEngine::from_config(&config).unwrap();
    assert_eq!(
        engine.ledger().total_for(ServiceKind::Swap),
        parse_ether("0.03").unwrap()
    );

    let err = engine
        .process(&oracle, &swap("10"), H256::from_low_u64_be(1))
        .await
        .unwrap_err();
    assert_eq!(err, FeeEngineError::DuplicateCapture(H256::from_low_u64_be(1)));
}
