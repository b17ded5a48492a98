// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Balance and gas lookups backing the pre-flight check.

use super::types::PendingTransaction;
use anyhow::{anyhow, Result};
use ethers::providers::Middleware;
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, TransactionRequest, U256};
use std::sync::Arc;
use tracing::debug;

/// External source of account balances and gas figures.
///
/// Implementations may block or fail; the validator bounds each call with a
/// timeout and never retries.
#[async_trait::async_trait]
pub trait BalanceOracle: Send + Sync {
    async fn balance_of(&self, account: Address) -> Result<U256>;

    async fn estimate_gas(&self, tx: &PendingTransaction) -> Result<U256>;

    async fn gas_price(&self) -> Result<U256>;
}

/// Oracle backed by an ethers JSON-RPC middleware.
pub struct ProviderOracle<M> {
    client: Arc<M>,
}

impl<M: Middleware> ProviderOracle<M> {
    pub fn new(client: Arc<M>) -> Self {
        Self { client }
    }

    fn to_typed(tx: &PendingTransaction) -> TypedTransaction {
        let mut request = TransactionRequest::new().from(tx.sender).value(tx.amount);
        if let Some(recipient) = tx.recipient {
            request = request.to(recipient);
        }
        if let Some(gas_price) = tx.gas_price {
            request = request.gas_price(gas_price);
        }
        request.into()
    }
}

#[async_trait::async_trait]
impl<M: Middleware + 'static> BalanceOracle for ProviderOracle<M> {
    async fn balance_of(&self, account: Address) -> Result<U256> {
        debug!("[ORACLE] Fetching balance for {:?}", account);
        self.client
            .get_balance(account, None)
            .await
            .map_err(|e| anyhow!("Balance lookup failed for {:?}: {}", account, e))
    }

    async fn estimate_gas(&self, tx: &PendingTransaction) -> Result<U256> {
        let typed = Self::to_typed(tx);
        self.client
            .estimate_gas(&typed, None)
            .await
            .map_err(|e| anyhow!("Unable to estimate gas: {}", e))
    }

    async fn gas_price(&self) -> Result<U256> {
        self.client
            .get_gas_price()
            .await
            .map_err(|e| anyhow!("Gas price lookup failed: {}", e))
    }
}
