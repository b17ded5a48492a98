// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, bail, Result};
use clap::Args;
use ethers::providers::{Http, Provider};
use ethers::types::{Address, U256};
use ethers::utils::{format_ether, parse_ether};
use std::path::PathBuf;
use tracing::info;

use crate::config::EngineConfig;
use crate::engine::FeeEngine;
use crate::fees::ServiceKind;
use crate::ledger::JsonLinesLedgerStore;
use crate::validation::{
    validate, PendingTransaction, ProviderOracle, TransactionValidator, ValidationResult,
};
use std::sync::Arc;

/// Arguments for the quote command
#[derive(Args, Debug)]
pub struct QuoteArgs {
    /// Service name (swap, lending, staking, bridging, liquidity)
    #[arg(long)]
    pub service: String,

    /// Transaction amount (ether unless --wei)
    #[arg(long)]
    pub amount: String,

    /// Treat amounts as raw wei
    #[arg(long)]
    pub wei: bool,
}

/// Arguments for the split command
#[derive(Args, Debug)]
pub struct SplitArgs {
    /// Fee amount to split (ether unless --wei)
    #[arg(long)]
    pub fee: String,

    /// Treat amounts as raw wei
    #[arg(long)]
    pub wei: bool,
}

/// Arguments for the validate command
///
/// With `--rpc-url` the balance and gas figures come from the node;
/// otherwise `--balance` and `--gas-estimate` are used as given.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Transaction amount (ether unless --wei)
    #[arg(long)]
    pub amount: String,

    /// Sender balance (ether unless --wei)
    #[arg(long, required_unless_present = "rpc_url")]
    pub balance: Option<String>,

    /// Estimated gas units
    #[arg(long, default_value = "21000")]
    pub gas_estimate: u64,

    /// Gas price in wei (queried from the node when omitted with --rpc-url)
    #[arg(long)]
    pub gas_price: Option<String>,

    /// JSON-RPC endpoint for balance and gas lookups
    #[arg(long, env = "RPC_URL")]
    pub rpc_url: Option<String>,

    /// Sending account, required with --rpc-url
    #[arg(long)]
    pub sender: Option<String>,

    /// Recipient account
    #[arg(long)]
    pub recipient: Option<String>,

    /// Service the transaction belongs to
    #[arg(long, default_value = "swap")]
    pub service: String,

    /// Treat amounts as raw wei
    #[arg(long)]
    pub wei: bool,
}

/// Arguments for the totals command
#[derive(Args, Debug)]
pub struct TotalsArgs {
    /// Ledger file to read (defaults to ledger.path from configuration)
    #[arg(long)]
    pub ledger: Option<PathBuf>,
}

fn parse_amount(value: &str, wei: bool) -> Result<U256> {
    if wei {
        U256::from_dec_str(value.trim()).map_err(|e| anyhow!("Invalid wei amount {:?}: {}", value, e))
    } else {
        parse_ether(value.trim()).map_err(|e| anyhow!("Invalid ether amount {:?}: {}", value, e))
    }
}

fn parse_address(value: &str) -> Result<Address> {
    value
        .trim()
        .parse()
        .map_err(|e| anyhow!("Invalid address {:?}: {:?}", value, e))
}

fn display_amount(value: U256, wei: bool) -> String {
    if wei {
        value.to_string()
    } else {
        format_ether(value)
    }
}

/// Quote the fee for one transaction
pub fn quote(config: &EngineConfig, args: QuoteArgs) -> Result<()> {
    let engine = FeeEngine::from_config(config)?;
    let amount = parse_amount(&args.amount, args.wei)?;
    let quote = engine.compute_fee_by_name(&args.service, amount)?;

    println!("Service:         {}", quote.service);
    println!("Gross amount:    {}", display_amount(quote.gross_amount, args.wei));
    println!("Discount:        {} bps", quote.discount_bps);
    println!("Effective rate:  {} bps", quote.effective_rate_bps);
    println!("Fee:             {}", display_amount(quote.fee_amount, args.wei));
    Ok(())
}

/// Split a fee under the configured allocation
pub fn split(config: &EngineConfig, args: SplitArgs) -> Result<()> {
    let engine = FeeEngine::from_config(config)?;
    let fee = parse_amount(&args.fee, args.wei)?;
    let split = engine.allocate(fee);

    println!("Treasury:        {}", display_amount(split.treasury_amount, args.wei));
    println!("Development:     {}", display_amount(split.development_amount, args.wei));
    println!("Staking rewards: {}", display_amount(split.staking_amount, args.wei));
    Ok(())
}

/// Run the admission rule, against the node when an RPC URL is given
pub async fn check(config: &EngineConfig, args: ValidateArgs) -> Result<()> {
    let limits = config.amount_limits()?;
    let amount = parse_amount(&args.amount, args.wei)?;
    let gas_price = args
        .gas_price
        .as_deref()
        .map(|price| parse_amount(price, true))
        .transpose()?;

    let result = match &args.rpc_url {
        Some(rpc_url) => {
            let sender = args
                .sender
                .as_deref()
                .ok_or_else(|| anyhow!("--sender is required with --rpc-url"))?;
            let service: ServiceKind = args.service.parse()?;

            let mut tx = PendingTransaction::new(service, parse_address(sender)?, amount);
            if let Some(recipient) = &args.recipient {
                tx = tx.with_recipient(parse_address(recipient)?);
            }
            if let Some(price) = gas_price {
                tx = tx.with_gas_price(price);
            }

            let provider = Provider::<Http>::try_from(rpc_url.as_str())
                .map_err(|e| anyhow!("Invalid RPC URL {}: {}", rpc_url, e))?;
            let oracle = ProviderOracle::new(Arc::new(provider));
            let validator = TransactionValidator::new(limits, config.oracle_timeout());

            info!("Checking {} transaction from {:?} against {}", service, tx.sender, rpc_url);
            validator.preflight(&oracle, &tx).await
        }
        None => {
            let balance = match &args.balance {
                Some(balance) => parse_amount(balance, args.wei)?,
                None => bail!("--balance is required without --rpc-url"),
            };
            validate(
                amount,
                balance,
                U256::from(args.gas_estimate),
                gas_price.unwrap_or_default(),
                limits.min_amount,
                limits.max_amount,
            )
        }
    };

    report(result)
}

fn report(result: ValidationResult) -> Result<()> {
    match result.into_result() {
        Ok(()) => {
            println!("PASS");
            Ok(())
        }
        Err(e) => {
            println!("FAIL {}: {}", e.reason_code(), e);
            Err(e.into())
        }
    }
}

/// Replay a ledger file and print per-service totals with their split
pub fn totals(config: &EngineConfig, args: TotalsArgs) -> Result<()> {
    let path = args
        .ledger
        .or_else(|| config.ledger.path.clone())
        .ok_or_else(|| anyhow!("No ledger file given. Use --ledger or set LEDGER_PATH"))?;

    if !path.is_file() {
        bail!("Ledger file {} does not exist", path.display());
    }

    let engine = FeeEngine::with_store(config, Arc::new(JsonLinesLedgerStore::open(&path)?))?;
    let totals = engine.totals();
    let splits = engine.distribute();

    info!("Read {} records from {}", engine.ledger().records().len(), path.display());

    for (service, total) in &totals {
        println!("{:<10} total {}", service.as_str(), format_ether(*total));
        if let Some(split) = splits.get(service) {
            println!(
                "           treasury {} / development {} / staking {}",
                format_ether(split.treasury_amount),
                format_ether(split.development_amount),
                format_ether(split.staking_amount)
            );
        }
    }
    Ok(())
}

/// Print the effective configuration as TOML
pub fn show_config(config: &EngineConfig) -> Result<()> {
    println!("{}", config.to_toml_string()?);
    Ok(())
}
