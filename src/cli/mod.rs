// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod operations;

use crate::config::EngineConfig;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Platform fee engine CLI
#[derive(Parser, Debug)]
#[command(name = "fee-engine")]
#[command(version = "0.1.0")]
#[command(about = "Operator tools for the platform fee engine", long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "FEE_ENGINE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute the fee for a transaction
    Quote(operations::QuoteArgs),

    /// Split a fee between treasury, development and staking
    Split(operations::SplitArgs),

    /// Check a transaction against amount and balance rules
    Validate(operations::ValidateArgs),

    /// Show captured fee totals from a ledger file
    Totals(operations::TotalsArgs),

    /// Print the effective configuration
    Config,
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    config.apply_env_overrides();
    config.check()?;

    match cli.command {
        Commands::Quote(args) => operations::quote(&config, args),
        Commands::Split(args) => operations::split(&config, args),
        Commands::Validate(args) => operations::check(&config, args).await,
        Commands::Totals(args) => operations::totals(&config, args),
        Commands::Config => operations::show_config(&config),
    }
}
