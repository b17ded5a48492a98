// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod capture;
pub mod store;
pub mod types;

pub use capture::FeeCaptureLedger;
pub use store::{JsonLinesLedgerStore, LedgerStore, MemoryLedgerStore};
pub use types::{FeeCaptured, FeeRecord, FeeTotals, LedgerStats};
