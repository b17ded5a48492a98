// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod bps;
pub mod calculator;
pub mod registry;
pub mod types;

pub use calculator::{quote_schedule, FeeCalculator};
pub use registry::FeeScheduleRegistry;
pub use types::{DiscountTier, FeeQuote, FeeSchedule, ServiceKind, BPS_DENOMINATOR};
