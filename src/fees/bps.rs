// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Integer basis-point arithmetic.

use super::types::BPS_DENOMINATOR;
use ethers::types::U256;

/// `floor(amount * bps / 10000)` without overflowing for any 256-bit amount.
///
/// Splits `amount = q * 10000 + r` so the product never exceeds `amount`
/// when `bps <= 10000`.
pub fn apply_bps(amount: U256, bps: u32) -> U256 {
    let denominator = U256::from(BPS_DENOMINATOR);
    let bps = U256::from(bps);
    let quotient = amount / denominator;
    let remainder = amount % denominator;

    quotient * bps + remainder * bps / denominator
}

/// `base * (10000 - discount) / 10000`, floored.
pub fn discounted_rate(base_rate_bps: u32, discount_bps: u32) -> u32 {
    let discount = discount_bps.min(BPS_DENOMINATOR);
    let scaled = u64::from(base_rate_bps) * u64::from(BPS_DENOMINATOR - discount);
    (scaled / u64::from(BPS_DENOMINATOR)) as u32
}
