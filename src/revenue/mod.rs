// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod allocator;

pub use allocator::{AllocationSplit, RevenueAllocation, RevenueAllocator};
