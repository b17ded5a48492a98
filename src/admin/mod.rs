// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Privileged configuration surface.
//!
//! Authorization is decided by an external access-control service, which
//! hands the caller an [`AdminGrant`]. This module only checks the grant's
//! verdict; it never authenticates anyone itself.

pub mod audit;

pub use audit::{AdminAction, AuditEntry, AuditLog, AuditOutcome};

use crate::errors::{FeeEngineError, Result};
use crate::fees::{FeeSchedule, FeeScheduleRegistry, ServiceKind};
use crate::revenue::{RevenueAllocation, RevenueAllocator};
use chrono::{DateTime, Utc};
use ethers::types::Address;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Verdict issued by the access-control service for one caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminGrant {
    subject: Address,
    authorized: bool,
    issued_at: DateTime<Utc>,
}

impl AdminGrant {
    pub fn new(subject: Address, authorized: bool) -> Self {
        Self {
            subject,
            authorized,
            issued_at: Utc::now(),
        }
    }

    pub fn authorized(subject: Address) -> Self {
        Self::new(subject, true)
    }

    pub fn denied(subject: Address) -> Self {
        Self::new(subject, false)
    }

    pub fn subject(&self) -> Address {
        self.subject
    }

    pub fn is_authorized(&self) -> bool {
        self.authorized
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }
}

/// Admin operations over the fee registry and revenue allocator.
pub struct FeeAdmin {
    registry: Arc<FeeScheduleRegistry>,
    allocator: Arc<RevenueAllocator>,
    audit: AuditLog,
}

impl FeeAdmin {
    pub fn new(registry: Arc<FeeScheduleRegistry>, allocator: Arc<RevenueAllocator>) -> Self {
        Self {
            registry,
            allocator,
            audit: AuditLog::new(),
        }
    }

    pub fn update_fee_structure(
        &self,
        grant: &AdminGrant,
        service: ServiceKind,
        schedule: FeeSchedule,
    ) -> Result<FeeSchedule> {
        let action = AdminAction::UpdateFeeStructure {
            service: service.to_string(),
        };
        let payload = render(&schedule);

        let result = Self::require(grant)
            .and_then(|_| self.registry.update(service, schedule))
            .map(|applied| applied.as_ref().clone());

        self.record(grant, action, payload, &result);
        result
    }

    pub fn update_revenue_allocation(
        &self,
        grant: &AdminGrant,
        allocation: RevenueAllocation,
    ) -> Result<RevenueAllocation> {
        let payload = render(&allocation);

        let result =
            Self::require(grant).and_then(|_| self.allocator.update_allocation(allocation));

        self.record(grant, AdminAction::UpdateRevenueAllocation, payload, &result);
        result
    }

    pub fn audit_log(&self) -> Vec<AuditEntry> {
        self.audit.entries()
    }

    fn require(grant: &AdminGrant) -> Result<()> {
        if grant.is_authorized() {
            Ok(())
        } else {
            Err(FeeEngineError::Unauthorized(format!(
                "{:?} holds no admin grant",
                grant.subject()
            )))
        }
    }

    fn record<T>(&self, grant: &AdminGrant, action: AdminAction, payload: String, result: &Result<T>) {
        let outcome = match result {
            Ok(_) => {
                info!("[ADMIN] {:?} applied {:?}", grant.subject(), action);
                AuditOutcome::Applied
            }
            Err(e) => {
                warn!("[ADMIN] {:?} rejected {:?}: {}", grant.subject(), action, e);
                AuditOutcome::Rejected(e.reason_code())
            }
        };

        self.audit.push(AuditEntry {
            subject: grant.subject(),
            action,
            outcome,
            payload,
            timestamp: Utc::now(),
        });
    }
}

fn render<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}
