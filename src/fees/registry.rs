// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use super::types::{FeeSchedule, ServiceKind};
use crate::errors::{FeeEngineError, Result};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

/// Active fee schedule per service.
///
/// Schedules are stored behind `Arc` and swapped wholesale, so a reader holds
/// either the old or the new schedule and never a mix of the two.
pub struct FeeScheduleRegistry {
    schedules: RwLock<BTreeMap<ServiceKind, Arc<FeeSchedule>>>,
}

impl FeeScheduleRegistry {
    pub fn new() -> Self {
        Self {
            schedules: RwLock::new(BTreeMap::new()),
        }
    }

    /// Build a registry from startup configuration, rejecting any invalid schedule.
    pub fn with_schedules(schedules: impl IntoIterator<Item = FeeSchedule>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for schedule in schedules {
            schedule.validate()?;
            let schedule = schedule.normalized();
            map.insert(schedule.service, Arc::new(schedule));
        }

        info!("[FEE-REGISTRY] Loaded {} fee schedules", map.len());

        Ok(Self {
            schedules: RwLock::new(map),
        })
    }

    pub fn get(&self, service: ServiceKind) -> Result<Arc<FeeSchedule>> {
        let schedules = self.schedules.read().unwrap_or_else(|e| e.into_inner());
        schedules
            .get(&service)
            .cloned()
            .ok_or_else(|| FeeEngineError::UnknownService(service.to_string()))
    }

    pub fn get_by_name(&self, service_name: &str) -> Result<Arc<FeeSchedule>> {
        self.get(service_name.parse()?)
    }

    /// Replace the schedule for `service`, leaving the previous one in place on error.
    pub fn update(&self, service: ServiceKind, schedule: FeeSchedule) -> Result<Arc<FeeSchedule>> {
        if schedule.service != service {
            warn!(
                "[FEE-REGISTRY] Rejected schedule for {}: payload targets {}",
                service, schedule.service
            );
            return Err(FeeEngineError::InvalidSchedule {
                service,
                reason: format!("schedule is for {}", schedule.service),
            });
        }

        if let Err(e) = schedule.validate() {
            warn!("[FEE-REGISTRY] Rejected schedule for {}: {}", service, e);
            return Err(e);
        }

        let schedule = Arc::new(schedule.normalized());
        let previous = self
            .schedules
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(service, schedule.clone());

        match previous {
            Some(old) => info!(
                "[FEE-REGISTRY] Updated {} schedule: base {} -> {} bps, {} tiers",
                service,
                old.base_rate_bps,
                schedule.base_rate_bps,
                schedule.tiers.len()
            ),
            None => info!(
                "[FEE-REGISTRY] Installed {} schedule: base {} bps, {} tiers",
                service,
                schedule.base_rate_bps,
                schedule.tiers.len()
            ),
        }

        Ok(schedule)
    }

    pub fn services(&self) -> Vec<ServiceKind> {
        let schedules = self.schedules.read().unwrap_or_else(|e| e.into_inner());
        schedules.keys().copied().collect()
    }

    /// Every configured schedule, ordered by service.
    pub fn snapshot(&self) -> Vec<FeeSchedule> {
        let schedules = self.schedules.read().unwrap_or_else(|e| e.into_inner());
        debug!("[FEE-REGISTRY] Snapshot of {} schedules", schedules.len());
        schedules.values().map(|s| s.as_ref().clone()).collect()
    }
}

impl Default for FeeScheduleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
