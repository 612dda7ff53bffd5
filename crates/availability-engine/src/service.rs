//! Query-level entry points combining the snapshot loader and slot generator.
//!
//! [`AvailabilityService`] is what calling layers use. It maps an unknown
//! provider to "no availability" rather than an error, so only storage
//! failures and invalid durations escape as `Err`.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::format;
use crate::freebusy::FreeWindow;
use crate::model::{ProviderId, ServiceId, Slot};
use crate::slots::{self, SlotVerdict};
use crate::snapshot::{self, ScheduleSnapshot, ScheduleSource};

/// "Which slots are free on this date?"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityQuery {
    pub provider_id: ProviderId,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<ServiceId>,
}

/// "Is this exact slot free?"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotCheckQuery {
    pub provider_id: ProviderId,
    #[serde(with = "format::datetime")]
    pub datetime: NaiveDateTime,
    pub service_duration_minutes: u32,
}

pub struct AvailabilityService<S> {
    source: S,
    config: EngineConfig,
}

impl<S: ScheduleSource> AvailabilityService<S> {
    pub fn new(source: S, config: EngineConfig) -> Self {
        Self { source, config }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Load the snapshot, or `None` when the provider does not exist.
    fn snapshot(&self, provider: ProviderId, date: NaiveDate) -> Result<Option<ScheduleSnapshot>> {
        match snapshot::load_snapshot(&self.source, provider, date) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(EngineError::NotFound(what)) => {
                debug!(provider, %date, "{} not found, treating as unavailable", what);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Bookable slots for the query's provider and date, given the current
    /// local time `now`.
    ///
    /// The service duration comes from `service_id` when it resolves, and
    /// from [`EngineConfig::default_duration_minutes`] otherwise.
    pub fn available_slots(
        &self,
        query: &AvailabilityQuery,
        now: NaiveDateTime,
    ) -> Result<Vec<Slot>> {
        let Some(snapshot) = self.snapshot(query.provider_id, query.date)? else {
            return Ok(Vec::new());
        };
        let duration = snapshot::resolve_duration(
            &self.source,
            query.service_id,
            self.config.default_duration_minutes,
        )?;
        slots::generate_slots(&snapshot, duration, self.config.slot_interval_minutes, now)
    }

    /// Why the requested slot is or is not bookable.
    pub fn explain_slot(&self, query: &SlotCheckQuery) -> Result<SlotVerdict> {
        let Some(snapshot) = self.snapshot(query.provider_id, query.datetime.date())? else {
            return Ok(SlotVerdict::UnknownProvider);
        };
        slots::explain_slot(&snapshot, query.datetime, query.service_duration_minutes)
    }

    /// Whether the requested slot is bookable right now.
    pub fn is_slot_available(&self, query: &SlotCheckQuery) -> Result<bool> {
        Ok(self.explain_slot(query)?.is_available())
    }

    /// Free stretches of the provider's working day on `date`.
    pub fn free_windows(&self, provider: ProviderId, date: NaiveDate) -> Result<Vec<FreeWindow>> {
        Ok(self
            .snapshot(provider, date)?
            .map(|s| slots::day_free_windows(&s))
            .unwrap_or_default())
    }
}
