//! In-memory schedule store.
//!
//! [`InMemoryScheduleStore`] keeps providers, their weekly hours, time off and
//! appointments behind a single `RwLock`, and implements [`ScheduleSource`]
//! for the snapshot loader. Readers hold the lock only for the duration of
//! one query. A working-hours replacement is validated and staged outside the
//! lock, then swapped in with one write, so readers see either the old week
//! or the new one.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::conflict::overlaps_inclusive;
use crate::error::{EngineError, Result};
use crate::hours::{WeeklySchedule, WorkingHoursEntry};
use crate::model::{
    Appointment, Interval, ProviderId, ServiceId, TimeOffId, TimeOffPeriod, WorkingHoursRule,
};
use crate::snapshot::{day_bounds, ScheduleSource};

#[derive(Debug, Default)]
struct ProviderRecord {
    hours: Option<WeeklySchedule>,
    time_off: Vec<TimeOffPeriod>,
    appointments: Vec<Appointment>,
}

#[derive(Debug, Default)]
struct StoreState {
    providers: BTreeMap<ProviderId, ProviderRecord>,
    services: BTreeMap<ServiceId, u32>,
    last_time_off_id: TimeOffId,
}

impl StoreState {
    fn provider(&self, id: ProviderId) -> Result<&ProviderRecord> {
        self.providers.get(&id).ok_or_else(|| not_found(id))
    }

    fn provider_mut(&mut self, id: ProviderId) -> Result<&mut ProviderRecord> {
        self.providers.get_mut(&id).ok_or_else(|| not_found(id))
    }
}

fn not_found(id: ProviderId) -> EngineError {
    EngineError::NotFound(format!("provider {}", id))
}

#[derive(Debug, Default)]
pub struct InMemoryScheduleStore {
    state: RwLock<StoreState>,
}

impl InMemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreState>> {
        self.state
            .read()
            .map_err(|_| EngineError::Persistence("schedule store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreState>> {
        self.state
            .write()
            .map_err(|_| EngineError::Persistence("schedule store lock poisoned".to_string()))
    }

    /// Register a provider with the standard week
    /// ([`WeeklySchedule::standard`]). Existing providers are left alone.
    pub fn add_provider(&self, provider: ProviderId) -> Result<()> {
        self.add_provider_with_hours(provider, Some(WeeklySchedule::standard()))
    }

    /// Register a provider with explicit hours, or none at all. A provider
    /// without hours is closed every day.
    pub fn add_provider_with_hours(
        &self,
        provider: ProviderId,
        hours: Option<WeeklySchedule>,
    ) -> Result<()> {
        let mut state = self.write()?;
        state
            .providers
            .entry(provider)
            .or_insert_with(|| ProviderRecord {
                hours,
                ..ProviderRecord::default()
            });
        Ok(())
    }

    pub fn add_service(&self, service: ServiceId, duration_minutes: u32) -> Result<()> {
        self.write()?.services.insert(service, duration_minutes);
        Ok(())
    }

    /// Atomically replace all seven working-hours rules of a provider.
    ///
    /// # Errors
    /// [`EngineError::InvalidWorkingHours`] for a malformed set,
    /// [`EngineError::NotFound`] for an unknown provider and
    /// [`EngineError::Persistence`] if the store is unusable. In every error
    /// case the previous rules are unchanged.
    pub fn replace_working_hours(
        &self,
        provider: ProviderId,
        entries: &[WorkingHoursEntry],
    ) -> Result<()> {
        let staged = WeeklySchedule::try_from_entries(entries).inspect_err(|e| {
            warn!(provider, error = %e, "rejected working hours replacement");
        })?;

        let mut state = self.write()?;
        state.provider_mut(provider)?.hours = Some(staged);
        info!(provider, "replaced working hours");
        Ok(())
    }

    /// The provider's rules ordered Sunday first; empty if none are stored.
    pub fn working_hours(&self, provider: ProviderId) -> Result<Vec<WorkingHoursRule>> {
        let state = self.read()?;
        Ok(state
            .provider(provider)?
            .hours
            .map(|week| week.rules().to_vec())
            .unwrap_or_default())
    }

    /// Record a time-off period and return it with its assigned id.
    ///
    /// # Errors
    /// [`EngineError::Rejected`] if `end` is not after `start`.
    pub fn add_time_off(
        &self,
        provider: ProviderId,
        start: NaiveDateTime,
        end: NaiveDateTime,
        reason: Option<String>,
    ) -> Result<TimeOffPeriod> {
        if end <= start {
            return Err(EngineError::Rejected(
                "time off must end after it starts".to_string(),
            ));
        }

        let mut state = self.write()?;
        let id = state.last_time_off_id + 1;
        let period = TimeOffPeriod {
            id,
            start,
            end,
            reason,
        };
        state.provider_mut(provider)?.time_off.push(period.clone());
        state.last_time_off_id = id;

        info!(provider, time_off_id = id, %start, %end, "added time off");
        Ok(period)
    }

    /// Delete one of the provider's own time-off periods. Returns `false` if
    /// the id does not exist or belongs to another provider.
    pub fn remove_time_off(&self, provider: ProviderId, time_off: TimeOffId) -> Result<bool> {
        let mut state = self.write()?;
        let record = state.provider_mut(provider)?;
        let before = record.time_off.len();
        record.time_off.retain(|t| t.id != time_off);
        let removed = record.time_off.len() != before;

        if removed {
            info!(provider, time_off_id = time_off, "removed time off");
        } else {
            debug!(provider, time_off_id = time_off, "no such time off");
        }
        Ok(removed)
    }

    /// Time off touching any day in `from..=to`, ordered by start.
    pub fn time_off_between(
        &self,
        provider: ProviderId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<TimeOffPeriod>> {
        let range = Interval::new(day_bounds(from).start, day_bounds(to).end);
        let state = self.read()?;
        let mut periods: Vec<TimeOffPeriod> = state
            .provider(provider)?
            .time_off
            .iter()
            .filter(|t| overlaps_inclusive(&t.interval(), &range))
            .cloned()
            .collect();
        periods.sort_by_key(|t| (t.start, t.id));
        Ok(periods)
    }

    /// Record a booked appointment. Booking decisions happen elsewhere; the
    /// store only keeps what it is given.
    pub fn add_appointment(&self, provider: ProviderId, appointment: Appointment) -> Result<()> {
        let mut state = self.write()?;
        state.provider_mut(provider)?.appointments.push(appointment);
        Ok(())
    }

    pub fn appointments(&self, provider: ProviderId) -> Result<Vec<Appointment>> {
        Ok(self.read()?.provider(provider)?.appointments.clone())
    }

    /// Build a store from a parsed [`ScheduleDocument`].
    ///
    /// # Errors
    /// [`EngineError::InvalidWorkingHours`] if any provider's hours are
    /// malformed, [`EngineError::Document`] for repeated provider or time-off
    /// ids and for time off that does not end after it starts.
    pub fn from_document(doc: ScheduleDocument) -> Result<Self> {
        let mut state = StoreState::default();
        let mut time_off_ids = BTreeSet::new();

        for service in doc.services {
            state.services.insert(service.id, service.duration_minutes);
        }

        for provider in doc.providers {
            let hours = provider
                .working_hours
                .as_deref()
                .map(WeeklySchedule::try_from_entries)
                .transpose()?;

            for period in &provider.time_off {
                if period.end <= period.start {
                    return Err(EngineError::Document(format!(
                        "time off {}: time off must end after it starts",
                        period.id
                    )));
                }
                if !time_off_ids.insert(period.id) {
                    return Err(EngineError::Document(format!(
                        "time off {} is listed twice",
                        period.id
                    )));
                }
                state.last_time_off_id = state.last_time_off_id.max(period.id);
            }

            let record = ProviderRecord {
                hours,
                time_off: provider.time_off,
                appointments: provider.appointments,
            };
            if state.providers.insert(provider.id, record).is_some() {
                return Err(EngineError::Document(format!(
                    "provider {} is listed twice",
                    provider.id
                )));
            }
        }

        debug!(
            providers = state.providers.len(),
            services = state.services.len(),
            "loaded schedule document"
        );
        Ok(Self {
            state: RwLock::new(state),
        })
    }

    /// Parse a JSON [`ScheduleDocument`] and build a store from it.
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: ScheduleDocument =
            serde_json::from_str(json).map_err(|e| EngineError::Document(e.to_string()))?;
        Self::from_document(doc)
    }
}

impl ScheduleSource for InMemoryScheduleStore {
    fn working_hours_for(
        &self,
        provider: ProviderId,
        weekday: u8,
    ) -> Result<Option<WorkingHoursRule>> {
        let state = self.read()?;
        Ok(state
            .provider(provider)?
            .hours
            .and_then(|week| week.rule(weekday).copied()))
    }

    fn time_off_overlapping(
        &self,
        provider: ProviderId,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<TimeOffPeriod>> {
        let range = Interval::new(from, to);
        let state = self.read()?;
        Ok(state
            .provider(provider)?
            .time_off
            .iter()
            .filter(|t| overlaps_inclusive(&t.interval(), &range))
            .cloned()
            .collect())
    }

    fn appointments_on(&self, provider: ProviderId, date: NaiveDate) -> Result<Vec<Appointment>> {
        let state = self.read()?;
        Ok(state
            .provider(provider)?
            .appointments
            .iter()
            .filter(|a| a.start.date() == date)
            .cloned()
            .collect())
    }

    fn service_duration(&self, service: ServiceId) -> Result<Option<u32>> {
        Ok(self.read()?.services.get(&service).copied())
    }
}

/// Serialized form of a whole store: services plus providers with their
/// hours, time off and appointments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleDocument {
    #[serde(default)]
    pub services: Vec<ServiceRecord>,
    #[serde(default)]
    pub providers: Vec<ProviderDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub id: ServiceId,
    pub duration_minutes: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderDocument {
    pub id: ProviderId,
    /// All seven weekdays, or omitted for a provider with no hours.
    #[serde(default)]
    pub working_hours: Option<Vec<WorkingHoursEntry>>,
    #[serde(default)]
    pub time_off: Vec<TimeOffPeriod>,
    #[serde(default)]
    pub appointments: Vec<Appointment>,
}
