//! # availability-engine
//!
//! Deterministic appointment availability for service providers.
//!
//! A provider has one recurring working-hours rule per weekday, any number of
//! ad-hoc time-off periods, and a set of booked appointments. The engine
//! answers two questions from those facts: which slots of a given length are
//! bookable on a date, and whether one exact slot is bookable. Every answer is
//! a pure function of a [`ScheduleSnapshot`] and an explicit "now".
//!
//! ## Modules
//!
//! - [`model`] — working hours, time off, appointments, slots
//! - [`snapshot`] — the [`ScheduleSource`] seam and snapshot loading
//! - [`slots`] — slot enumeration and single-slot checks
//! - [`conflict`] — overlap tests and time-off conflict detection
//! - [`freebusy`] — busy-time union and free windows
//! - [`hours`] — validated weekly working-hours sets
//! - [`store`] — in-memory schedule store with atomic hours replacement
//! - [`service`] — query-level API used by calling layers
//! - [`intake`] — request checks that run before the engine
//! - [`config`] — environment configuration
//! - [`format`] — text formats for timestamps and times
//! - [`error`] — error types

pub mod config;
pub mod conflict;
pub mod error;
pub mod format;
pub mod freebusy;
pub mod hours;
pub mod intake;
pub mod model;
pub mod service;
pub mod slots;
pub mod snapshot;
pub mod store;

pub use config::EngineConfig;
pub use conflict::conflicting_appointments;
pub use error::EngineError;
pub use hours::{WeeklySchedule, WorkingHoursEntry};
pub use model::{Appointment, AppointmentStatus, Slot, TimeOffPeriod, WorkingHoursRule};
pub use service::{AvailabilityQuery, AvailabilityService, SlotCheckQuery};
pub use slots::{check_slot, generate_slots, SlotVerdict};
pub use snapshot::{load_snapshot, ScheduleSnapshot, ScheduleSource};
pub use store::{InMemoryScheduleStore, ScheduleDocument};
