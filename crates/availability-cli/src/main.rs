//! `availability` CLI: query provider availability from a JSON schedule
//! document.
//!
//! ## Usage
//!
//! ```sh
//! # Bookable slots for provider 1 on a date, using service 7's duration
//! availability -s schedule.json slots --provider 1 --date 2025-06-02 --service 7
//!
//! # Is one exact slot free?
//! availability -s schedule.json check --provider 1 --at "2025-06-02 11:00" --duration 30
//!
//! # Unbooked stretches of the working day
//! availability -s schedule.json windows --provider 1 --date 2025-06-02
//!
//! # Which confirmed appointments would a proposed time off hit?
//! availability -s schedule.json conflicts --provider 1 \
//!     --from "2025-06-02 12:00" --to "2025-06-02 15:00"
//!
//! # The provider's weekly hours
//! availability -s schedule.json hours --provider 1
//! ```
//!
//! "Now" is taken from `--now` when given, otherwise from the wall clock in
//! `--timezone` (default UTC). Engine settings come from `AVAILABILITY_*`
//! environment variables, optionally via a `.env` file.

use anyhow::{Context, Result};
use availability_engine::conflict::{conflicting_appointments, TimeOffConflict};
use availability_engine::model::{TimeOffPeriod, WorkingHoursRule};
use availability_engine::{
    format, hours, intake, AvailabilityQuery, AvailabilityService, EngineConfig,
    InMemoryScheduleStore, SlotCheckQuery, SlotVerdict,
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "availability",
    version,
    about = "Provider appointment availability queries"
)]
struct Cli {
    /// Schedule document (JSON) with services and providers
    #[arg(short, long)]
    schedule: String,

    /// Current local time as "YYYY-MM-DD HH:MM" (defaults to the wall clock)
    #[arg(long)]
    now: Option<String>,

    /// IANA timezone the provider's schedule is kept in
    #[arg(long, default_value = "UTC")]
    timezone: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List bookable slots on a date
    Slots {
        #[arg(short, long)]
        provider: i64,
        /// Calendar date, YYYY-MM-DD
        #[arg(short, long)]
        date: String,
        /// Service whose duration to use (falls back to the default duration)
        #[arg(long)]
        service: Option<i64>,
    },
    /// Check whether one exact slot is bookable
    Check {
        #[arg(short, long)]
        provider: i64,
        /// Slot start, "YYYY-MM-DD HH:MM"
        #[arg(long)]
        at: String,
        /// Service duration in minutes
        #[arg(long)]
        duration: u32,
    },
    /// Show the free stretches of a working day
    Windows {
        #[arg(short, long)]
        provider: i64,
        #[arg(short, long)]
        date: String,
    },
    /// List confirmed appointments a proposed time off would overlap
    Conflicts {
        #[arg(short, long)]
        provider: i64,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
    /// Print a provider's weekly working hours
    Hours {
        #[arg(short, long)]
        provider: i64,
    },
}

#[derive(Serialize)]
struct ConflictDto {
    appointment_id: i64,
    #[serde(with = "format::datetime")]
    start: NaiveDateTime,
    #[serde(with = "format::datetime")]
    end: NaiveDateTime,
    overlap_minutes: i64,
}

impl From<&TimeOffConflict> for ConflictDto {
    fn from(c: &TimeOffConflict) -> Self {
        Self {
            appointment_id: c.appointment.id,
            start: c.appointment.start,
            end: c.appointment.end,
            overlap_minutes: c.overlap_minutes,
        }
    }
}

#[derive(Serialize)]
struct HoursDto {
    day: &'static str,
    #[serde(flatten)]
    rule: WorkingHoursRule,
}

fn main() -> Result<()> {
    // A missing .env file is fine; the environment alone is enough.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let config = EngineConfig::from_env().context("Failed to read engine configuration")?;
    let now = resolve_now(cli.now.as_deref(), &cli.timezone)?;
    debug!(%now, ?config, "starting");

    let json = std::fs::read_to_string(&cli.schedule)
        .with_context(|| format!("Failed to read file: {}", cli.schedule))?;
    let store = InMemoryScheduleStore::from_json(&json)
        .with_context(|| format!("Failed to load schedule: {}", cli.schedule))?;
    let service = AvailabilityService::new(store, config);

    match cli.command {
        Commands::Slots {
            provider,
            date,
            service: service_id,
        } => {
            let date = parse_date(&date)?;
            intake::validate_booking_date(date, now.date(), service.config())?;
            let query = AvailabilityQuery {
                provider_id: provider,
                date,
                service_id,
            };
            let slots = service.available_slots(&query, now)?;
            println!("{}", serde_json::to_string_pretty(&slots)?);
        }
        Commands::Check {
            provider,
            at,
            duration,
        } => {
            let datetime = parse_datetime(&at)?;
            intake::validate_slot_time(datetime, now)?;
            let query = SlotCheckQuery {
                provider_id: provider,
                datetime,
                service_duration_minutes: duration,
            };
            let verdict = service.explain_slot(&query)?;
            println!("{}", verdict_label(verdict));
        }
        Commands::Windows { provider, date } => {
            let date = parse_date(&date)?;
            let windows = service.free_windows(provider, date)?;
            println!("{}", serde_json::to_string_pretty(&windows)?);
        }
        Commands::Conflicts { provider, from, to } => {
            let (start, end) = (parse_datetime(&from)?, parse_datetime(&to)?);
            intake::validate_time_off(start, end, now, service.config())?;
            let proposed = TimeOffPeriod {
                id: 0,
                start,
                end,
                reason: None,
            };
            let appointments = service.source().appointments(provider)?;
            let conflicts: Vec<ConflictDto> = conflicting_appointments(&appointments, &proposed)
                .iter()
                .map(ConflictDto::from)
                .collect();
            println!("{}", serde_json::to_string_pretty(&conflicts)?);
        }
        Commands::Hours { provider } => {
            let rules: Vec<HoursDto> = service
                .source()
                .working_hours(provider)?
                .into_iter()
                .map(|rule| HoursDto {
                    day: hours::day_name(rule.weekday),
                    rule,
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rules)?);
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// The explicit `--now`, or the current wall-clock time in `timezone`.
fn resolve_now(now: Option<&str>, timezone: &str) -> Result<NaiveDateTime> {
    let tz: Tz = timezone
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid timezone: '{}'", timezone))?;
    match now {
        Some(raw) => parse_datetime(raw),
        None => Ok(Utc::now().with_timezone(&tz).naive_local()),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    format::parse_date(raw)
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", raw))
}

/// Accepts a full timestamp or, for convenience, a bare date meaning midnight.
fn parse_datetime(raw: &str) -> Result<NaiveDateTime> {
    format::parse_datetime(raw)
        .or_else(|| format::parse_date(raw).map(|d| d.and_time(NaiveTime::MIN)))
        .with_context(|| format!("Invalid timestamp '{}', expected YYYY-MM-DD HH:MM", raw))
}

fn verdict_label(verdict: SlotVerdict) -> &'static str {
    match verdict {
        SlotVerdict::Available => "available",
        SlotVerdict::UnknownProvider => "unavailable: unknown provider",
        SlotVerdict::Closed => "unavailable: closed",
        SlotVerdict::OutsideHours => "unavailable: outside working hours",
        SlotVerdict::Booked => "unavailable: booked",
        SlotVerdict::TimeOff => "unavailable: time off",
    }
}
