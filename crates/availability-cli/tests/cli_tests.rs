//! Integration tests for the `availability` CLI binary.
//!
//! These run the real binary against `tests/fixtures/schedule.json` with a
//! pinned `--now`, so every answer is independent of the wall clock.
//!
//! The fixture: provider 1 works 09:00-17:00 on weekdays, is off on Sunday,
//! takes a lunch break 12:00-13:00 on Monday 2025-06-02 and has confirmed
//! bookings there at 10:00-10:30 and 14:00-15:00. Service 7 lasts 45 minutes.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;

const NOW: &str = "2025-06-01 08:00";

fn schedule_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/schedule.json")
}

/// The binary with the fixture loaded, a pinned clock and a clean config.
fn availability() -> Command {
    let mut cmd = Command::cargo_bin("availability").unwrap();
    cmd.args(["-s", schedule_path(), "--now", NOW])
        .env_remove("AVAILABILITY_SLOT_INTERVAL")
        .env_remove("AVAILABILITY_DEFAULT_DURATION")
        .env_remove("AVAILABILITY_MAX_DAYS_IN_ADVANCE")
        .env_remove("AVAILABILITY_TIME_OFF_MIN_DURATION")
        .env_remove("AVAILABILITY_TIME_OFF_MAX_DURATION_DAYS");
    cmd
}

fn stdout_json(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().expect("binary should run");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

// ─────────────────────────────────────────────────────────────────────────────
// slots
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn slots_use_the_service_duration_and_skip_bookings() {
    let slots = stdout_json(availability().args([
        "slots",
        "--provider",
        "1",
        "--date",
        "2025-06-02",
        "--service",
        "7",
    ]));
    let starts: Vec<&str> = slots
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["start"].as_str().unwrap())
        .collect();

    assert_eq!(slots[0]["start"], "2025-06-02 09:00");
    assert_eq!(slots[0]["end"], "2025-06-02 09:45");
    // 09:15-10:00 touches the 10:00 booking and is still offered.
    assert!(starts.contains(&"2025-06-02 09:15"));
    assert!(!starts.contains(&"2025-06-02 09:30"));
    assert!(!starts.contains(&"2025-06-02 12:00"));
    assert!(starts.contains(&"2025-06-02 13:00"));
    // The cancelled 15:30 booking does not block anything.
    assert!(starts.contains(&"2025-06-02 15:15"));
    assert_eq!(*starts.last().unwrap(), "2025-06-02 16:15");
}

#[test]
fn slots_without_service_use_the_default_duration() {
    let slots = stdout_json(availability().args(["slots", "-p", "1", "-d", "2025-06-03"]));
    assert_eq!(slots[0]["start"], "2025-06-03 09:00");
    assert_eq!(slots[0]["end"], "2025-06-03 09:30");
    assert_eq!(slots.as_array().unwrap().len(), 31);
}

#[test]
fn slots_honor_the_interval_from_the_environment() {
    let slots = stdout_json(
        availability()
            .env("AVAILABILITY_SLOT_INTERVAL", "60")
            .args(["slots", "-p", "1", "-d", "2025-06-03"]),
    );
    assert_eq!(slots[1]["start"], "2025-06-03 10:00");
    assert_eq!(slots.as_array().unwrap().len(), 8);
}

#[test]
fn slots_on_a_day_off_are_empty() {
    availability()
        .args(["slots", "-p", "1", "-d", "2025-06-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"));
}

#[test]
fn slots_for_an_unknown_provider_are_empty() {
    availability()
        .args(["slots", "-p", "99", "-d", "2025-06-02"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"));
}

#[test]
fn slots_beyond_the_horizon_are_rejected() {
    availability()
        .args(["slots", "-p", "1", "-d", "2025-08-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("days ahead"));
}

#[test]
fn slots_in_the_past_are_rejected() {
    availability()
        .args(["slots", "-p", "1", "-d", "2025-05-30"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("in the past"));
}

#[test]
fn malformed_date_is_reported() {
    availability()
        .args(["slots", "-p", "1", "-d", "June 2nd"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid date"));
}

// ─────────────────────────────────────────────────────────────────────────────
// check
// ─────────────────────────────────────────────────────────────────────────────

fn check(at: &str, duration: &str) -> assert_cmd::assert::Assert {
    availability()
        .args(["check", "-p", "1", "--at", at, "--duration", duration])
        .assert()
}

#[test]
fn check_free_slot_is_available() {
    check("2025-06-02 11:00", "30")
        .success()
        .stdout(predicate::str::diff("available\n"));
}

#[test]
fn check_reports_each_reason() {
    check("2025-06-02 10:00", "30")
        .success()
        .stdout(predicate::str::contains("unavailable: booked"));
    check("2025-06-02 12:00", "30")
        .success()
        .stdout(predicate::str::contains("unavailable: time off"));
    check("2025-06-02 16:45", "30")
        .success()
        .stdout(predicate::str::contains("unavailable: outside working hours"));
    check("2025-06-01 10:00", "30")
        .success()
        .stdout(predicate::str::contains("unavailable: closed"));
}

#[test]
fn check_ending_as_time_off_begins_is_refused() {
    // 11:30-12:00 only touches the lunch break, but the single-slot check
    // treats time-off boundaries as occupied.
    check("2025-06-02 11:30", "30")
        .success()
        .stdout(predicate::str::contains("unavailable: time off"));
}

#[test]
fn check_unknown_provider() {
    availability()
        .args(["check", "-p", "99", "--at", "2025-06-02 10:00", "--duration", "30"])
        .assert()
        .success()
        .stdout(predicate::str::contains("unavailable: unknown provider"));
}

#[test]
fn check_zero_duration_fails() {
    check("2025-06-02 11:00", "0")
        .failure()
        .stderr(predicate::str::contains("Invalid duration"));
}

#[test]
fn check_in_the_past_fails() {
    check("2025-05-31 11:00", "30")
        .failure()
        .stderr(predicate::str::contains("in the past"));
}

// ─────────────────────────────────────────────────────────────────────────────
// windows, conflicts, hours
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn windows_split_around_busy_time() {
    let windows = stdout_json(availability().args(["windows", "-p", "1", "-d", "2025-06-02"]));
    let spans: Vec<(&str, &str)> = windows
        .as_array()
        .unwrap()
        .iter()
        .map(|w| (w["start"].as_str().unwrap(), w["end"].as_str().unwrap()))
        .collect();
    assert_eq!(
        spans,
        vec![
            ("2025-06-02 09:00", "2025-06-02 10:00"),
            ("2025-06-02 10:30", "2025-06-02 12:00"),
            ("2025-06-02 13:00", "2025-06-02 14:00"),
            ("2025-06-02 15:00", "2025-06-02 17:00"),
        ]
    );
    assert_eq!(windows[3]["duration_minutes"], 120);
}

#[test]
fn conflicts_list_confirmed_appointments_only() {
    let conflicts = stdout_json(availability().args([
        "conflicts",
        "-p",
        "1",
        "--from",
        "2025-06-02 13:30",
        "--to",
        "2025-06-02 17:00",
    ]));
    let conflicts = conflicts.as_array().unwrap();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0]["appointment_id"], 12);
    assert_eq!(conflicts[0]["overlap_minutes"], 60);
}

#[test]
fn conflicts_reject_too_short_time_off() {
    availability()
        .args([
            "conflicts",
            "-p",
            "1",
            "--from",
            "2025-06-02 13:30",
            "--to",
            "2025-06-02 13:45",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 30 minutes"));
}

#[test]
fn hours_print_the_week_with_day_names() {
    let hours = stdout_json(availability().args(["hours", "-p", "1"]));
    assert_eq!(hours.as_array().unwrap().len(), 7);
    assert_eq!(hours[0]["day"], "Sunday");
    assert_eq!(hours[0]["is_day_off"], true);
    assert_eq!(hours[6]["day"], "Saturday");
    assert_eq!(hours[6]["start_time"], "10:00");
    assert_eq!(hours[6]["end_time"], "15:00");
}

#[test]
fn hours_for_unknown_provider_fail() {
    availability()
        .args(["hours", "-p", "99"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Provider not found"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Startup errors
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn missing_schedule_file_fails() {
    Command::cargo_bin("availability")
        .unwrap()
        .args(["-s", "/nonexistent/schedule.json", "hours", "-p", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}

#[test]
fn invalid_config_value_fails() {
    availability()
        .env("AVAILABILITY_SLOT_INTERVAL", "0")
        .args(["hours", "-p", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration"));
}

#[test]
fn help_lists_every_subcommand() {
    Command::cargo_bin("availability")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("slots"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("windows"))
        .stdout(predicate::str::contains("conflicts"))
        .stdout(predicate::str::contains("hours"));
}
