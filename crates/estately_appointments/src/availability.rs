// --- File: crates/estately_appointments/src/availability.rs ---
//! Shapes raw month-schedule payloads into [`MonthSchedule`] values.
//!
//! Everything here is a pure transform. Malformed input never fails; it just
//! produces fewer (or no) days, slots or meeting types.

use chrono::{Datelike, NaiveDate};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

use crate::calendar::days_in_month;
use crate::meeting_type::{MeetingType, MeetingTypeOption};
use crate::models::{hhmm, MonthSchedule, Slot};

/// Formats the `data` of a month-schedule response.
///
/// Accepted shapes, per day-of-month key:
///
/// ```json
/// { "month": 6, "year": 2024, "availability_types": "virtual,phone",
///   "days": { "10": [ { "id": 1, "start_time": "09:00", "end_time": "09:30" } ] } }
/// ```
///
/// The `days` wrapper is optional (day keys may sit at the top level) and a day
/// value may be either a slot array or `{ "slots": [...] }`.
pub fn format_appointment_data(raw: &Value, reference: NaiveDate) -> MonthSchedule {
    let month = raw
        .get("month")
        .and_then(value_as_i64)
        .and_then(|m| u32::try_from(m).ok())
        .filter(|m| (1..=12).contains(m))
        .unwrap_or_else(|| reference.month());
    let year = raw
        .get("year")
        .and_then(value_as_i64)
        .and_then(|y| i32::try_from(y).ok())
        .unwrap_or_else(|| reference.year());

    let mut schedule = MonthSchedule::empty(month, year, reference);
    schedule.availability_types = raw
        .get("availability_types")
        .map(parse_types_value)
        .unwrap_or_default();

    let days_source = match raw.get("days") {
        Some(Value::Object(days)) => Some(days),
        _ => raw.as_object(),
    };
    let Some(days) = days_source else {
        return schedule;
    };

    let last_day = days_in_month(year, month);
    let mut days_with_slots = BTreeMap::new();
    for (key, value) in days {
        let Ok(day) = key.trim().parse::<u32>() else {
            continue;
        };
        if day == 0 || day > last_day {
            debug!("Ignoring day {} outside {}-{:02}", day, year, month);
            continue;
        }
        let slots = format_day_slots(value);
        if !slots.is_empty() {
            days_with_slots.insert(day, slots);
        }
    }
    schedule.days_with_slots = days_with_slots;
    schedule
}

/// Splits a capability string into meeting-type options.
pub fn format_meeting_types(raw: &str) -> Vec<MeetingTypeOption> {
    MeetingType::parse_list(raw)
        .into_iter()
        .map(MeetingTypeOption::from)
        .collect()
}

/// Sorted day numbers that have at least one slot.
pub fn format_available_dates(schedule: &MonthSchedule) -> Vec<u32> {
    schedule
        .days_with_slots
        .iter()
        .filter(|(_, slots)| !slots.is_empty())
        .map(|(day, _)| *day)
        .collect()
}

fn format_day_slots(value: &Value) -> Vec<Slot> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("slots") {
            Some(Value::Array(items)) => items,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    let mut slots: Vec<Slot> = items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| format_slot(item, index))
        .collect();
    slots.sort_by_key(|slot| (slot.start_time, slot.end_time));
    slots
}

fn format_slot(item: &Value, index: usize) -> Option<Slot> {
    let start = item.get("start_time").and_then(Value::as_str).and_then(hhmm::parse)?;
    let end = item.get("end_time").and_then(Value::as_str).and_then(hhmm::parse)?;
    let id = item
        .get("id")
        .and_then(value_as_i64)
        .unwrap_or(index as i64 + 1);
    let slot = Slot::new(id, start, end);
    if slot.is_none() {
        debug!("Dropping slot {} with start {} not before end {}", id, start, end);
    }
    slot
}

fn parse_types_value(value: &Value) -> Vec<MeetingType> {
    match value {
        Value::String(raw) => MeetingType::parse_list(raw),
        Value::Array(items) => {
            let joined = items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(",");
            MeetingType::parse_list(&joined)
        }
        _ => Vec::new(),
    }
}

fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
