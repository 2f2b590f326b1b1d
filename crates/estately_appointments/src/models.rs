// --- File: crates/estately_appointments/src/models.rs ---
use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::meeting_type::MeetingType;

/// `HH:MM` on the wire; `HH:MM:SS` is accepted on input.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(raw: &str) -> Option<NaiveTime> {
        let raw = raw.trim();
        NaiveTime::parse_from_str(raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
            .ok()
    }

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid time: {raw}")))
    }

    pub mod option {
        use chrono::NaiveTime;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            time: &Option<NaiveTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match time {
                Some(t) => super::serialize(t, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveTime>, D::Error> {
            let raw = Option::<String>::deserialize(deserializer)?;
            match raw {
                Some(raw) if !raw.trim().is_empty() => super::parse(&raw)
                    .map(Some)
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid time: {raw}"))),
                _ => Ok(None),
            }
        }
    }
}

/// A bookable interval on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Slot {
    pub id: i64,
    #[serde(with = "hhmm")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "09:00"))]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "09:30"))]
    pub end_time: NaiveTime,
    /// `"09:00 - 09:30"`
    pub time: String,
    /// `"9:00 AM - 9:30 AM"`
    pub formatted_time: String,
}

impl Slot {
    /// Returns `None` unless `start_time < end_time`.
    pub fn new(id: i64, start_time: NaiveTime, end_time: NaiveTime) -> Option<Self> {
        if start_time >= end_time {
            return None;
        }
        Some(Self {
            id,
            start_time,
            end_time,
            time: format!("{} - {}", start_time.format("%H:%M"), end_time.format("%H:%M")),
            formatted_time: format!("{} - {}", twelve_hour(start_time), twelve_hour(end_time)),
        })
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }
}

fn twelve_hour(time: NaiveTime) -> String {
    let (pm, hour) = time.hour12();
    format!("{}:{:02} {}", hour, time.minute(), if pm { "PM" } else { "AM" })
}

/// Formatted availability of one agent for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MonthSchedule {
    pub month: u32,
    pub year: i32,
    /// Month of the reference date the schedule was formatted against.
    pub current_month_number: u32,
    pub current_year: i32,
    pub days_with_slots: BTreeMap<u32, Vec<Slot>>,
    pub availability_types: Vec<MeetingType>,
}

impl MonthSchedule {
    pub fn empty(month: u32, year: i32, reference: NaiveDate) -> Self {
        use chrono::Datelike;
        Self {
            month,
            year,
            current_month_number: reference.month(),
            current_year: reference.year(),
            days_with_slots: BTreeMap::new(),
            availability_types: Vec::new(),
        }
    }

    pub fn covers(&self, month: u32, year: i32) -> bool {
        self.month == month && self.year == year
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Rescheduled,
    Cancelled,
    AutoCancelled,
    Completed,
    Rejected,
    /// Legacy value still sent by older admin panels.
    Approved,
}

impl AppointmentStatus {
    /// No lifecycle action is offered once an appointment reaches one of these.
    pub fn is_closed(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Cancelled
                | AppointmentStatus::AutoCancelled
                | AppointmentStatus::Completed
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Rescheduled => "rescheduled",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::AutoCancelled => "auto_cancelled",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Rejected => "rejected",
            AppointmentStatus::Approved => "approved",
        }
    }
}

/// Which side of an appointment the caller is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    User,
    Agent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Property {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub slug_id: Option<String>,
    #[serde(default)]
    pub title_image: Option<String>,
    #[serde(default)]
    pub agent_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Party {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub profile: Option<String>,
}

/// An appointment as returned by the marketplace API. Only the API mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Appointment {
    pub id: i64,
    pub status: AppointmentStatus,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = Date))]
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub start_at: NaiveTime,
    #[serde(with = "hhmm")]
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub end_at: NaiveTime,
    #[serde(default)]
    pub meeting_type: Option<MeetingType>,
    /// Capability string of the agent, e.g. `"virtual,phone"`.
    #[serde(default)]
    pub available_meeting_types: Option<String>,
    #[serde(default)]
    pub property: Option<Property>,
    #[serde(default)]
    pub user: Option<Party>,
    #[serde(default)]
    pub agent: Option<Party>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl Appointment {
    pub fn agent_id(&self) -> Option<i64> {
        self.agent
            .as_ref()
            .map(|a| a.id)
            .or_else(|| self.property.as_ref().and_then(|p| p.agent_id))
    }

    pub fn meeting_type_options(&self) -> Vec<MeetingType> {
        self.available_meeting_types
            .as_deref()
            .map(MeetingType::parse_list)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_slot_requires_start_before_end() {
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let half_past = NaiveTime::from_hms_opt(9, 30, 0).unwrap();
        assert!(Slot::new(1, half_past, nine).is_none());
        assert!(Slot::new(1, nine, nine).is_none());

        let slot = Slot::new(1, nine, half_past).unwrap();
        assert_eq!(slot.time, "09:00 - 09:30");
        assert_eq!(slot.formatted_time, "9:00 AM - 9:30 AM");
        assert_eq!(slot.duration_minutes(), 30);
    }

    #[test]
    fn test_afternoon_slot_formatting() {
        let slot = Slot::new(
            2,
            NaiveTime::from_hms_opt(12, 15, 0).unwrap(),
            NaiveTime::from_hms_opt(13, 0, 0).unwrap(),
        )
        .unwrap();
        assert_eq!(slot.formatted_time, "12:15 PM - 1:00 PM");
    }

    #[test]
    fn test_appointment_deserializes_from_api_shape() {
        let appointment: Appointment = serde_json::from_value(json!({
            "id": 41,
            "status": "auto_cancelled",
            "date": "2024-06-10",
            "start_at": "09:00:00",
            "end_at": "09:30:00",
            "meeting_type": "in_person",
            "available_meeting_types": "virtual,in_person",
            "agent": {"id": 7, "name": "Asha"}
        }))
        .unwrap();

        assert_eq!(appointment.status, AppointmentStatus::AutoCancelled);
        assert!(appointment.status.is_closed());
        assert_eq!(appointment.agent_id(), Some(7));
        assert_eq!(
            appointment.meeting_type_options(),
            vec![MeetingType::Virtual, MeetingType::InPerson]
        );
        assert_eq!(
            serde_json::to_value(&appointment).unwrap()["start_at"],
            json!("09:00")
        );
    }
}
