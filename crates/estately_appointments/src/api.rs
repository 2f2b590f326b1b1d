// --- File: crates/estately_appointments/src/api.rs ---
//! The remote marketplace API as seen by the scheduling core.
//!
//! The trait is object safe so callers hold an `Arc<dyn MarketplaceApi>`; the
//! reqwest implementation lives in [`crate::client`].

use chrono::{NaiveDate, NaiveTime};
use estately_common::services::BoxFuture;
use estately_common::EstatelyError;
use serde::{Deserialize, Serialize};

use crate::meeting_type::MeetingType;
use crate::models::{hhmm, Appointment, AppointmentStatus, Property};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthScheduleQuery {
    pub month: u32,
    pub year: i32,
    pub agent_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityCheck {
    pub agent_id: i64,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AvailabilityResult {
    pub available: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub property_id: i64,
    pub agent_id: i64,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub meeting_type: MeetingType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BookingConfirmation {
    #[serde(default)]
    pub appointment_id: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of `update-appointment-status`. Only the fields a transition needs are sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub appointment_id: i64,
    pub status: AppointmentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(
        default,
        with = "hhmm::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_time: Option<NaiveTime>,
    #[serde(
        default,
        with = "hhmm::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_time: Option<NaiveTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_type: Option<MeetingType>,
}

impl StatusUpdate {
    fn bare(appointment_id: i64, status: AppointmentStatus) -> Self {
        Self {
            appointment_id,
            status,
            reason: None,
            date: None,
            start_time: None,
            end_time: None,
            meeting_type: None,
        }
    }

    pub fn cancel(appointment_id: i64, reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
            ..Self::bare(appointment_id, AppointmentStatus::Cancelled)
        }
    }

    pub fn accept(appointment_id: i64) -> Self {
        Self::bare(appointment_id, AppointmentStatus::Confirmed)
    }

    pub fn reschedule(
        appointment_id: i64,
        reason: impl Into<String>,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
        meeting_type: MeetingType,
    ) -> Self {
        Self {
            reason: Some(reason.into()),
            date: Some(date),
            start_time: Some(start_time),
            end_time: Some(end_time),
            meeting_type: Some(meeting_type),
            ..Self::bare(appointment_id, AppointmentStatus::Rescheduled)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingTypeUpdate {
    pub appointment_id: i64,
    pub meeting_type: MeetingType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum DateFilter {
    #[default]
    All,
    Upcoming,
    Previous,
    Today,
}

impl DateFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateFilter::All => "all",
            DateFilter::Upcoming => "upcoming",
            DateFilter::Previous => "previous",
            DateFilter::Today => "today",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentListQuery {
    pub offset: u32,
    pub limit: u32,
    #[serde(default)]
    pub date_filter: DateFilter,
}

impl AppointmentListQuery {
    pub const DEFAULT_LIMIT: u32 = 10;
}

impl Default for AppointmentListQuery {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: Self::DEFAULT_LIMIT,
            date_filter: DateFilter::All,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AppointmentPage {
    pub items: Vec<Appointment>,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportUserRequest {
    pub user_id: i64,
    pub reason: String,
}

/// What a mutating call returns: the server's message, if any.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ActionOutcome {
    #[serde(default)]
    pub message: Option<String>,
}

/// Every marketplace endpoint the scheduling core calls.
pub trait MarketplaceApi: Send + Sync {
    fn get_agent_properties(&self, agent_id: i64) -> BoxFuture<'_, Vec<Property>, EstatelyError>;

    /// Returns the raw `data` payload; see [`crate::availability::format_appointment_data`].
    fn get_month_wise_time_schedules(
        &self,
        query: MonthScheduleQuery,
    ) -> BoxFuture<'_, serde_json::Value, EstatelyError>;

    fn check_agent_booking_availability(
        &self,
        check: AvailabilityCheck,
    ) -> BoxFuture<'_, AvailabilityResult, EstatelyError>;

    fn book_appointment(
        &self,
        request: BookAppointmentRequest,
    ) -> BoxFuture<'_, BookingConfirmation, EstatelyError>;

    fn update_appointment_status(
        &self,
        update: StatusUpdate,
    ) -> BoxFuture<'_, ActionOutcome, EstatelyError>;

    fn update_meeting_type(
        &self,
        update: MeetingTypeUpdate,
    ) -> BoxFuture<'_, ActionOutcome, EstatelyError>;

    fn get_user_appointments(
        &self,
        query: AppointmentListQuery,
    ) -> BoxFuture<'_, AppointmentPage, EstatelyError>;

    fn get_agent_appointments(
        &self,
        query: AppointmentListQuery,
    ) -> BoxFuture<'_, AppointmentPage, EstatelyError>;

    fn report_user(&self, request: ReportUserRequest) -> BoxFuture<'_, ActionOutcome, EstatelyError>;
}
