// --- File: crates/estately_appointments/src/handlers.rs ---
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use chrono::{NaiveDate, NaiveTime};
use estately_common::{validation_error, EstatelyError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use crate::api::{ActionOutcome, AppointmentListQuery, BookingConfirmation, DateFilter};
use crate::calendar::{CalendarGrid, YearMonth};
use crate::context::SchedulingContext;
use crate::lifecycle::{reschedule_update, ActionError, ActionTarget, AppointmentActions, AvailableActions};
use crate::listing::fetch_page;
use crate::meeting_type::MeetingType;
use crate::models::{hhmm, Appointment, AppointmentStatus, Property, Role, Slot};
use crate::picker::SchedulePicker;
use crate::report::report_user;
use crate::schedule_loader::ScheduleLoader;
use crate::slots::{slot_prompt, SlotPrompt};
use crate::wizard::{submit_booking, to_confirm, BookingDraft, WizardError};

// Shared state for the appointment handlers
#[derive(Clone)]
pub struct AppointmentsState {
    pub ctx: SchedulingContext,
}

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct CalendarQuery {
    pub agent_id: i64,
    /// Defaults to the current month when year and month are both omitted.
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub selected_day: Option<u32>,
}

/// A meeting type with its translated label.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MeetingTypeView {
    pub value: MeetingType,
    pub label: String,
    pub icon: &'static str,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CalendarResponse {
    pub grid: CalendarGrid,
    pub available_dates: Vec<u32>,
    pub meeting_types: Vec<MeetingTypeView>,
    pub can_navigate_back: bool,
    pub prompt: SlotPrompt,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct SlotsQuery {
    pub agent_id: i64,
    pub year: i32,
    pub month: u32,
    pub day: Option<u32>,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SlotsResponse {
    pub prompt: SlotPrompt,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BookRequest {
    pub property_id: i64,
    pub agent_id: i64,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = Date, example = "2024-06-10"))]
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "09:00"))]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "09:30"))]
    pub end_time: NaiveTime,
    pub meeting_type: Option<MeetingType>,
    #[serde(default)]
    pub notes: String,
}

/// The appointment's status as the caller last saw it; the action guards run against it.
#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CancelRequest {
    pub status: AppointmentStatus,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AcceptRequest {
    pub status: AppointmentStatus,
}

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RescheduleRequest {
    pub status: AppointmentStatus,
    #[serde(default)]
    pub reason: String,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = Date))]
    pub date: Option<NaiveDate>,
    #[serde(default, with = "hhmm::option")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, example = "14:00"))]
    pub start_time: Option<NaiveTime>,
    #[serde(default, with = "hhmm::option")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, example = "14:30"))]
    pub end_time: Option<NaiveTime>,
    pub meeting_type: Option<MeetingType>,
}

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MeetingTypeChangeRequest {
    pub status: AppointmentStatus,
    pub current_meeting_type: Option<MeetingType>,
    /// Capability string of the agent, e.g. `"virtual,phone"`.
    pub available_meeting_types: String,
    pub meeting_type: MeetingType,
}

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct ListQuery {
    #[serde(default)]
    pub role: Role,
    pub offset: Option<u32>,
    pub limit: Option<u32>,
    #[serde(default)]
    pub date_filter: DateFilter,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AppointmentListItem {
    pub appointment: Appointment,
    pub actions: AvailableActions,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AppointmentListResponse {
    pub items: Vec<AppointmentListItem>,
    pub total: u64,
    pub offset: u32,
    pub limit: u32,
    pub has_more: bool,
}

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReportRequest {
    #[serde(default)]
    pub reason: String,
}

fn requested_month(today: NaiveDate, year: Option<i32>, month: Option<u32>) -> Result<YearMonth, EstatelyError> {
    match (year, month) {
        (None, None) => Ok(YearMonth::from_date(today)),
        (Some(year), Some(month)) => YearMonth::new(year, month)
            .ok_or_else(|| validation_error(format!("Invalid month {}/{}", month, year))),
        _ => Err(validation_error("year and month must be given together")),
    }
}

/// A picker showing `month` with the agent's schedule applied.
async fn load_picker(
    ctx: &SchedulingContext,
    agent_id: i64,
    month: YearMonth,
) -> Result<SchedulePicker, EstatelyError> {
    let today = ctx.settings.today();
    let mut picker = SchedulePicker::new(agent_id, today, ctx.default_meeting_types.clone());
    picker.show_month(month, today).map_err(validation_error)?;
    let loader = ScheduleLoader::new(ctx.api.clone());
    if let Some(schedule) = loader.fetch(agent_id, month, today).await? {
        picker.apply_schedule(schedule);
    }
    Ok(picker)
}

fn wizard_failure(ctx: &SchedulingContext, e: WizardError) -> EstatelyError {
    error!("Booking request failed: {}", e);
    e.into_estately(ctx.translator.as_ref())
}

fn action_failure(ctx: &SchedulingContext, e: ActionError) -> EstatelyError {
    e.into_estately(ctx.translator.as_ref())
}

/// Calendar grid, available days and meeting types of an agent for one month.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/appointments/calendar",
    params(CalendarQuery),
    responses(
        (status = 200, description = "Calendar for the requested month", body = CalendarResponse),
        (status = 400, description = "Invalid or past month, or unavailable day"),
        (status = 502, description = "Marketplace unreachable")
    ),
    tag = "Appointments"
))]
pub async fn calendar_handler(
    State(state): State<Arc<AppointmentsState>>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<CalendarResponse>, EstatelyError> {
    let ctx = &state.ctx;
    let today = ctx.settings.today();
    let month = requested_month(today, query.year, query.month)?;
    let mut picker = load_picker(ctx, query.agent_id, month).await?;

    if let Some(day) = query.selected_day {
        picker
            .select_day(day)
            .map_err(|e| WizardError::from(e).into_estately(ctx.translator.as_ref()))?;
    }

    let prompt = picker.prompt();
    let meeting_types = picker
        .meeting_type_options()
        .iter()
        .map(|option| MeetingTypeView {
            value: option.value,
            label: ctx.t(option.label_key),
            icon: option.icon,
        })
        .collect();
    Ok(Json(CalendarResponse {
        grid: picker.grid(ctx.settings.week_start),
        available_dates: picker.available_dates(),
        meeting_types,
        can_navigate_back: picker.can_go_back(today),
        message: prompt.message_key().map(|key| ctx.t(key)),
        prompt,
    }))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/appointments/slots",
    params(SlotsQuery),
    responses(
        (status = 200, description = "Slots of the requested day", body = SlotsResponse),
        (status = 400, description = "Invalid or past month")
    ),
    tag = "Appointments"
))]
pub async fn slots_handler(
    State(state): State<Arc<AppointmentsState>>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<SlotsResponse>, EstatelyError> {
    let ctx = &state.ctx;
    let month = requested_month(ctx.settings.today(), Some(query.year), Some(query.month))?;
    let picker = load_picker(ctx, query.agent_id, month).await?;
    let prompt = slot_prompt(picker.schedule(), query.day, month.month(), month.year());
    Ok(Json(SlotsResponse {
        message: prompt.message_key().map(|key| ctx.t(key)),
        prompt,
    }))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/agents/{agent_id}/properties",
    params(("agent_id" = i64, Path, description = "Agent whose properties can be booked")),
    responses(
        (status = 200, description = "Bookable properties", body = [Property]),
        (status = 502, description = "Marketplace unreachable")
    ),
    tag = "Appointments"
))]
pub async fn agent_properties_handler(
    State(state): State<Arc<AppointmentsState>>,
    Path(agent_id): Path<i64>,
) -> Result<Json<Vec<Property>>, EstatelyError> {
    let properties = state.ctx.api.get_agent_properties(agent_id).await?;
    Ok(Json(properties))
}

/// Checks the agent's availability, then books.
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/appointments/book",
    request_body = BookRequest,
    responses(
        (status = 200, description = "Appointment requested", body = BookingConfirmation),
        (status = 400, description = "Missing or invalid selection"),
        (status = 409, description = "Agent not available at that time"),
        (status = 422, description = "Rejected by the marketplace")
    ),
    tag = "Appointments"
))]
pub async fn book_appointment_handler(
    State(state): State<Arc<AppointmentsState>>,
    Json(request): Json<BookRequest>,
) -> Result<Json<BookingConfirmation>, EstatelyError> {
    let ctx = &state.ctx;
    let draft = BookingDraft {
        selected_property: Some(Property {
            id: request.property_id,
            title: String::new(),
            slug_id: None,
            title_image: None,
            agent_id: Some(request.agent_id),
        }),
        selected_date: Some(request.date),
        selected_time_slot: Slot::new(0, request.start_time, request.end_time),
        selected_meeting_type: request.meeting_type,
        meeting_notes: request.notes,
    };
    let booking = to_confirm(&draft, request.agent_id).map_err(|e| wizard_failure(ctx, e))?;
    let confirmation = submit_booking(ctx.api.as_ref(), &booking)
        .await
        .map_err(|e| wizard_failure(ctx, e))?;
    info!(
        "Appointment {:?} requested for property {}",
        confirmation.appointment_id, request.property_id
    );
    ctx.notify_success(confirmation.message.as_deref(), "appointmentBooked");
    Ok(Json(confirmation))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/appointments/{id}/cancel",
    params(("id" = i64, Path, description = "Appointment ID")),
    request_body = CancelRequest,
    responses(
        (status = 200, description = "Appointment cancelled", body = ActionOutcome),
        (status = 400, description = "Reason missing"),
        (status = 409, description = "Appointment can no longer be cancelled")
    ),
    tag = "Appointments"
))]
pub async fn cancel_appointment_handler(
    State(state): State<Arc<AppointmentsState>>,
    Path(id): Path<i64>,
    Json(request): Json<CancelRequest>,
) -> Result<Json<ActionOutcome>, EstatelyError> {
    let ctx = &state.ctx;
    let target = ActionTarget {
        id,
        status: request.status,
        meeting_type: None,
        meeting_types: Vec::new(),
    };
    AppointmentActions::new(ctx.clone())
        .cancel(target, &request.reason, || {})
        .await
        .map(Json)
        .map_err(|e| action_failure(ctx, e))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/appointments/{id}/accept",
    params(("id" = i64, Path, description = "Appointment ID")),
    request_body = AcceptRequest,
    responses(
        (status = 200, description = "Appointment confirmed", body = ActionOutcome),
        (status = 409, description = "Appointment cannot be accepted")
    ),
    tag = "Appointments"
))]
pub async fn accept_appointment_handler(
    State(state): State<Arc<AppointmentsState>>,
    Path(id): Path<i64>,
    Json(request): Json<AcceptRequest>,
) -> Result<Json<ActionOutcome>, EstatelyError> {
    let ctx = &state.ctx;
    let target = ActionTarget {
        id,
        status: request.status,
        meeting_type: None,
        meeting_types: Vec::new(),
    };
    AppointmentActions::new(ctx.clone())
        .accept(target, Role::Agent, || {})
        .await
        .map(Json)
        .map_err(|e| action_failure(ctx, e))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/appointments/{id}/reschedule",
    params(("id" = i64, Path, description = "Appointment ID")),
    request_body = RescheduleRequest,
    responses(
        (status = 200, description = "Appointment rescheduled", body = ActionOutcome),
        (status = 400, description = "Reason, date, slot or meeting type missing"),
        (status = 409, description = "Appointment is closed")
    ),
    tag = "Appointments"
))]
pub async fn reschedule_appointment_handler(
    State(state): State<Arc<AppointmentsState>>,
    Path(id): Path<i64>,
    Json(request): Json<RescheduleRequest>,
) -> Result<Json<ActionOutcome>, EstatelyError> {
    let ctx = &state.ctx;
    if request.status.is_closed() {
        return Err(action_failure(ctx, ActionError::NotAllowed(request.status)));
    }
    let slot = match (request.start_time, request.end_time) {
        (Some(start), Some(end)) => Slot::new(0, start, end),
        _ => None,
    };
    let update = reschedule_update(
        id,
        &request.reason,
        request.date,
        slot.as_ref(),
        request.meeting_type,
    )
    .map_err(|e| action_failure(ctx, e))?;
    AppointmentActions::new(ctx.clone())
        .apply(update, "appointmentRescheduled", || {})
        .await
        .map(Json)
        .map_err(|e| action_failure(ctx, e))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/appointments/{id}/meeting-type",
    params(("id" = i64, Path, description = "Appointment ID")),
    request_body = MeetingTypeChangeRequest,
    responses(
        (status = 200, description = "Meeting type changed", body = ActionOutcome),
        (status = 400, description = "Meeting type not offered or unchanged"),
        (status = 409, description = "Appointment is closed")
    ),
    tag = "Appointments"
))]
pub async fn change_meeting_type_handler(
    State(state): State<Arc<AppointmentsState>>,
    Path(id): Path<i64>,
    Json(request): Json<MeetingTypeChangeRequest>,
) -> Result<Json<ActionOutcome>, EstatelyError> {
    let ctx = &state.ctx;
    let target = ActionTarget {
        id,
        status: request.status,
        meeting_type: request.current_meeting_type,
        meeting_types: MeetingType::parse_list(&request.available_meeting_types),
    };
    AppointmentActions::new(ctx.clone())
        .change_meeting_type(target, request.meeting_type, || {})
        .await
        .map(Json)
        .map_err(|e| action_failure(ctx, e))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/appointments",
    params(ListQuery),
    responses(
        (status = 200, description = "One page of appointments", body = AppointmentListResponse),
        (status = 502, description = "Marketplace unreachable")
    ),
    tag = "Appointments"
))]
pub async fn list_appointments_handler(
    State(state): State<Arc<AppointmentsState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<AppointmentListResponse>, EstatelyError> {
    let ctx = &state.ctx;
    let page_query = AppointmentListQuery {
        offset: query.offset.unwrap_or(0),
        limit: query.limit.filter(|l| *l > 0).unwrap_or(ctx.page_limit),
        date_filter: query.date_filter,
    };
    let page = fetch_page(ctx.api.as_ref(), query.role, page_query).await?;
    let has_more = u64::from(page_query.offset) + u64::from(page_query.limit) < page.total;
    let items = page
        .items
        .into_iter()
        .map(|appointment| AppointmentListItem {
            actions: AvailableActions::for_appointment(&appointment, query.role),
            appointment,
        })
        .collect();
    Ok(Json(AppointmentListResponse {
        items,
        total: page.total,
        offset: page_query.offset,
        limit: page_query.limit,
        has_more,
    }))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/users/{user_id}/report",
    params(("user_id" = i64, Path, description = "User to report")),
    request_body = ReportRequest,
    responses(
        (status = 200, description = "User reported", body = ActionOutcome),
        (status = 400, description = "Reason missing")
    ),
    tag = "Appointments"
))]
pub async fn report_user_handler(
    State(state): State<Arc<AppointmentsState>>,
    Path(user_id): Path<i64>,
    Json(request): Json<ReportRequest>,
) -> Result<Json<ActionOutcome>, EstatelyError> {
    let ctx = &state.ctx;
    report_user(ctx, user_id, &request.reason)
        .await
        .map(Json)
        .map_err(|e| action_failure(ctx, e))
}
