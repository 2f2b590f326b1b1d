// File: crates/estately_appointments/src/doc.rs

#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::api::{ActionOutcome, BookingConfirmation, DateFilter};
use crate::calendar::{CalendarDay, CalendarGrid};
use crate::handlers::{
    AcceptRequest, AppointmentListItem, AppointmentListResponse, BookRequest, CalendarResponse,
    CancelRequest, MeetingTypeChangeRequest, MeetingTypeView, ReportRequest, RescheduleRequest,
    SlotsResponse,
};
use crate::lifecycle::AvailableActions;
use crate::meeting_type::MeetingType;
use crate::models::{Appointment, AppointmentStatus, Party, Property, Role, Slot};
use crate::slots::SlotPrompt;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::calendar_handler,
        crate::handlers::slots_handler,
        crate::handlers::agent_properties_handler,
        crate::handlers::book_appointment_handler,
        crate::handlers::cancel_appointment_handler,
        crate::handlers::accept_appointment_handler,
        crate::handlers::reschedule_appointment_handler,
        crate::handlers::change_meeting_type_handler,
        crate::handlers::list_appointments_handler,
        crate::handlers::report_user_handler
    ),
    components(
        schemas(
            CalendarResponse,
            CalendarGrid,
            CalendarDay,
            MeetingTypeView,
            MeetingType,
            SlotPrompt,
            Slot,
            SlotsResponse,
            Property,
            Party,
            BookRequest,
            BookingConfirmation,
            CancelRequest,
            AcceptRequest,
            RescheduleRequest,
            MeetingTypeChangeRequest,
            ActionOutcome,
            Appointment,
            AppointmentStatus,
            AvailableActions,
            AppointmentListItem,
            AppointmentListResponse,
            DateFilter,
            Role,
            ReportRequest
        )
    ),
    tags(
        (name = "Appointments", description = "Property viewing appointments")
    ),
    servers(
        (url = "/api", description = "Estately API server")
    )
)]
pub struct AppointmentsApiDoc;
