// --- File: crates/estately_appointments/src/routes.rs ---

use axum::{
    routing::{get, post},
    Router,
};
use estately_common::services::{CatalogTranslator, StaticSession, TracingNotifier};
use estately_common::{config_error, EstatelyError};
use estately_config::AppConfig;
use std::sync::Arc;

use crate::client::HttpMarketplaceApi;
use crate::context::SchedulingContext;
use crate::handlers::{
    accept_appointment_handler, agent_properties_handler, book_appointment_handler,
    calendar_handler, cancel_appointment_handler, change_meeting_type_handler,
    list_appointments_handler, report_user_handler, reschedule_appointment_handler,
    slots_handler, AppointmentsState,
};

/// Creates the appointment routes backed by the configured marketplace API.
///
/// Fails when the `marketplace` section is missing or its base URL is invalid.
pub fn routes(config: Arc<AppConfig>) -> Result<Router, EstatelyError> {
    let marketplace = config
        .marketplace
        .as_ref()
        .ok_or_else(|| config_error("Marketplace configuration missing"))?;
    let session = Arc::new(StaticSession::new(marketplace.access_token.clone()));
    let api = HttpMarketplaceApi::from_config(marketplace, session)?;
    let ctx = SchedulingContext::new(
        Arc::new(api),
        Arc::new(CatalogTranslator::english()),
        Arc::new(TracingNotifier),
    )
    .with_scheduling_config(config.scheduling.as_ref());
    Ok(routes_with_context(ctx))
}

/// The same routes over an already assembled context.
pub fn routes_with_context(ctx: SchedulingContext) -> Router {
    let state = Arc::new(AppointmentsState { ctx });

    Router::new()
        .route("/appointments", get(list_appointments_handler))
        .route("/appointments/calendar", get(calendar_handler))
        .route("/appointments/slots", get(slots_handler))
        .route("/appointments/book", post(book_appointment_handler))
        .route("/appointments/{id}/cancel", post(cancel_appointment_handler))
        .route("/appointments/{id}/accept", post(accept_appointment_handler))
        .route(
            "/appointments/{id}/reschedule",
            post(reschedule_appointment_handler),
        )
        .route(
            "/appointments/{id}/meeting-type",
            post(change_meeting_type_handler),
        )
        .route("/agents/{agent_id}/properties", get(agent_properties_handler))
        .route("/users/{user_id}/report", post(report_user_handler))
        .with_state(state)
}
