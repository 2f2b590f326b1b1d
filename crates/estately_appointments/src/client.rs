// --- File: crates/estately_appointments/src/client.rs ---
//! reqwest implementation of [`MarketplaceApi`].

use estately_common::create_client;
use estately_common::models::ApiEnvelope;
use estately_common::services::{BoxFuture, SessionProvider};
use estately_common::{config_error, EstatelyError};
use estately_config::MarketplaceConfig;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, instrument};
use uuid::Uuid;

use crate::api::{
    ActionOutcome, AppointmentListQuery, AppointmentPage, AvailabilityCheck, AvailabilityResult,
    BookAppointmentRequest, BookingConfirmation, MarketplaceApi, MeetingTypeUpdate,
    MonthScheduleQuery, ReportUserRequest, StatusUpdate,
};
use crate::models::{Appointment, Property};

const REQUEST_ID_HEADER: &str = "X-Request-Id";

pub struct HttpMarketplaceApi {
    client: Client,
    base_url: Url,
    session: Arc<dyn SessionProvider>,
}

#[derive(Serialize)]
struct AgentQuery {
    agent_id: i64,
}

/// `check-availability` answers either `data: true` or `data: {"available": true}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum AvailabilityData {
    Flag(bool),
    Object { available: bool },
}

impl HttpMarketplaceApi {
    pub fn new(client: Client, base_url: Url, session: Arc<dyn SessionProvider>) -> Self {
        Self {
            client,
            base_url,
            session,
        }
    }

    pub fn from_config(
        config: &MarketplaceConfig,
        session: Arc<dyn SessionProvider>,
    ) -> Result<Self, EstatelyError> {
        // Url::join drops the last path segment unless the base ends with '/'
        let mut base = config.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| config_error(format!("Invalid marketplace base_url {base:?}: {e}")))?;
        let timeout = config
            .timeout_secs
            .unwrap_or(estately_common::http::client::DEFAULT_TIMEOUT_SECS);
        let client = create_client(timeout, true)?;
        Ok(Self::new(client, base_url, session))
    }

    fn request(&self, method: Method, endpoint: &str) -> Result<RequestBuilder, EstatelyError> {
        let url = self
            .base_url
            .join(endpoint)
            .map_err(|e| config_error(format!("Invalid endpoint {endpoint}: {e}")))?;
        let mut builder = self
            .client
            .request(method, url)
            .header(REQUEST_ID_HEADER, Uuid::new_v4().to_string());
        if let Some(token) = self.session.access_token() {
            builder = builder.bearer_auth(token);
        }
        Ok(builder)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        builder: RequestBuilder,
    ) -> Result<ApiEnvelope<T>, EstatelyError> {
        let response = builder.send().await.map_err(|e| {
            error!("Request to {} failed: {}", endpoint, e);
            EstatelyError::from(e)
        })?;
        let status = response.status();
        let body = response.text().await?;
        debug!("{} answered {} ({} bytes)", endpoint, status, body.len());

        match serde_json::from_str::<ApiEnvelope<T>>(&body) {
            Ok(envelope) => Ok(envelope),
            Err(e) if status.is_success() => {
                error!("Could not decode {} response: {}", endpoint, e);
                Err(e.into())
            }
            Err(_) => Err(estately_common::external_service_error(
                "marketplace",
                format!("{endpoint} returned {status}"),
            )),
        }
    }

    async fn get<Q: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &Q,
    ) -> Result<ApiEnvelope<T>, EstatelyError> {
        let builder = self.request(Method::GET, endpoint)?.query(query);
        self.send(endpoint, builder).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<ApiEnvelope<T>, EstatelyError> {
        let builder = self.request(Method::POST, endpoint)?.json(body);
        self.send(endpoint, builder).await
    }

    async fn post_action<B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<ActionOutcome, EstatelyError> {
        let payload = self.post::<B, Value>(endpoint, body).await?.into_result()?;
        Ok(ActionOutcome {
            message: payload.message,
        })
    }

    async fn appointments(
        &self,
        endpoint: &str,
        query: AppointmentListQuery,
    ) -> Result<AppointmentPage, EstatelyError> {
        let payload = self
            .get::<_, Vec<Appointment>>(endpoint, &query)
            .await?
            .into_result()?;
        let items = payload.data.unwrap_or_default();
        let total = payload.total.unwrap_or(items.len() as u64);
        Ok(AppointmentPage { items, total })
    }
}

impl MarketplaceApi for HttpMarketplaceApi {
    #[instrument(skip(self))]
    fn get_agent_properties(&self, agent_id: i64) -> BoxFuture<'_, Vec<Property>, EstatelyError> {
        Box::pin(async move {
            let payload = self
                .get::<_, Vec<Property>>("get-agent-properties", &AgentQuery { agent_id })
                .await?
                .into_result()?;
            Ok(payload.data.unwrap_or_default())
        })
    }

    #[instrument(skip(self))]
    fn get_month_wise_time_schedules(
        &self,
        query: MonthScheduleQuery,
    ) -> BoxFuture<'_, Value, EstatelyError> {
        Box::pin(async move {
            let payload = self
                .get::<_, Value>("get-monthly-time-slots", &query)
                .await?
                .into_result()?;
            Ok(payload.data.unwrap_or(Value::Null))
        })
    }

    #[instrument(skip(self))]
    fn check_agent_booking_availability(
        &self,
        check: AvailabilityCheck,
    ) -> BoxFuture<'_, AvailabilityResult, EstatelyError> {
        Box::pin(async move {
            let payload = self
                .get::<_, AvailabilityData>("check-availability", &check)
                .await?
                .into_result()?;
            let available = match payload.data {
                Some(AvailabilityData::Flag(flag)) => flag,
                Some(AvailabilityData::Object { available }) => available,
                None => false,
            };
            Ok(AvailabilityResult {
                available,
                message: payload.message,
            })
        })
    }

    #[instrument(skip(self, request), fields(property_id = request.property_id))]
    fn book_appointment(
        &self,
        request: BookAppointmentRequest,
    ) -> BoxFuture<'_, BookingConfirmation, EstatelyError> {
        Box::pin(async move {
            let payload = self
                .post::<_, Value>("create-appointment-request", &request)
                .await?
                .into_result()?;
            let appointment_id = payload
                .data
                .as_ref()
                .and_then(|d| d.get("id").or_else(|| d.get("appointment_id")))
                .and_then(Value::as_i64);
            Ok(BookingConfirmation {
                appointment_id,
                message: payload.message,
            })
        })
    }

    #[instrument(skip(self))]
    fn update_appointment_status(
        &self,
        update: StatusUpdate,
    ) -> BoxFuture<'_, ActionOutcome, EstatelyError> {
        Box::pin(async move { self.post_action("update-appointment-status", &update).await })
    }

    #[instrument(skip(self))]
    fn update_meeting_type(
        &self,
        update: MeetingTypeUpdate,
    ) -> BoxFuture<'_, ActionOutcome, EstatelyError> {
        Box::pin(async move { self.post_action("update-meeting-type", &update).await })
    }

    #[instrument(skip(self))]
    fn get_user_appointments(
        &self,
        query: AppointmentListQuery,
    ) -> BoxFuture<'_, AppointmentPage, EstatelyError> {
        Box::pin(async move { self.appointments("get-user-appointments", query).await })
    }

    #[instrument(skip(self))]
    fn get_agent_appointments(
        &self,
        query: AppointmentListQuery,
    ) -> BoxFuture<'_, AppointmentPage, EstatelyError> {
        Box::pin(async move { self.appointments("get-agent-appointments", query).await })
    }

    #[instrument(skip(self, request), fields(user_id = request.user_id))]
    fn report_user(&self, request: ReportUserRequest) -> BoxFuture<'_, ActionOutcome, EstatelyError> {
        Box::pin(async move { self.post_action("report-user", &request).await })
    }
}
