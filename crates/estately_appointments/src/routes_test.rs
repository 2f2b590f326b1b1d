#[cfg(test)]
mod tests {
    use crate::api::mock::{Call, MockMarketplaceApi};
    use crate::api::AppointmentPage;
    use crate::context::mock::{test_context, RecordingNotifier};
    use crate::models::{Appointment, AppointmentStatus};
    use crate::routes::{routes, routes_with_context};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use chrono::{NaiveDate, NaiveTime};
    use estately_config::{AppConfig, MarketplaceConfig, ServerConfig};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    fn june_schedule() -> Value {
        json!({
            "month": 6,
            "year": 2024,
            "availability_types": "virtual,phone",
            "days": {
                "5": [{"id": 1, "start_time": "09:00", "end_time": "09:30"}],
                "12": [{"id": 2, "start_time": "10:00", "end_time": "10:30"}],
                "20": [{"id": 3, "start_time": "15:00", "end_time": "15:30"}]
            }
        })
    }

    fn app(api: &Arc<MockMarketplaceApi>) -> Router {
        routes_with_context(test_context(
            api.clone(),
            Arc::new(RecordingNotifier::default()),
            today(),
        ))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_calendar_marks_available_days() {
        let api = Arc::new(MockMarketplaceApi::new().with_schedule(6, 2024, june_schedule()));

        let (status, body) = send(
            app(&api),
            get("/appointments/calendar?agent_id=7&year=2024&month=6"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["available_dates"], json!([5, 12, 20]));
        assert_eq!(body["grid"]["cells"].as_array().unwrap().len(), 42);
        assert_eq!(body["can_navigate_back"], false);
        assert_eq!(body["prompt"]["state"], "pick_date");
        assert_eq!(body["message"], "Pick a date to see available time slots");
        let labels: Vec<&str> = body["meeting_types"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["label"].as_str().unwrap())
            .collect();
        assert_eq!(labels, vec!["Virtual", "Phone"]);
    }

    #[tokio::test]
    async fn test_calendar_rejects_past_month_without_fetching() {
        let api = Arc::new(MockMarketplaceApi::new());

        let (status, _) = send(
            app(&api),
            get("/appointments/calendar?agent_id=7&year=2024&month=5"),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_calendar_with_unavailable_selected_day() {
        let api = Arc::new(MockMarketplaceApi::new().with_schedule(6, 2024, june_schedule()));

        let (status, body) = send(
            app(&api),
            get("/appointments/calendar?agent_id=7&year=2024&month=6&selected_day=6"),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Validation error: Please select a date");
    }

    #[tokio::test]
    async fn test_slots_prompt_states() {
        let api = Arc::new(MockMarketplaceApi::new().with_schedule(6, 2024, june_schedule()));

        let (_, body) = send(app(&api), get("/appointments/slots?agent_id=7&year=2024&month=6&day=12")).await;
        assert_eq!(body["prompt"]["state"], "slots");
        assert_eq!(body["prompt"]["slots"][0]["time"], "10:00 - 10:30");
        assert!(body.get("message").is_none());

        let (_, body) = send(app(&api), get("/appointments/slots?agent_id=7&year=2024&month=6&day=13")).await;
        assert_eq!(body["prompt"]["state"], "no_slots");
        assert_eq!(body["message"], "No slots available, please pick another date");
    }

    #[tokio::test]
    async fn test_book_checks_availability_first() {
        let api = Arc::new(MockMarketplaceApi::new());
        let request = json!({
            "property_id": 8,
            "agent_id": 7,
            "date": "2024-06-10",
            "start_time": "09:00",
            "end_time": "09:30",
            "meeting_type": "virtual"
        });

        let (status, body) = send(app(&api), post("/appointments/book", request.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["appointment_id"], 501);
        assert!(matches!(api.calls()[0], Call::Availability(_)));
        assert_eq!(api.bookings().len(), 1);

        api.set_available(false);
        let (status, body) = send(app(&api), post("/appointments/book", request)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["message"], "Conflict: Agent is busy at that time");
        assert_eq!(api.bookings().len(), 1);
    }

    #[tokio::test]
    async fn test_book_without_meeting_type_is_rejected() {
        let api = Arc::new(MockMarketplaceApi::new());
        let request = json!({
            "property_id": 8,
            "agent_id": 7,
            "date": "2024-06-10",
            "start_time": "09:00",
            "end_time": "09:30"
        });

        let (status, body) = send(app(&api), post("/appointments/book", request)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Validation error: Please select a meeting type");
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_requires_reason() {
        let api = Arc::new(MockMarketplaceApi::new());

        let (status, _) = send(
            app(&api),
            post("/appointments/42/cancel", json!({"status": "pending", "reason": " "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(api.calls().is_empty());

        let (status, _) = send(
            app(&api),
            post("/appointments/42/cancel", json!({"status": "pending", "reason": "not needed"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let updates = api.status_updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].appointment_id, 42);
        assert_eq!(updates[0].status, AppointmentStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_closed_appointment_cannot_be_accepted() {
        let api = Arc::new(MockMarketplaceApi::new());

        let (status, _) = send(
            app(&api),
            post("/appointments/42/accept", json!({"status": "completed"})),
        )
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_reschedule_and_meeting_type_change() {
        let api = Arc::new(MockMarketplaceApi::new());

        let (status, _) = send(
            app(&api),
            post(
                "/appointments/42/reschedule",
                json!({
                    "status": "confirmed",
                    "reason": "clash",
                    "date": "2024-06-12",
                    "start_time": "10:00",
                    "end_time": "10:30",
                    "meeting_type": "phone"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let update = &api.status_updates()[0];
        assert_eq!(update.status, AppointmentStatus::Rescheduled);
        assert_eq!(update.start_time, NaiveTime::from_hms_opt(10, 0, 0));

        let (status, _) = send(
            app(&api),
            post(
                "/appointments/42/meeting-type",
                json!({
                    "status": "confirmed",
                    "current_meeting_type": "phone",
                    "available_meeting_types": "virtual,phone",
                    "meeting_type": "phone"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(api.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_list_pages_with_actions() {
        let api = Arc::new(MockMarketplaceApi::new());
        *api.appointments.lock().unwrap() = AppointmentPage {
            items: vec![Appointment {
                id: 1,
                status: AppointmentStatus::Pending,
                date: NaiveDate::from_ymd_opt(2024, 6, 5).unwrap(),
                start_at: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                end_at: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
                meeting_type: None,
                available_meeting_types: None,
                property: None,
                user: None,
                agent: None,
                reason: None,
            }],
            total: 11,
        };

        let (status, body) = send(
            app(&api),
            get("/appointments?role=agent&date_filter=upcoming"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 11);
        assert_eq!(body["limit"], 10);
        assert_eq!(body["has_more"], true);
        assert_eq!(body["items"][0]["actions"]["accept"], true);
        assert!(matches!(api.calls()[0], Call::AgentAppointments(_)));
    }

    #[test]
    fn test_routes_need_marketplace_config() {
        let config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            use_appointments: true,
            marketplace: None,
            scheduling: None,
            logging: None,
        };
        assert!(routes(Arc::new(config.clone())).is_err());

        let config = AppConfig {
            marketplace: Some(MarketplaceConfig {
                base_url: "https://admin.example.com/api".to_string(),
                timeout_secs: None,
                access_token: None,
            }),
            ..config
        };
        assert!(routes(Arc::new(config)).is_ok());
    }
}
