// File: services/estately_backend/src/main.rs
use axum::{routing::get, Router};
#[cfg(feature = "appointments")]
use estately_appointments::routes as appointment_routes;
use estately_common::logging;
use estately_config::load_config;
use std::error::Error;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = Arc::new(load_config()?);
    // Dropping the guard would lose buffered file output
    let _log_guard = logging::init_from_config(config.logging.as_ref());

    #[allow(unused_mut)] // for the features it needs to be mutable
    let mut router = Router::new()
        .route("/", get(|| async { "Welcome to the Estately API!" }))
        .merge(estately_common::routes());

    #[cfg(feature = "appointments")]
    {
        if estately_common::is_appointments_enabled(&config) {
            router = router.merge(appointment_routes::routes(config.clone())?);
            info!("Appointment endpoints enabled");
        } else {
            warn!("Appointments disabled: set use_appointments and the [marketplace] section");
        }
    }

    let mut app = Router::new().nest("/api", router);

    // Conditionally add Swagger UI and JSON endpoint if openapi feature enabled
    #[cfg(feature = "openapi")]
    {
        #[cfg(feature = "appointments")]
        use estately_appointments::doc::AppointmentsApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "Estately API",
                version = "0.1.0",
                description = "Estately appointment scheduling API",
                license(name = "MIT", url = "https://opensource.org/licenses/MIT")
            ),
            components(),
            tags( (name = "Estately", description = "Core service endpoints")),
            servers( (url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        #[allow(unused_mut)] // for the features it needs to be mutable
        let mut openapi_doc = ApiDoc::openapi();
        #[cfg(feature = "appointments")]
        openapi_doc.merge(AppointmentsApiDoc::openapi());
        info!("Adding Swagger UI at /api/docs");

        let swagger_ui = SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc);
        app = app.merge(swagger_ui);
    }

    let app = app
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
