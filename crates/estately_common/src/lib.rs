// Declare modules within this crate
pub mod error; // Error handling
pub mod features; // Feature flag handling
pub mod http; // HTTP utilities
pub mod logging; // Logging utilities
pub mod models; // API envelope
pub mod routes; // Route definitions
pub mod services; // Capability traits

// Re-export the routes function to be used by the main backend service
pub use routes::routes;

// Re-export error types and utilities for easier access
pub use error::{
    api_error, config_error, conflict, external_service_error, internal_error, not_found,
    validation_error, Context, EstatelyError, HttpStatusCode,
};

// Re-export HTTP utilities for easier access
pub use http::{
    client::{create_client, default_client},
    handle_json_result, map_json_error, IntoHttpResponse,
};

pub use features::{is_appointments_enabled, is_feature_enabled};
