// --- File: crates/estately_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

// --- Marketplace API Config ---
// The access token is usually set to "secret_from_env" and injected from MARKETPLACE_ACCESS_TOKEN.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MarketplaceConfig {
    pub base_url: String, // Mandatory, e.g. https://admin.example.com/api/
    pub timeout_secs: Option<u64>,
    pub access_token: Option<String>,
}

// --- Scheduling Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct SchedulingConfig {
    /// IANA time zone used to decide what "today" is, e.g. "Asia/Kolkata".
    pub time_zone: Option<String>,
    /// First column of the calendar grid: "Sun" or "Mon".
    pub week_starts_on: Option<String>,
    /// Comma-separated meeting types offered when an agent does not send any.
    pub default_meeting_types: Option<String>,
    /// Page size for appointment lists.
    pub page_limit: Option<u32>,
}

// --- Logging Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct LoggingConfig {
    pub level: Option<String>,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<String>,
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_appointments: bool,

    // --- Optional Feature Configurations ---
    #[serde(default)]
    pub marketplace: Option<MarketplaceConfig>,
    #[serde(default)]
    pub scheduling: Option<SchedulingConfig>,
    #[serde(default)]
    pub logging: Option<LoggingConfig>,
}
