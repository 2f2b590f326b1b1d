//! Runtime feature checks.
//!
//! A feature is on when its `use_*` flag is set and its config section is present.

use estately_config::AppConfig;

/// Check if a feature is enabled at runtime based on configuration.
pub fn is_feature_enabled<T>(use_feature: bool, feature_config: Option<&T>) -> bool {
    use_feature && feature_config.is_some()
}

/// The appointment endpoints need the marketplace API to be configured.
pub fn is_appointments_enabled(config: &AppConfig) -> bool {
    is_feature_enabled(config.use_appointments, config.marketplace.as_ref())
}
