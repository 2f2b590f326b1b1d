// --- File: crates/estately_appointments/src/context.rs ---
use estately_common::services::{Notifier, Translator};
use estately_config::SchedulingConfig;
use std::sync::Arc;

use crate::api::{AppointmentListQuery, MarketplaceApi};
use crate::calendar::CalendarSettings;
use crate::meeting_type::MeetingType;

/// Capabilities every scheduling flow needs, injected once at the root.
#[derive(Clone)]
pub struct SchedulingContext {
    pub api: Arc<dyn MarketplaceApi>,
    pub translator: Arc<dyn Translator>,
    pub notifier: Arc<dyn Notifier>,
    pub settings: CalendarSettings,
    /// Offered when an agent's schedule does not list any meeting types.
    pub default_meeting_types: Vec<MeetingType>,
    pub page_limit: u32,
}

impl SchedulingContext {
    pub fn new(
        api: Arc<dyn MarketplaceApi>,
        translator: Arc<dyn Translator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            api,
            translator,
            notifier,
            settings: CalendarSettings::default(),
            default_meeting_types: MeetingType::ALL.to_vec(),
            page_limit: AppointmentListQuery::DEFAULT_LIMIT,
        }
    }

    pub fn with_scheduling_config(mut self, config: Option<&SchedulingConfig>) -> Self {
        self.settings = CalendarSettings::from_config(config);
        if let Some(types) = config
            .and_then(|c| c.default_meeting_types.as_deref())
            .map(MeetingType::parse_list)
            .filter(|types| !types.is_empty())
        {
            self.default_meeting_types = types;
        }
        if let Some(limit) = config.and_then(|c| c.page_limit).filter(|l| *l > 0) {
            self.page_limit = limit;
        }
        self
    }

    pub fn t(&self, key: &str) -> String {
        self.translator.t(key)
    }

    pub fn notify_success(&self, message: Option<&str>, fallback_key: &str) {
        match message.filter(|m| !m.trim().is_empty()) {
            Some(message) => self.notifier.success(message),
            None => self.notifier.success(&self.t(fallback_key)),
        }
    }
}

/// Notifier and context helpers for unit tests.
#[cfg(test)]
pub mod mock {
    use super::*;
    use crate::api::mock::MockMarketplaceApi;
    use chrono::{NaiveDate, Weekday};
    use estately_common::services::CatalogTranslator;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Notification {
        Success(String),
        Error(String),
    }

    #[derive(Default)]
    pub struct RecordingNotifier {
        pub notifications: Mutex<Vec<Notification>>,
    }

    impl RecordingNotifier {
        pub fn errors(&self) -> Vec<String> {
            self.notifications
                .lock()
                .unwrap()
                .iter()
                .filter_map(|n| match n {
                    Notification::Error(m) => Some(m.clone()),
                    _ => None,
                })
                .collect()
        }

        pub fn successes(&self) -> Vec<String> {
            self.notifications
                .lock()
                .unwrap()
                .iter()
                .filter_map(|n| match n {
                    Notification::Success(m) => Some(m.clone()),
                    _ => None,
                })
                .collect()
        }
    }

    impl Notifier for RecordingNotifier {
        fn success(&self, message: &str) {
            self.notifications
                .lock()
                .unwrap()
                .push(Notification::Success(message.to_string()));
        }

        fn error(&self, message: &str) {
            self.notifications
                .lock()
                .unwrap()
                .push(Notification::Error(message.to_string()));
        }
    }

    /// A Sunday-first context over `api` with English messages where today
    /// is pinned to `today`.
    pub fn test_context(
        api: Arc<MockMarketplaceApi>,
        notifier: Arc<RecordingNotifier>,
        today: NaiveDate,
    ) -> SchedulingContext {
        let mut ctx = SchedulingContext::new(api, Arc::new(CatalogTranslator::english()), notifier);
        ctx.settings = CalendarSettings {
            week_start: Weekday::Sun,
            ..CalendarSettings::default()
        }
        .with_today(today);
        ctx
    }
}
