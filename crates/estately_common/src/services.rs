// --- File: crates/estately_common/src/services.rs ---
//! Service abstractions for collaborators outside the scheduling core.
//!
//! Translation, toast notifications and the user session are injected through
//! these narrow traits instead of being read from a global store, so the
//! booking logic can be exercised with in-memory implementations.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use tracing::{error, info};

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Looks up localized strings by key.
pub trait Translator: Send + Sync {
    fn t(&self, key: &str) -> String;
}

/// Fire-and-forget user feedback (toasts, snackbars, log lines).
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Supplies the caller's session credentials.
pub trait SessionProvider: Send + Sync {
    fn access_token(&self) -> Option<String>;
}

/// Translator backed by an in-memory catalog. Unknown keys translate to themselves.
#[derive(Debug, Clone, Default)]
pub struct CatalogTranslator {
    entries: HashMap<String, String>,
}

impl CatalogTranslator {
    pub fn new(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }

    /// English strings for every key the scheduling core emits.
    pub fn english() -> Self {
        let entries = [
            ("selectProperty", "Please select a property"),
            ("selectDate", "Please select a date"),
            ("selectTimeSlot", "Please select a time slot"),
            ("selectMeetingType", "Please select a meeting type"),
            ("pickDateToSeeSlots", "Pick a date to see available time slots"),
            ("noSlotsPickAnotherDate", "No slots available, please pick another date"),
            ("agentNotAvailable", "The agent is not available at the selected time"),
            ("appointmentBooked", "Appointment booked successfully"),
            ("appointmentCancelled", "Appointment cancelled"),
            ("appointmentAccepted", "Appointment confirmed"),
            ("appointmentRescheduled", "Appointment rescheduled"),
            ("meetingTypeUpdated", "Meeting type updated"),
            ("reasonRequired", "Please enter a reason"),
            ("actionNotAllowed", "This action is not available for this appointment"),
            ("alreadySubmitting", "Your request is already being submitted"),
            ("cannotGoBack", "You cannot go back from this step"),
            ("userReported", "User reported"),
            ("somethingWentWrong", "Something went wrong, please try again"),
            ("virtual", "Virtual"),
            ("phone", "Phone"),
            ("inPerson", "In person"),
        ];
        Self::new(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

impl Translator for CatalogTranslator {
    fn t(&self, key: &str) -> String {
        self.entries
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}

/// Notifier that writes notifications to the tracing log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        info!(target: "estately::notify", "{}", message);
    }

    fn error(&self, message: &str) {
        error!(target: "estately::notify", "{}", message);
    }
}

/// A session with a fixed (possibly absent) token, e.g. the service token from config.
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    token: Option<String>,
}

impl StaticSession {
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }
}

impl SessionProvider for StaticSession {
    fn access_token(&self) -> Option<String> {
        self.token.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_falls_back_to_key() {
        let translator = CatalogTranslator::english();
        assert_eq!(translator.t("selectDate"), "Please select a date");
        assert_eq!(translator.t("unknownKey"), "unknownKey");
    }

    #[test]
    fn test_static_session() {
        assert_eq!(
            StaticSession::new(Some("abc".into())).access_token().as_deref(),
            Some("abc")
        );
        assert!(StaticSession::default().access_token().is_none());
    }
}
