// --- File: crates/estately_appointments/src/listing.rs ---
//! Paged appointment lists for either side of an appointment.

use estately_common::EstatelyError;
use tracing::error;

use crate::api::{AppointmentListQuery, AppointmentPage, DateFilter, MarketplaceApi};
use crate::context::SchedulingContext;
use crate::lifecycle::AvailableActions;
use crate::models::{Appointment, Role};

/// `Loaded { total: 0, .. }` is an empty result, not a list still loading.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ListState {
    #[default]
    NotLoaded,
    Loading,
    Loaded {
        items: Vec<Appointment>,
        total: u64,
    },
    Failed(String),
}

impl ListState {
    pub fn is_empty_result(&self) -> bool {
        matches!(self, ListState::Loaded { total: 0, .. })
    }

    pub fn items(&self) -> &[Appointment] {
        match self {
            ListState::Loaded { items, .. } => items.as_slice(),
            _ => &[],
        }
    }
}

/// Fetches one page for `role`: users see their bookings, agents the requests they received.
pub async fn fetch_page(
    api: &dyn MarketplaceApi,
    role: Role,
    query: AppointmentListQuery,
) -> Result<AppointmentPage, EstatelyError> {
    match role {
        Role::User => api.get_user_appointments(query).await,
        Role::Agent => api.get_agent_appointments(query).await,
    }
}

pub struct AppointmentList {
    ctx: SchedulingContext,
    role: Role,
    query: AppointmentListQuery,
    state: ListState,
}

impl AppointmentList {
    pub fn new(ctx: SchedulingContext, role: Role) -> Self {
        let query = AppointmentListQuery {
            limit: ctx.page_limit,
            ..AppointmentListQuery::default()
        };
        Self {
            ctx,
            role,
            query,
            state: ListState::NotLoaded,
        }
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    pub fn query(&self) -> AppointmentListQuery {
        self.query
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Changing the filter starts again from the first page.
    pub fn set_filter(&mut self, date_filter: DateFilter) {
        if self.query.date_filter != date_filter {
            self.query.date_filter = date_filter;
            self.query.offset = 0;
            self.state = ListState::NotLoaded;
        }
    }

    pub async fn load(&mut self) -> &ListState {
        self.state = ListState::Loading;
        self.state = match fetch_page(self.ctx.api.as_ref(), self.role, self.query).await {
            Ok(page) => ListState::Loaded {
                items: page.items,
                total: page.total,
            },
            Err(e) => {
                error!("Failed to load {:?} appointments: {}", self.role, e);
                let message = e.user_message(&self.ctx.t("somethingWentWrong"));
                self.ctx.notifier.error(&message);
                ListState::Failed(message)
            }
        };
        &self.state
    }

    pub fn has_next_page(&self) -> bool {
        match &self.state {
            ListState::Loaded { total, .. } => {
                u64::from(self.query.offset) + u64::from(self.query.limit) < *total
            }
            _ => false,
        }
    }

    pub fn has_previous_page(&self) -> bool {
        self.query.offset > 0
    }

    /// Loads the next page; `None` when already on the last one.
    pub async fn next_page(&mut self) -> Option<&ListState> {
        if !self.has_next_page() {
            return None;
        }
        self.query.offset += self.query.limit;
        Some(self.load().await)
    }

    pub async fn previous_page(&mut self) -> Option<&ListState> {
        if !self.has_previous_page() {
            return None;
        }
        self.query.offset = self.query.offset.saturating_sub(self.query.limit);
        Some(self.load().await)
    }

    /// Actions offered for each loaded appointment, in list order.
    pub fn actions(&self) -> Vec<(i64, AvailableActions)> {
        self.state
            .items()
            .iter()
            .map(|a| (a.id, AvailableActions::for_appointment(a, self.role)))
            .collect()
    }
}
