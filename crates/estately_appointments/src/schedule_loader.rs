// --- File: crates/estately_appointments/src/schedule_loader.rs ---
//! Month-schedule fetching where the last *issued* request wins.
//!
//! Every fetch takes a generation number before it goes out. When the
//! response comes back it is only handed to the caller if no newer fetch has
//! been issued since; otherwise it is dropped and the caller gets `Ok(None)`.

use chrono::NaiveDate;
use estately_common::EstatelyError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use crate::api::{MarketplaceApi, MonthScheduleQuery};
use crate::availability::format_appointment_data;
use crate::calendar::YearMonth;
use crate::models::MonthSchedule;

/// Ticket for one issued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

pub struct ScheduleLoader {
    api: Arc<dyn MarketplaceApi>,
    latest: AtomicU64,
}

impl ScheduleLoader {
    pub fn new(api: Arc<dyn MarketplaceApi>) -> Self {
        Self {
            api,
            latest: AtomicU64::new(0),
        }
    }

    /// Issues a new generation, superseding every earlier one.
    pub fn begin(&self) -> Generation {
        Generation(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.latest.load(Ordering::SeqCst) == generation.0
    }

    /// Fetches and formats the schedule of `agent_id` for `month`.
    ///
    /// Returns `Ok(None)` when a newer fetch was issued while this one was in
    /// flight. Errors of superseded fetches are swallowed the same way.
    pub async fn fetch(
        &self,
        agent_id: i64,
        month: YearMonth,
        today: NaiveDate,
    ) -> Result<Option<MonthSchedule>, EstatelyError> {
        let generation = self.begin();
        let query = MonthScheduleQuery {
            month: month.month(),
            year: month.year(),
            agent_id,
        };
        debug!("Fetching schedule {:?} as generation {:?}", query, generation);
        let result = self.api.get_month_wise_time_schedules(query).await;

        if !self.is_current(generation) {
            info!(
                "Discarding stale schedule for agent {} {}-{:02}",
                agent_id,
                month.year(),
                month.month()
            );
            return Ok(None);
        }
        let raw = result?;
        Ok(Some(format_appointment_data(&raw, today)))
    }
}
