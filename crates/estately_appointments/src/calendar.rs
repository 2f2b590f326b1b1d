// --- File: crates/estately_appointments/src/calendar.rs ---
//! Month grid computation and month navigation.

use chrono::{Datelike, Months, NaiveDate, Utc, Weekday};
use chrono_tz::Tz;
use estately_config::SchedulingConfig;
use serde::Serialize;
use std::str::FromStr;
use tracing::warn;

/// Number of cells in a calendar grid: six weeks of seven days.
pub const GRID_CELLS: usize = 42;

/// A calendar month, always valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    first: NaiveDate,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first| Self { first })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            first: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn days_in_month(&self) -> u32 {
        days_in_month(self.year(), self.month())
    }

    /// The date in this month with the given day, clamped to the last valid day.
    pub fn clamped_date(&self, day: u32) -> NaiveDate {
        let day = day.clamp(1, self.days_in_month());
        self.first.with_day(day).unwrap_or(self.first)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        Self::from_date(date) == *self
    }
}

/// Number of days in `month` of `year`; 0 for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return 0;
    };
    match first.checked_add_months(Months::new(1)).and_then(|d| d.pred_opt()) {
        Some(last) => last.day(),
        // only reachable at the very end of chrono's supported range
        None => 31,
    }
}

/// One cell of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CalendarDay {
    pub day: u32,
    pub is_current_month: bool,
    pub is_available: bool,
    pub is_selected: bool,
}

impl CalendarDay {
    /// Only available days of the displayed month can be clicked.
    pub fn is_selectable(&self) -> bool {
        self.is_available && self.is_current_month
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CalendarGrid {
    pub year: i32,
    pub month: u32,
    pub cells: Vec<CalendarDay>,
}

impl CalendarGrid {
    pub fn rows(&self) -> impl Iterator<Item = &[CalendarDay]> {
        self.cells.chunks(7)
    }

    pub fn current_month_days(&self) -> impl Iterator<Item = &CalendarDay> {
        self.cells.iter().filter(|c| c.is_current_month)
    }

    pub fn cell_for_day(&self, day: u32) -> Option<&CalendarDay> {
        self.current_month_days().find(|c| c.day == day)
    }
}

/// Builds the 6×7 grid for `month`.
///
/// Leading cells are the trailing days of the previous month, trailing cells
/// the first days of the next month; neither is ever available.
pub fn build_calendar_grid(
    month: YearMonth,
    available_dates: &[u32],
    selected: Option<NaiveDate>,
    week_start: Weekday,
) -> CalendarGrid {
    let first = month.first_day();
    let offset = (first.weekday().num_days_from_sunday() + 7 - week_start.num_days_from_sunday()) % 7;
    let previous_month_days = first.pred_opt().map(|d| d.day()).unwrap_or(31);
    let selected_day = selected.filter(|d| month.contains(*d)).map(|d| d.day());

    let mut cells = Vec::with_capacity(GRID_CELLS);
    for i in 0..offset {
        cells.push(CalendarDay {
            day: previous_month_days - offset + 1 + i,
            is_current_month: false,
            is_available: false,
            is_selected: false,
        });
    }
    for day in 1..=month.days_in_month() {
        cells.push(CalendarDay {
            day,
            is_current_month: true,
            is_available: available_dates.contains(&day),
            is_selected: selected_day == Some(day),
        });
    }
    let mut next_day = 1;
    while cells.len() < GRID_CELLS {
        cells.push(CalendarDay {
            day: next_day,
            is_current_month: false,
            is_available: false,
            is_selected: false,
        });
        next_day += 1;
    }

    CalendarGrid {
        year: month.year(),
        month: month.month(),
        cells,
    }
}

/// Moves `current` by `delta` months, clamping the day to the target month
/// (31 January + 1 month is 29 February in a leap year).
pub fn navigate_month(current: NaiveDate, delta: i32) -> Option<NaiveDate> {
    let months = Months::new(delta.unsigned_abs());
    if delta >= 0 {
        current.checked_add_months(months)
    } else {
        current.checked_sub_months(months)
    }
}

/// Bookings into the past are not possible, so the calendar never goes back
/// before the current real-world month.
pub fn can_navigate_back(displayed: YearMonth, today: NaiveDate) -> bool {
    displayed > YearMonth::from_date(today)
}

/// Where "today" is and how the grid is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarSettings {
    pub time_zone: Tz,
    pub week_start: Weekday,
    /// Pins "today" to a fixed date instead of the clock.
    pub pinned_today: Option<NaiveDate>,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            time_zone: Tz::UTC,
            week_start: Weekday::Sun,
            pinned_today: None,
        }
    }
}

impl CalendarSettings {
    pub fn from_config(config: Option<&SchedulingConfig>) -> Self {
        let mut settings = Self::default();
        let Some(config) = config else {
            return settings;
        };
        if let Some(zone) = config.time_zone.as_deref() {
            match Tz::from_str(zone) {
                Ok(tz) => settings.time_zone = tz,
                Err(_) => warn!("Unknown time zone {:?}, using UTC", zone),
            }
        }
        if let Some(day) = config.week_starts_on.as_deref() {
            match Weekday::from_str(day) {
                Ok(weekday) => settings.week_start = weekday,
                Err(_) => warn!("Unknown week start {:?}, using Sunday", day),
            }
        }
        settings
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.pinned_today = Some(today);
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.pinned_today
            .unwrap_or_else(|| Utc::now().with_timezone(&self.time_zone).date_naive())
    }
}

/// The month currently shown, remembered as a full date so the day survives
/// navigation the way a date picker's cursor does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarNavigator {
    cursor: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    #[error("Cannot navigate before the current month")]
    PastMonth,
    #[error("Date out of range")]
    OutOfRange,
}

impl CalendarNavigator {
    pub fn new(cursor: NaiveDate) -> Self {
        Self { cursor }
    }

    pub fn cursor(&self) -> NaiveDate {
        self.cursor
    }

    pub fn displayed_month(&self) -> YearMonth {
        YearMonth::from_date(self.cursor)
    }

    pub fn can_go_back(&self, today: NaiveDate) -> bool {
        can_navigate_back(self.displayed_month(), today)
    }

    pub fn previous(&mut self, today: NaiveDate) -> Result<YearMonth, NavigationError> {
        if !self.can_go_back(today) {
            return Err(NavigationError::PastMonth);
        }
        self.shift(-1)
    }

    pub fn next(&mut self) -> Result<YearMonth, NavigationError> {
        self.shift(1)
    }

    fn shift(&mut self, delta: i32) -> Result<YearMonth, NavigationError> {
        self.cursor = navigate_month(self.cursor, delta).ok_or(NavigationError::OutOfRange)?;
        Ok(self.displayed_month())
    }

    /// Jumps to an arbitrary month, refusing months before `today`'s.
    pub fn show(&mut self, month: YearMonth, today: NaiveDate) -> Result<YearMonth, NavigationError> {
        if month < YearMonth::from_date(today) {
            return Err(NavigationError::PastMonth);
        }
        self.cursor = month.clamped_date(self.cursor.day());
        Ok(month)
    }
}
