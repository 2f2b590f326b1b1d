// --- File: crates/estately_appointments/src/picker.rs ---
//! Calendar + time slot + meeting type selection for one agent.
//!
//! Shared by the booking wizard's second step and the reschedule form.

use chrono::{Datelike, NaiveDate, Weekday};
use thiserror::Error;
use tracing::debug;

use crate::availability::format_available_dates;
use crate::calendar::{
    build_calendar_grid, navigate_month, CalendarGrid, CalendarNavigator, NavigationError, YearMonth,
};
use crate::meeting_type::{MeetingType, MeetingTypeNotOffered, MeetingTypeOption, MeetingTypeSelector};
use crate::models::{MonthSchedule, Slot};
use crate::slots::{slot_prompt, SlotPrompt, TimeSlotSelector, UnknownSlot};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PickerError {
    #[error("{0} is not an available day of the displayed month")]
    DateNotSelectable(NaiveDate),
    #[error(transparent)]
    UnknownSlot(#[from] UnknownSlot),
    #[error(transparent)]
    MeetingType(#[from] MeetingTypeNotOffered),
    #[error(transparent)]
    Navigation(#[from] NavigationError),
}

impl PickerError {
    pub fn message_key(&self) -> &'static str {
        match self {
            PickerError::DateNotSelectable(_) => "selectDate",
            PickerError::UnknownSlot(_) => "selectTimeSlot",
            PickerError::MeetingType(_) => "selectMeetingType",
            PickerError::Navigation(_) => "cannotGoBack",
        }
    }
}

/// A complete choice: day, slot and meeting type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleChoice {
    pub date: NaiveDate,
    pub slot: Slot,
    pub meeting_type: MeetingType,
}

#[derive(Debug, Clone)]
pub struct SchedulePicker {
    agent_id: i64,
    navigator: CalendarNavigator,
    schedule: Option<MonthSchedule>,
    selected_date: Option<NaiveDate>,
    slots: TimeSlotSelector,
    meeting_types: MeetingTypeSelector,
    fallback_types: Vec<MeetingType>,
}

impl SchedulePicker {
    /// Starts on `today`'s month. `fallback_types` are offered until (and
    /// unless) a schedule lists the agent's own meeting types.
    pub fn new(agent_id: i64, today: NaiveDate, fallback_types: Vec<MeetingType>) -> Self {
        Self {
            agent_id,
            navigator: CalendarNavigator::new(today),
            schedule: None,
            selected_date: None,
            slots: TimeSlotSelector::default(),
            meeting_types: MeetingTypeSelector::new(&fallback_types),
            fallback_types,
        }
    }

    pub fn agent_id(&self) -> i64 {
        self.agent_id
    }

    pub fn displayed_month(&self) -> YearMonth {
        self.navigator.displayed_month()
    }

    pub fn can_go_back(&self, today: NaiveDate) -> bool {
        self.navigator.can_go_back(today)
    }

    pub fn schedule(&self) -> Option<&MonthSchedule> {
        self.schedule.as_ref()
    }

    /// Installs a freshly fetched schedule. Schedules for a month other than
    /// the displayed one are ignored and `false` is returned.
    pub fn apply_schedule(&mut self, schedule: MonthSchedule) -> bool {
        let month = self.displayed_month();
        if !schedule.covers(month.month(), month.year()) {
            return false;
        }
        let types = if schedule.availability_types.is_empty() {
            self.fallback_types.clone()
        } else {
            schedule.availability_types.clone()
        };
        self.meeting_types.set_options(&types);
        self.schedule = Some(schedule);

        // a refreshed schedule may have dropped the selected day or slot
        if let Some(date) = self.selected_date {
            let fresh = self.slots_for(date);
            let keep = self.slots.selected().map(|s| s.id);
            self.slots.set_slots(fresh);
            if let Some(id) = keep {
                if self.slots.select(id).is_err() {
                    debug!("Slot {} on {} is gone after the schedule refresh", id, date);
                }
            }
        }
        true
    }

    /// Moves the calendar by `delta` months. The selected day and slot belong
    /// to the old month's schedule, so both are cleared along with it.
    pub fn change_month(&mut self, delta: i32, today: NaiveDate) -> Result<YearMonth, PickerError> {
        if delta == 0 {
            return Ok(self.displayed_month());
        }
        let target = navigate_month(self.navigator.cursor(), delta).ok_or(NavigationError::OutOfRange)?;
        self.show_month(YearMonth::from_date(target), today)?;
        Ok(self.displayed_month())
    }

    /// Jumps straight to `month`; months before `today`'s are refused.
    pub fn show_month(&mut self, month: YearMonth, today: NaiveDate) -> Result<(), PickerError> {
        if month == self.displayed_month() {
            return Ok(());
        }
        self.navigator.show(month, today)?;
        self.schedule = None;
        self.selected_date = None;
        self.slots.set_slots(Vec::new());
        Ok(())
    }

    pub fn available_dates(&self) -> Vec<u32> {
        self.schedule
            .as_ref()
            .map(format_available_dates)
            .unwrap_or_default()
    }

    pub fn grid(&self, week_start: Weekday) -> CalendarGrid {
        build_calendar_grid(
            self.displayed_month(),
            &self.available_dates(),
            self.selected_date,
            week_start,
        )
    }

    /// Selects `date`. Only available days of the displayed month qualify;
    /// any previously selected time slot is cleared.
    pub fn select_date(&mut self, date: NaiveDate) -> Result<(), PickerError> {
        if !self.displayed_month().contains(date) || !self.available_dates().contains(&date.day()) {
            return Err(PickerError::DateNotSelectable(date));
        }
        self.selected_date = Some(date);
        let slots = self.slots_for(date);
        self.slots.set_slots(slots);
        Ok(())
    }

    pub fn select_day(&mut self, day: u32) -> Result<(), PickerError> {
        let month = self.displayed_month();
        let date = NaiveDate::from_ymd_opt(month.year(), month.month(), day)
            .ok_or(PickerError::DateNotSelectable(month.first_day()))?;
        self.select_date(date)
    }

    pub fn select_time_slot(&mut self, id: i64) -> Result<&Slot, PickerError> {
        let (slot, _) = self.slots.select(id)?;
        Ok(slot)
    }

    pub fn select_meeting_type(&mut self, meeting_type: MeetingType) -> Result<(), PickerError> {
        self.meeting_types.select(meeting_type)?;
        Ok(())
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.selected_date
    }

    pub fn selected_slot(&self) -> Option<&Slot> {
        self.slots.selected()
    }

    pub fn selected_meeting_type(&self) -> Option<MeetingType> {
        self.meeting_types.selected()
    }

    pub fn slots(&self) -> &[Slot] {
        self.slots.slots()
    }

    pub fn meeting_type_options(&self) -> &[MeetingTypeOption] {
        self.meeting_types.options()
    }

    pub fn prompt(&self) -> SlotPrompt {
        let month = self.displayed_month();
        slot_prompt(
            self.schedule.as_ref(),
            self.selected_date.map(|d| d.day()),
            month.month(),
            month.year(),
        )
    }

    /// The full choice, if every part has been made.
    pub fn choice(&self) -> Option<ScheduleChoice> {
        Some(ScheduleChoice {
            date: self.selected_date?,
            slot: self.slots.selected()?.clone(),
            meeting_type: self.meeting_types.selected()?,
        })
    }

    fn slots_for(&self, date: NaiveDate) -> Vec<Slot> {
        crate::slots::get_time_slots_for_date(
            self.schedule.as_ref(),
            Some(date.day()),
            date.month(),
            date.year(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::format_appointment_data;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    fn june() -> MonthSchedule {
        format_appointment_data(
            &json!({
                "month": 6,
                "year": 2024,
                "availability_types": "virtual,phone",
                "days": {
                    "10": [
                        {"id": 1, "start_time": "09:00", "end_time": "09:30"},
                        {"id": 2, "start_time": "10:00", "end_time": "10:30"}
                    ],
                    "12": [{"id": 3, "start_time": "14:00", "end_time": "15:00"}]
                }
            }),
            today(),
        )
    }

    fn picker() -> SchedulePicker {
        let mut picker = SchedulePicker::new(7, today(), MeetingType::ALL.to_vec());
        assert!(picker.apply_schedule(june()));
        picker
    }

    #[test]
    fn test_selecting_a_date_clears_the_time_slot() {
        let mut picker = picker();
        picker.select_day(10).unwrap();
        picker.select_time_slot(2).unwrap();
        assert_eq!(picker.selected_slot().map(|s| s.id), Some(2));

        picker.select_day(12).unwrap();
        assert!(picker.selected_slot().is_none());
        assert_eq!(picker.slots().len(), 1);
    }

    #[test]
    fn test_refreshed_schedule_keeps_only_surviving_slot() {
        let mut picker = picker();
        picker.select_day(10).unwrap();
        picker.select_time_slot(2).unwrap();

        assert!(picker.apply_schedule(june()));
        assert_eq!(picker.selected_slot().map(|s| s.id), Some(2));

        // slot 2 was booked in the meantime
        let mut refreshed = june();
        if let Some(slots) = refreshed.days_with_slots.get_mut(&10) {
            slots.retain(|s| s.id != 2);
        }
        assert!(picker.apply_schedule(refreshed));
        assert_eq!(picker.selected_date(), NaiveDate::from_ymd_opt(2024, 6, 10));
        assert!(picker.selected_slot().is_none());
        assert_eq!(picker.slots().len(), 1);
    }

    #[test]
    fn test_unavailable_days_cannot_be_selected() {
        let mut picker = picker();
        assert!(matches!(picker.select_day(11), Err(PickerError::DateNotSelectable(_))));
        assert!(picker.select_date(NaiveDate::from_ymd_opt(2024, 7, 10).unwrap()).is_err());
        assert!(picker.select_day(31).is_err());
        assert_eq!(picker.selected_date(), None);
        assert_eq!(picker.prompt(), SlotPrompt::PickDate);
    }

    #[test]
    fn test_meeting_types_come_from_schedule() {
        let mut picker = picker();
        assert_eq!(picker.meeting_type_options().len(), 2);
        assert!(picker.select_meeting_type(MeetingType::InPerson).is_err());
        picker.select_meeting_type(MeetingType::Virtual).unwrap();
        assert_eq!(picker.selected_meeting_type(), Some(MeetingType::Virtual));
    }

    #[test]
    fn test_schedule_for_other_month_is_ignored() {
        let mut picker = SchedulePicker::new(7, today(), Vec::new());
        let july = MonthSchedule::empty(7, 2024, today());
        assert!(!picker.apply_schedule(july));
        assert!(picker.schedule().is_none());
    }

    #[test]
    fn test_change_month_resets_selection_and_guards_past() {
        let mut picker = picker();
        picker.select_day(10).unwrap();
        assert_eq!(
            picker.change_month(-1, today()),
            Err(PickerError::Navigation(NavigationError::PastMonth))
        );
        // a refused move leaves everything untouched
        assert_eq!(picker.selected_date().map(|d| d.day()), Some(10));

        let month = picker.change_month(1, today()).unwrap();
        assert_eq!(month, YearMonth::new(2024, 7).unwrap());
        assert!(picker.selected_date().is_none());
        assert!(picker.schedule().is_none());
        assert!(picker.grid(Weekday::Sun).cells.iter().all(|c| !c.is_available));
    }

    #[test]
    fn test_choice_requires_every_part() {
        let mut picker = picker();
        picker.select_day(10).unwrap();
        picker.select_time_slot(1).unwrap();
        assert!(picker.choice().is_none());
        picker.select_meeting_type(MeetingType::Phone).unwrap();
        let choice = picker.choice().unwrap();
        assert_eq!(choice.date, NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
        assert_eq!(choice.slot.time, "09:00 - 09:30");
    }
}
