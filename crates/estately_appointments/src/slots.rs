// --- File: crates/estately_appointments/src/slots.rs ---
//! Time slots for the selected day.

use serde::Serialize;
use thiserror::Error;

use crate::models::{MonthSchedule, Slot};

/// Slots for `day` of `month`/`year`.
///
/// Empty when any input is missing, when the schedule belongs to another
/// month, or when the day has no entry.
pub fn get_time_slots_for_date(
    schedule: Option<&MonthSchedule>,
    day: Option<u32>,
    month: u32,
    year: i32,
) -> Vec<Slot> {
    let (Some(schedule), Some(day)) = (schedule, day) else {
        return Vec::new();
    };
    if !schedule.covers(month, year) {
        return Vec::new();
    }
    schedule
        .days_with_slots
        .get(&day)
        .cloned()
        .unwrap_or_default()
}

/// What the slot panel shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(tag = "state", content = "slots", rename_all = "snake_case")]
pub enum SlotPrompt {
    /// No date selected yet.
    PickDate,
    /// A date is selected but has no slots.
    NoSlots,
    Slots(Vec<Slot>),
}

impl SlotPrompt {
    /// Translation key of the message to show, if any.
    pub fn message_key(&self) -> Option<&'static str> {
        match self {
            SlotPrompt::PickDate => Some("pickDateToSeeSlots"),
            SlotPrompt::NoSlots => Some("noSlotsPickAnotherDate"),
            SlotPrompt::Slots(_) => None,
        }
    }
}

pub fn slot_prompt(
    schedule: Option<&MonthSchedule>,
    day: Option<u32>,
    month: u32,
    year: i32,
) -> SlotPrompt {
    if day.is_none() {
        return SlotPrompt::PickDate;
    }
    let slots = get_time_slots_for_date(schedule, day, month, year);
    if slots.is_empty() {
        SlotPrompt::NoSlots
    } else {
        SlotPrompt::Slots(slots)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown time slot: {0}")]
pub struct UnknownSlot(pub i64);

/// The slots of one day and the chosen one.
#[derive(Debug, Clone, Default)]
pub struct TimeSlotSelector {
    slots: Vec<Slot>,
    selected: Option<Slot>,
}

impl TimeSlotSelector {
    pub fn new(slots: Vec<Slot>) -> Self {
        Self {
            slots,
            selected: None,
        }
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Replaces the slots; any previous selection is cleared.
    pub fn set_slots(&mut self, slots: Vec<Slot>) {
        self.slots = slots;
        self.selected = None;
    }

    /// Selects the slot with `id` and returns it with its duration in minutes.
    pub fn select(&mut self, id: i64) -> Result<(&Slot, i64), UnknownSlot> {
        let slot = self
            .slots
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or(UnknownSlot(id))?;
        let duration = slot.duration_minutes();
        let selected: &Slot = self.selected.insert(slot);
        Ok((selected, duration))
    }

    pub fn selected(&self) -> Option<&Slot> {
        self.selected.as_ref()
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }
}
