// --- File: crates/estately_appointments/src/wizard.rs ---
//! The three-step booking flow: property, then date/time/meeting type, then
//! confirmation.
//!
//! State is an explicit [`WizardStep`]; every transition matches on it
//! exhaustively. Validation failures never reach the network. They are
//! reported through the [`Notifier`](estately_common::services::Notifier) and
//! returned as [`WizardError`].

use chrono::NaiveDate;
use estately_common::services::Translator;
use estately_common::EstatelyError;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::api::{AvailabilityCheck, BookAppointmentRequest, BookingConfirmation, MarketplaceApi};
use crate::calendar::YearMonth;
use crate::context::SchedulingContext;
use crate::meeting_type::MeetingType;
use crate::models::{Property, Slot};
use crate::picker::{PickerError, SchedulePicker};
use crate::schedule_loader::ScheduleLoader;

/// Everything step 3 shows and step 3 submits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedBooking {
    pub property: Property,
    pub agent_id: i64,
    pub date: NaiveDate,
    pub slot: Slot,
    pub meeting_type: MeetingType,
    pub notes: Option<String>,
}

impl ConfirmedBooking {
    pub fn availability_check(&self) -> AvailabilityCheck {
        AvailabilityCheck {
            agent_id: self.agent_id,
            date: self.date,
            start_time: self.slot.start_time,
            end_time: self.slot.end_time,
        }
    }

    pub fn booking_request(&self) -> BookAppointmentRequest {
        BookAppointmentRequest {
            property_id: self.property.id,
            agent_id: self.agent_id,
            date: self.date,
            start_time: self.slot.start_time,
            end_time: self.slot.end_time,
            meeting_type: self.meeting_type,
            notes: self.notes.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardStep {
    SelectProperty,
    SelectSchedule { property: Property },
    Confirm(ConfirmedBooking),
    /// A submission is in flight; further submits are rejected.
    Submitting(ConfirmedBooking),
    Submitted { appointment_id: Option<i64> },
}

impl WizardStep {
    /// 1-based step number as shown to the user.
    pub fn number(&self) -> u8 {
        match self {
            WizardStep::SelectProperty => 1,
            WizardStep::SelectSchedule { .. } => 2,
            WizardStep::Confirm(_) | WizardStep::Submitting(_) | WizardStep::Submitted { .. } => 3,
        }
    }
}

/// The user's selections so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingDraft {
    pub selected_property: Option<Property>,
    pub selected_date: Option<NaiveDate>,
    pub selected_time_slot: Option<Slot>,
    pub selected_meeting_type: Option<MeetingType>,
    pub meeting_notes: String,
}

#[derive(Error, Debug, Clone)]
pub enum WizardError {
    #[error("No property selected")]
    MissingProperty,
    #[error("No date selected")]
    MissingDate,
    #[error("No time slot selected")]
    MissingTimeSlot,
    #[error("No meeting type selected")]
    MissingMeetingType,
    #[error("Property {0} is not offered by this agent")]
    UnknownProperty(i64),
    #[error(transparent)]
    Selection(#[from] PickerError),
    #[error("Agent not available: {}", .0.as_deref().unwrap_or("no reason given"))]
    AgentNotAvailable(Option<String>),
    #[error("A submission is already in progress")]
    AlreadySubmitting,
    #[error("Cannot go back from this step")]
    CannotGoBack,
    #[error("Action not available on step {0}")]
    WrongStep(u8),
    #[error(transparent)]
    Api(#[from] EstatelyError),
}

impl WizardError {
    pub fn message_key(&self) -> &'static str {
        match self {
            WizardError::MissingProperty | WizardError::UnknownProperty(_) => "selectProperty",
            WizardError::MissingDate => "selectDate",
            WizardError::MissingTimeSlot => "selectTimeSlot",
            WizardError::MissingMeetingType => "selectMeetingType",
            WizardError::Selection(e) => e.message_key(),
            WizardError::AgentNotAvailable(_) => "agentNotAvailable",
            WizardError::AlreadySubmitting => "alreadySubmitting",
            WizardError::CannotGoBack => "cannotGoBack",
            WizardError::WrongStep(_) => "actionNotAllowed",
            WizardError::Api(_) => "somethingWentWrong",
        }
    }

    /// The server's wording where there is one, otherwise the translated key.
    pub fn user_message(&self, translator: &dyn Translator) -> String {
        let fallback = translator.t(self.message_key());
        match self {
            WizardError::AgentNotAvailable(Some(message)) if !message.trim().is_empty() => {
                message.clone()
            }
            WizardError::Api(e) => e.user_message(&fallback),
            _ => fallback,
        }
    }

    /// Converts into the shared error type, carrying the user-facing message.
    pub fn into_estately(self, translator: &dyn Translator) -> EstatelyError {
        let message = self.user_message(translator);
        match self {
            WizardError::Api(EstatelyError::ApiError(_)) => EstatelyError::ApiError(message),
            WizardError::Api(other) => other,
            WizardError::AgentNotAvailable(_) | WizardError::AlreadySubmitting => {
                EstatelyError::ConflictError(message)
            }
            _ => EstatelyError::ValidationError(message),
        }
    }
}

/// Checks the step-2 fields in the order the user fills them in.
pub fn validate_draft(draft: &BookingDraft) -> Result<(), WizardError> {
    if draft.selected_property.is_none() {
        return Err(WizardError::MissingProperty);
    }
    if draft.selected_date.is_none() {
        return Err(WizardError::MissingDate);
    }
    if draft.selected_time_slot.is_none() {
        return Err(WizardError::MissingTimeSlot);
    }
    if draft.selected_meeting_type.is_none() {
        return Err(WizardError::MissingMeetingType);
    }
    Ok(())
}

/// Builds the confirmation for `agent_id` from a complete draft.
pub fn to_confirm(draft: &BookingDraft, agent_id: i64) -> Result<ConfirmedBooking, WizardError> {
    validate_draft(draft)?;
    match (
        &draft.selected_property,
        draft.selected_date,
        &draft.selected_time_slot,
        draft.selected_meeting_type,
    ) {
        (Some(property), Some(date), Some(slot), Some(meeting_type)) => Ok(ConfirmedBooking {
            property: property.clone(),
            agent_id,
            date,
            slot: slot.clone(),
            meeting_type,
            notes: Some(draft.meeting_notes.trim().to_string()).filter(|n| !n.is_empty()),
        }),
        _ => Err(WizardError::MissingProperty),
    }
}

/// Checks the agent's availability and, only if available, books.
pub async fn submit_booking(
    api: &dyn MarketplaceApi,
    booking: &ConfirmedBooking,
) -> Result<BookingConfirmation, WizardError> {
    let availability = api
        .check_agent_booking_availability(booking.availability_check())
        .await?;
    if !availability.available {
        info!(
            "Agent {} not available on {} at {}",
            booking.agent_id, booking.date, booking.slot.time
        );
        return Err(WizardError::AgentNotAvailable(availability.message));
    }
    let confirmation = api.book_appointment(booking.booking_request()).await?;
    info!(
        "Booked property {} with agent {} on {} {}",
        booking.property.id, booking.agent_id, booking.date, booking.slot.time
    );
    Ok(confirmation)
}

pub struct BookingWizard {
    ctx: SchedulingContext,
    loader: Arc<ScheduleLoader>,
    agent_id: i64,
    from_property: bool,
    step: WizardStep,
    properties: Vec<Property>,
    selected_property: Option<Property>,
    picker: SchedulePicker,
    notes: String,
}

impl BookingWizard {
    /// Opens on step 1 for the given agent.
    pub fn new(ctx: SchedulingContext, agent_id: i64) -> Self {
        let today = ctx.settings.today();
        let picker = SchedulePicker::new(agent_id, today, ctx.default_meeting_types.clone());
        Self {
            loader: Arc::new(ScheduleLoader::new(ctx.api.clone())),
            ctx,
            agent_id,
            from_property: false,
            step: WizardStep::SelectProperty,
            properties: Vec::new(),
            selected_property: None,
            picker,
            notes: String::new(),
        }
    }

    /// Opens straight on step 2 for a property the user is looking at. Going
    /// back to step 1 is not possible in this mode.
    pub async fn for_property(ctx: SchedulingContext, agent_id: i64, property: Property) -> Self {
        let mut wizard = Self::new(ctx, agent_id);
        wizard.from_property = true;
        wizard.properties = vec![property.clone()];
        wizard.selected_property = Some(property.clone());
        wizard.step = WizardStep::SelectSchedule { property };
        wizard.follow_property_agent();
        wizard.refresh_schedule().await;
        wizard
    }

    pub fn step(&self) -> &WizardStep {
        &self.step
    }

    pub fn current_step(&self) -> u8 {
        self.step.number()
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.step, WizardStep::Submitted { .. })
    }

    pub fn is_from_property(&self) -> bool {
        self.from_property
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn picker(&self) -> &SchedulePicker {
        &self.picker
    }

    pub fn schedule_loader(&self) -> Arc<ScheduleLoader> {
        self.loader.clone()
    }

    pub fn draft(&self) -> BookingDraft {
        BookingDraft {
            selected_property: self.selected_property.clone(),
            selected_date: self.picker.selected_date(),
            selected_time_slot: self.picker.selected_slot().cloned(),
            selected_meeting_type: self.picker.selected_meeting_type(),
            meeting_notes: self.notes.clone(),
        }
    }

    /// Fetches the agent's properties for step 1.
    pub async fn load_properties(&mut self) -> Result<&[Property], WizardError> {
        match self.ctx.api.get_agent_properties(self.agent_id).await {
            Ok(properties) => {
                self.properties = properties;
                Ok(self.properties.as_slice())
            }
            Err(e) => {
                error!("Failed to load properties of agent {}: {}", self.agent_id, e);
                Err(self.fail(WizardError::Api(e)))
            }
        }
    }

    pub fn select_property(&mut self, property_id: i64) -> Result<(), WizardError> {
        if !matches!(self.step, WizardStep::SelectProperty) {
            return Err(self.fail(WizardError::WrongStep(self.current_step())));
        }
        match self.properties.iter().find(|p| p.id == property_id) {
            Some(property) => {
                self.selected_property = Some(property.clone());
                Ok(())
            }
            None => Err(self.fail(WizardError::UnknownProperty(property_id))),
        }
    }

    /// Advances one step. On step 3 this submits.
    pub async fn continue_step(&mut self) -> Result<u8, WizardError> {
        match &self.step {
            WizardStep::SelectProperty => {
                let Some(property) = self.selected_property.clone() else {
                    return Err(self.fail(WizardError::MissingProperty));
                };
                self.step = WizardStep::SelectSchedule { property };
                self.follow_property_agent();
                self.refresh_schedule().await;
                Ok(self.current_step())
            }
            WizardStep::SelectSchedule { .. } => {
                let booking = to_confirm(&self.draft(), self.picker.agent_id())
                    .map_err(|e| self.fail(e))?;
                self.step = WizardStep::Confirm(booking);
                Ok(self.current_step())
            }
            WizardStep::Confirm(_) => {
                self.submit().await?;
                Ok(self.current_step())
            }
            WizardStep::Submitting(_) => Err(self.fail(WizardError::AlreadySubmitting)),
            WizardStep::Submitted { .. } => Err(self.fail(WizardError::WrongStep(3))),
        }
    }

    pub fn prev(&mut self) -> Result<u8, WizardError> {
        let previous = match &self.step {
            WizardStep::SelectSchedule { .. } if self.from_property => None,
            WizardStep::SelectSchedule { .. } => Some(WizardStep::SelectProperty),
            WizardStep::Confirm(booking) => Some(WizardStep::SelectSchedule {
                property: booking.property.clone(),
            }),
            WizardStep::SelectProperty
            | WizardStep::Submitting(_)
            | WizardStep::Submitted { .. } => None,
        };
        match previous {
            Some(step) => {
                self.step = step;
                Ok(self.current_step())
            }
            None => Err(self.fail(WizardError::CannotGoBack)),
        }
    }

    /// Moves the calendar and fetches the new month's schedule.
    pub async fn change_month(&mut self, delta: i32) -> Result<YearMonth, WizardError> {
        self.ensure_schedule_step()?;
        let today = self.ctx.settings.today();
        let month = self
            .picker
            .change_month(delta, today)
            .map_err(|e| self.fail(e.into()))?;
        self.refresh_schedule().await;
        Ok(month)
    }

    pub fn select_date(&mut self, date: NaiveDate) -> Result<(), WizardError> {
        self.ensure_schedule_step()?;
        self.picker.select_date(date).map_err(|e| self.fail(e.into()))
    }

    pub fn select_time_slot(&mut self, slot_id: i64) -> Result<Slot, WizardError> {
        self.ensure_schedule_step()?;
        match self.picker.select_time_slot(slot_id) {
            Ok(slot) => Ok(slot.clone()),
            Err(e) => Err(self.fail(e.into())),
        }
    }

    pub fn select_meeting_type(&mut self, meeting_type: MeetingType) -> Result<(), WizardError> {
        self.ensure_schedule_step()?;
        self.picker
            .select_meeting_type(meeting_type)
            .map_err(|e| self.fail(e.into()))
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    /// Submits the confirmed booking: availability check, then booking.
    ///
    /// On success the wizard closes. On any failure it stays on step 3 and
    /// the user is told why.
    pub async fn submit(&mut self) -> Result<BookingConfirmation, WizardError> {
        let booking = match &self.step {
            WizardStep::Confirm(booking) => booking.clone(),
            WizardStep::Submitting(_) => return Err(self.fail(WizardError::AlreadySubmitting)),
            _ => return Err(self.fail(WizardError::WrongStep(self.current_step()))),
        };
        let draft = BookingDraft {
            selected_property: Some(booking.property.clone()),
            selected_date: Some(booking.date),
            selected_time_slot: Some(booking.slot.clone()),
            selected_meeting_type: Some(booking.meeting_type),
            meeting_notes: booking.notes.clone().unwrap_or_default(),
        };
        validate_draft(&draft).map_err(|e| self.fail(e))?;

        self.step = WizardStep::Submitting(booking.clone());
        match submit_booking(self.ctx.api.as_ref(), &booking).await {
            Ok(confirmation) => {
                self.step = WizardStep::Submitted {
                    appointment_id: confirmation.appointment_id,
                };
                self.ctx
                    .notify_success(confirmation.message.as_deref(), "appointmentBooked");
                Ok(confirmation)
            }
            Err(e) => {
                if let WizardError::Api(inner) = &e {
                    error!("Booking failed: {}", inner);
                }
                self.step = WizardStep::Confirm(booking);
                Err(self.fail(e))
            }
        }
    }

    /// Returns to step 3 if a submission was abandoned mid-flight (its future dropped).
    pub fn abandon_submission(&mut self) {
        if let WizardStep::Submitting(booking) = &self.step {
            warn!("Submission abandoned, returning to confirmation");
            self.step = WizardStep::Confirm(booking.clone());
        }
    }

    /// Fetches the displayed month for the agent. Failures are reported but
    /// leave the wizard usable; stale responses are ignored.
    pub async fn refresh_schedule(&mut self) {
        let month = self.picker.displayed_month();
        let today = self.ctx.settings.today();
        let agent_id = self.picker.agent_id();
        match self.loader.fetch(agent_id, month, today).await {
            Ok(Some(schedule)) => {
                self.picker.apply_schedule(schedule);
            }
            Ok(None) => {}
            Err(e) => {
                error!("Failed to load schedule for agent {}: {}", agent_id, e);
                self.fail(WizardError::Api(e));
            }
        }
    }

    /// Schedules belong to the selected property's agent, which may differ
    /// from the agent the wizard was opened for.
    fn follow_property_agent(&mut self) {
        let agent_id = self
            .selected_property
            .as_ref()
            .and_then(|p| p.agent_id)
            .unwrap_or(self.agent_id);
        if self.picker.agent_id() != agent_id {
            debug!("Switching schedule from agent {} to {}", self.picker.agent_id(), agent_id);
            self.picker = SchedulePicker::new(
                agent_id,
                self.ctx.settings.today(),
                self.ctx.default_meeting_types.clone(),
            );
        }
    }

    fn ensure_schedule_step(&self) -> Result<(), WizardError> {
        match self.step {
            WizardStep::SelectSchedule { .. } => Ok(()),
            _ => Err(self.fail(WizardError::WrongStep(self.current_step()))),
        }
    }

    fn fail(&self, error: WizardError) -> WizardError {
        self.ctx
            .notifier
            .error(&error.user_message(self.ctx.translator.as_ref()));
        error
    }
}
