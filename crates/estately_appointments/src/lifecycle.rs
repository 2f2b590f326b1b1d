// --- File: crates/estately_appointments/src/lifecycle.rs ---
//! Status transitions on existing appointments: cancel, accept, reschedule
//! and change meeting type.
//!
//! Each action validates locally, calls the marketplace once, and on success
//! invokes the caller's refetch callback exactly once. Failures are reported
//! through the notifier and never invoke the callback.

use chrono::NaiveDate;
use estately_common::services::Translator;
use estately_common::EstatelyError;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

use crate::api::{ActionOutcome, MeetingTypeUpdate, StatusUpdate};
use crate::calendar::YearMonth;
use crate::context::SchedulingContext;
use crate::meeting_type::{MeetingType, MeetingTypeNotOffered};
use crate::models::{Appointment, AppointmentStatus, Role, Slot};
use crate::picker::{PickerError, SchedulePicker};
use crate::schedule_loader::ScheduleLoader;

/// The parts of an appointment the action guards look at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionTarget {
    pub id: i64,
    pub status: AppointmentStatus,
    pub meeting_type: Option<MeetingType>,
    /// Meeting types the agent offers for this appointment.
    pub meeting_types: Vec<MeetingType>,
}

impl From<&Appointment> for ActionTarget {
    fn from(appointment: &Appointment) -> Self {
        Self {
            id: appointment.id,
            status: appointment.status,
            meeting_type: appointment.meeting_type,
            meeting_types: appointment.meeting_type_options(),
        }
    }
}

/// Which lifecycle actions are offered for an appointment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AvailableActions {
    pub cancel: bool,
    pub accept: bool,
    pub reschedule: bool,
    pub change_meeting_type: bool,
}

impl AvailableActions {
    pub fn for_appointment(appointment: &Appointment, role: Role) -> Self {
        Self::for_target(&ActionTarget::from(appointment), role)
    }

    pub fn for_target(target: &ActionTarget, role: Role) -> Self {
        let status = target.status;
        if status.is_closed() {
            return Self::default();
        }
        Self {
            cancel: status != AppointmentStatus::Approved,
            accept: role == Role::Agent
                && matches!(status, AppointmentStatus::Pending | AppointmentStatus::Rescheduled),
            reschedule: true,
            change_meeting_type: target
                .meeting_types
                .iter()
                .any(|t| Some(*t) != target.meeting_type),
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum ActionError {
    #[error("Action not available for appointment in status {}", .0.as_str())]
    NotAllowed(AppointmentStatus),
    #[error("A reason is required")]
    ReasonRequired,
    #[error("No date selected")]
    MissingDate,
    #[error("No time slot selected")]
    MissingTimeSlot,
    #[error("No meeting type selected")]
    MissingMeetingType,
    #[error("Appointment already uses this meeting type")]
    SameMeetingType,
    #[error("Appointment has no agent")]
    MissingAgent,
    #[error(transparent)]
    MeetingType(#[from] MeetingTypeNotOffered),
    #[error(transparent)]
    Selection(#[from] PickerError),
    #[error(transparent)]
    Api(#[from] EstatelyError),
}

impl ActionError {
    pub fn message_key(&self) -> &'static str {
        match self {
            ActionError::NotAllowed(_) | ActionError::MissingAgent => "actionNotAllowed",
            ActionError::ReasonRequired => "reasonRequired",
            ActionError::MissingDate => "selectDate",
            ActionError::MissingTimeSlot => "selectTimeSlot",
            ActionError::MissingMeetingType
            | ActionError::SameMeetingType
            | ActionError::MeetingType(_) => "selectMeetingType",
            ActionError::Selection(e) => e.message_key(),
            ActionError::Api(_) => "somethingWentWrong",
        }
    }

    pub fn user_message(&self, translator: &dyn Translator) -> String {
        let fallback = translator.t(self.message_key());
        match self {
            ActionError::Api(e) => e.user_message(&fallback),
            _ => fallback,
        }
    }

    pub fn into_estately(self, translator: &dyn Translator) -> EstatelyError {
        let message = self.user_message(translator);
        match self {
            ActionError::Api(EstatelyError::ApiError(_)) => EstatelyError::ApiError(message),
            ActionError::Api(other) => other,
            ActionError::NotAllowed(_) => EstatelyError::ConflictError(message),
            _ => EstatelyError::ValidationError(message),
        }
    }
}

fn required_reason(reason: &str) -> Result<String, ActionError> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(ActionError::ReasonRequired);
    }
    Ok(reason.to_string())
}

/// Builds the reschedule transition, checking the reason first and then the
/// new date, slot and meeting type in that order.
pub fn reschedule_update(
    appointment_id: i64,
    reason: &str,
    date: Option<NaiveDate>,
    slot: Option<&Slot>,
    meeting_type: Option<MeetingType>,
) -> Result<StatusUpdate, ActionError> {
    let reason = required_reason(reason)?;
    let date = date.ok_or(ActionError::MissingDate)?;
    let slot = slot.ok_or(ActionError::MissingTimeSlot)?;
    let meeting_type = meeting_type.ok_or(ActionError::MissingMeetingType)?;
    Ok(StatusUpdate::reschedule(
        appointment_id,
        reason,
        date,
        slot.start_time,
        slot.end_time,
        meeting_type,
    ))
}

/// Runs lifecycle actions against the marketplace.
#[derive(Clone)]
pub struct AppointmentActions {
    ctx: SchedulingContext,
}

impl AppointmentActions {
    pub fn new(ctx: SchedulingContext) -> Self {
        Self { ctx }
    }

    pub async fn cancel(
        &self,
        target: impl Into<ActionTarget>,
        reason: &str,
        on_changed: impl FnOnce(),
    ) -> Result<ActionOutcome, ActionError> {
        let target = target.into();
        if !AvailableActions::for_target(&target, Role::User).cancel {
            return Err(self.fail(ActionError::NotAllowed(target.status)));
        }
        let reason = required_reason(reason).map_err(|e| self.fail(e))?;
        self.apply(
            StatusUpdate::cancel(target.id, reason),
            "appointmentCancelled",
            on_changed,
        )
        .await
    }

    pub async fn accept(
        &self,
        target: impl Into<ActionTarget>,
        role: Role,
        on_changed: impl FnOnce(),
    ) -> Result<ActionOutcome, ActionError> {
        let target = target.into();
        if !AvailableActions::for_target(&target, role).accept {
            return Err(self.fail(ActionError::NotAllowed(target.status)));
        }
        self.apply(
            StatusUpdate::accept(target.id),
            "appointmentAccepted",
            on_changed,
        )
        .await
    }

    /// Switches to another of the appointment's offered meeting types.
    pub async fn change_meeting_type(
        &self,
        target: impl Into<ActionTarget>,
        meeting_type: MeetingType,
        on_changed: impl FnOnce(),
    ) -> Result<ActionOutcome, ActionError> {
        let target = target.into();
        if target.status.is_closed() {
            return Err(self.fail(ActionError::NotAllowed(target.status)));
        }
        if !target.meeting_types.contains(&meeting_type) {
            return Err(self.fail(MeetingTypeNotOffered(meeting_type).into()));
        }
        if target.meeting_type == Some(meeting_type) {
            return Err(self.fail(ActionError::SameMeetingType));
        }
        let update = MeetingTypeUpdate {
            appointment_id: target.id,
            meeting_type,
        };
        match self.ctx.api.update_meeting_type(update).await {
            Ok(outcome) => Ok(self.succeed(outcome, "meetingTypeUpdated", on_changed)),
            Err(e) => {
                error!("Meeting type change for {} failed: {}", target.id, e);
                Err(self.fail(e.into()))
            }
        }
    }

    pub async fn reschedule(
        &self,
        form: &RescheduleForm,
        on_changed: impl FnOnce(),
    ) -> Result<ActionOutcome, ActionError> {
        let update = form.to_update().map_err(|e| self.fail(e))?;
        self.apply(update, "appointmentRescheduled", on_changed).await
    }

    /// Submits a prepared status transition.
    pub async fn apply(
        &self,
        update: StatusUpdate,
        success_key: &str,
        on_changed: impl FnOnce(),
    ) -> Result<ActionOutcome, ActionError> {
        let appointment_id = update.appointment_id;
        let status = update.status;
        match self.ctx.api.update_appointment_status(update).await {
            Ok(outcome) => {
                info!("Appointment {} moved to {}", appointment_id, status.as_str());
                Ok(self.succeed(outcome, success_key, on_changed))
            }
            Err(e) => {
                error!(
                    "Status update of {} to {} failed: {}",
                    appointment_id,
                    status.as_str(),
                    e
                );
                Err(self.fail(e.into()))
            }
        }
    }

    fn succeed(
        &self,
        outcome: ActionOutcome,
        success_key: &str,
        on_changed: impl FnOnce(),
    ) -> ActionOutcome {
        on_changed();
        self.ctx.notify_success(outcome.message.as_deref(), success_key);
        outcome
    }

    fn fail(&self, error: ActionError) -> ActionError {
        notify_failure(&self.ctx, error)
    }
}

fn notify_failure(ctx: &SchedulingContext, error: ActionError) -> ActionError {
    ctx.notifier
        .error(&error.user_message(ctx.translator.as_ref()));
    error
}

/// The reschedule dialog: a fresh schedule for the appointment's agent, a new
/// date/slot/meeting type and a reason.
pub struct RescheduleForm {
    ctx: SchedulingContext,
    appointment: Appointment,
    loader: ScheduleLoader,
    picker: SchedulePicker,
    reason: String,
}

impl RescheduleForm {
    pub fn new(ctx: SchedulingContext, appointment: Appointment) -> Result<Self, ActionError> {
        if appointment.status.is_closed() {
            return Err(notify_failure(&ctx, ActionError::NotAllowed(appointment.status)));
        }
        let Some(agent_id) = appointment.agent_id() else {
            error!("Appointment {} has no agent to reschedule with", appointment.id);
            return Err(notify_failure(&ctx, ActionError::MissingAgent));
        };
        let mut offered = appointment.meeting_type_options();
        if offered.is_empty() {
            offered = ctx.default_meeting_types.clone();
        }
        let picker = SchedulePicker::new(agent_id, ctx.settings.today(), offered);
        Ok(Self {
            loader: ScheduleLoader::new(ctx.api.clone()),
            ctx,
            appointment,
            picker,
            reason: String::new(),
        })
    }

    /// Creates the form and loads the current month's schedule.
    pub async fn open(ctx: SchedulingContext, appointment: Appointment) -> Result<Self, ActionError> {
        let mut form = Self::new(ctx, appointment)?;
        form.refresh_schedule().await?;
        Ok(form)
    }

    pub fn appointment(&self) -> &Appointment {
        &self.appointment
    }

    pub fn picker(&self) -> &SchedulePicker {
        &self.picker
    }

    pub async fn refresh_schedule(&mut self) -> Result<(), ActionError> {
        let today = self.ctx.settings.today();
        let month = self.picker.displayed_month();
        let agent_id = self.picker.agent_id();
        match self.loader.fetch(agent_id, month, today).await {
            Ok(Some(schedule)) => {
                self.picker.apply_schedule(schedule);
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(e) => {
                error!(
                    "Failed to load reschedule options of agent {} for appointment {}: {}",
                    agent_id, self.appointment.id, e
                );
                Err(self.fail(e.into()))
            }
        }
    }

    pub async fn change_month(&mut self, delta: i32) -> Result<YearMonth, ActionError> {
        let month = self
            .picker
            .change_month(delta, self.ctx.settings.today())
            .map_err(|e| self.fail(e.into()))?;
        self.refresh_schedule().await?;
        Ok(month)
    }

    pub fn select_date(&mut self, date: NaiveDate) -> Result<(), ActionError> {
        self.picker
            .select_date(date)
            .map_err(|e| self.fail(e.into()))
    }

    pub fn select_time_slot(&mut self, slot_id: i64) -> Result<(), ActionError> {
        match self.picker.select_time_slot(slot_id) {
            Ok(_) => Ok(()),
            Err(e) => Err(self.fail(e.into())),
        }
    }

    pub fn select_meeting_type(&mut self, meeting_type: MeetingType) -> Result<(), ActionError> {
        self.picker
            .select_meeting_type(meeting_type)
            .map_err(|e| self.fail(e.into()))
    }

    pub fn set_reason(&mut self, reason: impl Into<String>) {
        self.reason = reason.into();
    }

    pub fn to_update(&self) -> Result<StatusUpdate, ActionError> {
        reschedule_update(
            self.appointment.id,
            &self.reason,
            self.picker.selected_date(),
            self.picker.selected_slot(),
            self.picker.selected_meeting_type(),
        )
    }
    fn fail(&self, error: ActionError) -> ActionError {
        notify_failure(&self.ctx, error)
    }
}
