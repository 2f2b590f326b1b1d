// --- File: crates/estately_appointments/src/meeting_type.rs ---
//! Meeting types an agent can offer, and the selector used by the booking and
//! reschedule flows.
//!
//! Agents advertise their meeting types as a comma-separated capability string
//! (`"virtual,phone,in_person"`). This module is the only place that string is
//! parsed and the only place a type is mapped to its icon and label.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum MeetingType {
    Virtual,
    Phone,
    InPerson,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown meeting type: {0}")]
pub struct UnknownMeetingType(pub String);

impl MeetingType {
    pub const ALL: [MeetingType; 3] = [MeetingType::Virtual, MeetingType::Phone, MeetingType::InPerson];

    /// Wire value sent to the marketplace API.
    pub fn as_str(&self) -> &'static str {
        match self {
            MeetingType::Virtual => "virtual",
            MeetingType::Phone => "phone",
            MeetingType::InPerson => "in_person",
        }
    }

    /// Translation key for the display label.
    pub fn label_key(&self) -> &'static str {
        match self {
            MeetingType::Virtual => "virtual",
            MeetingType::Phone => "phone",
            MeetingType::InPerson => "inPerson",
        }
    }

    /// Icon tag the front-end maps to an icon component.
    pub fn icon(&self) -> &'static str {
        match self {
            MeetingType::Virtual => "video",
            MeetingType::Phone => "phone",
            MeetingType::InPerson => "building",
        }
    }

    /// Parses a capability string, keeping the first occurrence of each known
    /// type in order. Unknown tokens and blanks are skipped.
    pub fn parse_list(raw: &str) -> Vec<MeetingType> {
        let mut types = Vec::new();
        for token in raw.split(',') {
            if let Ok(meeting_type) = token.parse::<MeetingType>() {
                if !types.contains(&meeting_type) {
                    types.push(meeting_type);
                }
            }
        }
        types
    }

    /// Inverse of [`MeetingType::parse_list`].
    pub fn join_list(types: &[MeetingType]) -> String {
        types
            .iter()
            .map(MeetingType::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl FromStr for MeetingType {
    type Err = UnknownMeetingType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "virtual" | "video" | "online" => Ok(MeetingType::Virtual),
            "phone" | "call" => Ok(MeetingType::Phone),
            "in_person" | "inperson" | "offline" => Ok(MeetingType::InPerson),
            _ => Err(UnknownMeetingType(s.trim().to_string())),
        }
    }
}

impl fmt::Display for MeetingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One selectable option as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MeetingTypeOption {
    pub value: MeetingType,
    pub label_key: &'static str,
    pub icon: &'static str,
}

impl From<MeetingType> for MeetingTypeOption {
    fn from(value: MeetingType) -> Self {
        Self {
            value,
            label_key: value.label_key(),
            icon: value.icon(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Meeting type {0} is not offered")]
pub struct MeetingTypeNotOffered(pub MeetingType);

/// Tracks the offered meeting types and the user's choice.
#[derive(Debug, Clone, Default)]
pub struct MeetingTypeSelector {
    options: Vec<MeetingTypeOption>,
    selected: Option<MeetingType>,
}

impl MeetingTypeSelector {
    pub fn new(types: &[MeetingType]) -> Self {
        Self {
            options: types.iter().copied().map(MeetingTypeOption::from).collect(),
            selected: None,
        }
    }

    pub fn from_capabilities(raw: &str) -> Self {
        Self::new(&MeetingType::parse_list(raw))
    }

    pub fn options(&self) -> &[MeetingTypeOption] {
        &self.options
    }

    pub fn offers(&self, meeting_type: MeetingType) -> bool {
        self.options.iter().any(|o| o.value == meeting_type)
    }

    /// Replaces the offered types. A selection that is no longer offered is dropped.
    pub fn set_options(&mut self, types: &[MeetingType]) {
        self.options = types.iter().copied().map(MeetingTypeOption::from).collect();
        if let Some(current) = self.selected {
            if !self.offers(current) {
                self.selected = None;
            }
        }
    }

    pub fn select(&mut self, meeting_type: MeetingType) -> Result<(), MeetingTypeNotOffered> {
        if !self.offers(meeting_type) {
            return Err(MeetingTypeNotOffered(meeting_type));
        }
        self.selected = Some(meeting_type);
        Ok(())
    }

    pub fn selected(&self) -> Option<MeetingType> {
        self.selected
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }
}
