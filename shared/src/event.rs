use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::Zeroizing;

use crate::error::ApiError;
use crate::model::{PinField, ProfileField, ProfileRecord, Session, UserId};
use crate::mode::EditTab;
use crate::pipeline::MutationId;
use crate::query_cache::QueryKey;

// --- Sensitive text: redacts Debug, zeroizes on Drop ---

#[derive(Default)]
pub struct SensitiveText(Zeroizing<String>);

impl SensitiveText {
    pub fn new(s: impl Into<String>) -> Self {
        Self(Zeroizing::new(s.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

impl Clone for SensitiveText {
    fn clone(&self) -> Self {
        Self::new(self.expose())
    }
}

impl PartialEq for SensitiveText {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl Eq for SensitiveText {}

impl fmt::Debug for SensitiveText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<&str> for SensitiveText {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl Serialize for SensitiveText {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.expose())
    }
}

impl<'de> Deserialize<'de> for SensitiveText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

// --- Event enum: shell-originated first, capability responses last ---

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Event {
    // Configuration & session
    Configure {
        base_url: String,
    },
    SessionStarted(Box<Session>),
    SessionEnded,

    // Host dialog
    DialogOpenChanged {
        open: bool,
    },
    CloseRequested,

    // Mode
    EditRequested,
    EditTabSelected {
        tab: EditTab,
    },
    EditCancelled,

    // Forms
    ProfileFieldEdited {
        field: ProfileField,
        value: String,
    },
    PinFieldEdited {
        field: PinField,
        value: SensitiveText,
    },
    ProfileSubmitted,
    PinSubmitted,

    // Capability responses (boxed to keep enum size small)
    ProfileFetched {
        key: QueryKey,
        generation: u64,
        outcome: Box<Result<ProfileRecord, ApiError>>,
    },
    ProfileUpdated {
        user_id: UserId,
        mutation_id: MutationId,
        outcome: Box<Result<ProfileRecord, ApiError>>,
    },
    PinUpdated {
        user_id: UserId,
        mutation_id: MutationId,
        outcome: Box<Result<(), ApiError>>,
    },
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Configure { .. } => "configure",
            Self::SessionStarted(_) => "session_started",
            Self::SessionEnded => "session_ended",
            Self::DialogOpenChanged { .. } => "dialog_open_changed",
            Self::CloseRequested => "close_requested",
            Self::EditRequested => "edit_requested",
            Self::EditTabSelected { .. } => "edit_tab_selected",
            Self::EditCancelled => "edit_cancelled",
            Self::ProfileFieldEdited { .. } => "profile_field_edited",
            Self::PinFieldEdited { .. } => "pin_field_edited",
            Self::ProfileSubmitted => "profile_submitted",
            Self::PinSubmitted => "pin_submitted",
            Self::ProfileFetched { .. } => "profile_fetched",
            Self::ProfileUpdated { .. } => "profile_updated",
            Self::PinUpdated { .. } => "pin_updated",
        }
    }

    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Self::CloseRequested
                | Self::EditRequested
                | Self::EditTabSelected { .. }
                | Self::EditCancelled
                | Self::ProfileFieldEdited { .. }
                | Self::PinFieldEdited { .. }
                | Self::ProfileSubmitted
                | Self::PinSubmitted
        )
    }
}
