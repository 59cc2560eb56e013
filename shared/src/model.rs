use serde::{Deserialize, Serialize};
use std::fmt;

use crate::api::ApiConfig;
use crate::event::SensitiveText;
use crate::mode::Mode;
use crate::pipeline::MutationPipeline;
use crate::query_cache::QueryCache;
use crate::sync::ProfileSync;
use crate::validation::FieldErrors;

// --- Typed IDs ---

macro_rules! typed_id {
    ($name:ident) => {
        #[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

typed_id!(UserId);

// --- Session identity (owned by the auth context, read-only here) ---

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Gst,
    NonGst,
    #[serde(other)]
    Other,
}

impl Role {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Admin => "Administrator",
            Self::Gst => "GST User",
            Self::NonGst => "Non-GST User",
            Self::Other => "User",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: UserId,
    pub username: String,
    pub role: Role,
    pub is_active: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Company {
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: Identity,
    pub company: Option<Company>,
    #[serde(default)]
    pub access_token: Option<SensitiveText>,
}

#[derive(Debug, Default)]
pub struct AuthContext {
    pub user: Option<Identity>,
    pub company: Option<Company>,
    pub access_token: Option<SensitiveText>,
}

impl AuthContext {
    #[must_use]
    pub fn user_id(&self) -> Option<&UserId> {
        self.user.as_ref().map(|u| &u.id)
    }
}

// --- Server-owned profile record ---

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub last_login: Option<String>,
}

// --- Form fields ---

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum ProfileField {
    FullName,
    Email,
    Mobile,
}

impl ProfileField {
    pub const ALL: [Self; 3] = [Self::FullName, Self::Email, Self::Mobile];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FullName => "fullName",
            Self::Email => "email",
            Self::Mobile => "mobile",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum PinField {
    CurrentPin,
    NewPin,
    ConfirmPin,
}

impl PinField {
    pub const ALL: [Self; 3] = [Self::CurrentPin, Self::NewPin, Self::ConfirmPin];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CurrentPin => "currentPin",
            Self::NewPin => "newPin",
            Self::ConfirmPin => "confirmPin",
        }
    }
}

/// Working copy of the editable subset of [`ProfileRecord`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub full_name: String,
    pub email: String,
    pub mobile: String,
    pub errors: FieldErrors<ProfileField>,
    /// Set once a submit has been attempted; edits re-validate from then on.
    pub submitted: bool,
}

impl ProfileForm {
    #[must_use]
    pub fn from_record(record: &ProfileRecord) -> Self {
        Self {
            full_name: record.full_name.clone().unwrap_or_default(),
            email: record.email.clone().unwrap_or_default(),
            mobile: record.mobile.clone().unwrap_or_default(),
            ..Self::default()
        }
    }

    /// Replaces values and clears validation state.
    pub fn overwrite_from(&mut self, record: &ProfileRecord) {
        *self = Self::from_record(record);
    }

    #[must_use]
    pub fn get(&self, field: ProfileField) -> &str {
        match field {
            ProfileField::FullName => &self.full_name,
            ProfileField::Email => &self.email,
            ProfileField::Mobile => &self.mobile,
        }
    }

    pub fn set(&mut self, field: ProfileField, value: String) {
        match field {
            ProfileField::FullName => self.full_name = value,
            ProfileField::Email => self.email = value,
            ProfileField::Mobile => self.mobile = value,
        }
    }
}

/// Transient PIN rotation inputs. Never persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PinForm {
    pub current_pin: SensitiveText,
    pub new_pin: SensitiveText,
    pub confirm_pin: SensitiveText,
    pub errors: FieldErrors<PinField>,
    pub submitted: bool,
}

impl PinForm {
    #[must_use]
    pub fn get(&self, field: PinField) -> &SensitiveText {
        match field {
            PinField::CurrentPin => &self.current_pin,
            PinField::NewPin => &self.new_pin,
            PinField::ConfirmPin => &self.confirm_pin,
        }
    }

    pub fn set(&mut self, field: PinField, value: SensitiveText) {
        match field {
            PinField::CurrentPin => self.current_pin = value,
            PinField::NewPin => self.new_pin = value,
            PinField::ConfirmPin => self.confirm_pin = value,
        }
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.current_pin.is_empty() && self.new_pin.is_empty() && self.confirm_pin.is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Default)]
pub struct Model {
    pub config: ApiConfig,
    pub auth: AuthContext,

    // Host-owned open flag; the core only mirrors it.
    pub dialog_open: bool,
    pub mode: Mode,

    pub profile_form: ProfileForm,
    pub pin_form: PinForm,

    pub profile_cache: QueryCache<ProfileRecord>,
    pub sync: ProfileSync,

    pub profile_pipeline: MutationPipeline,
    pub pin_pipeline: MutationPipeline,
}

impl Model {
    #[must_use]
    pub fn current_user_id(&self) -> Option<&UserId> {
        self.auth.user_id()
    }

    /// Record currently cached for the signed-in user, if any.
    #[must_use]
    pub fn cached_profile(&self) -> Option<&ProfileRecord> {
        let user_id = self.current_user_id()?;
        self.profile_cache
            .data(&crate::query_cache::QueryKey::profile(user_id.clone()))
    }
}
