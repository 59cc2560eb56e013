//! Presentation projection: what the shell renders, derived from the model.

use serde::{Deserialize, Serialize};

use crate::event::SensitiveText;
use crate::mode::{EditTab, Mode};
use crate::model::{Model, PinField, ProfileField};
use crate::pipeline::MutationStatus;
use crate::query_cache::QueryKey;

pub const NOT_PROVIDED: &str = "Not provided";
pub const NEVER_LOGGED_IN: &str = "Never";

pub const SAVE_PROFILE_LABEL: &str = "Save Changes";
pub const SAVING_PROFILE_LABEL: &str = "Saving...";
pub const UPDATE_PIN_LABEL: &str = "Update PIN";
pub const UPDATING_PIN_LABEL: &str = "Updating...";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ViewModel {
    pub open: bool,
    pub mode: Mode,
    pub active_tab: Option<EditTab>,
    pub account: Option<AccountView>,
    pub profile: ProfileDisplay,
    pub profile_form: ProfileFormView,
    pub pin_form: PinFormView,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AccountView {
    pub username: String,
    pub role_label: String,
    pub company_name: Option<String>,
    pub is_active: bool,
    pub status_label: String,
    pub last_login: String,
    pub initials: String,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    /// Showing cached data while a fetch is in flight.
    Refreshing,
    Loaded,
    Failed,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ProfileDisplay {
    pub full_name: String,
    pub email: String,
    pub mobile: String,
    pub load_state: LoadState,
    pub load_error: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct FieldView<V> {
    pub name: String,
    pub value: V,
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ProfileFormView {
    pub fields: Vec<FieldView<String>>,
    pub submit_label: String,
    pub can_submit: bool,
    pub is_pending: bool,
    /// Outcome of the latest submission; back to `Idle` after the dialog closes.
    pub status: MutationStatus,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PinFormView {
    pub fields: Vec<FieldView<SensitiveText>>,
    pub submit_label: String,
    pub can_submit: bool,
    pub is_pending: bool,
    pub status: MutationStatus,
}

#[must_use]
pub fn project(model: &Model) -> ViewModel {
    ViewModel {
        open: model.dialog_open,
        mode: model.mode,
        active_tab: model.mode.edit_tab(),
        account: account_view(model),
        profile: profile_display(model),
        profile_form: profile_form_view(model),
        pin_form: pin_form_view(model),
    }
}

fn account_view(model: &Model) -> Option<AccountView> {
    let user = model.auth.user.as_ref()?;
    let record = model.cached_profile();

    let display_name = record
        .and_then(|r| r.full_name.as_deref())
        .filter(|n| !n.trim().is_empty())
        .unwrap_or(&user.username);

    Some(AccountView {
        username: user.username.clone(),
        role_label: user.role.label().to_string(),
        company_name: model.auth.company.as_ref().map(|c| c.name.clone()),
        is_active: user.is_active,
        status_label: if user.is_active { "Active" } else { "Inactive" }.to_string(),
        last_login: record
            .and_then(|r| r.last_login.clone())
            .unwrap_or_else(|| NEVER_LOGGED_IN.to_string()),
        initials: initials(display_name),
    })
}

/// Up to two uppercase initials from the first two words.
#[must_use]
pub fn initials(name: &str) -> String {
    let letters: String = name
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect();

    if letters.is_empty() {
        "?".to_string()
    } else {
        letters
    }
}

fn or_placeholder(value: Option<&String>) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .cloned()
        .unwrap_or_else(|| NOT_PROVIDED.to_string())
}

fn profile_display(model: &Model) -> ProfileDisplay {
    let entry = model
        .current_user_id()
        .and_then(|id| model.profile_cache.entry(&QueryKey::profile(id.clone())));
    let record = entry.and_then(|e| e.data());

    let load_state = match entry {
        None => LoadState::Idle,
        Some(e) if e.is_fetching() && e.data().is_some() => LoadState::Refreshing,
        Some(e) if e.is_fetching() => LoadState::Loading,
        Some(e) if e.last_error().is_some() => LoadState::Failed,
        Some(e) if e.data().is_some() => LoadState::Loaded,
        Some(_) => LoadState::Idle,
    };

    ProfileDisplay {
        full_name: or_placeholder(record.and_then(|r| r.full_name.as_ref())),
        email: or_placeholder(record.and_then(|r| r.email.as_ref())),
        mobile: or_placeholder(record.and_then(|r| r.mobile.as_ref())),
        load_state,
        load_error: entry
            .and_then(|e| e.last_error())
            .map(|e| e.message.clone()),
    }
}

fn profile_form_view(model: &Model) -> ProfileFormView {
    let form = &model.profile_form;
    let is_pending = model.profile_pipeline.is_pending();

    ProfileFormView {
        fields: ProfileField::ALL
            .iter()
            .map(|&field| FieldView {
                name: field.as_str().to_string(),
                value: form.get(field).to_string(),
                error: form.errors.get(&field).cloned(),
            })
            .collect(),
        submit_label: if is_pending {
            SAVING_PROFILE_LABEL
        } else {
            SAVE_PROFILE_LABEL
        }
        .to_string(),
        can_submit: !is_pending && model.auth.user.is_some(),
        is_pending,
        status: model.profile_pipeline.status().clone(),
    }
}

fn pin_form_view(model: &Model) -> PinFormView {
    let form = &model.pin_form;
    let is_pending = model.pin_pipeline.is_pending();

    PinFormView {
        fields: PinField::ALL
            .iter()
            .map(|&field| FieldView {
                name: field.as_str().to_string(),
                value: form.get(field).clone(),
                error: form.errors.get(&field).cloned(),
            })
            .collect(),
        submit_label: if is_pending {
            UPDATING_PIN_LABEL
        } else {
            UPDATE_PIN_LABEL
        }
        .to_string(),
        can_submit: !is_pending && model.auth.user.is_some(),
        is_pending,
        status: model.pin_pipeline.status().clone(),
    }
}
