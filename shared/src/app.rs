use tracing::{debug, info, warn};

use crate::api::{self, ApiConfig, UpdatePinRequest, UpdateProfileRequest};
use crate::capabilities::{Capabilities, Toast};
use crate::error::{ApiError, ErrorKind};
use crate::event::{Event, SensitiveText};
use crate::mode::{Mode, ModeCommand};
use crate::model::{
    AuthContext, Model, PinField, PinForm, ProfileField, ProfileForm, ProfileRecord, Session,
    UserId,
};
use crate::pipeline::{MutationId, MutationPipeline};
use crate::query_cache::QueryKey;
use crate::sync::{FetchRequest, SyncOutcome};
use crate::validation::{validate_pin, validate_profile};
use crate::view::{self, ViewModel};

pub const PROFILE_UPDATED_TITLE: &str = "Profile updated";
pub const PROFILE_UPDATED_DESCRIPTION: &str = "Your profile has been updated successfully.";
pub const PROFILE_FAILED_TITLE: &str = "Update failed";
pub const PIN_UPDATED_TITLE: &str = "PIN updated";
pub const PIN_UPDATED_DESCRIPTION: &str = "Your PIN has been changed successfully.";
pub const PIN_FAILED_TITLE: &str = "PIN update failed";

#[derive(Default)]
pub struct App;

impl App {
    // --- Session & dialog ---

    fn start_session(session: Session, model: &mut Model, caps: &Capabilities) {
        let Session {
            user,
            company,
            access_token,
        } = session;

        if model.auth.user_id() != Some(&user.id) {
            info!(user_id = %user.id, "session user changed");
            model.profile_cache.retain_user(&user.id);
            Self::reset_user_state(model);
        }

        model.auth = AuthContext {
            user: Some(user),
            company,
            access_token,
        };
        Self::sync_profile(model, caps);
    }

    fn end_session(model: &mut Model, caps: &Capabilities) {
        info!("session ended");
        model.auth = AuthContext::default();
        model.profile_cache.clear();
        Self::reset_user_state(model);
        Self::sync_profile(model, caps);
    }

    fn reset_user_state(model: &mut Model) {
        model.mode = Mode::View;
        model.profile_form = ProfileForm::default();
        model.pin_form.clear();
        model.profile_pipeline = MutationPipeline::default();
        model.pin_pipeline = MutationPipeline::default();
    }

    /// Only the open/closed edges matter; a repeated `open` keeps the mode.
    fn set_dialog_open(open: bool, model: &mut Model, caps: &Capabilities) {
        if open == model.dialog_open {
            return;
        }
        model.dialog_open = open;

        if !open {
            Self::apply_mode(ModeCommand::Close, model);
            model.pin_form.clear();
            model.profile_pipeline.reset_if_settled();
            model.pin_pipeline.reset_if_settled();
        }

        Self::sync_profile(model, caps);
    }

    // --- Mode ---

    fn apply_mode(command: ModeCommand, model: &mut Model) -> bool {
        match model.mode.transition(command) {
            Ok(next) => {
                if next != model.mode {
                    debug!(from = ?model.mode, to = ?next, "mode changed");
                }
                model.mode = next;
                true
            }
            Err(e) => {
                debug!(error = %e, "mode command ignored");
                false
            }
        }
    }

    /// Leaving the edit parent discards unsaved input on both tabs.
    fn cancel_edit(model: &mut Model) {
        if !Self::apply_mode(ModeCommand::Cancel, model) {
            return;
        }
        match model.cached_profile().cloned() {
            Some(record) => model.profile_form.overwrite_from(&record),
            None => model.profile_form = ProfileForm::default(),
        }
        model.pin_form.clear();
    }

    // --- Forms ---

    fn edit_profile_field(field: ProfileField, value: String, model: &mut Model) {
        if model.mode != Mode::EditProfile {
            debug!(field = field.as_str(), mode = ?model.mode, "profile edit outside edit mode");
            return;
        }
        let form = &mut model.profile_form;
        form.set(field, value);
        if form.submitted {
            form.errors = validate_profile(form).err().unwrap_or_default();
        }
    }

    fn edit_pin_field(field: PinField, value: SensitiveText, model: &mut Model) {
        if model.mode != Mode::EditPin {
            debug!(field = field.as_str(), mode = ?model.mode, "pin edit outside edit mode");
            return;
        }
        let form = &mut model.pin_form;
        form.set(field, value);
        if form.submitted {
            form.errors = validate_pin(form).err().unwrap_or_default();
        }
    }

    // --- Profile sync ---

    fn sync_profile(model: &mut Model, caps: &Capabilities) {
        let request = model.sync.reconcile(
            model.auth.user_id(),
            model.dialog_open,
            &mut model.profile_cache,
            &mut model.profile_form,
        );
        if let Some(request) = request {
            Self::send_fetch(request, model, caps);
        }
    }

    fn send_fetch(request: FetchRequest, model: &mut Model, caps: &Capabilities) {
        let FetchRequest { key, generation } = request;

        let url = match model.config.profile_url(&key.user_id) {
            Ok(url) => url,
            Err(e) => {
                warn!(key = %key, error = %e, "cannot build profile url");
                model.profile_cache.resolve(
                    &key,
                    generation,
                    Err(ApiError::new(ErrorKind::Unknown, e.to_string())),
                );
                return;
            }
        };

        info!(key = %key, generation, "fetching profile");

        let mut builder = caps.http.get(&url).header("Accept", "application/json");
        if let Some(token) = &model.auth.access_token {
            builder = builder.header("Authorization", &format!("Bearer {}", token.expose()));
        }

        builder.send(move |result| Event::ProfileFetched {
            key,
            generation,
            outcome: Box::new(api::decode_json(result)),
        });
    }

    fn on_profile_fetched(
        key: &QueryKey,
        generation: u64,
        outcome: Result<ProfileRecord, ApiError>,
        model: &mut Model,
    ) {
        if let Err(e) = &outcome {
            warn!(key = %key, generation, error = %e, "profile fetch failed");
        }

        let result = model.sync.on_fetched(
            key,
            generation,
            outcome,
            &mut model.profile_cache,
            &mut model.profile_form,
        );

        match result {
            SyncOutcome::Synced => debug!(key = %key, generation, "profile form synced"),
            SyncOutcome::CachedOnly => debug!(key = %key, generation, "profile cached"),
            SyncOutcome::Discarded => debug!(key = %key, generation, "stale profile response dropped"),
            SyncOutcome::Failed => {}
        }
    }

    // --- Mutations ---

    fn submit_profile(model: &mut Model, caps: &Capabilities) {
        if model.mode != Mode::EditProfile {
            debug!(mode = ?model.mode, "profile submit outside edit mode");
            return;
        }
        if let Some(in_flight) = model.profile_pipeline.in_flight() {
            debug!(mutation_id = %in_flight, "profile submit ignored while pending");
            return;
        }
        let Some(user_id) = model.auth.user_id().cloned() else {
            warn!("profile submit without a signed-in user");
            return;
        };

        let form = &mut model.profile_form;
        form.submitted = true;
        if let Err(errors) = validate_profile(form) {
            debug!(fields = errors.len(), "profile form invalid");
            form.errors = errors;
            return;
        }
        form.errors.clear();

        let url = match model.config.profile_url(&user_id) {
            Ok(url) => url,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "cannot build profile url");
                return;
            }
        };

        let body = UpdateProfileRequest {
            full_name: &model.profile_form.full_name,
            email: &model.profile_form.email,
            mobile: &model.profile_form.mobile,
        };
        let builder = match caps.http.patch(&url).body_json(&body) {
            Ok(builder) => builder,
            Err(e) => {
                warn!(error = %e, "profile update serialize failed");
                return;
            }
        };

        let mutation_id = match model.profile_pipeline.begin() {
            Ok(id) => id,
            Err(e) => {
                debug!(error = %e, "profile submit rejected");
                return;
            }
        };

        info!(user_id = %user_id, mutation_id = %mutation_id, "updating profile");

        let mut builder = builder
            .header("Accept", "application/json")
            .header("Idempotency-Key", &mutation_id.to_string());
        if let Some(token) = &model.auth.access_token {
            builder = builder.header("Authorization", &format!("Bearer {}", token.expose()));
        }

        builder.send(move |result| Event::ProfileUpdated {
            user_id,
            mutation_id,
            outcome: Box::new(api::decode_json(result)),
        });
    }

    fn submit_pin(model: &mut Model, caps: &Capabilities) {
        if model.mode != Mode::EditPin {
            debug!(mode = ?model.mode, "pin submit outside edit mode");
            return;
        }
        if let Some(in_flight) = model.pin_pipeline.in_flight() {
            debug!(mutation_id = %in_flight, "pin submit ignored while pending");
            return;
        }
        let Some(user_id) = model.auth.user_id().cloned() else {
            warn!("pin submit without a signed-in user");
            return;
        };

        let form = &mut model.pin_form;
        form.submitted = true;
        if let Err(errors) = validate_pin(form) {
            debug!(fields = errors.len(), "pin form invalid");
            form.errors = errors;
            return;
        }
        form.errors.clear();

        let url = match model.config.pin_url(&user_id) {
            Ok(url) => url,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "cannot build pin url");
                return;
            }
        };

        let body = UpdatePinRequest {
            current_pin: model.pin_form.current_pin.expose(),
            new_pin: model.pin_form.new_pin.expose(),
        };
        let builder = match caps.http.patch(&url).body_json(&body) {
            Ok(builder) => builder,
            Err(e) => {
                warn!(error = %e, "pin update serialize failed");
                return;
            }
        };

        let mutation_id = match model.pin_pipeline.begin() {
            Ok(id) => id,
            Err(e) => {
                debug!(error = %e, "pin submit rejected");
                return;
            }
        };

        info!(user_id = %user_id, mutation_id = %mutation_id, "updating pin");

        let mut builder = builder.header("Idempotency-Key", &mutation_id.to_string());
        if let Some(token) = &model.auth.access_token {
            builder = builder.header("Authorization", &format!("Bearer {}", token.expose()));
        }

        builder.send(move |result| Event::PinUpdated {
            user_id,
            mutation_id,
            outcome: Box::new(api::decode_empty(result)),
        });
    }

    fn on_profile_updated(
        user_id: UserId,
        mutation_id: MutationId,
        outcome: Result<ProfileRecord, ApiError>,
        model: &mut Model,
        caps: &Capabilities,
    ) {
        let settled = model.profile_pipeline.settle(
            mutation_id,
            outcome.as_ref().map(|_| ()).map_err(|e| e.message.clone()),
        );
        if !settled {
            debug!(mutation_id = %mutation_id, "profile pipeline was reset before resolution");
        }
        let same_user = model.auth.user_id() == Some(&user_id);

        match outcome {
            Ok(record) => {
                info!(user_id = %user_id, mutation_id = %mutation_id, "profile update confirmed");

                if same_user {
                    model.profile_form.overwrite_from(&record);
                    Self::apply_mode(ModeCommand::MutationSucceeded, model);
                }

                let key = QueryKey::profile(user_id);
                model.profile_cache.invalidate(&key);
                if let Some(request) = model.sync.refetch(&key, &mut model.profile_cache) {
                    Self::send_fetch(request, model, caps);
                }

                caps.notify.show(Toast::success(
                    PROFILE_UPDATED_TITLE,
                    PROFILE_UPDATED_DESCRIPTION,
                ));
            }
            Err(e) => {
                warn!(user_id = %user_id, mutation_id = %mutation_id, error = %e, "profile update failed");
                caps.notify.show(Toast::failure(PROFILE_FAILED_TITLE, e.message));
            }
        }
    }

    fn on_pin_updated(
        user_id: &UserId,
        mutation_id: MutationId,
        outcome: Result<(), ApiError>,
        model: &mut Model,
        caps: &Capabilities,
    ) {
        let settled = model.pin_pipeline.settle(
            mutation_id,
            outcome.as_ref().map_err(|e| e.message.clone()).copied(),
        );
        if !settled {
            debug!(mutation_id = %mutation_id, "pin pipeline was reset before resolution");
        }

        match outcome {
            Ok(()) => {
                info!(user_id = %user_id, mutation_id = %mutation_id, "pin update confirmed");
                if model.auth.user_id() == Some(user_id) {
                    model.pin_form = PinForm::default();
                    Self::apply_mode(ModeCommand::MutationSucceeded, model);
                }
                caps.notify
                    .show(Toast::success(PIN_UPDATED_TITLE, PIN_UPDATED_DESCRIPTION));
            }
            Err(e) => {
                warn!(user_id = %user_id, mutation_id = %mutation_id, error = %e, "pin update failed");
                caps.notify.show(Toast::failure(PIN_FAILED_TITLE, e.message));
            }
        }
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        debug!(
            event = event.name(),
            user_initiated = event.is_user_initiated(),
            "update"
        );

        match event {
            Event::Configure { base_url } => match ApiConfig::new(base_url) {
                Ok(config) => {
                    info!(base_url = config.base_url(), "api configured");
                    model.config = config;
                }
                Err(e) => warn!(error = %e, "api configuration rejected"),
            },

            Event::SessionStarted(session) => Self::start_session(*session, model, caps),
            Event::SessionEnded => Self::end_session(model, caps),

            Event::DialogOpenChanged { open } => Self::set_dialog_open(open, model, caps),
            Event::CloseRequested => caps.dialog.request_close(),

            Event::EditRequested if !model.dialog_open => {
                debug!("edit requested while dialog closed");
            }
            Event::EditRequested => {
                Self::apply_mode(ModeCommand::RequestEdit, model);
            }
            Event::EditTabSelected { tab } => {
                Self::apply_mode(ModeCommand::SelectTab(tab), model);
            }
            Event::EditCancelled => Self::cancel_edit(model),

            Event::ProfileFieldEdited { field, value } => {
                Self::edit_profile_field(field, value, model);
            }
            Event::PinFieldEdited { field, value } => Self::edit_pin_field(field, value, model),
            Event::ProfileSubmitted => Self::submit_profile(model, caps),
            Event::PinSubmitted => Self::submit_pin(model, caps),

            Event::ProfileFetched {
                key,
                generation,
                outcome,
            } => Self::on_profile_fetched(&key, generation, *outcome, model),
            Event::ProfileUpdated {
                user_id,
                mutation_id,
                outcome,
            } => Self::on_profile_updated(user_id, mutation_id, *outcome, model, caps),
            Event::PinUpdated {
                user_id,
                mutation_id,
                outcome,
            } => Self::on_pin_updated(&user_id, mutation_id, *outcome, model, caps),
        }

        caps.render.render();
    }

    fn view(&self, model: &Model) -> ViewModel {
        view::project(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{DialogOperation, Effect, NotifyOperation, Severity};
    use crate::model::{Identity, Role};
    use crux_core::testing::AppTester;

    fn session(id: &str) -> Event {
        Event::SessionStarted(Box::new(Session {
            user: Identity {
                id: UserId::new(id),
                username: format!("user-{id}"),
                role: Role::Admin,
                is_active: true,
            },
            company: None,
            access_token: Some("tok".into()),
        }))
    }

    #[test]
    fn invalid_configuration_keeps_previous() {
        let app = AppTester::<App, _>::default();
        let mut model = Model::default();

        app.update(
            Event::Configure {
                base_url: "https://accounts.acme.test/api".into(),
            },
            &mut model,
        );
        app.update(
            Event::Configure {
                base_url: "ftp://nope".into(),
            },
            &mut model,
        );

        assert_eq!(model.config.base_url(), "https://accounts.acme.test/api/");
    }

    #[test]
    fn close_request_asks_host_and_keeps_open_flag() {
        let app = AppTester::<App, _>::default();
        let mut model = Model::default();
        app.update(Event::DialogOpenChanged { open: true }, &mut model);

        let update = app.update(Event::CloseRequested, &mut model);

        assert!(model.dialog_open);
        assert!(update.effects.iter().any(|e| matches!(
            e,
            Effect::Dialog(req) if req.operation == DialogOperation::RequestClose
        )));
    }

    #[test]
    fn opening_without_user_does_not_fetch() {
        let app = AppTester::<App, _>::default();
        let mut model = Model::default();

        let update = app.update(Event::DialogOpenChanged { open: true }, &mut model);

        assert!(!update.effects.iter().any(|e| matches!(e, Effect::Http(_))));
        assert!(update.effects.iter().any(|e| matches!(e, Effect::Render(_))));
    }

    #[test]
    fn edits_outside_edit_mode_are_ignored() {
        let app = AppTester::<App, _>::default();
        let mut model = Model::default();
        app.update(session("u1"), &mut model);

        app.update(
            Event::ProfileFieldEdited {
                field: ProfileField::FullName,
                value: "Nope".into(),
            },
            &mut model,
        );

        assert_eq!(model.profile_form.full_name, "");
    }

    #[test]
    fn session_switch_resets_forms_and_mode() {
        let app = AppTester::<App, _>::default();
        let mut model = Model::default();
        app.update(session("u1"), &mut model);
        app.update(Event::DialogOpenChanged { open: true }, &mut model);
        app.update(Event::EditRequested, &mut model);
        app.update(
            Event::ProfileFieldEdited {
                field: ProfileField::Mobile,
                value: "555".into(),
            },
            &mut model,
        );

        let update = app.update(session("u2"), &mut model);

        assert_eq!(model.mode, Mode::View);
        assert_eq!(model.profile_form.mobile, "");
        assert!(model
            .profile_cache
            .entry(&QueryKey::profile(UserId::new("u1")))
            .is_none());
        assert!(update.effects.iter().any(|e| matches!(e, Effect::Http(_))));
    }

    #[test]
    fn failure_toast_carries_server_message() {
        let app = AppTester::<App, _>::default();
        let mut model = Model::default();
        app.update(session("u1"), &mut model);

        let update = app.update(
            Event::PinUpdated {
                user_id: UserId::new("u1"),
                mutation_id: MutationId::generate(),
                outcome: Box::new(Err(ApiError::from_http_status(
                    400,
                    Some(br#"{"message":"Current PIN is incorrect"}"#),
                ))),
            },
            &mut model,
        );

        let toast = update
            .effects
            .iter()
            .find_map(|e| match e {
                Effect::Notify(req) => match &req.operation {
                    NotifyOperation::Show(toast) => Some(toast.clone()),
                },
                _ => None,
            })
            .unwrap();
        assert_eq!(toast.title, PIN_FAILED_TITLE);
        assert_eq!(toast.description.as_deref(), Some("Current PIN is incorrect"));
        assert_eq!(toast.severity, Severity::Destructive);
    }
}
