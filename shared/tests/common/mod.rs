#![allow(dead_code)]

use crux_core::testing::AppTester;
use crux_http::protocol::HttpRequest;
use profile_dialog::capabilities::{NotifyOperation, Toast};
use profile_dialog::query_cache::QueryKey;
use profile_dialog::{App, Effect, Event, Identity, Model, ProfileRecord, Role, Session, UserId};

pub type Tester = AppTester<App, Effect>;

pub fn session(id: &str) -> Event {
    Event::SessionStarted(Box::new(Session {
        user: Identity {
            id: UserId::new(id),
            username: format!("user-{id}"),
            role: Role::Gst,
            is_active: true,
        },
        company: None,
        access_token: Some("secret-token".into()),
    }))
}

pub fn record(full_name: &str, email: &str, mobile: &str) -> ProfileRecord {
    ProfileRecord {
        full_name: Some(full_name.into()),
        email: Some(email.into()),
        mobile: Some(mobile.into()),
        last_login: None,
    }
}

pub fn http_requests(effects: &[Effect]) -> Vec<&HttpRequest> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::Http(req) => Some(&req.operation),
            _ => None,
        })
        .collect()
}

pub fn toasts(effects: &[Effect]) -> Vec<Toast> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::Notify(req) => match &req.operation {
                NotifyOperation::Show(toast) => Some(toast.clone()),
            },
            _ => None,
        })
        .collect()
}

pub fn header<'a>(request: &'a HttpRequest, name: &str) -> Option<&'a str> {
    request
        .headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
        .map(|h| h.value.as_str())
}

pub fn json_body(request: &HttpRequest) -> serde_json::Value {
    serde_json::from_slice(&request.body).expect("request body is JSON")
}

pub fn fetched(user: &str, generation: u64, record: ProfileRecord) -> Event {
    Event::ProfileFetched {
        key: QueryKey::profile(UserId::new(user)),
        generation,
        outcome: Box::new(Ok(record)),
    }
}

/// Signed in as `user`, dialog open, initial fetch resolved with `initial`.
pub fn opened_with(app: &Tester, user: &str, initial: ProfileRecord) -> Model {
    let mut model = Model::default();
    app.update(session(user), &mut model);
    app.update(Event::DialogOpenChanged { open: true }, &mut model);
    app.update(fetched(user, 0, initial), &mut model);
    model
}
