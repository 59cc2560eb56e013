//! Server contract: base URL configuration, endpoints, request bodies and
//! response decoding. Transport itself is the shell's `crux_http` capability.

use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Display;
use thiserror::Error;
use url::Url;

use crate::error::{ApiError, ErrorKind};
use crate::model::UserId;

pub const DEFAULT_API_BASE_URL: &str = "https://api.example.com/v1/";
pub const MAX_URL_LENGTH: usize = 2048;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Shell-provided API settings. The base URL is stored normalised with a
/// trailing slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ConfigError> {
        let raw = base_url.into();
        let invalid = |reason: &str| ConfigError::InvalidBaseUrl {
            url: truncate_url(&raw),
            reason: reason.to_string(),
        };

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(invalid("URL cannot be empty"));
        }
        if trimmed.len() > MAX_URL_LENGTH {
            return Err(invalid("URL too long"));
        }

        let parsed = Url::parse(trimmed).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(parsed.scheme(), "https" | "http") {
            return Err(invalid("scheme must be http or https"));
        }
        if parsed.host_str().is_none() {
            return Err(invalid("URL must have a host"));
        }
        if !parsed.username().is_empty() || parsed.password().is_some() {
            return Err(invalid("credentials in URL not allowed"));
        }
        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(invalid("query and fragment not allowed"));
        }

        let mut base_url = String::from(parsed);
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Ok(Self { base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}users/{id}/profile`, with the id percent-encoded as one segment.
    pub fn profile_url(&self, user_id: &UserId) -> Result<String, ConfigError> {
        self.endpoint(&["users", user_id.as_str(), "profile"])
    }

    pub fn pin_url(&self, user_id: &UserId) -> Result<String, ConfigError> {
        self.endpoint(&["users", user_id.as_str(), "pin"])
    }

    fn endpoint(&self, segments: &[&str]) -> Result<String, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidBaseUrl {
            url: truncate_url(&self.base_url),
            reason: reason.to_string(),
        };
        let mut url = Url::parse(&self.base_url).map_err(|e| invalid(&e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| invalid("URL cannot be a base"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url.into())
    }
}

fn truncate_url(url: &str) -> String {
    if url.len() <= 100 {
        url.to_string()
    } else {
        let cut = (0..=100).rev().find(|i| url.is_char_boundary(*i)).unwrap_or(0);
        format!("{}...", &url[..cut])
    }
}

// --- Request bodies ---

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest<'a> {
    pub full_name: &'a str,
    pub email: &'a str,
    pub mobile: &'a str,
}

/// `confirmPin` is a client-side check only and is never sent.
#[derive(Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePinRequest<'a> {
    pub current_pin: &'a str,
    pub new_pin: &'a str,
}

// Redact debug output because this carries both PINs.
impl std::fmt::Debug for UpdatePinRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdatePinRequest").finish_non_exhaustive()
    }
}

// --- Response decoding ---

pub type HttpOutcome<E> = Result<crux_http::Response<Vec<u8>>, E>;

/// Non-2xx responses become [`ApiError`]s carrying the server message.
pub fn decode_json<T, E>(outcome: HttpOutcome<E>) -> Result<T, ApiError>
where
    T: DeserializeOwned,
    E: Display,
{
    let body = successful_body(outcome)?;
    serde_json::from_slice(&body).map_err(|e| {
        ApiError::new(
            ErrorKind::Deserialization,
            format!("unexpected response body: {e}"),
        )
    })
}

/// For endpoints whose success body carries nothing the core needs.
pub fn decode_empty<E: Display>(outcome: HttpOutcome<E>) -> Result<(), ApiError> {
    successful_body(outcome).map(|_| ())
}

fn successful_body<E: Display>(outcome: HttpOutcome<E>) -> Result<Vec<u8>, ApiError> {
    let mut response = outcome.map_err(|e| ApiError::transport(e.to_string()))?;
    let status: u16 = response.status().into();
    let body = response.take_body().unwrap_or_default();
    if (200..300).contains(&status) {
        Ok(body)
    } else {
        Err(ApiError::from_http_status(status, Some(&body)))
    }
}
