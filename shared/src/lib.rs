// lib.rs - headless core for the profile management dialog

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod api;
pub mod app;
pub mod capabilities;
pub mod error;
pub mod event;
pub mod mode;
pub mod model;
pub mod pipeline;
pub mod query_cache;
pub mod sync;
pub mod validation;
pub mod view;

pub use api::{ApiConfig, ConfigError};
pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use crux_core::{render::Render, App as CruxApp};
pub use error::{ApiError, ErrorKind};
pub use event::{Event, SensitiveText};
pub use mode::{EditTab, Mode};
pub use model::{Company, Identity, Model, PinField, ProfileField, ProfileRecord, Role, Session, UserId};
pub use pipeline::{MutationId, MutationStatus};
pub use view::ViewModel;
