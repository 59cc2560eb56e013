mod dialog;
mod notify;

pub use self::dialog::{Dialog, DialogOperation};
pub use self::notify::{Notify, NotifyOperation, Severity, Toast};

pub use crux_core::render::Render;
pub use crux_http::Http;

use crate::app::App;
use crate::event::Event;

pub type AppHttp = Http<Event>;
pub type AppRender = Render<Event>;
pub type AppNotify = Notify<Event>;
pub type AppDialog = Dialog<Event>;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub http: Http<Event>,
    pub render: Render<Event>,
    pub notify: Notify<Event>,
    pub dialog: Dialog<Event>,
}
