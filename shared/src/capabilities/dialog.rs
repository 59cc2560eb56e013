use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

/// Requests to the host that owns the dialog's open flag. The core never
/// closes the dialog itself; the host answers with `DialogOpenChanged`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogOperation {
    RequestClose,
}

impl Operation for DialogOperation {
    type Output = ();
}

pub struct Dialog<E> {
    context: CapabilityContext<DialogOperation, E>,
}

impl<Ev> Capability<Ev> for Dialog<Ev> {
    type Operation = DialogOperation;
    type MappedSelf<MappedEv> = Dialog<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Dialog::new(self.context.map_event(f))
    }
}

impl<E> Dialog<E>
where
    E: Send + 'static,
{
    pub fn new(context: CapabilityContext<DialogOperation, E>) -> Self {
        Self { context }
    }

    pub fn request_close(&self) {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            ctx.notify_shell(DialogOperation::RequestClose).await;
        });
    }
}
