//! Blocking user notices (the browser's `alert`).
use crux_core::capability::{CapabilityContext, Operation};
use crux_core::macros::Capability;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum NoticeOperation {
    Alert { message: String },
}

impl Operation for NoticeOperation {
    type Output = ();
}

#[derive(Capability)]
pub struct Notice<Ev> {
    context: CapabilityContext<NoticeOperation, Ev>,
}

impl<Ev> Notice<Ev> {
    pub fn new(context: CapabilityContext<NoticeOperation, Ev>) -> Self {
        Self { context }
    }
}

impl<Ev> Notice<Ev>
where
    Ev: 'static,
{
    pub fn alert(&self, message: impl Into<String>) {
        let ctx = self.context.clone();
        let operation = NoticeOperation::Alert {
            message: message.into(),
        };
        self.context.spawn(async move {
            ctx.notify_shell(operation).await;
        });
    }
}
