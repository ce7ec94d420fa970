use crux_core::capability::{CapabilityContext, Operation};
use crux_core::macros::Capability;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum NavigateOperation {
    /// Full document load, leaving the current page.
    Load { url: String },
}

impl Operation for NavigateOperation {
    type Output = ();
}

#[derive(Capability)]
pub struct Navigator<Ev> {
    context: CapabilityContext<NavigateOperation, Ev>,
}

impl<Ev> Navigator<Ev> {
    pub fn new(context: CapabilityContext<NavigateOperation, Ev>) -> Self {
        Self { context }
    }
}

impl<Ev> Navigator<Ev>
where
    Ev: 'static,
{
    pub fn load(&self, url: impl Into<String>) {
        let ctx = self.context.clone();
        let operation = NavigateOperation::Load { url: url.into() };
        self.context.spawn(async move {
            ctx.notify_shell(operation).await;
        });
    }
}
