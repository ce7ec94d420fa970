use crux_core::capability::{CapabilityContext, Operation};
use crux_core::macros::Capability;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One recognition session. The shell resolves it once the session ends.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum SpeechOperation {
    Recognize { locale: String },
}

impl Operation for SpeechOperation {
    type Output = SpeechResult;
}

/// Hypotheses for the first result, best first.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpeechTranscript {
    pub hypotheses: Vec<String>,
}

impl SpeechTranscript {
    pub fn new(hypotheses: Vec<String>) -> Self {
        Self { hypotheses }
    }

    pub fn best(&self) -> Option<&str> {
        self.hypotheses.first().map(String::as_str)
    }
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum SpeechError {
    #[error("speech recognition is not supported on this platform")]
    Unsupported,

    #[error("session ended without a result")]
    NoResult,

    #[error("recognition error: {code}")]
    Recognition { code: String },
}

pub type SpeechResult = Result<SpeechTranscript, SpeechError>;

#[derive(Capability)]
pub struct Speech<Ev> {
    context: CapabilityContext<SpeechOperation, Ev>,
}

impl<Ev> Speech<Ev> {
    pub fn new(context: CapabilityContext<SpeechOperation, Ev>) -> Self {
        Self { context }
    }
}

impl<Ev> Speech<Ev>
where
    Ev: Send + 'static,
{
    pub fn recognize<F>(&self, locale: impl Into<String>, callback: F)
    where
        F: FnOnce(SpeechResult) -> Ev + Send + 'static,
    {
        let ctx = self.context.clone();
        let operation = SpeechOperation::Recognize {
            locale: locale.into(),
        };
        self.context.spawn(async move {
            let result = ctx.request_from_shell(operation).await;
            ctx.update_app(callback(result));
        });
    }
}
