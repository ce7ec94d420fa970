use serde::{Deserialize, Serialize};

use crate::cases::CaseEvent;
use crate::config::AppConfig;
use crate::messaging::MessagingEvent;
use crate::navigation::NavigationEvent;
use crate::search::SearchEvent;
use crate::voice::VoiceEvent;

/// Everything the shell can tell the core, plus the capability callbacks of
/// each flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    AppStarted,
    Configure(AppConfig),

    Navigation(NavigationEvent),
    Messaging(MessagingEvent),
    Cases(CaseEvent),
    Search(SearchEvent),
    Voice(VoiceEvent),
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AppStarted => "app_started",
            Self::Configure(_) => "configure",
            Self::Navigation(e) => e.name(),
            Self::Messaging(e) => e.name(),
            Self::Cases(e) => e.name(),
            Self::Search(e) => e.name(),
            Self::Voice(e) => e.name(),
        }
    }
}
