use crate::cases::{CaseForm, SavePhase};
use crate::config::AppConfig;
use crate::messaging::ChatState;
use crate::navigation::NavigationState;
use crate::search::SearchState;
use crate::voice::VoiceState;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Model {
    pub config: AppConfig,
    pub navigation: NavigationState,
    pub chat: ChatState,
    pub case_form: CaseForm,
    pub save: SavePhase,
    pub search: SearchState,
    pub voice: VoiceState,
}
