use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::cases::{CaseField, CaseForm, ImageRole, SavePhase, CASE_CATEGORIES};
use crate::filter::CaseList;
use crate::messaging::{render_turn, ChatState, Speaker, TurnLine};
use crate::model::Model;
use crate::navigation::{NavigationState, Settings};
use crate::search::SearchState;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageView {
    pub id: String,
    pub visible: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TurnView {
    pub speaker: Speaker,
    pub lines: Vec<TurnLine>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatView {
    pub input: String,
    pub turns: Vec<TurnView>,
    /// Bot turns so far; the shell scrolls the transcript down when it grows.
    pub bot_turns: usize,
    pub awaiting_reply: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldView {
    pub field: CaseField,
    pub element_id: String,
    pub value: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageView {
    pub role: ImageRole,
    pub element_id: String,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: usize,
    /// `data:` URL the shell can put straight into an `<img src>`.
    pub preview_url: String,
}

fn preview_url(content_type: &str, bytes: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{content_type};base64,{encoded}")
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CaseFormView {
    pub fields: Vec<FieldView>,
    pub images: Vec<ImageView>,
    pub categories: Vec<String>,
    pub saving: bool,
    /// Role currently being uploaded.
    pub uploading: Option<ImageRole>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CaseItemView {
    pub id: String,
    pub text: String,
    pub visible: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CaseListView {
    pub items: Vec<CaseItemView>,
    pub advisory: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchView {
    pub input: String,
    pub history: Vec<String>,
    pub history_panel_visible: bool,
    pub case_list: Option<CaseListView>,
    pub searching: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewModel {
    pub pages: Vec<PageView>,
    pub sidebar_open: bool,
    pub dark_mode: bool,
    pub settings: Settings,
    pub chat: ChatView,
    pub case_form: CaseFormView,
    pub search: SearchView,
    pub recording: bool,
}

impl ViewModel {
    pub fn build(model: &Model) -> Self {
        Self {
            pages: pages(&model.navigation),
            sidebar_open: model.navigation.sidebar_open,
            dark_mode: model.navigation.dark_mode,
            settings: model.navigation.settings.clone(),
            chat: chat(&model.chat),
            case_form: case_form(&model.case_form, &model.save),
            search: search(&model.search),
            recording: model.voice.recording,
        }
    }
}

fn pages(nav: &NavigationState) -> Vec<PageView> {
    nav.sections
        .iter()
        .map(|id| PageView {
            id: id.clone(),
            visible: nav.is_visible(id),
        })
        .collect()
}

fn chat(state: &ChatState) -> ChatView {
    ChatView {
        input: state.input.clone(),
        turns: state
            .transcript
            .iter()
            .map(|turn| TurnView {
                speaker: turn.speaker,
                lines: render_turn(turn),
            })
            .collect(),
        bot_turns: state
            .transcript
            .iter()
            .filter(|turn| turn.speaker == Speaker::Bot)
            .count(),
        awaiting_reply: state.pending_replies > 0,
    }
}

fn case_form(form: &CaseForm, save: &SavePhase) -> CaseFormView {
    CaseFormView {
        fields: CaseField::ALL
            .iter()
            .map(|field| FieldView {
                field: *field,
                element_id: field.element_id().to_string(),
                value: form.value(*field).to_string(),
            })
            .collect(),
        images: form
            .attachments()
            .map(|a| ImageView {
                role: a.role,
                element_id: a.role.element_id().to_string(),
                file_name: a.file_name.clone(),
                content_type: a.content_type.clone(),
                size_bytes: a.bytes.len(),
                preview_url: preview_url(&a.content_type, &a.bytes),
            })
            .collect(),
        categories: CASE_CATEGORIES.iter().map(ToString::to_string).collect(),
        saving: save.is_busy(),
        uploading: match save {
            SavePhase::Uploading { current, .. } => Some(*current),
            _ => None,
        },
    }
}

fn case_list(list: &CaseList) -> CaseListView {
    CaseListView {
        items: list
            .items()
            .iter()
            .map(|item| CaseItemView {
                id: item.id.clone(),
                text: item.text.clone(),
                visible: item.visible,
            })
            .collect(),
        advisory: list.advisory().map(str::to_string),
    }
}

fn search(state: &SearchState) -> SearchView {
    SearchView {
        input: state.input.clone(),
        history: state.history.entries().to_vec(),
        history_panel_visible: state.panel_visible && !state.history.is_empty(),
        case_list: state.case_list.as_ref().map(case_list),
        searching: state.remote_in_flight,
    }
}
