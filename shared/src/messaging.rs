//! The chat box: transcript state, request building for both backend
//! contracts and reply parsing.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::capabilities::{
    into_reply, ApiRequest, Capabilities, HttpReply, HttpResult, RequestError,
};
use crate::config::{AppConfig, MessagingMode};
use crate::error::{AppError, ErrorKind};
use crate::event::Event;
use crate::model::Model;

pub const NOT_FOUND_PREFIX: &str = "🔍 ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    Bot,
}

/// Case fields as the chat endpoint returns them. Values are kept verbatim;
/// absent fields are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseDetail {
    pub case_title: String,
    pub suspect_name: String,
    pub crime_type: String,
    pub status: String,
    pub fir_number: String,
    pub details: String,
}

impl CaseDetail {
    fn from_object(object: &serde_json::Map<String, Value>) -> Self {
        let field = |key: &str| display_value(object.get(key));
        Self {
            case_title: field("Case Title"),
            suspect_name: field("Suspect Name"),
            crime_type: field("Crime Type"),
            status: field("Status"),
            fir_number: field("FIR Number"),
            details: field("Details"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnContent {
    Text {
        text: String,
    },
    NotFound {
        message: String,
    },
    CaseSummary {
        title: String,
        description: String,
        status: String,
    },
    CaseDetail(CaseDetail),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub speaker: Speaker,
    pub content: TurnContent,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            content: TurnContent::Text { text: text.into() },
        }
    }

    pub fn bot(content: TurnContent) -> Self {
        Self {
            speaker: Speaker::Bot,
            content,
        }
    }
}

/// One displayed line of a turn. `label` is rendered emphasized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnLine {
    pub label: Option<String>,
    pub value: String,
}

impl TurnLine {
    fn plain(value: impl Into<String>) -> Self {
        Self {
            label: None,
            value: value.into(),
        }
    }

    fn labelled(label: &str, value: &str) -> Self {
        Self {
            label: Some(label.to_string()),
            value: value.to_string(),
        }
    }
}

pub fn render_turn(turn: &ChatTurn) -> Vec<TurnLine> {
    match &turn.content {
        TurnContent::Text { text } => vec![TurnLine::plain(text.clone())],
        TurnContent::NotFound { message } => {
            vec![TurnLine::plain(format!("{NOT_FOUND_PREFIX}{message}"))]
        }
        TurnContent::CaseSummary {
            title,
            description,
            status,
        } => vec![
            TurnLine::labelled("Case Title", title),
            TurnLine::labelled("Description", description),
            TurnLine::labelled("Status", status),
        ],
        TurnContent::CaseDetail(detail) => vec![
            TurnLine::labelled("Case Title", &detail.case_title),
            TurnLine::labelled("Suspect Name", &detail.suspect_name),
            TurnLine::labelled("Crime Type", &detail.crime_type),
            TurnLine::labelled("Status", &detail.status),
            TurnLine::labelled("FIR Number", &detail.fir_number),
            TurnLine::labelled("Details", &detail.details),
        ],
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatState {
    pub input: String,
    pub transcript: Vec<ChatTurn>,
    pub pending_replies: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MessagingEvent {
    InputChanged(String),
    KeyPressed { key: String },
    Submitted,

    #[serde(skip)]
    ReplyReceived {
        mode: MessagingMode,
        result: Box<HttpResult>,
    },
}

impl MessagingEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::InputChanged(_) => "message_input_changed",
            Self::KeyPressed { .. } => "message_key_pressed",
            Self::Submitted => "message_submitted",
            Self::ReplyReceived { .. } => "message_reply_received",
        }
    }
}

pub fn build_request(
    config: &AppConfig,
    mode: MessagingMode,
    text: &str,
) -> Result<ApiRequest, RequestError> {
    match mode {
        MessagingMode::Lookup => {
            let query = url::form_urlencoded::Serializer::new(String::new())
                .append_pair("title", text)
                .finish();
            ApiRequest::get(format!("{}?{query}", config.endpoint(&config.lookup_path)))
        }
        MessagingMode::Chat => ApiRequest::post(config.endpoint(&config.chat_path))?
            .with_json(&serde_json::json!({ "message": text })),
    }
}

/// Turns a backend answer into the bot turn's content.
pub fn parse_reply(mode: MessagingMode, response: &HttpReply) -> Result<TurnContent, AppError> {
    let body: Option<Value> = response.json().ok();

    if !response.is_success() {
        // The lookup endpoint answers "not found" with a 404 and a message.
        if mode == MessagingMode::Lookup && response.status() == 404 {
            if let Some(message) = body.as_ref().and_then(not_found_message) {
                return Ok(TurnContent::NotFound { message });
            }
        }
        return Err(AppError::from_http_status(response.status(), response.body()));
    }

    let Some(body) = body else {
        return Err(AppError::new(
            ErrorKind::InvalidResponse,
            "reply is not valid JSON",
        ));
    };

    match mode {
        MessagingMode::Lookup => parse_lookup(&body),
        MessagingMode::Chat => parse_chat(&body),
    }
}

fn parse_lookup(body: &Value) -> Result<TurnContent, AppError> {
    let Value::Object(object) = body else {
        return Err(AppError::new(
            ErrorKind::InvalidResponse,
            "lookup reply is not an object",
        ));
    };

    if let Some(message) = not_found_message(body) {
        return Ok(TurnContent::NotFound { message });
    }

    Ok(TurnContent::CaseSummary {
        title: display_value(object.get("title")),
        description: display_value(object.get("description")),
        status: display_value(object.get("status")),
    })
}

fn parse_chat(body: &Value) -> Result<TurnContent, AppError> {
    match body.get("response") {
        Some(Value::String(text)) => Ok(TurnContent::Text { text: text.clone() }),
        Some(Value::Object(object)) => Ok(TurnContent::CaseDetail(CaseDetail::from_object(object))),
        Some(value @ (Value::Number(_) | Value::Bool(_))) => Ok(TurnContent::Text {
            text: value.to_string(),
        }),
        Some(Value::Array(_)) | Some(Value::Null) | None => Err(AppError::new(
            ErrorKind::InvalidResponse,
            "chat reply carries no response",
        )),
    }
}

/// A `message` that is present and truthy.
fn not_found_message(body: &Value) -> Option<String> {
    match body.get("message")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Null | Value::String(_) | Value::Bool(false) => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn submit(model: &mut Model, caps: &Capabilities) {
    let text = model.chat.input.trim().to_string();
    if text.is_empty() {
        debug!("empty message ignored");
        return;
    }

    model.chat.transcript.push(ChatTurn::user(text.clone()));
    model.chat.input.clear();

    let mode = model.config.messaging_mode;
    match build_request(&model.config, mode, &text) {
        Ok(request) => {
            model.chat.pending_replies += 1;
            request.send(&caps.http, move |result| {
                Event::Messaging(MessagingEvent::ReplyReceived {
                    mode,
                    result: Box::new(result),
                })
            });
        }
        Err(e) => error!(error = %e, "cannot build message request"),
    }

    caps.render.render();
}

pub fn update(event: MessagingEvent, model: &mut Model, caps: &Capabilities) {
    match event {
        MessagingEvent::InputChanged(value) => {
            model.chat.input = value;
            caps.render.render();
        }

        MessagingEvent::KeyPressed { key } => {
            if key == "Enter" {
                submit(model, caps);
            }
        }

        MessagingEvent::Submitted => submit(model, caps),

        MessagingEvent::ReplyReceived { mode, result } => {
            model.chat.pending_replies = model.chat.pending_replies.saturating_sub(1);

            let content = into_reply(*result)
                .map_err(AppError::from)
                .and_then(|response| parse_reply(mode, &response));

            match content {
                Ok(content) => {
                    info!(?mode, "bot reply received");
                    model.chat.transcript.push(ChatTurn::bot(content));
                }
                Err(e) => error!(error = %e, ?mode, "message failed"),
            }

            caps.render.render();
        }
    }
}
