mod http;
mod kv;
mod navigator;
mod notice;
mod speech;

pub use self::http::{
    into_reply, ApiRequest, ContentType, HttpCapability, HttpMethod, HttpReply, HttpResult,
    RequestError, ValidatedUrl,
};
pub use self::kv::{checked_value, KvError, KvKey, KvResult};
pub use self::navigator::{NavigateOperation, Navigator};
pub use self::notice::{Notice, NoticeOperation};
pub use self::speech::{Speech, SpeechError, SpeechOperation, SpeechResult, SpeechTranscript};

// Crux's built-in Render capability covers view refreshes.
pub use crux_core::render::Render;
pub use crux_http::Http;
pub use crux_kv::KeyValue;

use crate::event::Event;
use crate::App;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub http: Http<Event>,
    pub key_value: KeyValue<Event>,
    pub render: Render<Event>,
    pub notice: Notice<Event>,
    pub navigator: Navigator<Event>,
    pub speech: Speech<Event>,
}
