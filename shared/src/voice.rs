use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::capabilities::{Capabilities, SpeechError, SpeechResult};
use crate::event::Event;
use crate::model::Model;

pub const SPEECH_UNSUPPORTED: &str = "Your browser does not support Speech Recognition.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoiceState {
    pub recording: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VoiceEvent {
    CaptureRequested,

    #[serde(skip)]
    CaptureFinished(Box<SpeechResult>),
}

impl VoiceEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CaptureRequested => "voice_capture_requested",
            Self::CaptureFinished(_) => "voice_capture_finished",
        }
    }
}

pub fn update(event: VoiceEvent, model: &mut Model, caps: &Capabilities) {
    match event {
        VoiceEvent::CaptureRequested => {
            if model.voice.recording {
                debug!("already recording");
                return;
            }
            model.voice.recording = true;
            caps.speech.recognize(model.config.speech_locale.clone(), |result| {
                Event::Voice(VoiceEvent::CaptureFinished(Box::new(result)))
            });
        }

        VoiceEvent::CaptureFinished(result) => {
            model.voice.recording = false;
            match *result {
                Ok(transcript) => match transcript.best() {
                    Some(text) => {
                        info!(chars = text.len(), "voice input captured");
                        model.chat.input = text.to_string();
                    }
                    None => debug!("recognition returned no hypotheses"),
                },
                Err(SpeechError::Unsupported) => caps.notice.alert(SPEECH_UNSUPPORTED),
                Err(e) => error!(error = %e, "voice recognition error"),
            }
        }
    }

    caps.render.render();
}
