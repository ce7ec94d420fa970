use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Where the Flask backend listens when started with `app.run()`.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_HISTORY_KEY: &str = "recentSearches";
pub const DEFAULT_HISTORY_LIMIT: usize = 5;
pub const MAX_HISTORY_LIMIT: usize = 50;
pub const DEFAULT_SPEECH_LOCALE: &str = "en-US";

/// Which backend contract the chat box talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessagingMode {
    /// `GET /get_case?title=...`, answered with a case summary or a not-found message.
    #[default]
    Lookup,
    /// `POST /chat` with `{"message": ...}`, answered with text or a case detail object.
    Chat,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Absolute origin of the backend; every route is joined onto it.
    pub base_url: String,
    pub chat_path: String,
    pub lookup_path: String,
    pub create_case_path: String,
    pub upload_path: String,
    pub search_path: String,
    pub messaging_mode: MessagingMode,
    pub history_key: String,
    pub history_limit: usize,
    pub speech_locale: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            chat_path: "/chat".into(),
            lookup_path: "/get_case".into(),
            create_case_path: "/add_case".into(),
            upload_path: "/upload_case_images".into(),
            search_path: "/Search".into(),
            messaging_mode: MessagingMode::default(),
            history_key: DEFAULT_HISTORY_KEY.into(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            speech_locale: DEFAULT_SPEECH_LOCALE.into(),
        }
    }
}

impl AppConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let parsed = Url::parse(&self.base_url).map_err(|e| ConfigError::Invalid {
            field: "base_url",
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                field: "base_url",
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }
        if parsed.host_str().is_none() {
            return Err(ConfigError::Invalid {
                field: "base_url",
                reason: "must name a host".into(),
            });
        }

        for (field, path) in [
            ("chat_path", &self.chat_path),
            ("lookup_path", &self.lookup_path),
            ("create_case_path", &self.create_case_path),
            ("upload_path", &self.upload_path),
            ("search_path", &self.search_path),
        ] {
            if !path.starts_with('/') || path.starts_with("//") {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("'{path}' must be an absolute path"),
                });
            }
        }

        if self.history_key.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "history_key",
                reason: "cannot be empty".into(),
            });
        }

        if !(1..=MAX_HISTORY_LIMIT).contains(&self.history_limit) {
            return Err(ConfigError::Invalid {
                field: "history_limit",
                reason: format!("{} is outside 1..={MAX_HISTORY_LIMIT}", self.history_limit),
            });
        }

        if self.speech_locale.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "speech_locale",
                reason: "cannot be empty".into(),
            });
        }

        Ok(())
    }

    /// Joins `path` onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}
