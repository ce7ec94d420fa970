use serde::{Deserialize, Serialize};

use crux_kv::error::KeyValueError;

use crate::capabilities::{KvError, RequestError};
use crate::multipart::MultipartError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Network,
    Validation,
    NotFound,
    Server,
    InvalidResponse,
    Storage,
    Serialization,
    Unknown,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Network => "NETWORK_ERROR",
            Self::Validation => "VALIDATION_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::Server => "SERVER_ERROR",
            Self::InvalidResponse => "INVALID_RESPONSE",
            Self::Storage => "STORAGE_ERROR",
            Self::Serialization => "SERIALIZATION_ERROR",
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
    pub internal_message: Option<String>,
    pub http_status: Option<u16>,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            internal_message: None,
            http_status: None,
        }
    }

    #[must_use]
    pub fn with_internal(mut self, internal: impl Into<String>) -> Self {
        self.internal_message = Some(internal.into());
        self
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Maps a non-2xx answer; a JSON body of the form `{"error": "..."}`
    /// (or `{"message": "..."}`) supplies the message.
    #[must_use]
    pub fn from_http_status(status: u16, body: &[u8]) -> Self {
        let kind = match status {
            400 | 422 => ErrorKind::Validation,
            404 => ErrorKind::NotFound,
            500..=599 => ErrorKind::Server,
            _ => ErrorKind::Unknown,
        };

        let message = serde_json::from_slice::<ApiErrorResponse>(body)
            .ok()
            .and_then(|e| e.error.or(e.message))
            .unwrap_or_else(|| format!("HTTP error: {status}"));

        Self {
            http_status: Some(status),
            ..Self::new(kind, message)
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)?;
        if let Some(internal) = &self.internal_message {
            write!(f, " (internal: {internal})")?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}

impl From<RequestError> for AppError {
    fn from(e: RequestError) -> Self {
        let kind = match &e {
            RequestError::Serialization { .. } => ErrorKind::Serialization,
            RequestError::InvalidUrl { .. }
            | RequestError::BodyTooLarge { .. }
            | RequestError::InvalidRequest { .. } => ErrorKind::Validation,
        };
        Self::new(kind, e.to_string())
    }
}

/// Failures `crux_http` reports without a status: the request never got an
/// answer, or the answer could not be decoded.
impl From<crux_http::Error> for AppError {
    fn from(e: crux_http::Error) -> Self {
        let kind = match &e {
            crux_http::Error::Io(_) | crux_http::Error::Timeout => ErrorKind::Network,
            crux_http::Error::Json(_) => ErrorKind::Serialization,
            crux_http::Error::Url(_) => ErrorKind::Validation,
            crux_http::Error::Http(_) => ErrorKind::InvalidResponse,
        };
        Self::new(kind, e.to_string())
    }
}

impl From<KvError> for AppError {
    fn from(e: KvError) -> Self {
        Self::new(ErrorKind::Validation, e.to_string())
    }
}

impl From<KeyValueError> for AppError {
    fn from(e: KeyValueError) -> Self {
        Self::new(ErrorKind::Storage, "local storage is unavailable").with_internal(e.to_string())
    }
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        Self::new(ErrorKind::Validation, e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(ErrorKind::Serialization, e.to_string())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

pub type AppResult<T> = Result<T, AppError>;
