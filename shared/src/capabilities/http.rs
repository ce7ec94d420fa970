use crux_http::{Http, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::event::Event;

pub type HttpCapability = Http<Event>;

/// What `crux_http` hands back to the update loop. Statuses of 400 and above
/// arrive as `Err(crux_http::Error::Http(..))` with the body attached.
pub type HttpResult = crux_http::Result<Response<Vec<u8>>>;

pub const MAX_URL_LENGTH: usize = 2048;
pub const MAX_REQUEST_BODY_SIZE: usize = 50 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidatedUrl(String);

impl ValidatedUrl {
    pub fn new(url: impl Into<String>) -> Result<Self, RequestError> {
        let url = url.into();
        Self::validate(&url)?;
        Ok(Self(url))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(url: &str) -> Result<(), RequestError> {
        if url.trim().is_empty() {
            return Err(RequestError::InvalidUrl {
                url: url.to_string(),
                reason: "URL cannot be empty".to_string(),
            });
        }

        if url.len() > MAX_URL_LENGTH {
            return Err(RequestError::InvalidUrl {
                url: Self::truncate_url(url),
                reason: format!("URL exceeds maximum length of {} bytes", MAX_URL_LENGTH),
            });
        }

        if url.chars().any(|c| c.is_control() || c == ' ') {
            return Err(RequestError::InvalidUrl {
                url: Self::truncate_url(url),
                reason: "URL contains whitespace or control characters".to_string(),
            });
        }

        // crux_http parses every URL it is given, so only absolute ones get through.
        let parsed = Url::parse(url).map_err(|e| RequestError::InvalidUrl {
            url: Self::truncate_url(url),
            reason: e.to_string(),
        })?;

        let scheme = parsed.scheme().to_lowercase();
        if scheme != "http" && scheme != "https" {
            return Err(RequestError::InvalidUrl {
                url: Self::truncate_url(url),
                reason: format!(
                    "invalid scheme '{}', only 'http' and 'https' are allowed",
                    scheme
                ),
            });
        }

        if parsed.host_str().is_none() {
            return Err(RequestError::InvalidUrl {
                url: Self::truncate_url(url),
                reason: "URL must have a host".to_string(),
            });
        }

        if !parsed.username().is_empty() || parsed.password().is_some() {
            return Err(RequestError::InvalidUrl {
                url: Self::truncate_url(url),
                reason: "credentials in URL are not allowed".to_string(),
            });
        }

        Ok(())
    }

    fn truncate_url(url: &str) -> String {
        if url.len() <= 100 {
            url.to_string()
        } else {
            let cut = (0..=100).rev().find(|i| url.is_char_boundary(*i)).unwrap_or(0);
            format!("{}...", &url[..cut])
        }
    }
}

impl std::fmt::Display for ValidatedUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentType {
    Json,
    Multipart { boundary: String },
}

impl ContentType {
    pub fn header_value(&self) -> String {
        match self {
            ContentType::Json => "application/json".to_string(),
            ContentType::Multipart { boundary } => {
                format!("multipart/form-data; boundary={boundary}")
            }
        }
    }
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum RequestError {
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request body too large: {size} bytes exceeds maximum of {max} bytes")]
    BodyTooLarge { size: usize, max: usize },

    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("serialization error: {message}")]
    Serialization { message: String },
}

/// A checked request for one of the backend routes. Building one never
/// touches the capability, so the routes can be unit tested as plain values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    method: HttpMethod,
    url: ValidatedUrl,
    content_type: Option<ContentType>,
    body: Vec<u8>,
}

impl ApiRequest {
    pub fn get(url: impl Into<String>) -> Result<Self, RequestError> {
        Ok(Self::new(HttpMethod::Get, ValidatedUrl::new(url)?))
    }

    pub fn post(url: impl Into<String>) -> Result<Self, RequestError> {
        Ok(Self::new(HttpMethod::Post, ValidatedUrl::new(url)?))
    }

    fn new(method: HttpMethod, url: ValidatedUrl) -> Self {
        Self {
            method,
            url,
            content_type: None,
            body: Vec::new(),
        }
    }

    pub fn with_body(mut self, content_type: ContentType, body: Vec<u8>) -> Result<Self, RequestError> {
        if self.method == HttpMethod::Get {
            return Err(RequestError::InvalidRequest {
                reason: "GET requests cannot carry a body".to_string(),
            });
        }

        if body.len() > MAX_REQUEST_BODY_SIZE {
            return Err(RequestError::BodyTooLarge {
                size: body.len(),
                max: MAX_REQUEST_BODY_SIZE,
            });
        }

        self.content_type = Some(content_type);
        self.body = body;
        Ok(self)
    }

    pub fn with_json<T: Serialize>(self, value: &T) -> Result<Self, RequestError> {
        let body = serde_json::to_vec(value).map_err(|e| RequestError::Serialization {
            message: e.to_string(),
        })?;
        self.with_body(ContentType::Json, body)
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn url(&self) -> &ValidatedUrl {
        &self.url
    }

    pub fn content_type(&self) -> Option<&ContentType> {
        self.content_type.as_ref()
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Hands the request to `crux_http`; `make_event` wraps the outcome.
    pub fn send<F>(self, http: &HttpCapability, make_event: F)
    where
        F: FnOnce(HttpResult) -> Event + Send + 'static,
    {
        let mut builder = match self.method {
            HttpMethod::Get => http.get(self.url.as_str()),
            HttpMethod::Post => http.post(self.url.as_str()),
        };

        if let Some(content_type) = &self.content_type {
            // body first: it sets its own mime, which the explicit header replaces
            builder = builder
                .body(self.body)
                .header("Content-Type", content_type.header_value().as_str());
        }

        builder.send(make_event);
    }
}

/// A response with a status, whichever side of 400 it landed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    status: u16,
    body: Vec<u8>,
}

impl HttpReply {
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Folds error statuses back into a reply so callers can read the backend's
/// JSON error body. Only transport failures stay errors.
pub fn into_reply(result: HttpResult) -> Result<HttpReply, crux_http::Error> {
    match result {
        Ok(mut response) => {
            let status = response.status() as u16;
            let body = response.take_body().unwrap_or_default();
            Ok(HttpReply::new(status, body))
        }
        Err(crux_http::Error::Http(error)) => Ok(HttpReply::new(
            error.code as u16,
            error.body.unwrap_or_default(),
        )),
        Err(other) => Err(other),
    }
}
