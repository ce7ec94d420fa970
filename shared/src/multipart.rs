//! `multipart/form-data` encoding for image uploads.
//!
//! The body is assembled in the core so the shell only forwards bytes and the
//! `Content-Type` header.

use thiserror::Error;

use crate::capabilities::ContentType;

const CRLF: &[u8] = b"\r\n";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MultipartError {
    #[error("invalid field name '{0}'")]
    InvalidFieldName(String),

    #[error("boundary '{0}' occurs inside part '{1}'")]
    BoundaryCollision(String, String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        content_type: String,
        bytes: Vec<u8>,
    },
}

impl Part {
    fn name(&self) -> &str {
        match self {
            Part::Text { name, .. } | Part::File { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartForm {
    boundary: String,
    parts: Vec<Part>,
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::with_boundary(format!("----CaseDeskBoundary{}", uuid::Uuid::new_v4().simple()))
    }

    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            parts: Vec::new(),
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn content_type(&self) -> ContentType {
        ContentType::Multipart {
            boundary: self.boundary.clone(),
        }
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(Part::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.parts.push(Part::File {
            name: name.into(),
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        });
        self
    }

    pub fn encode(&self) -> Result<Vec<u8>, MultipartError> {
        let delimiter = format!("--{}", self.boundary);
        let mut body = Vec::new();

        for part in &self.parts {
            let name = part.name();
            if name.is_empty() || name.chars().any(|c| c.is_control() || c == '"') {
                return Err(MultipartError::InvalidFieldName(name.to_string()));
            }

            body.extend_from_slice(delimiter.as_bytes());
            body.extend_from_slice(CRLF);

            match part {
                Part::Text { name, value } => {
                    if value.contains(&delimiter) {
                        return Err(MultipartError::BoundaryCollision(
                            self.boundary.clone(),
                            name.clone(),
                        ));
                    }
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"").as_bytes(),
                    );
                    body.extend_from_slice(CRLF);
                    body.extend_from_slice(CRLF);
                    body.extend_from_slice(value.as_bytes());
                }
                Part::File {
                    name,
                    file_name,
                    content_type,
                    bytes,
                } => {
                    if contains_subslice(bytes, delimiter.as_bytes()) {
                        return Err(MultipartError::BoundaryCollision(
                            self.boundary.clone(),
                            name.clone(),
                        ));
                    }
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{}\"",
                            sanitize_file_name(file_name)
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(CRLF);
                    body.extend_from_slice(
                        format!("Content-Type: {}", sanitize_content_type(content_type))
                            .as_bytes(),
                    );
                    body.extend_from_slice(CRLF);
                    body.extend_from_slice(CRLF);
                    body.extend_from_slice(bytes);
                }
            }
            body.extend_from_slice(CRLF);
        }

        body.extend_from_slice(delimiter.as_bytes());
        body.extend_from_slice(b"--");
        body.extend_from_slice(CRLF);
        Ok(body)
    }
}

fn sanitize_file_name(file_name: &str) -> String {
    let cleaned: String = file_name
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| if c == '"' { '\'' } else { c })
        .collect();
    if cleaned.trim().is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

fn sanitize_content_type(content_type: &str) -> &str {
    if content_type.is_empty() || content_type.chars().any(char::is_control) {
        "application/octet-stream"
    } else {
        content_type
    }
}

fn contains_subslice(haystack: &[u8], needle: &[u8]) -> bool {
    !needle.is_empty() && haystack.windows(needle.len()).any(|w| w == needle)
}
