//! Files embedded in create/update requests.
//!
//! Clients send a file as a data URL (`data:<mime>;base64,<payload>`). The
//! payload is validated here and stored base64-encoded next to its metadata.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// Largest accepted decoded size (5 MiB).
pub const MAX_ATTACHMENT_BYTES: usize = 5 * 1024 * 1024;

/// MIME types a client may attach.
pub const ALLOWED_MIME_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/png",
    "image/jpg",
    "application/pdf",
    "text/plain",
];

/// Storage encoding of [`Attachment::data`].
pub const ATTACHMENT_ENCODING: &str = "base64";

/// A validated file attached to a record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: i64,
    /// Base64 payload, as received.
    pub data: String,
}

/// Raw attachment input: a data URL and an optional original file name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttachmentInput {
    pub data_url: String,
    pub name: Option<String>,
}

impl Attachment {
    /// Decodes and validates a data URL.
    ///
    /// `default_stem` names the file when the client did not: the stored name
    /// becomes `<default_stem>_<unix millis>`.
    pub fn from_input(input: &AttachmentInput, default_stem: &str) -> ResultEngine<Self> {
        let (mime_type, payload) = split_data_url(&input.data_url)?;

        if !ALLOWED_MIME_TYPES.contains(&mime_type) {
            return Err(EngineError::InvalidAttachment(
                "file type not allowed. Allowed: JPG, PNG, PDF, TXT".to_string(),
            ));
        }

        let decoded = STANDARD
            .decode(payload)
            .map_err(|_| EngineError::InvalidAttachment("payload is not valid base64".to_string()))?;
        if decoded.len() > MAX_ATTACHMENT_BYTES {
            return Err(EngineError::InvalidAttachment(
                "file is too large. Maximum 5MB allowed".to_string(),
            ));
        }

        let name = input
            .name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .unwrap_or_else(|| format!("{default_stem}_{}", Utc::now().timestamp_millis()));

        Ok(Self {
            name,
            mime_type: mime_type.to_string(),
            size_bytes: decoded.len() as i64,
            data: payload.to_string(),
        })
    }

    /// Decoded file content.
    pub fn bytes(&self) -> ResultEngine<Vec<u8>> {
        STANDARD
            .decode(&self.data)
            .map_err(|_| EngineError::Corrupted(format!("attachment {} is not base64", self.name)))
    }

    pub(crate) fn from_columns(
        data: Option<String>,
        mime_type: Option<String>,
        size_bytes: Option<i64>,
        name: Option<String>,
    ) -> Option<Self> {
        Some(Self {
            data: data?,
            mime_type: mime_type?,
            size_bytes: size_bytes.unwrap_or_default(),
            name: name.unwrap_or_default(),
        })
    }
}

/// Splits `data:<mime>;base64,<payload>` into its MIME type and payload.
fn split_data_url(value: &str) -> ResultEngine<(&str, &str)> {
    let invalid = || {
        EngineError::InvalidAttachment("invalid file format. Expected a base64 data URL".to_string())
    };

    let rest = value.trim().strip_prefix("data:").ok_or_else(invalid)?;
    let (mime_type, payload) = rest.split_once(";base64,").ok_or_else(invalid)?;
    let mime_ok = !mime_type.is_empty()
        && mime_type
            .chars()
            .all(|c| c.is_ascii_alphabetic() || matches!(c, '-' | '+' | '/'));
    if !mime_ok || payload.is_empty() {
        return Err(invalid());
    }
    Ok((mime_type, payload))
}
