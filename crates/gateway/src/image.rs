//! Scan image payloads: raw base64 or a `data:<mime>;base64,` URI.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::client::InlineImage;
use crate::error::GatewayError;

/// MIME type assumed when the payload carries no data-URI header.
pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// A decoded-and-verified scan image, kept in base64 for the model request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    mime_type: String,
    data: String,
    byte_len: usize,
}

impl ImagePayload {
    /// Parse a payload. Everything up to and including the first comma is
    /// treated as a header and stripped; a `data:<mime>;...` header also
    /// supplies the MIME type.
    pub fn parse(raw: &str) -> Result<Self, GatewayError> {
        let (mime_type, data) = match raw.split_once(',') {
            Some((header, data)) => (mime_from_header(header), data),
            None => (None, raw),
        };

        let data: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        if data.is_empty() {
            return Err(GatewayError::InvalidImage("no image data".to_string()));
        }

        let bytes = BASE64
            .decode(data.as_bytes())
            .map_err(|e| GatewayError::InvalidImage(format!("not valid base64: {}", e)))?;
        if bytes.is_empty() {
            return Err(GatewayError::InvalidImage("image is empty".to_string()));
        }

        Ok(Self {
            mime_type: mime_type.unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string()),
            data,
            byte_len: bytes.len(),
        })
    }

    /// Encode raw image bytes (e.g. read from a file).
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Result<Self, GatewayError> {
        if bytes.is_empty() {
            return Err(GatewayError::InvalidImage("image is empty".to_string()));
        }
        Ok(Self {
            mime_type: mime_type.into(),
            data: BASE64.encode(bytes),
            byte_len: bytes.len(),
        })
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Size of the decoded image in bytes.
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    /// Render as `data:<mime>;base64,<data>`.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    pub fn into_inline(self) -> InlineImage {
        InlineImage {
            mime_type: self.mime_type,
            data: self.data,
        }
    }
}

fn mime_from_header(header: &str) -> Option<String> {
    header
        .trim()
        .strip_prefix("data:")
        .and_then(|rest| rest.split(';').next())
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

/// Guess a MIME type from a file extension.
pub fn mime_for_extension(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "heic" => "image/heic",
        _ => DEFAULT_MIME_TYPE,
    }
}
