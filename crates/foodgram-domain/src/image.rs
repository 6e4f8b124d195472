//! Inline image payloads sent as base64 data URIs.

use std::str::FromStr;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// Image subtypes accepted in `data:image/<ext>;base64,...` URIs.
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["png", "jpeg", "jpg", "gif", "webp"];

/// A decoded image ready to be written to media storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    /// Lower-cased file extension taken from the MIME subtype.
    pub extension: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageDecodeError {
    #[error("expected a data:image/<ext>;base64,<payload> URI")]
    NotDataUri,
    #[error("unsupported image type: {0}")]
    UnsupportedType(String),
    #[error("invalid base64 payload")]
    InvalidBase64,
    #[error("empty image payload")]
    Empty,
}

impl FromStr for DecodedImage {
    type Err = ImageDecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .trim()
            .strip_prefix("data:image/")
            .ok_or(ImageDecodeError::NotDataUri)?;
        let (subtype, payload) = rest
            .split_once(";base64,")
            .ok_or(ImageDecodeError::NotDataUri)?;

        let extension = subtype.to_ascii_lowercase();
        if !ALLOWED_IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            return Err(ImageDecodeError::UnsupportedType(extension));
        }

        let payload: String = payload.split_whitespace().collect();
        let bytes = STANDARD
            .decode(payload.as_bytes())
            .map_err(|_| ImageDecodeError::InvalidBase64)?;
        if bytes.is_empty() {
            return Err(ImageDecodeError::Empty);
        }
        Ok(Self { extension, bytes })
    }
}
