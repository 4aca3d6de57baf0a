//! Image payloads handed from capture/upload to diagnosis and history.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;

use crate::error::{AgroError, MediaAccessReason, Result};

/// Mime type assumed when a payload carries no explicit type.
pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// Raw image bytes together with their mime type.
#[derive(Clone, PartialEq, Eq)]
pub struct ImagePayload {
    mime_type: String,
    bytes: Vec<u8>,
}

impl std::fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePayload")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImagePayload {
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// A JPEG still, the format camera frames are encoded in.
    pub fn jpeg(bytes: Vec<u8>) -> Self {
        Self::new(DEFAULT_IMAGE_MIME, bytes)
    }

    /// Parses `data:<mime>;base64,<data>`.
    ///
    /// A bare base64 string is accepted as well and treated as JPEG.
    pub fn from_data_url(text: &str) -> Result<Self> {
        let text = text.trim();
        let (mime_type, data) = match text.strip_prefix("data:") {
            Some(rest) => {
                let (header, data) = rest.split_once(',').ok_or_else(|| {
                    AgroError::media_access(
                        MediaAccessReason::UnsupportedFile,
                        "data URL has no payload",
                    )
                })?;
                let mime = header
                    .strip_suffix(";base64")
                    .ok_or_else(|| {
                        AgroError::media_access(
                            MediaAccessReason::UnsupportedFile,
                            "data URL is not base64 encoded",
                        )
                    })?;
                let mime = if mime.is_empty() {
                    DEFAULT_IMAGE_MIME
                } else {
                    mime
                };
                (mime.to_string(), data)
            }
            None => (DEFAULT_IMAGE_MIME.to_string(), text),
        };

        if !mime_type.starts_with("image/") {
            return Err(AgroError::media_access(
                MediaAccessReason::UnsupportedFile,
                format!("'{mime_type}' is not an image type"),
            ));
        }

        let bytes = BASE64_STANDARD.decode(data).map_err(|e| {
            AgroError::media_access(
                MediaAccessReason::UnsupportedFile,
                format!("invalid base64 image data: {e}"),
            )
        })?;

        Ok(Self { mime_type, bytes })
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Base64 of the raw bytes, without any data URL header.
    pub fn to_base64(&self) -> String {
        BASE64_STANDARD.encode(&self.bytes)
    }

    /// The text form stored in history records and rendered by front ends.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }
}
