//! Result types for generation calls.

use crate::error::{RenderError, Result};
use crate::options::ImageFormat;
use base64::Engine;
use serde::Serialize;

/// Metadata about the generation call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerationMetadata {
    /// Model used for generation.
    pub model: Option<String>,
    /// Round-trip duration in milliseconds.
    pub duration_ms: Option<u64>,
}

/// An image returned by the generation service.
///
/// Holds the payload exactly as received (base64 plus MIME type); nothing
/// is decoded until [`decode`](Self::decode) is called.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[must_use = "generated image should be displayed or saved"]
pub struct GeneratedImage {
    /// MIME type reported by the service.
    pub mime_type: String,
    /// Base64-encoded image bytes.
    pub data: String,
    /// Generation metadata.
    pub metadata: GenerationMetadata,
}

impl GeneratedImage {
    /// Creates a new generated image from base64 data.
    pub fn new(
        mime_type: impl Into<String>,
        data: impl Into<String>,
        metadata: GenerationMetadata,
    ) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
            metadata,
        }
    }

    /// Returns the image as a data URI (`data:<mime>;base64,<data>`).
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    /// Decodes the base64 payload into raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(&self.data)
            .map_err(|e| RenderError::Decode(e.to_string()))
    }

    /// Returns the image format, if the MIME type is a known one.
    pub fn format(&self) -> Option<ImageFormat> {
        ImageFormat::from_mime_type(&self.mime_type)
    }

    /// Returns a file extension for saving, defaulting to `png`.
    pub fn extension(&self) -> &'static str {
        self.format().unwrap_or_default().extension()
    }
}

/// Outcome of a call that reached the service and got a well-formed answer.
///
/// Transport and protocol failures are `Err` values instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// The service returned an image.
    Image(GeneratedImage),
    /// The service answered but produced no image.
    NoImage,
}

impl GenerationOutcome {
    /// Returns the image, if any.
    pub fn into_image(self) -> Option<GeneratedImage> {
        match self {
            Self::Image(image) => Some(image),
            Self::NoImage => None,
        }
    }
}
