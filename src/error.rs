//! Error types for rendering sessions.

/// Errors surfaced by the rendering pipeline.
///
/// The `Display` output of every variant is the user-facing message; the
/// session controller shows it verbatim.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// A required input is missing or a field value is not in its option set.
    #[error("{0}")]
    Validation(String),

    /// The service credential is not configured.
    #[error("{0}")]
    Configuration(String),

    /// The generation service could not be reached or answered with garbage.
    ///
    /// The underlying cause is logged by the provider, never carried here.
    #[error("Failed to generate image with {provider} API.")]
    GenerationFailed {
        /// Display name of the provider that failed.
        provider: &'static str,
    },

    /// Failed to decode base64 image data.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// I/O error (e.g., reading an input image).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RenderError {
    /// Returns true for errors the user can fix from the form (missing image, bad value).
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Result type alias for rendering operations.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Low-level failure of a single service call.
///
/// Never returned from the public API: providers log it and map it to
/// [`RenderError::GenerationFailed`].
#[derive(Debug, thiserror::Error)]
pub(crate) enum TransportError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Collapses whitespace and truncates a response body so it can be logged safely.
pub(crate) fn sanitize_error_message(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= MAX_ERROR_MESSAGE_LEN {
        return collapsed;
    }
    let truncated: String = collapsed.chars().take(MAX_ERROR_MESSAGE_LEN).collect();
    format!("{truncated}...")
}
