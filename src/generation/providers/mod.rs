//! Generation service providers.

#[cfg(feature = "gemini")]
mod gemini;

#[cfg(feature = "gemini")]
pub use gemini::{
    GeminiModel, GeminiProvider, GeminiProviderBuilder, API_KEY_ENV, FALLBACK_API_KEY_ENV,
};
