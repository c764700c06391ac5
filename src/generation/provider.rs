//! Provider trait for render generation backends.

use crate::error::Result;
use crate::generation::types::GenerationOutcome;
use crate::prompt::PromptPayload;
use async_trait::async_trait;

/// A backend that turns a compiled payload into an image.
///
/// Implementations make exactly one attempt per call: no retries, no
/// streaming. "Answered without an image" is `Ok(GenerationOutcome::NoImage)`;
/// only failures to get an answer are `Err`.
#[async_trait]
pub trait RenderProvider: Send + Sync {
    /// Submits the payload and returns the first image in the answer.
    async fn generate(&self, payload: &PromptPayload) -> Result<GenerationOutcome>;

    /// Returns the name of this provider for display.
    fn name(&self) -> &str;
}
