//! Generation client: submits compiled payloads to an image service.

mod provider;
pub mod providers;
mod types;

pub use provider::RenderProvider;
pub use types::{GeneratedImage, GenerationMetadata, GenerationOutcome};
