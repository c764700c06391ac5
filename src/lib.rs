#![warn(missing_docs)]
//! ArchRender - AI architectural renderings from a sketch, model or photo.
//!
//! This crate turns a set of rendering preferences (camera, lighting,
//! weather, site context, objects to add...) plus an input image into a
//! structured instruction for an image model, submits it, and tracks the
//! results for a session.
//!
//! # Quick Start
//!
//! ```no_run
//! use archrender::{GeminiProvider, ImageInput, Phase, SessionController};
//!
//! #[tokio::main]
//! async fn main() -> archrender::Result<()> {
//!     let session = SessionController::new(GeminiProvider::builder().build());
//!     session.set_input_image(Some(ImageInput::from_path("facade.png")?));
//!     session.set_option("timeOfDay", "Golden Hour")?;
//!     session.set_option("siteContext", "Coastal Waterfront")?;
//!
//!     if session.generate().await == Phase::Succeeded {
//!         let image = session.snapshot().result.expect("succeeded");
//!         std::fs::write("render.png", image.decode()?)?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Compiling prompts without a service
//!
//! ```
//! use archrender::{prompt, ImageInput, RenderControls};
//!
//! let input = ImageInput::from_bytes(vec![0u8; 16]);
//! let payload = prompt::compile(&input, None, &RenderControls::default());
//! assert!(payload.text().contains("Maintain same view as input"));
//! ```
//!
//! # Features
//!
//! - `gemini` (default): Gemini (Google) provider
//! - `cli`: the `archrender` command-line front end

mod error;

pub mod generation;
pub mod options;
pub mod prompt;
pub mod session;

// Re-export error types at crate root
pub use error::{RenderError, Result};

pub use generation::{GeneratedImage, GenerationMetadata, GenerationOutcome, RenderProvider};
pub use options::{
    ImageFormat, ImageInput, OptionSet, RenderControls, RenderOptions, SiteContext, ViewAngle,
};
pub use prompt::{PayloadPart, PromptPayload};
pub use session::{Phase, SessionController, SessionSnapshot};

#[cfg(feature = "gemini")]
pub use generation::providers::{GeminiModel, GeminiProvider, GeminiProviderBuilder};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{RenderError, Result};
    pub use crate::generation::{GeneratedImage, GenerationOutcome, RenderProvider};
    pub use crate::options::{ImageInput, OptionSet, RenderControls, RenderOptions};
    pub use crate::prompt::{compile, PromptPayload};
    pub use crate::session::{Phase, SessionController, SessionSnapshot};

    #[cfg(feature = "gemini")]
    pub use crate::generation::providers::GeminiProvider;
}
