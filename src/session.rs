//! Session controller: owns the form state and runs generations.
//!
//! The controller is the only writer of session state. Requests are not
//! serialized: if a second generation starts before the first resolves,
//! whichever resolves last determines the final state.

use crate::error::{RenderError, Result};
use crate::generation::{GeneratedImage, GenerationOutcome, RenderProvider};
use crate::options::{ImageInput, RenderControls, RenderOptions};
use crate::prompt;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;

/// Shown when the service answers without an image.
pub const NO_IMAGE_MESSAGE: &str = "Failed to generate image. The model did not return an image.";

/// Shown when a failure carries no message of its own.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred.";

/// Where the session is in the generation cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// No generation has run yet.
    #[default]
    Idle,
    /// A generation is outstanding.
    Generating,
    /// The last generation produced an image.
    Succeeded,
    /// The last generation failed or produced nothing.
    Failed,
}

/// Point-in-time copy of everything a front end displays.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionSnapshot {
    /// Current phase.
    pub phase: Phase,
    /// Error text to display, if any.
    pub error: Option<String>,
    /// Image from the most recent successful generation.
    pub result: Option<GeneratedImage>,
    /// Every successful result, newest first.
    pub history: Vec<GeneratedImage>,
}

impl SessionSnapshot {
    /// Returns true while a generation is outstanding.
    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Generating
    }
}

#[derive(Default)]
struct SessionState {
    options: RenderOptions,
    view: SessionSnapshot,
}

/// Drives render generations for one session.
///
/// Cloning yields another handle to the same session.
#[derive(Clone)]
pub struct SessionController {
    provider: Arc<dyn RenderProvider>,
    state: Arc<Mutex<SessionState>>,
}

impl SessionController {
    /// Creates a session with default options and empty history.
    pub fn new(provider: impl RenderProvider + 'static) -> Self {
        Self::with_provider(Arc::new(provider))
    }

    /// Creates a session around a shared provider.
    pub fn with_provider(provider: Arc<dyn RenderProvider>) -> Self {
        Self {
            provider,
            state: Arc::new(Mutex::new(SessionState::default())),
        }
    }

    /// Returns a copy of the current options.
    pub fn options(&self) -> RenderOptions {
        self.state.lock().options.clone()
    }

    /// Returns a copy of the current display state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.lock().view.clone()
    }

    /// Returns the history, newest first.
    pub fn history(&self) -> Vec<GeneratedImage> {
        self.state.lock().view.history.clone()
    }

    /// Returns true while a generation is outstanding.
    pub fn is_loading(&self) -> bool {
        self.state.lock().view.is_loading()
    }

    /// Sets or clears the input image.
    pub fn set_input_image(&self, image: Option<ImageInput>) {
        self.state.lock().options.input_image = image;
    }

    /// Sets or clears the style reference image.
    pub fn set_reference_image(&self, image: Option<ImageInput>) {
        self.state.lock().options.reference_image = image;
    }

    /// Sets one control by its form name. See [`RenderControls::set`].
    pub fn set_option(&self, field: &str, value: &str) -> Result<()> {
        self.state.lock().options.controls.set(field, value)
    }

    /// Mutates the controls in place.
    pub fn update_controls(&self, f: impl FnOnce(&mut RenderControls)) {
        f(&mut self.state.lock().options.controls);
    }

    /// Restores every control to its default, keeping both images.
    pub fn reset_controls(&self) {
        self.state.lock().options.reset_controls();
        tracing::debug!("render controls reset to defaults");
    }

    /// Runs one generation with the current options and returns the phase it ends in.
    ///
    /// Without an input image nothing is submitted: the error text is set
    /// and the phase is left unchanged. Otherwise the previous result and
    /// error are cleared, the provider is called once, and the outcome is
    /// recorded. The phase never stays `Generating` once this returns.
    pub async fn generate(&self) -> Phase {
        let payload = {
            let mut guard = self.state.lock();
            let state = &mut *guard;
            let input = match state.options.require_input_image() {
                Ok(input) => input.clone(),
                Err(e) => {
                    tracing::warn!("render requested without an input image");
                    state.view.error = Some(e.to_string());
                    return state.view.phase;
                }
            };

            state.view.phase = Phase::Generating;
            state.view.error = None;
            state.view.result = None;

            prompt::compile(
                &input,
                state.options.reference_image.as_ref(),
                &state.options.controls,
            )
        };

        tracing::debug!(
            provider = self.provider.name(),
            images = payload.images().count(),
            text_len = payload.text().len(),
            "compiled render payload"
        );

        let outcome = self.provider.generate(&payload).await;

        let mut state = self.state.lock();
        self.record(&mut state.view, outcome);
        state.view.phase
    }

    fn record(&self, view: &mut SessionSnapshot, outcome: Result<GenerationOutcome>) {
        match outcome.map(GenerationOutcome::into_image) {
            Ok(Some(image)) => {
                view.history.insert(0, image.clone());
                view.result = Some(image);
                view.phase = Phase::Succeeded;
                tracing::info!(history_len = view.history.len(), "render succeeded");
            }
            Ok(None) => {
                view.error = Some(NO_IMAGE_MESSAGE.to_string());
                view.phase = Phase::Failed;
            }
            Err(e) => {
                view.error = Some(failure_message(&e));
                view.phase = Phase::Failed;
                tracing::warn!(provider = self.provider.name(), error = %e, "render failed");
            }
        }
    }
}

fn failure_message(error: &RenderError) -> String {
    let message = error.to_string();
    if message.trim().is_empty() {
        UNKNOWN_ERROR_MESSAGE.to_string()
    } else {
        message
    }
}
