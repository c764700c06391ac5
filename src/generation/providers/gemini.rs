//! Gemini (Google) render provider.

use crate::error::{sanitize_error_message, RenderError, Result, TransportError};
use crate::generation::provider::RenderProvider;
use crate::generation::types::{GeneratedImage, GenerationMetadata, GenerationOutcome};
use crate::prompt::{PayloadPart, PromptPayload};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Environment variable holding the service credential.
pub const API_KEY_ENV: &str = "API_KEY";

/// Consulted when [`API_KEY_ENV`] is unset.
pub const FALLBACK_API_KEY_ENV: &str = "GOOGLE_API_KEY";

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const PROVIDER_NAME: &str = "Gemini";

/// Gemini image model variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GeminiModel {
    /// Nano Banana - Gemini 2.5 Flash Image (fast, economical).
    #[default]
    NanoBanana,
    /// Nano Banana Pro - Gemini 3 Pro Image (highest quality).
    NanoBananaPro,
}

impl GeminiModel {
    /// Returns the API model identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NanoBanana => "gemini-2.5-flash-image",
            Self::NanoBananaPro => "nano-banana-pro-preview",
        }
    }
}

/// Builder for GeminiProvider.
#[derive(Debug, Clone)]
pub struct GeminiProviderBuilder {
    api_key: Option<String>,
    key_vars: Vec<String>,
    model: GeminiModel,
    base_url: String,
}

impl Default for GeminiProviderBuilder {
    fn default() -> Self {
        Self {
            api_key: None,
            key_vars: vec![API_KEY_ENV.to_string(), FALLBACK_API_KEY_ENV.to_string()],
            model: GeminiModel::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl GeminiProviderBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Without one, the key is read from the environment
    /// on every call.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Reads the credential from `name` instead of `API_KEY`/`GOOGLE_API_KEY`.
    pub fn api_key_var(mut self, name: impl Into<String>) -> Self {
        self.key_vars = vec![name.into()];
        self
    }

    /// Sets the Gemini model variant.
    pub fn model(mut self, model: GeminiModel) -> Self {
        self.model = model;
        self
    }

    /// Overrides the API base URL (e.g. for a proxy).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Builds the provider.
    pub fn build(self) -> GeminiProvider {
        GeminiProvider {
            client: reqwest::Client::new(),
            api_key: self.api_key,
            key_vars: self.key_vars,
            model: self.model,
            base_url: self.base_url.trim_end_matches('/').to_string(),
        }
    }
}

/// Gemini render provider.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    key_vars: Vec<String>,
    model: GeminiModel,
    base_url: String,
}

impl GeminiProvider {
    /// Creates a new `GeminiProviderBuilder`.
    pub fn builder() -> GeminiProviderBuilder {
        GeminiProviderBuilder::new()
    }

    /// Returns the configured model.
    pub fn model(&self) -> GeminiModel {
        self.model
    }

    fn resolve_api_key(&self) -> Result<String> {
        if let Some(ref key) = self.api_key {
            return Ok(key.clone());
        }
        self.key_vars
            .iter()
            .find_map(|name| std::env::var(name).ok().filter(|v| !v.trim().is_empty()))
            .ok_or_else(|| {
                let name = self.key_vars.first().map_or(API_KEY_ENV, String::as_str);
                RenderError::Configuration(format!("{name} environment variable not set"))
            })
    }

    async fn generate_impl(&self, payload: &PromptPayload) -> Result<GenerationOutcome> {
        let api_key = self.resolve_api_key()?;
        let start = Instant::now();
        let body = GeminiRequest::from_payload(payload);

        tracing::info!(
            model = self.model.as_str(),
            parts = payload.parts().len(),
            "submitting render request"
        );

        let inline_data = match self.send(&api_key, &body).await {
            Ok(inline_data) => inline_data,
            Err(e) => {
                tracing::error!(model = self.model.as_str(), error = %e, "Gemini render request failed");
                return Err(RenderError::GenerationFailed {
                    provider: PROVIDER_NAME,
                });
            }
        };

        let duration_ms = start.elapsed().as_millis() as u64;

        match inline_data {
            Some(inline) => {
                tracing::info!(mime_type = %inline.mime_type, duration_ms, "render complete");
                Ok(GenerationOutcome::Image(GeneratedImage::new(
                    inline.mime_type,
                    inline.data,
                    GenerationMetadata {
                        model: Some(self.model.as_str().to_string()),
                        duration_ms: Some(duration_ms),
                    },
                )))
            }
            None => {
                tracing::warn!(duration_ms, "Gemini response contained no image");
                Ok(GenerationOutcome::NoImage)
            }
        }
    }

    async fn send(
        &self,
        api_key: &str,
        body: &GeminiRequest,
    ) -> std::result::Result<Option<InlineData>, TransportError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url,
            self.model.as_str(),
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(TransportError::Api {
                status: status.as_u16(),
                message: sanitize_error_message(&text),
            });
        }

        let bytes = response.bytes().await?;
        let parsed: GeminiResponse = serde_json::from_slice(&bytes)?;
        first_inline_image(parsed)
    }
}

#[async_trait]
impl RenderProvider for GeminiProvider {
    async fn generate(&self, payload: &PromptPayload) -> Result<GenerationOutcome> {
        self.generate_impl(payload).await
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }
}

/// Scans the first candidate's parts in order and returns the first inline image.
///
/// A missing candidate or content block is a malformed answer; parts without
/// image data are simply "no image".
fn first_inline_image(
    response: GeminiResponse,
) -> std::result::Result<Option<InlineData>, TransportError> {
    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_deref())
    {
        tracing::warn!(block_reason = %reason, "Gemini blocked the prompt");
    }

    let candidate = response.candidates.into_iter().next().ok_or_else(|| {
        TransportError::UnexpectedResponse("no candidates in Gemini response".into())
    })?;

    if let Some(ref finish_reason) = candidate.finish_reason {
        tracing::debug!(finish_reason = %finish_reason, "Gemini candidate finished");
    }

    let content = candidate.content.ok_or_else(|| {
        TransportError::UnexpectedResponse("no content in Gemini candidate".into())
    })?;

    Ok(content.parts.into_iter().find_map(|p| p.inline_data))
}

// Request/Response types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiRequestPart>,
}

/// A part in a Gemini request - text or inline image data.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiRequestPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiConfig {
    response_modalities: Vec<String>,
}

impl GeminiRequest {
    fn from_payload(payload: &PromptPayload) -> Self {
        let parts = payload
            .parts()
            .iter()
            .map(|part| match part {
                PayloadPart::Image(image) => GeminiRequestPart::InlineData {
                    inline_data: InlineData {
                        mime_type: image.mime_type().to_string(),
                        data: image.to_base64(),
                    },
                },
                PayloadPart::Text(text) => GeminiRequestPart::Text { text: text.clone() },
            })
            .collect();

        Self {
            contents: vec![GeminiContent { parts }],
            generation_config: GeminiConfig {
                response_modalities: vec!["IMAGE".to_string()],
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContentResponse>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPartResponse {
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{ImageInput, RenderControls};
    use crate::prompt::compile;
    use crate::session::{Phase, SessionController, NO_IMAGE_MESSAGE};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    const PNG: [u8; 12] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
    const JPEG: [u8; 12] = [0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0, 0, 0, 0, 0];

    fn parse(json: &str) -> GeminiResponse {
        serde_json::from_str(json).unwrap()
    }

    /// A provider that reads its key from a variable no test environment sets.
    fn keyless_provider() -> GeminiProvider {
        GeminiProvider::builder()
            .api_key_var("ARCHRENDER_TEST_KEY_THAT_IS_NEVER_SET")
            .base_url("http://127.0.0.1:1")
            .build()
    }

    /// Answers one HTTP request with `status` and `body`, then closes.
    /// The handle resolves to the request head as received.
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 4096];

            let head_end = loop {
                let n = stream.read(&mut chunk).await.unwrap();
                assert!(n > 0, "connection closed before request head");
                request.extend_from_slice(&chunk[..n]);
                if let Some(pos) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
            };

            let head = String::from_utf8_lossy(&request[..head_end]).to_string();
            let content_length = head
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                .map(|(_, value)| value.trim().parse::<usize>().unwrap())
                .unwrap_or(0);
            while request.len() < head_end + content_length {
                let n = stream.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
            head
        });

        (base_url, handle)
    }

    fn provider_at(base_url: &str) -> GeminiProvider {
        GeminiProvider::builder()
            .api_key("test-key")
            .base_url(base_url)
            .build()
    }

    fn default_payload() -> PromptPayload {
        compile(
            &ImageInput::from_bytes(PNG.to_vec()),
            None,
            &RenderControls::default(),
        )
    }

    #[test]
    fn test_gemini_model_as_str() {
        assert_eq!(GeminiModel::NanoBanana.as_str(), "gemini-2.5-flash-image");
        assert_eq!(
            GeminiModel::NanoBananaPro.as_str(),
            "nano-banana-pro-preview"
        );
    }

    #[test]
    fn test_gemini_model_default() {
        assert_eq!(GeminiModel::default(), GeminiModel::NanoBanana);
        assert_eq!(
            GeminiProvider::builder().build().model(),
            GeminiModel::NanoBanana
        );
    }

    #[test]
    fn test_builder_trims_base_url() {
        let provider = GeminiProvider::builder()
            .base_url("http://localhost:8080/v1beta/")
            .build();
        assert_eq!(provider.base_url, "http://localhost:8080/v1beta");
    }

    #[test]
    fn test_explicit_key_wins() {
        let provider = GeminiProvider::builder()
            .api_key("test-key")
            .api_key_var("ARCHRENDER_TEST_KEY_THAT_IS_NEVER_SET")
            .build();
        assert_eq!(provider.resolve_api_key().unwrap(), "test-key");
    }

    #[test]
    fn test_request_parts_follow_payload_order() {
        let input = ImageInput::from_bytes(PNG.to_vec());
        let reference = ImageInput::from_bytes(JPEG.to_vec());
        let payload = compile(&input, Some(&reference), &RenderControls::default());

        let request = GeminiRequest::from_payload(&payload);
        let json = serde_json::to_value(&request).unwrap();
        let parts = json["contents"][0]["parts"].as_array().unwrap();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[0]["inlineData"]["data"], input.to_base64());
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[2]["text"], payload.text());
        assert_eq!(
            json["generationConfig"]["responseModalities"],
            serde_json::json!(["IMAGE"])
        );
    }

    #[test]
    fn test_first_inline_image_wins() {
        let resp = parse(
            r#"{
            "candidates": [{
                "content": {
                    "parts": [
                        {"text": "Here is your rendering"},
                        {"inlineData": {"mimeType": "image/jpeg", "data": "Zmlyc3Q="}},
                        {"inlineData": {"mimeType": "image/png", "data": "c2Vjb25k"}}
                    ]
                },
                "finishReason": "STOP"
            }]
        }"#,
        );
        let inline = first_inline_image(resp).unwrap().unwrap();
        assert_eq!(inline.mime_type, "image/jpeg");
        assert_eq!(inline.data, "Zmlyc3Q=");
    }

    #[test]
    fn test_text_only_answer_is_no_image() {
        let resp = parse(
            r#"{
            "candidates": [{
                "content": {"parts": [{"text": "I cannot render that."}]},
                "finishReason": "STOP"
            }]
        }"#,
        );
        assert!(first_inline_image(resp).unwrap().is_none());
    }

    #[test]
    fn test_missing_candidates_is_malformed() {
        let resp = parse(
            r#"{
            "candidates": [],
            "promptFeedback": {"blockReason": "SAFETY"}
        }"#,
        );
        assert!(matches!(
            first_inline_image(resp),
            Err(TransportError::UnexpectedResponse(_))
        ));
    }

    #[test]
    fn test_missing_content_is_malformed() {
        let resp = parse(r#"{"candidates": [{"finishReason": "IMAGE_SAFETY"}]}"#);
        assert!(matches!(
            first_inline_image(resp),
            Err(TransportError::UnexpectedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_key_is_configuration_error() {
        let provider = keyless_provider();
        let payload = compile(
            &ImageInput::from_bytes(PNG.to_vec()),
            None,
            &RenderControls::default(),
        );

        let err = provider.generate(&payload).await.unwrap_err();
        assert!(matches!(err, RenderError::Configuration(_)));
        assert_eq!(
            err.to_string(),
            "ARCHRENDER_TEST_KEY_THAT_IS_NEVER_SET environment variable not set"
        );
    }

    #[tokio::test]
    async fn test_transport_failure_is_generation_failed() {
        let provider = GeminiProvider::builder()
            .api_key("test-key")
            .base_url("http://127.0.0.1:1")
            .build();
        let payload = compile(
            &ImageInput::from_bytes(PNG.to_vec()),
            None,
            &RenderControls::default(),
        );

        let err = provider.generate(&payload).await.unwrap_err();
        assert!(matches!(
            err,
            RenderError::GenerationFailed { provider: "Gemini" }
        ));
        assert_eq!(err.to_string(), "Failed to generate image with Gemini API.");
    }

    #[tokio::test]
    async fn test_error_status_is_generation_failed() {
        let (base_url, server) = serve_once(
            "500 Internal Server Error",
            r#"{"error": {"code": 500, "message": "internal", "status": "INTERNAL"}}"#,
        )
        .await;

        let err = provider_at(&base_url)
            .generate(&default_payload())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RenderError::GenerationFailed { provider: "Gemini" }
        ));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_unparseable_body_is_generation_failed() {
        let (base_url, server) = serve_once("200 OK", "not json").await;

        let err = provider_at(&base_url)
            .generate(&default_payload())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RenderError::GenerationFailed { provider: "Gemini" }
        ));
        assert_eq!(err.to_string(), "Failed to generate image with Gemini API.");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_inline_image_becomes_data_uri() {
        let (base_url, server) = serve_once(
            "200 OK",
            r#"{"candidates": [{"content": {"parts": [
                {"text": "Here is your rendering"},
                {"inlineData": {"mimeType": "image/png", "data": "AA=="}}
            ]}}]}"#,
        )
        .await;

        let outcome = provider_at(&base_url)
            .generate(&default_payload())
            .await
            .unwrap();
        let image = outcome.into_image().expect("image part");
        assert_eq!(image.data_uri(), "data:image/png;base64,AA==");
        assert_eq!(
            image.metadata.model.as_deref(),
            Some("gemini-2.5-flash-image")
        );

        let head = server.await.unwrap();
        assert!(head.starts_with("POST /models/gemini-2.5-flash-image:generateContent "));
        assert!(head.to_ascii_lowercase().contains("x-goog-api-key: test-key"));
    }

    #[tokio::test]
    async fn test_text_only_answer_fails_the_session() {
        let (base_url, server) = serve_once(
            "200 OK",
            r#"{"candidates": [{"content": {"parts": [{"text": "I cannot render that."}]}}]}"#,
        )
        .await;

        let session = SessionController::new(provider_at(&base_url));
        session.set_input_image(Some(ImageInput::from_bytes(PNG.to_vec())));

        assert_eq!(session.generate().await, Phase::Failed);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.error.as_deref(), Some(NO_IMAGE_MESSAGE));
        assert!(snapshot.result.is_none());
        assert!(snapshot.history.is_empty());
        server.await.unwrap();
    }
}
