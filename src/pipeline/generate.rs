//! Text generation: the one stage with network I/O.
//!
//! Extraction only needs "prompt in, text out", so the seam is a small
//! [`TextGenerator`] trait. Two implementations ship with the crate:
//!
//! * [`CohereGenerator`] — a direct `reqwest` client for Cohere's
//!   `/v1/generate` endpoint (the default backend).
//! * [`ProviderGenerator`] — wraps any `edgequake_llm` provider (OpenAI,
//!   Anthropic, Gemini, Ollama, …) chosen by name.
//!
//! Tests substitute their own implementation. There is no retry loop: a
//! failed call is returned to the caller immediately.

use crate::config::ServiceConfig;
use crate::error::InvoiceError;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Parameters for one generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub model: String,
    pub max_tokens: usize,
    pub temperature: f32,
    pub stop_sequences: Vec<String>,
}

impl GenerationRequest {
    /// Take the generation parameters from the service config.
    pub fn from_config(prompt: impl Into<String>, config: &ServiceConfig) -> Self {
        Self {
            prompt: prompt.into(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            stop_sequences: config.stop_sequences.clone(),
        }
    }
}

/// A text-generation backend.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Run one completion and return the generated text.
    ///
    /// Errors should be [`InvoiceError::GenerationFailed`] carrying the
    /// backend's message.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, InvoiceError>;
}

/// Cut `text` at the earliest occurrence of any stop sequence.
///
/// Backends that cannot enforce stop sequences server-side use this so every
/// backend returns text with the same shape.
pub fn truncate_at_stop(text: &str, stops: &[String]) -> String {
    let cut = stops
        .iter()
        .filter(|s| !s.is_empty())
        .filter_map(|s| text.find(s.as_str()))
        .min()
        .unwrap_or(text.len());
    text[..cut].to_string()
}

// ── Cohere ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct CohereGenerateBody<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: usize,
    temperature: f32,
    stop_sequences: &'a [String],
}

#[derive(Debug, Deserialize)]
struct CohereGenerateResponse {
    #[serde(default)]
    generations: Vec<CohereGeneration>,
}

#[derive(Debug, Deserialize)]
struct CohereGeneration {
    text: String,
}

#[derive(Debug, Deserialize)]
struct CohereErrorBody {
    message: String,
}

/// Native client for Cohere's `/v1/generate`.
pub struct CohereGenerator {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl CohereGenerator {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, InvoiceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| InvoiceError::Internal(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/generate", self.base_url)
    }
}

#[async_trait]
impl TextGenerator for CohereGenerator {
    fn name(&self) -> &str {
        "cohere"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, InvoiceError> {
        let body = CohereGenerateBody {
            model: &request.model,
            prompt: &request.prompt,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stop_sequences: &request.stop_sequences,
        };

        let start = Instant::now();
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| InvoiceError::GenerationFailed {
                message: if e.is_timeout() {
                    format!("request to Cohere timed out: {e}")
                } else {
                    e.to_string()
                },
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<CohereErrorBody>(&text)
                .map(|b| b.message)
                .unwrap_or(text);
            return Err(InvoiceError::GenerationFailed {
                message: format!("status code: {}, body: {message}", status.as_u16()),
            });
        }

        let parsed: CohereGenerateResponse =
            response
                .json()
                .await
                .map_err(|e| InvoiceError::GenerationFailed {
                    message: format!("invalid Cohere response: {e}"),
                })?;

        debug!("Cohere answered in {:?}", start.elapsed());

        parsed
            .generations
            .into_iter()
            .next()
            .map(|g| g.text)
            .ok_or_else(|| InvoiceError::GenerationFailed {
                message: "Cohere returned no generations".into(),
            })
    }
}

// ── edgequake-llm providers ──────────────────────────────────────────────

/// Any `edgequake_llm` chat provider used as a completion backend.
///
/// The prompt is sent as a single user message. Stop sequences go to the
/// provider and are applied to the reply again, since not every provider
/// honours them.
pub struct ProviderGenerator {
    provider: Arc<dyn LLMProvider>,
    name: String,
}

impl ProviderGenerator {
    pub fn new(name: impl Into<String>, provider: Arc<dyn LLMProvider>) -> Self {
        Self {
            provider,
            name: name.into(),
        }
    }
}

#[async_trait]
impl TextGenerator for ProviderGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, InvoiceError> {
        let messages = vec![ChatMessage::user(request.prompt.as_str())];
        let options = CompletionOptions {
            temperature: Some(request.temperature),
            max_tokens: Some(request.max_tokens),
            stop: (!request.stop_sequences.is_empty()).then(|| request.stop_sequences.clone()),
            ..Default::default()
        };

        let response = self
            .provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| InvoiceError::GenerationFailed {
                message: e.to_string(),
            })?;

        debug!(
            "{}: {} input tokens, {} output tokens",
            self.name, response.prompt_tokens, response.completion_tokens
        );

        Ok(truncate_at_stop(&response.content, &request.stop_sequences))
    }
}

/// Build the generation backend named in the config.
///
/// `"cohere"` selects [`CohereGenerator`] with the configured key; any other
/// name goes through [`ProviderFactory::create_llm_provider`], which reads
/// the provider's own API key from the environment.
pub fn resolve_generator(config: &ServiceConfig) -> Result<Arc<dyn TextGenerator>, InvoiceError> {
    let timeout = Duration::from_secs(config.api_timeout_secs);

    if config.uses_cohere() {
        let key = config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| InvoiceError::ProviderNotConfigured {
                provider: config.provider_name.clone(),
                hint: "COHERE_API_KEY is missing.".into(),
            })?;
        info!("Using Cohere model '{}'", config.model);
        return Ok(Arc::new(CohereGenerator::new(
            key,
            config.cohere_base_url.as_str(),
            timeout,
        )?));
    }

    let provider = ProviderFactory::create_llm_provider(&config.provider_name, &config.model)
        .map_err(|e| InvoiceError::ProviderNotConfigured {
            provider: config.provider_name.clone(),
            hint: format!("{e}"),
        })?;
    info!(
        "Using provider '{}' with model '{}'",
        config.provider_name, config.model
    );
    Ok(Arc::new(ProviderGenerator::new(
        config.provider_name.as_str(),
        provider,
    )))
}
