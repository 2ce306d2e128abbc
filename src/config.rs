//! Service configuration.
//!
//! Everything the service needs at runtime is held in [`ServiceConfig`],
//! built once at startup via [`ServiceConfigBuilder`] and shared read-only
//! with every request handler. Nothing is read from the environment after
//! `build()` returns; the binary maps CLI flags and env vars onto the builder.

use crate::error::InvoiceError;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Provider name that selects the native Cohere client.
pub const COHERE_PROVIDER: &str = "cohere";

/// Model used with the Cohere backend when none is given.
pub const DEFAULT_COHERE_MODEL: &str = "command";

/// Default Cohere API root.
pub const DEFAULT_COHERE_BASE_URL: &str = "https://api.cohere.ai";

/// Configuration for the invoice service.
///
/// # Example
/// ```rust
/// use invoice_ai::ServiceConfig;
///
/// let config = ServiceConfig::builder()
///     .api_key("co-test-key")
///     .port(8080)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_tokens, 500);
/// ```
#[derive(Clone)]
pub struct ServiceConfig {
    /// Interface to bind. Default: `0.0.0.0`.
    pub host: IpAddr,

    /// TCP port to listen on. Default: 5000.
    pub port: u16,

    /// Generation backend. `"cohere"` uses the native client; any other
    /// name is resolved through `edgequake_llm::ProviderFactory`.
    /// Default: `"cohere"`.
    pub provider_name: String,

    /// Model identifier passed to the backend. Default: `"command"` for
    /// Cohere; other providers must name one explicitly.
    pub model: String,

    /// Credential for the Cohere API. Required when `provider_name` is
    /// `"cohere"`; other providers read their own key from the environment.
    pub api_key: Option<String>,

    /// Cohere API root, overridable for proxies and tests.
    pub cohere_base_url: String,

    /// Sampling temperature. Default: 0.0 (deterministic extraction).
    pub temperature: f32,

    /// Generation token ceiling. Default: 500.
    pub max_tokens: usize,

    /// Generation stops at the first of these. Default: a blank line.
    pub stop_sequences: Vec<String>,

    /// Per-call timeout for the generation HTTP client, in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Document-type label used when a request omits `docType`. Default: `"Invoice"`.
    pub default_doc_type: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 5000,
            provider_name: COHERE_PROVIDER.to_string(),
            model: DEFAULT_COHERE_MODEL.to_string(),
            api_key: None,
            cohere_base_url: DEFAULT_COHERE_BASE_URL.to_string(),
            temperature: 0.0,
            max_tokens: 500,
            stop_sequences: vec!["\n\n".to_string()],
            api_timeout_secs: 60,
            default_doc_type: "Invoice".to_string(),
        }
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("provider_name", &self.provider_name)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("cohere_base_url", &self.cohere_base_url)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("stop_sequences", &self.stop_sequences)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("default_doc_type", &self.default_doc_type)
            .finish()
    }
}

impl ServiceConfig {
    /// Create a new builder for `ServiceConfig`.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder {
            config: Self::default(),
            model: None,
        }
    }

    /// Socket address the server binds to.
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the native Cohere client is selected.
    pub fn uses_cohere(&self) -> bool {
        self.provider_name.eq_ignore_ascii_case(COHERE_PROVIDER)
    }
}

/// Builder for [`ServiceConfig`].
#[derive(Debug)]
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
    model: Option<String>,
}

impl ServiceConfigBuilder {
    pub fn host(mut self, host: IpAddr) -> Self {
        self.config.host = host;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = name.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn cohere_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.cohere_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn stop_sequences(mut self, stops: Vec<String>) -> Self {
        self.config.stop_sequences = stops;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs.max(1);
        self
    }

    pub fn default_doc_type(mut self, label: impl Into<String>) -> Self {
        self.config.default_doc_type = label.into();
        self
    }

    /// Build the configuration, validating constraints.
    ///
    /// Fails when the Cohere backend is selected without a credential, so a
    /// misconfigured process dies at startup instead of on its first request.
    pub fn build(mut self) -> Result<ServiceConfig, InvoiceError> {
        match self.model.take() {
            Some(model) => self.config.model = model,
            None if self.config.uses_cohere() => {
                self.config.model = DEFAULT_COHERE_MODEL.to_string();
            }
            None => {
                return Err(InvoiceError::InvalidConfig(format!(
                    "provider '{}' needs an explicit model (--model or INVOICE_AI_MODEL)",
                    self.config.provider_name
                )));
            }
        }

        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(InvoiceError::InvalidConfig("model must not be empty".into()));
        }
        if c.max_tokens == 0 {
            return Err(InvoiceError::InvalidConfig("max_tokens must be ≥ 1".into()));
        }
        if c.default_doc_type.trim().is_empty() {
            return Err(InvoiceError::InvalidConfig(
                "default document type must not be empty".into(),
            ));
        }
        if c.uses_cohere() && c.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
            return Err(InvoiceError::ProviderNotConfigured {
                provider: COHERE_PROVIDER.to_string(),
                hint: "COHERE_API_KEY is missing. Set it in the environment or in .env.".into(),
            });
        }
        Ok(self.config)
    }
}
