//! Generation service: the only place that talks to an LLM.
//!
//! Structured calls try the fast model up to `fast_attempts` times, then
//! escalate once to the strict model. A structured result must be a
//! non-empty JSON object that validates against the caller's schema.
//! Failures come back as `None`; callers always have a deterministic path.

use std::collections::BTreeMap;
use std::sync::Arc;

use backon::{ConstantBuilder, Retryable};
use lazy_static::lazy_static;
use lawpack_core::text::{sanitize, truncate_chars};
use parking_lot::RwLock;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::config::GenerationConfig;
use crate::prompts::{STRUCTURED_SYSTEM_PROMPT, TEXT_SYSTEM_PROMPT};
use crate::providers::{
    ChatMessage, CompletionConfig, LlmProvider, ProviderError, ProviderRegistry, TokenUsage,
};

lazy_static! {
    static ref REASONING: Regex = Regex::new(r"(?s)<think>.*?</think>").unwrap();
    static ref FENCE: Regex = Regex::new(r"```(?:json)?").unwrap();
    static ref OBJECT: Regex = Regex::new(r"(?s)\{.*\}").unwrap();
}

/// Why a single generation attempt was rejected.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("No generation provider configured")]
    NoProvider,

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Response is not a JSON object: {0}")]
    InvalidJson(String),

    #[error("Response is an empty JSON object")]
    EmptyObject,

    #[error("Response violates schema: {0}")]
    SchemaViolation(String),

    #[error("Schema does not compile: {0}")]
    InvalidSchema(String),

    #[error("Response text is empty")]
    EmptyText,
}

impl GenerationError {
    /// Whether another attempt against the same model could succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            GenerationError::NoProvider
                | GenerationError::InvalidSchema(_)
                | GenerationError::Provider(ProviderError::Unauthorized)
                | GenerationError::Provider(ProviderError::NotConfigured(_))
                | GenerationError::Provider(ProviderError::Credential(_))
        )
    }
}

/// Calls and tokens for one model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelUsage {
    pub calls: u32,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// Accumulated generation usage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationUsage {
    pub models: BTreeMap<String, ModelUsage>,

    /// Provider errors and rejected responses
    pub failed_calls: u32,

    /// Times the strict model was used after the fast model gave up
    pub escalations: u32,
}

impl GenerationUsage {
    /// Add token usage from a provider response.
    pub fn add(&mut self, usage: &TokenUsage, model: &str) {
        let entry = self.models.entry(model.to_string()).or_default();
        entry.calls += 1;
        entry.prompt_tokens += usage.prompt_tokens;
        entry.completion_tokens += usage.completion_tokens;
    }

    pub fn total_calls(&self) -> u32 {
        self.models.values().map(|m| m.calls).sum()
    }

    pub fn total_tokens(&self) -> u32 {
        self.models
            .values()
            .map(|m| m.prompt_tokens + m.completion_tokens)
            .sum()
    }
}

/// Fast/strict model routing over an [`LlmProvider`].
pub struct GenerationService {
    provider: Option<Arc<dyn LlmProvider>>,
    config: GenerationConfig,
    usage: RwLock<GenerationUsage>,
}

impl GenerationService {
    pub fn new(provider: Arc<dyn LlmProvider>, config: GenerationConfig) -> Self {
        Self {
            provider: Some(provider),
            config,
            usage: RwLock::new(GenerationUsage::default()),
        }
    }

    /// A service that never generates; every call returns `None`.
    pub fn disabled(config: GenerationConfig) -> Self {
        Self {
            provider: None,
            config,
            usage: RwLock::new(GenerationUsage::default()),
        }
    }

    /// Build the configured provider from a registry.
    pub fn from_registry(
        registry: &ProviderRegistry,
        config: GenerationConfig,
    ) -> Result<Self, ProviderError> {
        let provider = registry.create(&config.provider, &config.provider_config)?;
        Ok(Self::new(provider, config))
    }

    pub fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }

    /// Provider's local readiness check. A disabled service is never ready.
    pub async fn is_ready(&self) -> bool {
        match self.provider.as_deref() {
            Some(provider) => provider.health_check().await,
            None => false,
        }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Snapshot of usage so far.
    pub fn usage(&self) -> GenerationUsage {
        self.usage.read().clone()
    }

    /// JSON object validating against `schema`, or `None`.
    pub async fn generate_structured(&self, prompt: &str, schema: &Value) -> Option<Value> {
        let provider = self.provider.as_deref()?;

        let validator = match jsonschema::options().build(schema) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "generation schema does not compile");
                return None;
            }
        };

        if self.config.fast_attempts > 0 {
            let backoff = ConstantBuilder::default()
                .with_delay(self.config.retry_delay)
                .with_max_times(self.config.fast_attempts - 1);

            let fast = (|| self.structured_once(provider, &self.config.fast_model, prompt, &validator))
                .retry(backoff)
                .when(GenerationError::is_retryable)
                .notify(|e: &GenerationError, delay| {
                    tracing::debug!(
                        model = %self.config.fast_model,
                        error = %e,
                        ?delay,
                        "retrying structured generation"
                    );
                })
                .await;

            match fast {
                Ok(value) => return Some(value),
                Err(e) => tracing::warn!(
                    model = %self.config.fast_model,
                    error = %e,
                    "fast model failed, escalating to strict model"
                ),
            }
        }

        self.usage.write().escalations += 1;
        match self
            .structured_once(provider, &self.config.strict_model, prompt, &validator)
            .await
        {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(model = %self.config.strict_model, error = %e, "structured generation failed");
                None
            }
        }
    }

    /// Free text from the fast model, then once from the strict model.
    pub async fn generate_text(&self, prompt: &str) -> Option<String> {
        let provider = self.provider.as_deref()?;

        match self.text_once(provider, &self.config.fast_model, prompt).await {
            Ok(text) => return Some(text),
            Err(e) => tracing::warn!(
                model = %self.config.fast_model,
                error = %e,
                "fast model failed, escalating to strict model"
            ),
        }

        self.usage.write().escalations += 1;
        match self.text_once(provider, &self.config.strict_model, prompt).await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(model = %self.config.strict_model, error = %e, "text generation failed");
                None
            }
        }
    }

    async fn structured_once(
        &self,
        provider: &dyn LlmProvider,
        model: &str,
        prompt: &str,
        validator: &jsonschema::Validator,
    ) -> Result<Value, GenerationError> {
        let content = self
            .complete(provider, model, STRUCTURED_SYSTEM_PROMPT, prompt, true)
            .await?;

        let result = check_structured(&content, validator);
        if result.is_err() {
            self.usage.write().failed_calls += 1;
        }
        result
    }

    async fn text_once(
        &self,
        provider: &dyn LlmProvider,
        model: &str,
        prompt: &str,
    ) -> Result<String, GenerationError> {
        let content = self
            .complete(provider, model, TEXT_SYSTEM_PROMPT, prompt, false)
            .await?;
        let text = REASONING.replace_all(&content, "").trim().to_string();
        if text.is_empty() {
            self.usage.write().failed_calls += 1;
            return Err(GenerationError::EmptyText);
        }
        Ok(text)
    }

    async fn complete(
        &self,
        provider: &dyn LlmProvider,
        model: &str,
        system: &str,
        prompt: &str,
        json_mode: bool,
    ) -> Result<String, GenerationError> {
        let config = CompletionConfig {
            model: model.to_string(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            timeout: self.config.timeout,
            json_mode,
        };
        let messages = vec![ChatMessage::system(system), ChatMessage::user(prompt)];

        match provider.complete(messages, &config).await {
            Ok(response) => {
                self.usage.write().add(&response.usage, model);
                Ok(sanitize(&response.content))
            }
            Err(e) => {
                self.usage.write().failed_calls += 1;
                Err(e.into())
            }
        }
    }
}

impl std::fmt::Debug for GenerationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationService")
            .field("provider", &self.provider.as_ref().map(|p| p.name().to_string()))
            .field("fast_model", &self.config.fast_model)
            .field("strict_model", &self.config.strict_model)
            .finish()
    }
}

fn check_structured(content: &str, validator: &jsonschema::Validator) -> Result<Value, GenerationError> {
    let value = parse_json_object(content)
        .ok_or_else(|| GenerationError::InvalidJson(truncate_chars(content, 120)))?;

    if value.as_object().map(|o| o.is_empty()).unwrap_or(true) {
        return Err(GenerationError::EmptyObject);
    }

    if let Some(error) = validator.iter_errors(&value).next() {
        return Err(GenerationError::SchemaViolation(format!(
            "{} at {}",
            error, error.instance_path
        )));
    }

    Ok(value)
}

/// Pull a JSON object out of model output.
///
/// Drops reasoning blocks and markdown fences, then parses the outermost
/// `{...}` span. Anything that is not an object yields `None`.
pub fn parse_json_object(raw: &str) -> Option<Value> {
    let text = sanitize(raw);
    let text = REASONING.replace_all(&text, "");
    let text = FENCE.replace_all(&text, "");
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let span = OBJECT.find(text).map(|m| m.as_str()).unwrap_or(text);
    serde_json::from_str::<Value>(span)
        .ok()
        .filter(Value::is_object)
}
