//! Chat completion backends used by [`GenerationService`](crate::generation::GenerationService).
//!
//! A backend is an [`LlmProvider`]; a [`ProviderRegistry`] builds one from
//! a type name and a JSON settings object. The only shipped backend speaks
//! the OpenAI chat completions dialect and points at Groq.
//!
//! API keys travel as [`crate::secrets::ApiCredential`] and are redacted in
//! Debug and Display output.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::secrets::CredentialError;

mod factory;
mod openai_compat;

pub use factory::{ProviderFactory, ProviderRegistry};
pub use openai_compat::{OpenAiCompatProvider, OpenAiCompatProviderFactory, GROQ_BASE_URL};

/// Completion call failures.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Completion request failed: {0}")]
    Http(String),

    #[error("Provider throttled the request (retry after {retry_after:?})")]
    RateLimited { retry_after: Option<Duration> },

    #[error("Provider returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Unreadable completion body: {0}")]
    Parse(String),

    #[error("Provider rejected the API key")]
    Unauthorized,

    #[error("No completion within {0:?}")]
    Timeout(Duration),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error(transparent)]
    Credential(#[from] CredentialError),
}

/// Per-call settings.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,

    /// Request `response_format: json_object`
    pub json_mode: bool,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: "qwen/qwen3-32b".to_string(),
            max_tokens: 1200,
            temperature: 0.1,
            timeout: Duration::from_secs(15),
            json_mode: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

/// One turn of a prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// What a provider returned for one call.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
    pub usage: TokenUsage,

    /// Model that actually answered
    pub model: String,

    /// `finish_reason` as reported
    pub stop_reason: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl TokenUsage {
    pub fn total(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// A chat completion backend.
///
/// Only generation calls providers; the candidate loop and the verifier
/// never do.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError>;

    /// Cheap local readiness check, no network call.
    async fn health_check(&self) -> bool;

    /// Name for logs.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles_serialize_lowercase() {
        let value = serde_json::to_value(vec![ChatMessage::system("규칙"), ChatMessage::user("입력")]).unwrap();
        assert_eq!(value[0]["role"], "system");
        assert_eq!(value[1]["role"], "user");
        assert_eq!(value[1]["content"], "입력");
    }

    #[test]
    fn test_usage_sums_both_sides() {
        let usage = TokenUsage {
            prompt_tokens: 320,
            completion_tokens: 48,
        };
        assert_eq!(usage.total(), 368);
    }

    #[test]
    fn test_credential_error_converts() {
        let err: ProviderError = CredentialError::NotLoaded("api_key".to_string()).into();
        assert!(err.to_string().contains("api_key"));
    }
}
