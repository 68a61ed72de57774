//! Runtime configuration.
//!
//! Every section has defaults, so an empty YAML document is a valid
//! configuration. Durations are written the human way (`"1h"`, `"200ms"`).

use std::path::Path;
use std::time::Duration;

use lawpack_core::{VerifierConfig, DEFAULT_CANDIDATE_CAP, MAX_CANDIDATE_CAP};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

mod duration_human {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(raw.trim()).map_err(serde::de::Error::custom)
    }
}

/// Candidate loop limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    /// Maximum candidates attempted per run
    pub max_attempts: usize,

    /// Results requested from each corpus search
    pub search_limit: usize,

    /// Maximum entries in an article's sibling index
    pub index_limit: usize,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_attempts: 6,
            search_limit: 10,
            index_limit: 120,
        }
    }
}

/// Candidate generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateConfig {
    /// Candidate list cap, never above 10
    pub cap: usize,

    /// Turn case keywords into candidates when the list would be empty
    pub keyword_fallback: bool,
}

impl Default for CandidateConfig {
    fn default() -> Self {
        Self {
            cap: DEFAULT_CANDIDATE_CAP,
            keyword_fallback: false,
        }
    }
}

/// Result cache settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub max_entries: u64,

    #[serde(with = "duration_human")]
    pub search_ttl: Duration,

    #[serde(with = "duration_human")]
    pub fetch_ttl: Duration,

    #[serde(with = "duration_human")]
    pub examples_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            search_ttl: Duration::from_secs(60 * 60),
            fetch_ttl: Duration::from_secs(60 * 60),
            examples_ttl: Duration::from_secs(30 * 60),
        }
    }
}

/// Generation service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Provider type in the registry
    pub provider: String,

    /// Provider-specific settings passed to the factory
    pub provider_config: serde_json::Value,

    /// Model tried first
    pub fast_model: String,

    /// Model used once after the fast model gives up
    pub strict_model: String,

    /// Structured-call attempts against the fast model
    pub fast_attempts: usize,

    #[serde(with = "duration_human")]
    pub retry_delay: Duration,

    pub temperature: f32,

    pub max_tokens: u32,

    #[serde(with = "duration_human")]
    pub timeout: Duration,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: "openai-compatible".to_string(),
            provider_config: serde_json::json!({}),
            fast_model: "qwen/qwen3-32b".to_string(),
            strict_model: "llama-3.3-70b-versatile".to_string(),
            fast_attempts: 2,
            retry_delay: Duration::from_millis(200),
            temperature: 0.1,
            max_tokens: 1200,
            timeout: Duration::from_secs(15),
        }
    }
}

/// Statute corpus settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    pub base_url: String,

    #[serde(with = "duration_human")]
    pub search_timeout: Duration,

    #[serde(with = "duration_human")]
    pub fetch_timeout: Duration,

    /// Maximum characters of article text kept
    pub text_cap: usize,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.law.go.kr".to_string(),
            search_timeout: Duration::from_secs(8),
            fetch_timeout: Duration::from_secs(12),
            text_cap: 4000,
        }
    }
}

/// Supporting example search settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExamplesConfig {
    pub enabled: bool,

    /// Search category (`news`, `blog`, `webkr`, ...)
    pub category: String,

    pub display: usize,

    #[serde(with = "duration_human")]
    pub timeout: Duration,

    pub base_url: String,
}

impl Default for ExamplesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            category: "news".to_string(),
            display: 10,
            timeout: Duration::from_secs(7),
            base_url: "https://openapi.naver.com".to_string(),
        }
    }
}

/// Complete runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub candidate_loop: LoopConfig,
    pub candidates: CandidateConfig,
    pub cache: CacheConfig,
    pub generation: GenerationConfig,
    pub corpus: CorpusConfig,
    pub examples: ExamplesConfig,
    pub verifier: VerifierConfig,
}

impl RuntimeConfig {
    /// Parse and validate YAML.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: RuntimeConfig = if yaml.trim().is_empty() {
            RuntimeConfig::default()
        } else {
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))?
        };
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Reject settings the loop cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.candidate_loop.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "candidate_loop.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.candidate_loop.search_limit == 0 {
            return Err(ConfigError::Invalid(
                "candidate_loop.search_limit must be at least 1".to_string(),
            ));
        }
        if self.candidates.cap > MAX_CANDIDATE_CAP {
            return Err(ConfigError::Invalid(format!(
                "candidates.cap {} exceeds the maximum of {}",
                self.candidates.cap, MAX_CANDIDATE_CAP
            )));
        }
        for (name, ttl) in [
            ("search_ttl", self.cache.search_ttl),
            ("fetch_ttl", self.cache.fetch_ttl),
            ("examples_ttl", self.cache.examples_ttl),
        ] {
            if ttl.is_zero() {
                return Err(ConfigError::Invalid(format!("cache.{} must be non-zero", name)));
            }
        }
        if self.verifier.weak_threshold > self.verifier.confirmed_threshold {
            return Err(ConfigError::Invalid(format!(
                "verifier.weak_threshold {} is above confirmed_threshold {}",
                self.verifier.weak_threshold, self.verifier.confirmed_threshold
            )));
        }
        if self.verifier.thin_text_chars > self.verifier.full_text_chars {
            return Err(ConfigError::Invalid(
                "verifier.thin_text_chars is above full_text_chars".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.candidate_loop.max_attempts, 6);
        assert_eq!(config.candidates.cap, 8);
        assert!(!config.candidates.keyword_fallback);
        assert_eq!(config.cache.examples_ttl, Duration::from_secs(1800));
        assert_eq!(config.generation.fast_attempts, 2);
        assert_eq!(config.corpus.fetch_timeout, Duration::from_secs(12));
        assert_eq!(config.verifier.confirmed_threshold, 75);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(RuntimeConfig::from_yaml_str("").unwrap(), RuntimeConfig::default());
    }

    #[test]
    fn test_partial_yaml_with_durations() {
        let yaml = r#"
candidate_loop:
  max_attempts: 3
cache:
  search_ttl: 10m
  fetch_ttl: 2h 30m
generation:
  retry_delay: 50ms
verifier:
  confirmed_threshold: 80
"#;
        let config = RuntimeConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.candidate_loop.max_attempts, 3);
        assert_eq!(config.candidate_loop.search_limit, 10);
        assert_eq!(config.cache.search_ttl, Duration::from_secs(600));
        assert_eq!(config.cache.fetch_ttl, Duration::from_secs(9000));
        assert_eq!(config.generation.retry_delay, Duration::from_millis(50));
        assert_eq!(config.verifier.confirmed_threshold, 80);
        assert_eq!(config.verifier.weak_threshold, 50);
    }

    #[test]
    fn test_invalid_duration() {
        let err = RuntimeConfig::from_yaml_str("cache:\n  search_ttl: soon\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_failures() {
        for yaml in [
            "candidate_loop:\n  max_attempts: 0\n",
            "candidates:\n  cap: 11\n",
            "cache:\n  fetch_ttl: 0s\n",
            "verifier:\n  confirmed_threshold: 40\n",
        ] {
            let err = RuntimeConfig::from_yaml_str(yaml).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "accepted: {}", yaml);
        }
    }

    #[test]
    fn test_round_trip_human_durations() {
        let yaml = serde_yaml::to_string(&RuntimeConfig::default()).unwrap();
        assert!(yaml.contains("search_ttl: 1h"));
        let parsed = RuntimeConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed, RuntimeConfig::default());
    }
}
