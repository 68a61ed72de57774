//! Credential handling for every external service.
//!
//! Corpus, example search and generation providers all load their keys
//! through [`ApiCredential`], which never prints its value:
//!
//! ```ignore
//! use lawpack_runtime::secrets::ApiCredential;
//!
//! // Config first, then environment
//! let oc = ApiCredential::from_config_or_env(&config, "oc", "LAW_API_ID", "law.go.kr OC")?;
//!
//! // Exposed only where the request is built
//! request.query(&[("OC", oc.expose())]);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value as JsonValue;
use thiserror::Error;

/// law.go.kr DRF `OC` identifier.
pub const LAW_API_ID_ENV: &str = "LAW_API_ID";

pub const NAVER_CLIENT_ID_ENV: &str = "NAVER_CLIENT_ID";
pub const NAVER_CLIENT_SECRET_ENV: &str = "NAVER_CLIENT_SECRET";

/// Key for the default OpenAI-compatible provider.
pub const GROQ_API_KEY_ENV: &str = "GROQ_API_KEY";

const REDACTED: &str = "[REDACTED]";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("{name} required: set '{config_key}' in config or {env_var} environment variable")]
    Missing {
        name: &'static str,
        config_key: String,
        env_var: String,
    },

    #[error("Credential '{0}' not loaded")]
    NotLoaded(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Config,
    Environment,
    /// Passed in by code, e.g. a CLI flag
    Programmatic,
}

impl CredentialSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialSource::Config => "config",
            CredentialSource::Environment => "environment",
            CredentialSource::Programmatic => "programmatic",
        }
    }
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

fn env_value(env_var: &str) -> Option<String> {
    std::env::var(env_var)
        .ok()
        .and_then(|v| non_empty(&v).map(str::to_string))
}

fn config_value<'a>(config: &'a JsonValue, config_key: &str) -> Option<&'a str> {
    config.get(config_key).and_then(JsonValue::as_str).and_then(non_empty)
}

/// A secret that prints as `[REDACTED]`.
pub struct ApiCredential {
    value: SecretString,
    source: CredentialSource,
    name: &'static str,
}

impl ApiCredential {
    pub fn new(value: impl Into<String>, source: CredentialSource, name: &'static str) -> Self {
        Self {
            value: SecretString::from(value.into()),
            source,
            name,
        }
    }

    /// Load from an environment variable. Blank values count as missing.
    pub fn from_env(env_var: &str, name: &'static str) -> Result<Self, CredentialError> {
        env_value(env_var)
            .map(|v| Self::new(v, CredentialSource::Environment, name))
            .ok_or_else(|| CredentialError::Missing {
                name,
                config_key: String::new(),
                env_var: env_var.to_string(),
            })
    }

    /// `config[config_key]` if non-blank, else `env_var`.
    pub fn from_config_or_env(
        config: &JsonValue,
        config_key: &str,
        env_var: &str,
        name: &'static str,
    ) -> Result<Self, CredentialError> {
        if let Some(value) = config_value(config, config_key) {
            return Ok(Self::new(value, CredentialSource::Config, name));
        }
        Self::from_env(env_var, name).map_err(|_| CredentialError::Missing {
            name,
            config_key: config_key.to_string(),
            env_var: env_var.to_string(),
        })
    }

    /// Whether [`from_config_or_env`](Self::from_config_or_env) would succeed.
    pub fn is_available(config: &JsonValue, config_key: &str, env_var: &str) -> bool {
        config_value(config, config_key).is_some() || env_value(env_var).is_some()
    }

    /// The raw value. Call only where a request is being built.
    pub fn expose(&self) -> &str {
        self.value.expose_secret()
    }

    pub fn is_empty(&self) -> bool {
        self.expose().is_empty()
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Clone for ApiCredential {
    fn clone(&self) -> Self {
        Self::new(self.expose(), self.source, self.name)
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredential")
            .field("name", &self.name)
            .field("source", &self.source)
            .field("value", &REDACTED)
            .finish()
    }
}

impl fmt::Display for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) {}", self.name, self.source, REDACTED)
    }
}

/// Loads every credential a service needs, failing on the first missing one.
///
/// ```ignore
/// let creds = CredentialBuilder::new()
///     .require("client_id", NAVER_CLIENT_ID_ENV, "Naver client id")
///     .require("client_secret", NAVER_CLIENT_SECRET_ENV, "Naver client secret")
///     .build(&config)?;
/// ```
#[derive(Debug, Default)]
pub struct CredentialBuilder {
    /// (config key, env var, display name)
    required: Vec<(&'static str, &'static str, &'static str)>,
}

impl CredentialBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require(mut self, config_key: &'static str, env_var: &'static str, name: &'static str) -> Self {
        self.required.push((config_key, env_var, name));
        self
    }

    pub fn build(self, config: &JsonValue) -> Result<CredentialSet, CredentialError> {
        let credentials = self
            .required
            .into_iter()
            .map(|(key, env_var, name)| {
                ApiCredential::from_config_or_env(config, key, env_var, name).map(|cred| (key, cred))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        Ok(CredentialSet { credentials })
    }
}

/// Credentials loaded by a [`CredentialBuilder`], keyed by config key.
pub struct CredentialSet {
    credentials: BTreeMap<&'static str, ApiCredential>,
}

impl CredentialSet {
    pub fn get(&self, key: &str) -> Result<&ApiCredential, CredentialError> {
        self.credentials
            .get(key)
            .ok_or_else(|| CredentialError::NotLoaded(key.to_string()))
    }
}

impl fmt::Debug for CredentialSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.credentials.iter().map(|(k, v)| (k, v.source())))
            .finish()
    }
}
