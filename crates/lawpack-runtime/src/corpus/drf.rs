//! law.go.kr DRF open API backend.
//!
//! Search is `lawSearch.do`, fetch is `lawService.do` keyed by `MST`. Both
//! ask for XML, which is decoded into a JSON tree and handed to the core
//! document parsers. One attempt per call, no retry.

use std::time::Duration;

use async_trait::async_trait;
use lawpack_core::{extract_article, normalize_search_results, ArticlePack, ExtractOptions, StatuteHit};
use serde_json::Value;

use super::{CorpusError, CorpusGateway};
use crate::config::CorpusConfig;
use crate::secrets::{ApiCredential, CredentialSource, LAW_API_ID_ENV};

/// Display name of the DRF `OC` identifier.
pub const OC_CREDENTIAL_NAME: &str = "law.go.kr OC";

/// Gateway over the DRF endpoints.
pub struct DrfGateway {
    oc: ApiCredential,
    base_url: String,
    search_timeout: Duration,
    fetch_timeout: Duration,
    extract: ExtractOptions,
    #[cfg(feature = "law-drf")]
    client: reqwest::Client,
}

impl std::fmt::Debug for DrfGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrfGateway")
            .field("oc", &self.oc)
            .field("base_url", &self.base_url)
            .field("extract", &self.extract)
            .finish()
    }
}

impl DrfGateway {
    pub fn new(oc: ApiCredential, config: &CorpusConfig, index_limit: usize) -> Self {
        Self {
            oc,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            search_timeout: config.search_timeout,
            fetch_timeout: config.fetch_timeout,
            extract: ExtractOptions {
                text_cap: config.text_cap,
                index_limit,
            },
            #[cfg(feature = "law-drf")]
            client: reqwest::Client::new(),
        }
    }

    /// OC from `LAW_API_ID`.
    pub fn from_env(config: &CorpusConfig, index_limit: usize) -> Result<Self, CorpusError> {
        let oc = ApiCredential::from_env(LAW_API_ID_ENV, OC_CREDENTIAL_NAME)?;
        Ok(Self::new(oc, config, index_limit))
    }

    /// OC given directly, e.g. from a CLI flag.
    pub fn with_oc(oc: impl Into<String>, config: &CorpusConfig, index_limit: usize) -> Self {
        Self::new(
            ApiCredential::new(oc, CredentialSource::Programmatic, OC_CREDENTIAL_NAME),
            config,
            index_limit,
        )
    }

    fn search_params(&self, query: &str, limit: usize) -> Vec<(&'static str, String)> {
        vec![
            ("OC", self.oc.expose().to_string()),
            ("target", "law".to_string()),
            ("type", "XML".to_string()),
            ("query", query.to_string()),
            ("display", limit.to_string()),
            ("page", "1".to_string()),
        ]
    }

    fn fetch_params(&self, id: &str) -> Vec<(&'static str, String)> {
        vec![
            ("OC", self.oc.expose().to_string()),
            ("target", "law".to_string()),
            ("type", "XML".to_string()),
            ("MST", id.to_string()),
        ]
    }

    #[cfg(feature = "law-drf")]
    async fn request_xml(
        &self,
        endpoint: &str,
        params: &[(&'static str, String)],
        timeout: Duration,
    ) -> Result<Value, CorpusError> {
        let response = self
            .client
            .get(format!("{}/DRF/{}", self.base_url, endpoint))
            .query(params)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CorpusError::Timeout(timeout)
                } else {
                    CorpusError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CorpusError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| CorpusError::Http(e.to_string()))?;
        super::xml_to_value(&body)
    }

    #[cfg(not(feature = "law-drf"))]
    async fn request_xml(
        &self,
        _endpoint: &str,
        _params: &[(&'static str, String)],
        _timeout: Duration,
    ) -> Result<Value, CorpusError> {
        Err(CorpusError::NotConfigured(
            "DRF gateway requires the 'law-drf' feature".to_string(),
        ))
    }
}

#[async_trait]
impl CorpusGateway for DrfGateway {
    async fn search(&self, query: &str, limit: usize) -> Vec<StatuteHit> {
        let query = query.trim();
        if query.is_empty() || limit == 0 {
            return Vec::new();
        }

        let params = self.search_params(query, limit);
        match self.request_xml("lawSearch.do", &params, self.search_timeout).await {
            Ok(doc) => {
                let mut hits = normalize_search_results(&doc, &self.base_url);
                hits.truncate(limit);
                if hits.is_empty() {
                    tracing::debug!(query, "statute search returned no results");
                }
                hits
            }
            Err(e) => {
                tracing::warn!(query, error = %e, "statute search failed");
                Vec::new()
            }
        }
    }

    async fn fetch(&self, id: &str, article_hint: Option<&str>) -> ArticlePack {
        let id = id.trim();
        if id.is_empty() {
            return ArticlePack::empty("", "");
        }

        let params = self.fetch_params(id);
        match self.request_xml("lawService.do", &params, self.fetch_timeout).await {
            Ok(doc) => extract_article(&doc, id, article_hint, &self.extract),
            Err(e) => {
                tracing::warn!(statute_id = id, error = %e, "statute fetch failed");
                ArticlePack::empty("", id)
            }
        }
    }

    fn name(&self) -> &str {
        "law.go.kr"
    }
}
