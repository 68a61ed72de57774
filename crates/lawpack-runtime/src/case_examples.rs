//! Supporting example search (news, blogs, web documents about similar cases).
//!
//! Examples are context for the caseworker, never evidence: they do not
//! feed the verifier. Like the corpus, the gateway returns an empty list on
//! any failure.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lawpack_core::text::{clean_text, strip_html_tags};
use lawpack_core::{Case, TaskCategory};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::cache::{CacheKey, CacheValue, OperationClass, ResultCache};
use crate::config::ExamplesConfig;
use crate::secrets::{
    ApiCredential, CredentialBuilder, CredentialError, NAVER_CLIENT_ID_ENV, NAVER_CLIENT_SECRET_ENV,
};

/// One search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleItem {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub link: String,
}

/// Failures talking to the example search backend.
#[derive(Error, Debug)]
pub enum ExampleSearchError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Search API returned status {0}")]
    Status(u16),

    #[error("Malformed response: {0}")]
    Parse(String),

    #[error("Example search not configured: {0}")]
    NotConfigured(String),

    #[error(transparent)]
    Credential(#[from] CredentialError),
}

#[async_trait]
pub trait ExampleSearchGateway: Send + Sync {
    async fn search(&self, query: &str, category: &str, limit: usize) -> Vec<ExampleItem>;
}

#[async_trait]
impl<T: ExampleSearchGateway + ?Sized> ExampleSearchGateway for Arc<T> {
    async fn search(&self, query: &str, category: &str, limit: usize) -> Vec<ExampleItem> {
        (**self).search(query, category, limit).await
    }
}

/// Query for similar administrative cases.
pub fn build_example_query(case: &Case) -> String {
    let base = case
        .keywords
        .iter()
        .filter(|k| !k.is_empty())
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .join(" ");
    let base = if base.is_empty() {
        "행정처분".to_string()
    } else {
        base
    };

    let suffix = match case.task {
        TaskCategory::ParkingViolation => "건설기계관리법 주기위반 행정처분 사례",
        TaskCategory::Abandonment => "자동차관리법 무단방치 과태료 사례",
        TaskCategory::IllegalStop => "도로교통법 불법주정차 과태료 사례",
        _ => "행정심판 처분 사례",
    };
    format!("{} {}", base, suffix)
}

/// Items from a search API body (`{"items": [...]}`), markup removed.
/// Items without a title or link are dropped.
pub fn normalize_items(body: &JsonValue) -> Vec<ExampleItem> {
    let field = |item: &JsonValue, key: &str| {
        item.get(key)
            .and_then(JsonValue::as_str)
            .map(|s| clean_text(&strip_html_tags(s)))
            .unwrap_or_default()
    };

    body.get("items")
        .and_then(JsonValue::as_array)
        .map(|items| {
            items
                .iter()
                .map(|item| ExampleItem {
                    title: field(item, "title"),
                    description: field(item, "description"),
                    link: field(item, "link"),
                })
                .filter(|item| !item.title.is_empty() && !item.link.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Naver open search API (`/v1/search/{category}.json`).
pub struct NaverSearchGateway {
    client_id: ApiCredential,
    client_secret: ApiCredential,
    base_url: String,
    timeout: Duration,
    #[cfg(feature = "naver")]
    client: reqwest::Client,
}

impl std::fmt::Debug for NaverSearchGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NaverSearchGateway")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl NaverSearchGateway {
    /// Credentials from `credentials` JSON (`client_id`, `client_secret`)
    /// with `NAVER_CLIENT_ID` / `NAVER_CLIENT_SECRET` as fallback.
    pub fn from_config(config: &ExamplesConfig, credentials: &JsonValue) -> Result<Self, ExampleSearchError> {
        let creds = CredentialBuilder::new()
            .require("client_id", NAVER_CLIENT_ID_ENV, "Naver client id")
            .require("client_secret", NAVER_CLIENT_SECRET_ENV, "Naver client secret")
            .build(credentials)?;

        Ok(Self {
            client_id: creds.get("client_id")?.clone(),
            client_secret: creds.get("client_secret")?.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout,
            #[cfg(feature = "naver")]
            client: reqwest::Client::new(),
        })
    }

    #[cfg(feature = "naver")]
    fn params(query: &str, limit: usize) -> Vec<(&'static str, String)> {
        vec![
            ("query", query.to_string()),
            ("display", limit.to_string()),
            ("start", "1".to_string()),
            ("sort", "sim".to_string()),
        ]
    }

    #[cfg(feature = "naver")]
    async fn request(&self, query: &str, category: &str, limit: usize) -> Result<Vec<ExampleItem>, ExampleSearchError> {
        let response = self
            .client
            .get(format!("{}/v1/search/{}.json", self.base_url, category))
            .header("X-Naver-Client-Id", self.client_id.expose())
            .header("X-Naver-Client-Secret", self.client_secret.expose())
            .query(&Self::params(query, limit))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ExampleSearchError::Timeout(self.timeout)
                } else {
                    ExampleSearchError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExampleSearchError::Status(status.as_u16()));
        }

        let body: JsonValue = response
            .json()
            .await
            .map_err(|e| ExampleSearchError::Parse(e.to_string()))?;
        Ok(normalize_items(&body))
    }

    #[cfg(not(feature = "naver"))]
    async fn request(&self, _query: &str, _category: &str, _limit: usize) -> Result<Vec<ExampleItem>, ExampleSearchError> {
        Err(ExampleSearchError::NotConfigured(
            "Naver search requires the 'naver' feature".to_string(),
        ))
    }
}

#[async_trait]
impl ExampleSearchGateway for NaverSearchGateway {
    async fn search(&self, query: &str, category: &str, limit: usize) -> Vec<ExampleItem> {
        let query = query.trim();
        if query.is_empty() || limit == 0 {
            return Vec::new();
        }
        match self.request(query, category, limit).await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(query, category, error = %e, "example search failed");
                Vec::new()
            }
        }
    }
}

/// An [`ExampleSearchGateway`] memoized through a shared [`ResultCache`].
pub struct CachedExampleSearch<G> {
    inner: G,
    cache: Arc<ResultCache>,
}

impl<G: ExampleSearchGateway> CachedExampleSearch<G> {
    pub fn new(inner: G, cache: Arc<ResultCache>) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl<G: ExampleSearchGateway> ExampleSearchGateway for CachedExampleSearch<G> {
    async fn search(&self, query: &str, category: &str, limit: usize) -> Vec<ExampleItem> {
        let key = CacheKey::Examples {
            query: query.to_string(),
            category: category.to_string(),
            limit,
        };
        if let Some(CacheValue::Examples(items)) = self.cache.get(&key).await {
            return items;
        }

        let items = self.inner.search(query, category, limit).await;
        self.cache
            .put(
                key,
                CacheValue::Examples(items.clone()),
                self.cache.ttl_for(OperationClass::Examples),
            )
            .await;
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;

    struct CountingSearch {
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl ExampleSearchGateway for CountingSearch {
        async fn search(&self, query: &str, _category: &str, _limit: usize) -> Vec<ExampleItem> {
            *self.calls.lock() += 1;
            vec![ExampleItem {
                title: query.to_string(),
                description: String::new(),
                link: "https://news.example/1".to_string(),
            }]
        }
    }

    #[test]
    fn test_query_per_category() {
        let mut case = Case {
            task: TaskCategory::ParkingViolation,
            keywords: vec!["굴착기".into(), "".into(), "주기".into(), "야간".into(), "도로".into()],
            ..Case::default()
        };
        assert_eq!(
            build_example_query(&case),
            "굴착기 주기 야간 건설기계관리법 주기위반 행정처분 사례"
        );

        case.task = TaskCategory::Disclosure;
        case.keywords.clear();
        assert_eq!(build_example_query(&case), "행정처분 행정심판 처분 사례");

        case.task = TaskCategory::IllegalStop;
        assert!(build_example_query(&case).ends_with("도로교통법 불법주정차 과태료 사례"));
    }

    #[test]
    fn test_normalize_items() {
        let body = json!({
            "items": [
                {"title": "<b>굴착기</b> 도로 주기 과태료", "description": "야간 &amp; 주기", "link": "https://n.example/a"},
                {"title": "", "link": "https://n.example/b"},
                {"title": "링크 없음"},
                "garbage"
            ]
        });
        let items = normalize_items(&body);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "굴착기 도로 주기 과태료");
        assert_eq!(items[0].description, "야간 & 주기");
        assert!(normalize_items(&json!({"errorMessage": "x"})).is_empty());
    }

    #[tokio::test]
    async fn test_cached_search() {
        let inner = Arc::new(CountingSearch { calls: Mutex::new(0) });
        let cached = CachedExampleSearch::new(inner.clone(), Arc::new(ResultCache::default()));

        cached.search("주기 사례", "news", 10).await;
        cached.search("주기 사례", "news", 10).await;
        cached.search("주기 사례", "blog", 10).await;
        assert_eq!(*inner.calls.lock(), 2);
    }

    #[cfg(not(feature = "naver"))]
    #[tokio::test]
    async fn test_search_without_backend_is_empty() {
        let gw = NaverSearchGateway::from_config(
            &ExamplesConfig::default(),
            &json!({"client_id": "id", "client_secret": "secret"}),
        )
        .unwrap();
        assert!(gw.search("굴착기 주기 사례", "news", 5).await.is_empty());
        assert!(gw.search("  ", "news", 5).await.is_empty());
    }

    #[test]
    fn test_credentials_redacted_and_required() {
        let gw = NaverSearchGateway::from_config(
            &ExamplesConfig::default(),
            &json!({"client_id": "naver-id-777", "client_secret": "naver-secret-888"}),
        )
        .unwrap();
        let debug = format!("{:?}", gw);
        assert!(!debug.contains("naver-id-777"));
        assert!(!debug.contains("naver-secret-888"));

        std::env::remove_var(NAVER_CLIENT_SECRET_ENV);
        let missing = NaverSearchGateway::from_config(&ExamplesConfig::default(), &json!({"client_id": "x"}));
        assert!(matches!(missing, Err(ExampleSearchError::Credential(_))));
    }
}
