//! Statute corpus access.
//!
//! [`CorpusGateway`] never errors to its caller: transport, status and
//! decoding failures are logged and turned into an empty hit list or an
//! article pack without text. [`CorpusError`] exists for the layers below
//! that boundary.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lawpack_core::{ArticlePack, StatuteHit};
use thiserror::Error;

use crate::secrets::CredentialError;

mod cached;
mod drf;
mod xml;

pub use cached::CachedCorpus;
pub use drf::{DrfGateway, OC_CREDENTIAL_NAME};
pub use xml::xml_to_value;

/// Failures talking to a corpus backend.
#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Corpus returned status {0}")]
    Status(u16),

    #[error("Malformed XML: {0}")]
    Xml(String),

    #[error("Corpus backend not configured: {0}")]
    NotConfigured(String),

    #[error(transparent)]
    Credential(#[from] CredentialError),
}

/// Search and fetch over a statute corpus.
#[async_trait]
pub trait CorpusGateway: Send + Sync {
    /// Ranked matches for `query`, at most `limit`.
    async fn search(&self, query: &str, limit: usize) -> Vec<StatuteHit>;

    /// One article of statute `id`, chosen by `article_hint` when it matches.
    async fn fetch(&self, id: &str, article_hint: Option<&str>) -> ArticlePack;

    /// Backend name for logs.
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: CorpusGateway + ?Sized> CorpusGateway for Arc<T> {
    async fn search(&self, query: &str, limit: usize) -> Vec<StatuteHit> {
        (**self).search(query, limit).await
    }

    async fn fetch(&self, id: &str, article_hint: Option<&str>) -> ArticlePack {
        (**self).fetch(id, article_hint).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use lawpack_core::{ArticleSelection, DocumentShape};
    use parking_lot::Mutex;
    use std::collections::HashMap;

    /// In-memory corpus that counts calls.
    #[derive(Default)]
    pub struct MockCorpus {
        hits: HashMap<String, Vec<StatuteHit>>,
        texts: HashMap<String, String>,
        pub searches: Mutex<Vec<String>>,
        pub fetches: Mutex<Vec<(String, Option<String>)>>,
    }

    impl MockCorpus {
        pub fn new() -> Self {
            Self::default()
        }

        /// Register statute `name` under `id` with article text `text`.
        pub fn statute(mut self, name: &str, id: &str, text: &str) -> Self {
            self.hits.insert(
                name.to_string(),
                vec![StatuteHit {
                    name: name.to_string(),
                    id: id.to_string(),
                    link: format!("https://www.law.go.kr/법령/{}", name),
                    promulgation_date: "20240101".to_string(),
                }],
            );
            self.texts.insert(id.to_string(), text.to_string());
            self
        }

        pub fn search_count(&self) -> usize {
            self.searches.lock().len()
        }

        pub fn fetch_count(&self) -> usize {
            self.fetches.lock().len()
        }
    }

    #[async_trait]
    impl CorpusGateway for MockCorpus {
        async fn search(&self, query: &str, limit: usize) -> Vec<StatuteHit> {
            self.searches.lock().push(query.to_string());
            self.hits
                .get(query)
                .map(|h| h.iter().take(limit).cloned().collect())
                .unwrap_or_default()
        }

        async fn fetch(&self, id: &str, article_hint: Option<&str>) -> ArticlePack {
            self.fetches
                .lock()
                .push((id.to_string(), article_hint.map(str::to_string)));
            let text = self.texts.get(id).cloned().unwrap_or_default();
            ArticlePack {
                statute_name: String::new(),
                statute_id: id.to_string(),
                article_number: article_hint.unwrap_or("1").to_string(),
                article_title: "장소의 제한".to_string(),
                text,
                index: Vec::new(),
                link: None,
                selection: if article_hint.is_some() {
                    ArticleSelection::HintMatched
                } else {
                    ArticleSelection::FirstArticle
                },
                shape: DocumentShape::ServiceArticles,
            }
        }

        fn name(&self) -> &str {
            "mock"
        }
    }
}
