//! Corpus gateway memoized through the shared [`ResultCache`].
//!
//! Searches and article fetches are cached under separate operation
//! classes; empty results are never stored, so a failed call is retried on
//! the next run.

use std::sync::Arc;

use async_trait::async_trait;
use lawpack_core::{ArticlePack, StatuteHit};

use super::CorpusGateway;
use crate::cache::{CacheKey, CacheValue, OperationClass, ResultCache};

/// A [`CorpusGateway`] memoized through a shared [`ResultCache`].
pub struct CachedCorpus<G> {
    inner: G,
    cache: Arc<ResultCache>,
}

impl<G: CorpusGateway> CachedCorpus<G> {
    pub fn new(inner: G, cache: Arc<ResultCache>) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    pub fn inner(&self) -> &G {
        &self.inner
    }
}

#[async_trait]
impl<G: CorpusGateway> CorpusGateway for CachedCorpus<G> {
    async fn search(&self, query: &str, limit: usize) -> Vec<StatuteHit> {
        let key = CacheKey::Search {
            query: query.to_string(),
            limit,
        };
        if let Some(CacheValue::Search(hits)) = self.cache.get(&key).await {
            return hits;
        }

        let hits = self.inner.search(query, limit).await;
        self.cache
            .put(
                key,
                CacheValue::Search(hits.clone()),
                self.cache.ttl_for(OperationClass::Search),
            )
            .await;
        hits
    }

    async fn fetch(&self, id: &str, article_hint: Option<&str>) -> ArticlePack {
        let key = CacheKey::Fetch {
            id: id.to_string(),
            article_hint: article_hint.map(str::to_string),
        };
        if let Some(CacheValue::Fetch(pack)) = self.cache.get(&key).await {
            return pack;
        }

        let pack = self.inner.fetch(id, article_hint).await;
        self.cache
            .put(
                key,
                CacheValue::Fetch(pack.clone()),
                self.cache.ttl_for(OperationClass::Fetch),
            )
            .await;
        pack
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
