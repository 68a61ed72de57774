//! # lawpack-runtime
//!
//! Async side of lawpack: corpus access, generation, caching and the
//! candidate loop.
//!
//! `lawpack-core` decides what a statute says and how well it fits a case.
//! This crate goes and gets the statutes:
//! - [`CaseExtractor`] turns a complaint into a [`lawpack_core::Case`]
//! - [`CandidateGenerator`] proposes statutes to try
//! - [`CandidateLoop`] searches, fetches and verifies them in order
//! - [`Pipeline`] runs all of the above plus example search
//!
//! ## Degradation
//!
//! No step fails a run. A missing generation provider falls back to the
//! deterministic case and domain-rule candidates; corpus or search failures
//! become empty results; a run without evidence ends as the score-0 FAIL
//! result that reads "추가 확인 필요".
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use lawpack_runtime::{DrfGateway, Pipeline, ResultCache, RuntimeConfig};
//!
//! let config = RuntimeConfig::from_yaml_file("lawpack.yaml")?;
//! let corpus = DrfGateway::from_env(&config.corpus, config.candidate_loop.index_limit)?;
//! let pipeline = Pipeline::builder(config.clone())
//!     .corpus(Arc::new(corpus))
//!     .cache(Arc::new(ResultCache::new(&config.cache)))
//!     .build()?;
//!
//! let ctx = pipeline.find("굴착기가 도로에 상시 주기되어 있습니다").await;
//! if let Some(best) = ctx.best() {
//!     println!("{} {} ({})", best.article.statute_name, best.article.article_number, best.score());
//! }
//! ```

pub mod cache;
pub mod candidates;
pub mod case_examples;
pub mod config;
pub mod corpus;
pub mod generation;
pub mod intake;
pub mod orchestrator;
pub mod prompts;
pub mod providers;
pub mod secrets;

pub use cache::{CacheKey, CacheStats, CacheValue, ClassStats, OperationClass, ResultCache};
pub use candidates::CandidateGenerator;
pub use case_examples::{
    build_example_query, CachedExampleSearch, ExampleItem, ExampleSearchError, ExampleSearchGateway,
    NaverSearchGateway,
};
pub use config::{
    CacheConfig, CandidateConfig, ConfigError, CorpusConfig, ExamplesConfig, GenerationConfig, LoopConfig,
    RuntimeConfig,
};
pub use corpus::{CachedCorpus, CorpusError, CorpusGateway, DrfGateway};
pub use generation::{GenerationError, GenerationService, GenerationUsage, ModelUsage};
pub use intake::CaseExtractor;
pub use orchestrator::{CandidateLoop, Pipeline, PipelineBuilder, PipelineContext, PipelineError, StepTimings};
pub use providers::{
    ChatMessage, CompletionConfig, CompletionResponse, LlmProvider, ProviderError, ProviderFactory,
    ProviderRegistry, TokenUsage,
};
pub use secrets::{ApiCredential, CredentialError, CredentialSource};
