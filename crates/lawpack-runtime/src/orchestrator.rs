//! Candidate loop and the end-to-end pipeline.
//!
//! The loop walks candidates strictly in order, one at a time:
//! - search the corpus by statute name and take the first hit
//! - fetch the hinted article (or the first one)
//! - verify it deterministically against the case
//! - stop early on the first CONFIRMED result
//!
//! Nothing here fails a run. Missing evidence ends as the score-0 FAIL
//! sentinel, which callers report as requiring confirmation.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use lawpack_core::{
    ArticlePack, AttemptOutcome, AttemptRecord, AttemptState, Candidate, Case, FetchOutcome, LawPack, LoopOutcome,
    LoopTerminal, LoopTrace, SearchOutcome, SkipReason, VerificationEngine,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cache::{CacheStats, ResultCache};
use crate::candidates::CandidateGenerator;
use crate::case_examples::{build_example_query, CachedExampleSearch, ExampleItem, ExampleSearchGateway};
use crate::config::{ConfigError, ExamplesConfig, LoopConfig, RuntimeConfig};
use crate::corpus::{CachedCorpus, CorpusGateway};
use crate::generation::{GenerationService, GenerationUsage};
use crate::intake::CaseExtractor;

/// Errors assembling a pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("No corpus gateway configured")]
    MissingCorpus,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

fn advance(state: &mut AttemptState, next: AttemptState, index: usize, candidate: &Candidate) {
    debug_assert!(state.can_transition_to(next), "{} -> {}", state, next);
    tracing::debug!(
        index,
        law_name = %candidate.law_name,
        from = %state,
        to = %next,
        "attempt state"
    );
    *state = next;
}

/// Sequential lookup, verify and early stop over a candidate list.
pub struct CandidateLoop {
    corpus: Arc<dyn CorpusGateway>,
    verifier: VerificationEngine,
    config: LoopConfig,
}

impl CandidateLoop {
    pub fn new(corpus: Arc<dyn CorpusGateway>, verifier: VerificationEngine, config: LoopConfig) -> Self {
        Self {
            corpus,
            verifier,
            config,
        }
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// Run candidates in order, at most `max_attempts` of them.
    pub async fn run(&self, case: &Case, candidates: &[Candidate]) -> LoopOutcome {
        let started = Instant::now();
        let mut best = LawPack::no_evidence();
        let mut attempts: Vec<AttemptRecord> = Vec::new();
        let mut terminal = LoopTerminal::Exhausted;

        for (index, candidate) in candidates.iter().take(self.config.max_attempts).enumerate() {
            let (record, pack) = self.attempt(case, index, candidate).await;

            if let (Some(pack), Some(verify)) = (pack, record.outcome.verify()) {
                if verify.total > best.score() {
                    best = LawPack {
                        article: pack,
                        verify: verify.clone(),
                        candidate: Some(candidate.clone()),
                    };
                }
            }

            let confirmed = record.is_confirmed();
            attempts.push(record);
            if confirmed {
                terminal = LoopTerminal::Confirmed;
                break;
            }
        }

        let outcome = LoopOutcome {
            best,
            trace: LoopTrace::from_attempts(attempts),
            terminal,
            elapsed_ms: elapsed_ms(started),
            completed_at: Utc::now(),
        };

        tracing::info!(
            terminal = ?outcome.terminal,
            attempts = outcome.trace.len(),
            candidates = candidates.len(),
            best = %outcome.best.article.statute_name,
            score = outcome.best.score(),
            verdict = %outcome.best.verdict(),
            "candidate loop finished"
        );
        outcome
    }

    async fn attempt(
        &self,
        case: &Case,
        index: usize,
        candidate: &Candidate,
    ) -> (AttemptRecord, Option<ArticlePack>) {
        let mut state = AttemptState::Pending;
        let mut record = AttemptRecord {
            index,
            candidate: candidate.clone(),
            search: SearchOutcome::NoResult,
            fetch: FetchOutcome::NotAttempted,
            outcome: AttemptOutcome::Skipped {
                reason: SkipReason::NoSearchResult,
            },
            search_ms: 0,
            fetch_ms: 0,
        };

        advance(&mut state, AttemptState::Searching, index, candidate);
        let search_started = Instant::now();
        let hits = self
            .corpus
            .search(&candidate.law_name, self.config.search_limit)
            .await;
        record.search_ms = elapsed_ms(search_started);

        let Some(hit) = hits.first().cloned() else {
            advance(&mut state, AttemptState::Skipped, index, candidate);
            tracing::warn!(law_name = %candidate.law_name, "no search result, skipping candidate");
            return (record, None);
        };
        record.search = SearchOutcome::Hit {
            hit: hit.clone(),
            total_hits: hits.len(),
        };

        advance(&mut state, AttemptState::Fetching, index, candidate);
        let hint = candidate.article_hint_str();
        let fetch_started = Instant::now();
        let mut pack = self.corpus.fetch(&hit.id, hint.as_deref()).await;
        record.fetch_ms = elapsed_ms(fetch_started);

        if pack.statute_name.trim().is_empty() {
            pack.statute_name = hit.name.clone();
        }
        if pack.link.is_none() && !hit.link.is_empty() {
            pack.link = Some(hit.link.clone());
        }
        record.fetch = FetchOutcome::Fetched {
            article_number: pack.article_number.clone(),
            article_title: pack.article_title.clone(),
            selection: pack.selection.clone(),
            text_chars: pack.text.chars().count(),
        };

        if !pack.has_text() {
            advance(&mut state, AttemptState::Skipped, index, candidate);
            tracing::warn!(law_name = %candidate.law_name, statute_id = %hit.id, "empty article text, skipping candidate");
            record.outcome = AttemptOutcome::Skipped {
                reason: SkipReason::EmptyText,
            };
            return (record, None);
        }
        if pack.used_fallback() {
            tracing::debug!(law_name = %candidate.law_name, hint = ?hint, "hinted article not found, using first article");
        }

        advance(&mut state, AttemptState::Verifying, index, candidate);
        let verify = self.verifier.verify(case, &pack.article_title, &pack.text);
        advance(&mut state, AttemptState::Recorded, index, candidate);
        record.outcome = AttemptOutcome::Recorded { verify };

        (record, Some(pack))
    }
}

/// Wall-clock time per pipeline step, in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepTimings {
    pub intake_ms: u64,
    pub candidates_ms: u64,
    pub loop_ms: u64,
    pub examples_ms: u64,
}

impl StepTimings {
    pub fn total_ms(&self) -> u64 {
        self.intake_ms + self.candidates_ms + self.loop_ms + self.examples_ms
    }
}

/// State of one pipeline run, owned by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineContext {
    pub raw_input: String,

    /// Preset to skip intake
    pub case: Option<Case>,

    pub candidates: Vec<Candidate>,
    pub outcome: Option<LoopOutcome>,

    #[serde(default)]
    pub example_query: Option<String>,

    #[serde(default)]
    pub examples: Vec<ExampleItem>,

    pub timings: StepTimings,
    pub started_at: DateTime<Utc>,

    #[serde(default)]
    pub generation_usage: Option<GenerationUsage>,

    #[serde(default)]
    pub cache_stats: Option<CacheStats>,
}

impl PipelineContext {
    pub fn new(raw_input: impl Into<String>) -> Self {
        Self {
            raw_input: raw_input.into(),
            case: None,
            candidates: Vec::new(),
            outcome: None,
            example_query: None,
            examples: Vec::new(),
            timings: StepTimings::default(),
            started_at: Utc::now(),
            generation_usage: None,
            cache_stats: None,
        }
    }

    /// Context for an already structured case.
    pub fn with_case(case: Case) -> Self {
        let mut ctx = Self::new(case.facts.what.clone());
        ctx.case = Some(case);
        ctx
    }

    pub fn best(&self) -> Option<&LawPack> {
        self.outcome.as_ref().map(|o| &o.best)
    }

    /// True unless the best result is CONFIRMED.
    pub fn requires_confirmation(&self) -> bool {
        self.outcome
            .as_ref()
            .map(LoopOutcome::requires_confirmation)
            .unwrap_or(true)
    }
}

/// Intake, candidates, loop and example search in one run.
pub struct Pipeline {
    extractor: CaseExtractor,
    generator: CandidateGenerator,
    candidate_loop: CandidateLoop,
    generation: Arc<GenerationService>,
    examples: Option<Arc<dyn ExampleSearchGateway>>,
    examples_config: ExamplesConfig,
    cache: Option<Arc<ResultCache>>,
}

impl Pipeline {
    pub fn builder(config: RuntimeConfig) -> PipelineBuilder {
        PipelineBuilder {
            config,
            corpus: None,
            generation: None,
            examples: None,
            cache: None,
        }
    }

    pub fn candidate_loop(&self) -> &CandidateLoop {
        &self.candidate_loop
    }

    /// Run the pipeline into `ctx`. Intake is skipped when `ctx` already
    /// holds a case. Candidates, the loop and (when configured) example
    /// search run every time and overwrite earlier results. Never fails; a step whose collaborator is
    /// unavailable degrades to its deterministic path.
    pub async fn run(&self, ctx: &mut PipelineContext) {
        if ctx.case.is_none() {
            let started = Instant::now();
            ctx.case = Some(self.extractor.extract(&ctx.raw_input).await);
            ctx.timings.intake_ms = elapsed_ms(started);
        }
        let case = match ctx.case.clone() {
            Some(case) => case,
            None => Case::fallback(&ctx.raw_input),
        };

        let started = Instant::now();
        ctx.candidates = self.generator.generate(&case).await;
        ctx.timings.candidates_ms = elapsed_ms(started);

        let started = Instant::now();
        ctx.outcome = Some(self.candidate_loop.run(&case, &ctx.candidates).await);
        ctx.timings.loop_ms = elapsed_ms(started);

        if let (Some(examples), true) = (&self.examples, self.examples_config.enabled) {
            let started = Instant::now();
            let query = build_example_query(&case);
            ctx.examples = examples
                .search(&query, &self.examples_config.category, self.examples_config.display)
                .await;
            ctx.example_query = Some(query);
            ctx.timings.examples_ms = elapsed_ms(started);
        }

        ctx.generation_usage = Some(self.generation.usage());
        ctx.cache_stats = self.cache.as_ref().map(|c| c.stats());

        tracing::info!(
            candidates = ctx.candidates.len(),
            examples = ctx.examples.len(),
            total_ms = ctx.timings.total_ms(),
            requires_confirmation = ctx.requires_confirmation(),
            "pipeline finished"
        );
    }

    /// [`run`](Self::run) on a fresh context.
    pub async fn find(&self, raw_input: &str) -> PipelineContext {
        let mut ctx = PipelineContext::new(raw_input);
        self.run(&mut ctx).await;
        ctx
    }

    /// [`run`](Self::run) for an already structured case, skipping intake.
    pub async fn run_case(&self, case: Case) -> PipelineContext {
        let mut ctx = PipelineContext::with_case(case);
        self.run(&mut ctx).await;
        ctx
    }
}

/// Assembles a [`Pipeline`] from configuration and collaborators.
pub struct PipelineBuilder {
    config: RuntimeConfig,
    corpus: Option<Arc<dyn CorpusGateway>>,
    generation: Option<Arc<GenerationService>>,
    examples: Option<Arc<dyn ExampleSearchGateway>>,
    cache: Option<Arc<ResultCache>>,
}

impl PipelineBuilder {
    pub fn corpus(mut self, corpus: Arc<dyn CorpusGateway>) -> Self {
        self.corpus = Some(corpus);
        self
    }

    pub fn generation(mut self, generation: Arc<GenerationService>) -> Self {
        self.generation = Some(generation);
        self
    }

    pub fn examples(mut self, examples: Arc<dyn ExampleSearchGateway>) -> Self {
        self.examples = Some(examples);
        self
    }

    /// Memoize corpus and example calls through `cache`.
    pub fn cache(mut self, cache: Arc<ResultCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn build(self) -> Result<Pipeline, PipelineError> {
        self.config.validate()?;
        let corpus = self.corpus.ok_or(PipelineError::MissingCorpus)?;

        let (corpus, examples): (Arc<dyn CorpusGateway>, Option<Arc<dyn ExampleSearchGateway>>) =
            match &self.cache {
                Some(cache) => (
                    Arc::new(CachedCorpus::new(corpus, cache.clone())),
                    self.examples.map(|e| {
                        Arc::new(CachedExampleSearch::new(e, cache.clone())) as Arc<dyn ExampleSearchGateway>
                    }),
                ),
                None => (corpus, self.examples),
            };

        let generation = self
            .generation
            .unwrap_or_else(|| Arc::new(GenerationService::disabled(self.config.generation.clone())));

        Ok(Pipeline {
            extractor: CaseExtractor::new(generation.clone()),
            generator: CandidateGenerator::new(generation.clone(), self.config.candidates.clone()),
            candidate_loop: CandidateLoop::new(
                corpus,
                VerificationEngine::new(self.config.verifier.clone()),
                self.config.candidate_loop.clone(),
            ),
            generation,
            examples,
            examples_config: self.config.examples.clone(),
            cache: self.cache,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::testing::MockCorpus;
    use crate::generation::testing::{quick_config, ScriptedProvider};
    use async_trait::async_trait;
    use lawpack_core::{CandidateOrigin, TaskCategory, Verdict, NEEDS_CONFIRMATION};
    use proptest::prelude::*;

    fn parking_case() -> Case {
        Case {
            task: TaskCategory::ParkingViolation,
            keywords: vec!["건설기계".to_string(), "주기".to_string()],
            ..Case::default()
        }
    }

    fn candidate(name: &str) -> Candidate {
        Candidate::new(name, CandidateOrigin::DomainRule)
    }

    fn text_with(keyword: &str, chars: usize) -> String {
        let mut text = keyword.to_string();
        while text.chars().count() < chars {
            text.push('가');
        }
        text
    }

    fn run_loop(corpus: Arc<MockCorpus>, case: &Case, candidates: &[Candidate]) -> LoopOutcome {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let candidate_loop = CandidateLoop::new(corpus, VerificationEngine::default(), LoopConfig::default());
        runtime.block_on(candidate_loop.run(case, candidates))
    }

    #[tokio::test]
    async fn test_confirmed_on_first_candidate_stops_early() {
        let corpus = Arc::new(MockCorpus::new().statute("건설기계관리법", "000123", &text_with("주기", 260)));
        let candidates: Vec<Candidate> = [
            "건설기계관리법",
            "건설기계관리법 시행령",
            "도로교통법",
            "주차장법",
            "행정절차법",
            "행정기본법",
        ]
        .iter()
        .map(|n| candidate(n))
        .collect();

        let candidate_loop = CandidateLoop::new(corpus.clone(), VerificationEngine::default(), LoopConfig::default());
        let outcome = candidate_loop.run(&parking_case(), &candidates).await;

        assert_eq!(outcome.terminal, LoopTerminal::Confirmed);
        assert_eq!(outcome.trace.len(), 1);
        assert_eq!(outcome.best.verdict(), Verdict::Confirmed);
        assert_eq!(outcome.best.score(), 77);
        assert_eq!(outcome.best.article.statute_id, "000123");
        assert_eq!(outcome.best.article.statute_name, "건설기계관리법");
        assert!(outcome.best.article.link.is_some());
        assert_eq!(corpus.search_count(), 1);
        assert_eq!(corpus.fetch_count(), 1);
        assert!(!outcome.requires_confirmation());
    }

    #[tokio::test]
    async fn test_empty_candidate_list() {
        let corpus = Arc::new(MockCorpus::new());
        let candidate_loop = CandidateLoop::new(corpus.clone(), VerificationEngine::default(), LoopConfig::default());
        let outcome = candidate_loop.run(&parking_case(), &[]).await;

        assert!(outcome.best.is_no_evidence());
        assert_eq!(outcome.best.score(), 0);
        assert_eq!(outcome.best.verdict(), Verdict::Fail);
        assert!(outcome.trace.is_empty());
        assert_eq!(outcome.terminal, LoopTerminal::Exhausted);
        assert_eq!(outcome.status_message(), NEEDS_CONFIRMATION);
        assert_eq!(corpus.search_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_text_skipped_then_second_wins() {
        let corpus = Arc::new(
            MockCorpus::new()
                .statute("자동차관리법", "000200", "")
                .statute("도로교통법", "000300", &text_with("건설기계 주기", 300)),
        );
        let candidates = vec![candidate("자동차관리법"), candidate("도로교통법")];

        let candidate_loop = CandidateLoop::new(corpus, VerificationEngine::default(), LoopConfig::default());
        let outcome = candidate_loop.run(&parking_case(), &candidates).await;

        assert_eq!(outcome.trace.len(), 2);
        let first = &outcome.trace.attempts()[0];
        assert_eq!(first.outcome.skip_reason(), Some(SkipReason::EmptyText));
        assert!(matches!(first.fetch, FetchOutcome::Fetched { text_chars: 0, .. }));
        assert_eq!(outcome.best.article.statute_id, "000300");
        assert_eq!(
            outcome.best.candidate.as_ref().map(|c| c.law_name.as_str()),
            Some("도로교통법")
        );
    }

    #[tokio::test]
    async fn test_no_search_result_and_max_attempts() {
        let corpus = Arc::new(MockCorpus::new());
        let candidates: Vec<Candidate> = (0..9).map(|i| candidate(&format!("법률{}", i))).collect();
        let config = LoopConfig {
            max_attempts: 3,
            ..LoopConfig::default()
        };

        let candidate_loop = CandidateLoop::new(corpus.clone(), VerificationEngine::default(), config);
        let outcome = candidate_loop.run(&parking_case(), &candidates).await;

        assert_eq!(outcome.trace.len(), 3);
        assert!(outcome
            .trace
            .attempts()
            .iter()
            .all(|a| a.outcome.skip_reason() == Some(SkipReason::NoSearchResult)));
        assert_eq!(corpus.fetch_count(), 0);
        assert!(outcome.best.is_no_evidence());
    }

    #[tokio::test]
    async fn test_ties_keep_first_seen() {
        let corpus = Arc::new(
            MockCorpus::new()
                .statute("도로교통법", "1", &text_with("", 100))
                .statute("주차장법", "2", &text_with("", 100)),
        );
        let candidates = vec![candidate("도로교통법"), candidate("주차장법")];

        let candidate_loop = CandidateLoop::new(corpus, VerificationEngine::default(), LoopConfig::default());
        let outcome = candidate_loop.run(&parking_case(), &candidates).await;

        assert_eq!(outcome.trace.recorded().count(), 2);
        assert_eq!(outcome.best.article.statute_id, "1");
        assert_eq!(outcome.terminal, LoopTerminal::Exhausted);
        assert!(outcome.requires_confirmation());
    }

    proptest! {
        #[test]
        fn prop_best_is_max_recorded_and_stops_at_first_confirmed(
            specs in prop::collection::vec((0usize..320, any::<bool>(), any::<bool>()), 0..9)
        ) {
            let mut corpus = MockCorpus::new();
            let mut candidates = Vec::new();
            for (i, (len, keyword, indexed)) in specs.iter().enumerate() {
                let name = format!("법률{}", i);
                if *indexed {
                    let kw = if *keyword { "주기" } else { "" };
                    corpus = corpus.statute(&name, &i.to_string(), &text_with(kw, *len));
                }
                candidates.push(candidate(&name));
            }

            let outcome = run_loop(Arc::new(corpus), &parking_case(), &candidates);

            prop_assert_eq!(outcome.best.score(), outcome.trace.max_total());
            prop_assert!(outcome.trace.len() <= LoopConfig::default().max_attempts);
            if let Some(first) = outcome.trace.first_confirmed() {
                prop_assert_eq!(outcome.trace.len(), first + 1);
                prop_assert_eq!(outcome.terminal, LoopTerminal::Confirmed);
            } else {
                prop_assert_eq!(outcome.terminal, LoopTerminal::Exhausted);
            }
            for (position, record) in outcome.trace.attempts().iter().enumerate() {
                prop_assert_eq!(record.index, position);
            }
        }
    }

    struct FixedExamples;

    #[async_trait]
    impl ExampleSearchGateway for FixedExamples {
        async fn search(&self, query: &str, _category: &str, _limit: usize) -> Vec<ExampleItem> {
            vec![ExampleItem {
                title: format!("사례: {}", query),
                description: String::new(),
                link: "https://news.example/1".to_string(),
            }]
        }
    }

    #[tokio::test]
    async fn test_pipeline_end_to_end() {
        let provider = ScriptedProvider::ok(&[
            r#"{"task_type": "주기위반", "facts": {"what": "굴착기 도로 주기", "where": "OO동"}, "keywords": ["건설기계", "주기"]}"#,
            r#"{"candidates": [{"law_name": "건설기계관리법", "article_hint": "33", "confidence": 0.8}]}"#,
        ]);
        let corpus = Arc::new(MockCorpus::new().statute(
            "건설기계관리법",
            "000123",
            &text_with("건설기계 굴착기 도로 주기", 260),
        ));
        let cache = Arc::new(ResultCache::default());

        let pipeline = Pipeline::builder(RuntimeConfig::default())
            .corpus(corpus.clone())
            .generation(Arc::new(GenerationService::new(provider, quick_config())))
            .examples(Arc::new(FixedExamples))
            .cache(cache)
            .build()
            .unwrap();

        let ctx = pipeline.find("굴착기가 OO동 도로에 주기되어 있습니다").await;
        let case = ctx.case.as_ref().unwrap();
        assert_eq!(case.task, TaskCategory::ParkingViolation);
        assert_eq!(ctx.candidates[0].law_name, "건설기계관리법");
        assert_eq!(ctx.candidates[0].origin, CandidateOrigin::DomainRule);
        assert!(!ctx.requires_confirmation());
        assert_eq!(ctx.examples.len(), 1);
        assert!(ctx
            .example_query
            .as_deref()
            .unwrap()
            .ends_with("건설기계관리법 주기위반 행정처분 사례"));
        assert_eq!(ctx.generation_usage.as_ref().unwrap().total_calls(), 2);
        assert_eq!(ctx.cache_stats.unwrap().search.misses, 1);

        let again = pipeline.run_case(case.clone()).await;
        assert_eq!(corpus.search_count(), 1);
        assert_eq!(again.cache_stats.unwrap().search.hits, 1);
    }

    #[tokio::test]
    async fn test_pipeline_without_generation_or_examples() {
        let corpus = Arc::new(MockCorpus::new());
        let pipeline = Pipeline::builder(RuntimeConfig::default())
            .corpus(corpus)
            .build()
            .unwrap();

        let ctx = pipeline.find("정보공개 청구 처리 기한 문의").await;
        assert_eq!(ctx.case.as_ref().unwrap().task, TaskCategory::Other);
        assert!(ctx.candidates.is_empty());
        assert!(ctx.best().unwrap().is_no_evidence());
        assert!(ctx.requires_confirmation());
        assert!(ctx.examples.is_empty());
        assert_eq!(ctx.example_query, None);
    }

    #[tokio::test]
    async fn test_preset_case_skips_intake_only() {
        let pipeline = Pipeline::builder(RuntimeConfig::default())
            .corpus(Arc::new(MockCorpus::new()))
            .build()
            .unwrap();
        let case = Case {
            task: TaskCategory::Disclosure,
            ..Case::default()
        };

        let mut ctx = PipelineContext::with_case(case.clone());
        ctx.candidates = vec![candidate("이전 후보")];
        pipeline.run(&mut ctx).await;

        assert_eq!(ctx.case.as_ref(), Some(&case));
        assert_eq!(ctx.timings.intake_ms, 0);
        let names: Vec<_> = ctx.candidates.iter().map(|c| c.law_name.as_str()).collect();
        assert_eq!(names, vec!["공공기관의 정보공개에 관한 법률"]);
        assert_eq!(ctx.outcome.as_ref().unwrap().trace.len(), 1);
    }

    #[test]
    fn test_builder_requires_corpus_and_valid_config() {
        assert!(matches!(
            Pipeline::builder(RuntimeConfig::default()).build(),
            Err(PipelineError::MissingCorpus)
        ));

        let mut config = RuntimeConfig::default();
        config.candidate_loop.max_attempts = 0;
        let result = Pipeline::builder(config).corpus(Arc::new(MockCorpus::new())).build();
        assert!(matches!(result, Err(PipelineError::Config(_))));
    }
}
