//! Candidate generation: domain rules, then generation, then merge.

use std::sync::Arc;

use lawpack_core::candidates::{domain_candidates, keyword_candidates, merge_candidates, parse_generated_candidates};
use lawpack_core::{Candidate, Case};

use crate::config::CandidateConfig;
use crate::generation::GenerationService;
use crate::prompts::{candidate_prompt, candidate_schema};

/// Keyword candidates used when the list would otherwise be empty.
const KEYWORD_FALLBACK_LIMIT: usize = 3;

/// Produces the ordered, deduplicated candidate list for a case.
#[derive(Debug, Clone)]
pub struct CandidateGenerator {
    generation: Arc<GenerationService>,
    config: CandidateConfig,
}

impl CandidateGenerator {
    pub fn new(generation: Arc<GenerationService>, config: CandidateConfig) -> Self {
        Self { generation, config }
    }

    pub async fn generate(&self, case: &Case) -> Vec<Candidate> {
        let rule = domain_candidates(case.task);

        let generated = if self.generation.is_enabled() {
            match self
                .generation
                .generate_structured(&candidate_prompt(case), &candidate_schema())
                .await
            {
                Some(value) => parse_generated_candidates(&value),
                None => {
                    tracing::warn!(task = %case.task, "candidate generation failed, using domain rules only");
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        let rule_count = rule.len();
        let generated_count = generated.len();
        let mut candidates = merge_candidates(rule, generated, self.config.cap);

        if candidates.is_empty() && self.config.keyword_fallback {
            candidates = keyword_candidates(&case.keywords, KEYWORD_FALLBACK_LIMIT);
            if !candidates.is_empty() {
                tracing::warn!(count = candidates.len(), "no statute candidates, falling back to keywords");
            }
        }

        tracing::info!(
            task = %case.task,
            rule = rule_count,
            generated = generated_count,
            total = candidates.len(),
            "candidates generated"
        );
        candidates
    }
}
