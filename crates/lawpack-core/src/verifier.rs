//! Verification engine.
//!
//! Scores how well a retrieved article supports the facts of a case. The
//! score is deterministic and explainable: four bounded components, a fixed
//! sum, and notes that say where each component came from.

use serde::{Deserialize, Serialize};

use crate::text::{clean_text, extract_keywords, sanitize};
use crate::types::{Case, ScoreBreakdown, Verdict, VerifyResult};

/// Terms indicating powers outside an administrative caseworker's scope.
pub const OUT_OF_SCOPE_TERMS: &[&str] = &["구속", "수사", "압수", "수색", "체포", "기소", "형사", "구금"];

/// Corpus junk markers that suggest a damaged extraction.
pub const JUNK_MARKERS: &[&str] = &["||", ">>"];

const MAX_RELEVANCE: u32 = 35;
const MAX_SCOPE_FIT: u32 = 25;
const MAX_ARTICLE_MATCH: u32 = 25;
const MAX_RISK: u32 = 15;
const SCOPE_PENALTY_PER_TERM: u32 = 8;

/// Verdict thresholds and text length cut-offs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Minimum total for CONFIRMED
    pub confirmed_threshold: u32,

    /// Minimum total for WEAK
    pub weak_threshold: u32,

    /// Text at least this long earns the full-text article-match bonus
    pub full_text_chars: usize,

    /// Text shorter than this is treated as thin evidence
    pub thin_text_chars: usize,

    /// Maximum keyword pool size
    pub pool_limit: usize,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            confirmed_threshold: 75,
            weak_threshold: 50,
            full_text_chars: 200,
            thin_text_chars: 80,
            pool_limit: 12,
        }
    }
}

impl VerifierConfig {
    /// Map a total onto a verdict.
    pub fn verdict_for(&self, total: u32) -> Verdict {
        if total >= self.confirmed_threshold {
            Verdict::Confirmed
        } else if total >= self.weak_threshold {
            Verdict::Weak
        } else {
            Verdict::Fail
        }
    }
}

/// Deterministic article scorer.
#[derive(Debug, Clone, Default)]
pub struct VerificationEngine {
    config: VerifierConfig,
}

impl VerificationEngine {
    pub fn new(config: VerifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Keyword pool for a case: first 8 keywords, first 6 issues, then up to
    /// 6 keywords extracted from `facts.what`; cleaned, deduplicated, capped.
    pub fn keyword_pool(&self, case: &Case) -> Vec<String> {
        let what = clean_text(&case.facts.what);
        let candidates = case
            .keywords
            .iter()
            .take(8)
            .map(|k| clean_text(k))
            .chain(case.issues.iter().take(6).map(|i| clean_text(i)))
            .chain(extract_keywords(&what, 6));

        let mut pool: Vec<String> = Vec::new();
        for term in candidates {
            if pool.len() >= self.config.pool_limit {
                break;
            }
            if !term.is_empty() && !pool.contains(&term) {
                pool.push(term);
            }
        }
        pool
    }

    /// Score `title` and `text` against `case`.
    pub fn verify(&self, case: &Case, title: &str, text: &str) -> VerifyResult {
        let title = sanitize(title);
        let text = sanitize(text);
        let haystack = format!("{}\n{}", title, text).to_lowercase();
        let title_lower = title.to_lowercase();
        let text_chars = text.chars().count();

        let pool = self.keyword_pool(case);
        let hits = pool
            .iter()
            .filter(|term| haystack.contains(&term.to_lowercase()))
            .count() as u32;
        let relevance = relevance_score(hits, pool.len() as u32);

        let out_of_scope: Vec<&str> = OUT_OF_SCOPE_TERMS
            .iter()
            .copied()
            .filter(|term| text.contains(term))
            .collect();
        let scope_fit = MAX_SCOPE_FIT
            .saturating_sub((out_of_scope.len() as u32 * SCOPE_PENALTY_PER_TERM).min(MAX_SCOPE_FIT));

        let title_hit = pool.iter().any(|term| title_lower.contains(&term.to_lowercase()));
        let mut article_match = 10;
        if text_chars >= self.config.full_text_chars {
            article_match += 10;
        }
        if title_hit {
            article_match += 5;
        }
        let article_match = article_match.min(MAX_ARTICLE_MATCH);

        let has_junk = JUNK_MARKERS.iter().any(|m| text.contains(m));
        let mut risk = 0;
        if text.is_empty() || text_chars < self.config.thin_text_chars {
            risk += 10;
        }
        if has_junk {
            risk += 5;
        }
        let hallucination_risk = risk.min(MAX_RISK);

        let breakdown = ScoreBreakdown {
            relevance,
            scope_fit,
            article_match,
            hallucination_risk,
        };
        let total = breakdown.total();
        let verdict = self.config.verdict_for(total);

        let mut notes = vec![
            format!("keyword hits {}/{}", hits, pool.len()),
            format!("text length {} chars", text_chars),
        ];
        if !out_of_scope.is_empty() {
            notes.push(format!("out-of-scope terms: {}", out_of_scope.join(", ")));
        }
        if has_junk {
            notes.push("junk markers present".to_string());
        }
        if text.is_empty() {
            notes.push("no article text".to_string());
        }

        tracing::debug!(total, verdict = %verdict, hits, pool = pool.len(), "Article verified");

        VerifyResult {
            breakdown,
            total,
            verdict,
            notes,
        }
    }
}

/// `min(35, floor(35 * hits / max(1, pool)))`.
pub fn relevance_score(hits: u32, pool_size: u32) -> u32 {
    (MAX_RELEVANCE * hits / pool_size.max(1)).min(MAX_RELEVANCE)
}
