//! # lawpack-core
//!
//! Deterministic core of the statute candidate loop.
//!
//! This crate answers, without any I/O:
//! - Which statutes should be tried for a case?
//! - What does a retrieved statute document actually say?
//! - How well does that text support the facts?
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same input always produces same output
//! 2. **No network calls**: Corpus and generation live in `lawpack-runtime`
//! 3. **Never panics on bad documents**: Unknown layouts yield empty evidence
//! 4. **Explainable**: Every score carries its breakdown and notes
//!
//! ## Example
//!
//! ```rust,ignore
//! use lawpack_core::{Case, VerificationEngine, Verdict};
//!
//! let case = Case::from_file("case.yaml")?;
//! let result = VerificationEngine::default().verify(&case, "주기장의 설치", &article_text);
//!
//! match result.verdict {
//!     Verdict::Confirmed => println!("OK: {}", result.total),
//!     Verdict::Weak => println!("WEAK: {:?}", result.notes),
//!     Verdict::Fail => println!("FAIL"),
//! }
//! ```

pub mod candidates;
pub mod case;
pub mod document;
pub mod text;
pub mod trace;
pub mod types;
pub mod verifier;

// Re-export main types at crate root
pub use candidates::{
    domain_candidates, keyword_candidates, merge_candidates, parse_generated_candidates,
    DEFAULT_CANDIDATE_CAP, MAX_CANDIDATE_CAP,
};
pub use document::{
    default_resolvers, extract_article, normalize_search_results, ExtractOptions, ShapeResolver,
};
pub use trace::{
    AttemptOutcome, AttemptRecord, AttemptState, FetchOutcome, LoopOutcome, LoopTerminal,
    LoopTrace, SearchOutcome, SkipReason, NEEDS_CONFIRMATION,
};
pub use types::{
    ArticlePack, ArticleRef, ArticleSelection, AuthorityScope, Candidate, CandidateOrigin, Case,
    CaseRequest, DocumentShape, Facts, InputQuality, LawPack, ScoreBreakdown, StatuteHit,
    TaskCategory, Verdict, VerifyResult,
};
pub use verifier::{VerificationEngine, VerifierConfig};

use thiserror::Error;

/// Errors from the deterministic core.
///
/// Scoring and parsing never fail; only loading inputs from outside can.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Verify a text against a case with default thresholds.
///
/// Shorthand for `VerificationEngine::default().verify(..)`.
pub fn verify(case: &Case, title: &str, text: &str) -> VerifyResult {
    VerificationEngine::default().verify(case, title, text)
}
