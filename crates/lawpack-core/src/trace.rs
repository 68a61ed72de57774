//! Candidate loop trace types.
//!
//! A [`LoopTrace`] is assembled once from the attempt records of a finished
//! run and exposes read-only accessors only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ArticleSelection, Candidate, LawPack, StatuteHit, Verdict, VerifyResult};

/// Message shown when the best result is not confirmed.
pub const NEEDS_CONFIRMATION: &str = "추가 확인 필요";

/// Message shown when the best result is confirmed.
pub const CONFIRMED_MESSAGE: &str = "근거 조문 확인";

/// Lifecycle of a single candidate attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptState {
    Pending,
    Searching,
    Fetching,
    Verifying,
    Recorded,
    Skipped,
}

impl AttemptState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptState::Pending => "pending",
            AttemptState::Searching => "searching",
            AttemptState::Fetching => "fetching",
            AttemptState::Verifying => "verifying",
            AttemptState::Recorded => "recorded",
            AttemptState::Skipped => "skipped",
        }
    }

    /// Whether `next` is a legal successor of this state.
    pub fn can_transition_to(&self, next: AttemptState) -> bool {
        use AttemptState::*;
        matches!(
            (self, next),
            (Pending, Searching)
                | (Searching, Fetching)
                | (Searching, Skipped)
                | (Fetching, Verifying)
                | (Fetching, Skipped)
                | (Verifying, Recorded)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AttemptState::Recorded | AttemptState::Skipped)
    }
}

impl std::fmt::Display for AttemptState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the corpus search returned for an attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SearchOutcome {
    NoResult,
    /// First hit, taken as authoritative
    Hit { hit: StatuteHit, total_hits: usize },
}

/// What the corpus fetch returned for an attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FetchOutcome {
    NotAttempted,
    Fetched {
        article_number: String,
        article_title: String,
        selection: ArticleSelection,
        text_chars: usize,
    },
}

/// Why an attempt ended without verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NoSearchResult,
    EmptyText,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::NoSearchResult => "no_search_result",
            SkipReason::EmptyText => "empty_text",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal outcome of one attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Recorded { verify: VerifyResult },
    Skipped { reason: SkipReason },
}

impl AttemptOutcome {
    pub fn state(&self) -> AttemptState {
        match self {
            AttemptOutcome::Recorded { .. } => AttemptState::Recorded,
            AttemptOutcome::Skipped { .. } => AttemptState::Skipped,
        }
    }

    pub fn verify(&self) -> Option<&VerifyResult> {
        match self {
            AttemptOutcome::Recorded { verify } => Some(verify),
            AttemptOutcome::Skipped { .. } => None,
        }
    }

    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            AttemptOutcome::Skipped { reason } => Some(*reason),
            AttemptOutcome::Recorded { .. } => None,
        }
    }
}

/// One candidate attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// Position in the candidate list
    pub index: usize,
    pub candidate: Candidate,
    pub search: SearchOutcome,
    pub fetch: FetchOutcome,
    pub outcome: AttemptOutcome,
    pub search_ms: u64,
    pub fetch_ms: u64,
}

impl AttemptRecord {
    pub fn is_confirmed(&self) -> bool {
        self.outcome
            .verify()
            .map(|v| v.verdict == Verdict::Confirmed)
            .unwrap_or(false)
    }
}

/// Ordered attempt records of a finished run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoopTrace {
    attempts: Vec<AttemptRecord>,
}

impl LoopTrace {
    pub fn from_attempts(attempts: Vec<AttemptRecord>) -> Self {
        Self { attempts }
    }

    pub fn attempts(&self) -> &[AttemptRecord] {
        &self.attempts
    }

    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    /// Attempts that reached verification.
    pub fn recorded(&self) -> impl Iterator<Item = (&AttemptRecord, &VerifyResult)> {
        self.attempts
            .iter()
            .filter_map(|a| a.outcome.verify().map(|v| (a, v)))
    }

    /// Index (in trace order) of the first confirmed attempt.
    pub fn first_confirmed(&self) -> Option<usize> {
        self.attempts.iter().position(AttemptRecord::is_confirmed)
    }

    /// Highest recorded total, 0 when nothing was recorded.
    pub fn max_total(&self) -> u32 {
        self.recorded().map(|(_, v)| v.total).max().unwrap_or(0)
    }
}

/// How the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopTerminal {
    /// Stopped early on a confirmed article
    Confirmed,
    /// Ran out of candidates or attempts
    Exhausted,
}

/// Result of a candidate loop run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopOutcome {
    pub best: LawPack,
    pub trace: LoopTrace,
    pub terminal: LoopTerminal,
    pub elapsed_ms: u64,
    pub completed_at: DateTime<Utc>,
}

impl LoopOutcome {
    /// Any best result short of CONFIRMED needs a human to confirm it.
    pub fn requires_confirmation(&self) -> bool {
        self.best.verdict() != Verdict::Confirmed
    }

    pub fn status_message(&self) -> &'static str {
        if self.requires_confirmation() {
            NEEDS_CONFIRMATION
        } else {
            CONFIRMED_MESSAGE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CandidateOrigin, ScoreBreakdown};

    fn record(index: usize, outcome: AttemptOutcome) -> AttemptRecord {
        AttemptRecord {
            index,
            candidate: Candidate::new("도로교통법", CandidateOrigin::DomainRule),
            search: SearchOutcome::NoResult,
            fetch: FetchOutcome::NotAttempted,
            outcome,
            search_ms: 0,
            fetch_ms: 0,
        }
    }

    fn verified(total: u32, verdict: Verdict) -> AttemptOutcome {
        AttemptOutcome::Recorded {
            verify: VerifyResult {
                breakdown: ScoreBreakdown::default(),
                total,
                verdict,
                notes: vec![],
            },
        }
    }

    #[test]
    fn test_state_transitions() {
        assert!(AttemptState::Pending.can_transition_to(AttemptState::Searching));
        assert!(AttemptState::Searching.can_transition_to(AttemptState::Skipped));
        assert!(!AttemptState::Pending.can_transition_to(AttemptState::Verifying));
        assert!(!AttemptState::Recorded.can_transition_to(AttemptState::Searching));
        assert!(AttemptState::Skipped.is_terminal());
    }

    #[test]
    fn test_trace_accessors() {
        let trace = LoopTrace::from_attempts(vec![
            record(0, AttemptOutcome::Skipped { reason: SkipReason::EmptyText }),
            record(1, verified(60, Verdict::Weak)),
            record(2, verified(80, Verdict::Confirmed)),
        ]);
        assert_eq!(trace.len(), 3);
        assert_eq!(trace.recorded().count(), 2);
        assert_eq!(trace.first_confirmed(), Some(2));
        assert_eq!(trace.max_total(), 80);
        assert_eq!(trace.attempts()[0].outcome.skip_reason(), Some(SkipReason::EmptyText));
    }

    #[test]
    fn test_status_message() {
        let outcome = LoopOutcome {
            best: LawPack::no_evidence(),
            trace: LoopTrace::default(),
            terminal: LoopTerminal::Exhausted,
            elapsed_ms: 0,
            completed_at: Utc::now(),
        };
        assert!(outcome.requires_confirmation());
        assert_eq!(outcome.status_message(), "추가 확인 필요");
    }

    #[test]
    fn test_skip_reason_serialization() {
        let json = serde_json::to_string(&SkipReason::NoSearchResult).unwrap();
        assert_eq!(json, "\"no_search_result\"");
    }
}
