//! Deterministic candidate rules, parsing of generated candidates, and merge.

use serde_json::Value;

use crate::text::{article_number, clean_text};
use crate::types::{Candidate, CandidateOrigin, TaskCategory};

/// Confidence given to rule-based candidates.
pub const DOMAIN_RULE_CONFIDENCE: f64 = 0.35;

/// Confidence given to keyword fallback candidates.
pub const KEYWORD_FALLBACK_CONFIDENCE: f64 = 0.2;

/// Default candidate list cap.
pub const DEFAULT_CANDIDATE_CAP: usize = 8;

/// Hard ceiling on the candidate list cap.
pub const MAX_CANDIDATE_CAP: usize = 10;

/// Statutes that always apply to a category, in priority order.
pub fn domain_statutes(task: TaskCategory) -> &'static [&'static str] {
    match task {
        TaskCategory::ParkingViolation => &["건설기계관리법", "건설기계관리법 시행령", "도로교통법"],
        TaskCategory::Abandonment => &["자동차관리법", "도로교통법"],
        TaskCategory::IllegalStop => &["도로교통법", "주차장법"],
        TaskCategory::AdministrativeAction => &["행정절차법", "행정기본법"],
        TaskCategory::Disclosure => &["공공기관의 정보공개에 관한 법률"],
        TaskCategory::Other => &[],
    }
}

/// Rule-based candidates for a category.
pub fn domain_candidates(task: TaskCategory) -> Vec<Candidate> {
    domain_statutes(task)
        .iter()
        .map(|name| {
            Candidate::new(*name, CandidateOrigin::DomainRule)
                .with_reason("domain rule")
                .with_confidence(DOMAIN_RULE_CONFIDENCE)
        })
        .collect()
}

/// Parse generated output into candidates.
///
/// Accepts `{"candidates": [...]}` or a bare array. Entries that are not
/// objects or have no usable statute name are dropped.
pub fn parse_generated_candidates(value: &Value) -> Vec<Candidate> {
    let entries: &[Value] = match value {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => match map.get("candidates") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        },
        _ => &[],
    };

    entries
        .iter()
        .filter_map(|entry| {
            let obj = entry.as_object()?;
            let law_name = clean_text(obj.get("law_name").and_then(Value::as_str).unwrap_or(""));
            if law_name.is_empty() {
                return None;
            }

            let mut candidate = Candidate::new(law_name, CandidateOrigin::Generated)
                .with_confidence(parse_confidence(obj.get("confidence")));
            candidate.article_hint = parse_hint(obj.get("article_hint"));
            candidate.reason = clean_text(obj.get("reason").and_then(Value::as_str).unwrap_or(""));
            Some(candidate)
        })
        .collect()
}

/// Deterministic first, then generated; dedupe by exact name keeping the
/// first occurrence; cap (clamped to [`MAX_CANDIDATE_CAP`]).
pub fn merge_candidates(rule: Vec<Candidate>, generated: Vec<Candidate>, cap: usize) -> Vec<Candidate> {
    let cap = cap.min(MAX_CANDIDATE_CAP);
    let mut merged: Vec<Candidate> = Vec::with_capacity(cap);

    for candidate in rule.into_iter().chain(generated) {
        if merged.len() >= cap {
            break;
        }
        if merged.iter().any(|c| c.law_name == candidate.law_name) {
            continue;
        }
        merged.push(candidate);
    }

    merged
}

/// Candidates made from case keywords, used when nothing else is available.
pub fn keyword_candidates(keywords: &[String], limit: usize) -> Vec<Candidate> {
    let mut out: Vec<Candidate> = Vec::new();
    for keyword in keywords {
        if out.len() >= limit {
            break;
        }
        let name = clean_text(keyword);
        if name.is_empty() || out.iter().any(|c| c.law_name == name) {
            continue;
        }
        out.push(
            Candidate::new(name, CandidateOrigin::KeywordFallback)
                .with_reason("keyword fallback")
                .with_confidence(KEYWORD_FALLBACK_CONFIDENCE),
        );
    }
    out
}

fn parse_hint(value: Option<&Value>) -> Option<u32> {
    let hint = match value? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => article_number(s).map(|(number, _)| number),
        _ => None,
    };
    hint.filter(|n| *n > 0)
}

fn parse_confidence(value: Option<&Value>) -> f64 {
    let raw = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    };
    if raw.is_finite() {
        raw.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_domain_candidates() {
        let cands = domain_candidates(TaskCategory::ParkingViolation);
        assert_eq!(cands.len(), 3);
        assert_eq!(cands[0].law_name, "건설기계관리법");
        assert!(cands.iter().all(|c| c.confidence == DOMAIN_RULE_CONFIDENCE));
        assert!(domain_candidates(TaskCategory::Other).is_empty());
    }

    #[test]
    fn test_parse_generated_drops_malformed() {
        let value = json!({"candidates": [
            {"law_name": " 도로교통법\u{0007} ", "article_hint": "제32조", "reason": "<b>정차</b>", "confidence": 1.4},
            {"law_name": "", "confidence": 0.9},
            "not an object",
            {"article_hint": "5"},
            {"law_name": "주차장법", "article_hint": 12, "confidence": "0.4"},
            {"law_name": "행정기본법", "article_hint": "모름", "confidence": -2}
        ]});
        let cands = parse_generated_candidates(&value);
        assert_eq!(cands.len(), 3);
        assert_eq!(cands[0].law_name, "도로교통법");
        assert_eq!(cands[0].article_hint, Some(32));
        assert_eq!(cands[0].reason, "정차");
        assert_eq!(cands[0].confidence, 1.0);
        assert_eq!(cands[1].article_hint, Some(12));
        assert_eq!(cands[1].confidence, 0.4);
        assert_eq!(cands[2].article_hint, None);
        assert_eq!(cands[2].confidence, 0.0);
        assert!(cands.iter().all(|c| c.origin == CandidateOrigin::Generated));
    }

    #[test]
    fn test_parse_generated_bare_array() {
        let cands = parse_generated_candidates(&json!([{"law_name": "주차장법"}]));
        assert_eq!(cands.len(), 1);
        assert!(parse_generated_candidates(&json!({"candidates": "x"})).is_empty());
    }

    #[test]
    fn test_branch_hint_keeps_main_number() {
        let cands = parse_generated_candidates(&json!([{"law_name": "건설기계관리법", "article_hint": "제33조의2"}]));
        assert_eq!(cands[0].article_hint, Some(33));
    }

    #[test]
    fn test_merge_rule_first_and_dedupe() {
        let rule = domain_candidates(TaskCategory::IllegalStop);
        let generated = parse_generated_candidates(&json!([
            {"law_name": "도로교통법", "article_hint": "32", "confidence": 0.9},
            {"law_name": "지방세법", "confidence": 0.1}
        ]));
        let merged = merge_candidates(rule, generated, 8);
        let names: Vec<_> = merged.iter().map(|c| c.law_name.as_str()).collect();
        assert_eq!(names, vec!["도로교통법", "주차장법", "지방세법"]);
        assert_eq!(merged[0].origin, CandidateOrigin::DomainRule);
        assert_eq!(merged[0].article_hint, None);
    }

    #[test]
    fn test_merge_cap_never_exceeds_ceiling() {
        let generated: Vec<Candidate> = (0..20)
            .map(|i| Candidate::new(format!("법{}", i), CandidateOrigin::Generated))
            .collect();
        assert_eq!(merge_candidates(vec![], generated.clone(), 3).len(), 3);
        assert_eq!(merge_candidates(vec![], generated, 50).len(), MAX_CANDIDATE_CAP);
    }

    #[test]
    fn test_keyword_candidates() {
        let keywords = vec!["굴착기".to_string(), "굴착기".to_string(), "주기".to_string(), "장기".to_string(), "사유지".to_string()];
        let cands = keyword_candidates(&keywords, 3);
        let names: Vec<_> = cands.iter().map(|c| c.law_name.as_str()).collect();
        assert_eq!(names, vec!["굴착기", "주기", "장기"]);
        assert_eq!(cands[0].confidence, KEYWORD_FALLBACK_CONFIDENCE);
    }
}
