//! Prompts and response schemas for the generative steps.
//!
//! Two calls are made per run at most: case intake and candidate
//! generation. Both ask for JSON only and are validated against the
//! schemas below before anything downstream sees them.

use lawpack_core::text::sanitize;
use lawpack_core::Case;
use serde_json::{json, Value};

/// System prompt for structured (JSON) calls.
pub const STRUCTURED_SYSTEM_PROMPT: &str =
    "Output JSON only. No markdown. No extra keys. Follow the schema exactly.";

/// System prompt for free-text calls.
pub const TEXT_SYSTEM_PROMPT: &str =
    "You are a Korean public-administration assistant. Be factual, structured, and cautious.";

const INTAKE_TEMPLATE: &str = r#"
다음 민원/업무지시를 "사실관계" 중심으로 구조화해라.
반드시 아래 JSON 스키마만 출력(키 추가 금지).

{
  "task_type": "주기위반|무단방치|불법주정차|행정처분|정보공개|기타",
  "authority_scope": {
    "my_role": "주기위반 단속 담당",
    "can_do": ["현장확인","계도","통지","안내","이관"],
    "cannot_do": ["형사수사","강제집행","압수수색","구금"]
  },
  "facts": {
    "who": "대상(차량/건설기계/업체/개인 등)",
    "what": "무슨 일이 있었는지(핵심 1~2문장)",
    "where": "장소(모르면 빈문자열)",
    "when": "기간/일시(모르면 빈문자열)",
    "evidence": ["사진","영상","진술","기타(없으면 빈배열)"]
  },
  "request": {
    "user_wants": "민원인이 원하는 조치",
    "constraints": "기한/절차/이의제기 등(없으면 빈문자열)"
  },
  "issues": ["쟁점1","쟁점2"],
  "keywords": ["키워드1","키워드2","키워드3","키워드4"]
}

입력:
"""{input}"""

주의:
- 소설 금지. 입력에 없는 사실은 '추가 확인 필요'로 처리.
- where/when 없으면 빈문자열.
- keywords는 사실 기반 핵심어로.
"#;

const CANDIDATE_TEMPLATE: &str = r#"
너는 '법령 후보 생성기'다. 반드시 아래 JSON만 출력.

{
  "candidates": [
    {"law_name":"법령명","article_hint":"조번호(숫자만, 모르면 빈문자열)","reason":"짧게","confidence":0.0}
  ]
}

입력(사실요약):
- task_type: {task_type}
- who: {who}
- what: {what}
- where: {where}
- when: {when}
- issues: {issues}
- keywords: {keywords}

규칙:
- candidates는 3~7개
- law_name은 '정확한 공식 법령명'
- article_hint는 모르면 빈문자열
- 추정은 하되 과장 금지(확신 낮으면 confidence 낮게)
"#;

/// Intake prompt for raw complaint text.
pub fn intake_prompt(raw_input: &str) -> String {
    INTAKE_TEMPLATE.replace("{input}", &sanitize(raw_input))
}

/// Candidate generation prompt built from a structured case.
pub fn candidate_prompt(case: &Case) -> String {
    CANDIDATE_TEMPLATE
        .replace("{task_type}", case.task.label_ko())
        .replace("{who}", &case.facts.who)
        .replace("{what}", &case.facts.what)
        .replace("{where}", &case.facts.location)
        .replace("{when}", &case.facts.period)
        .replace("{issues}", &format!("{:?}", case.issues))
        .replace("{keywords}", &format!("{:?}", case.keywords))
}

/// Schema for the intake response. Only the top-level shape is enforced;
/// [`Case::from_generated`] cleans every field, so `null` or mistyped
/// values degrade to empty instead of discarding the case.
pub fn intake_schema() -> Value {
    json!({
        "type": "object",
        "required": ["facts"],
        "properties": {
            "facts": {"type": "object"}
        }
    })
}

/// Schema for the candidate response. Items are left unconstrained;
/// `parse_generated_candidates` drops malformed entries one by one.
pub fn candidate_schema() -> Value {
    json!({
        "type": "object",
        "required": ["candidates"],
        "properties": {
            "candidates": {"type": "array"}
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lawpack_core::{Facts, TaskCategory};

    #[test]
    fn test_intake_prompt_embeds_sanitized_input() {
        let prompt = intake_prompt("  굴착기 주기 민원\u{200B}  ");
        assert!(prompt.contains("\"\"\"굴착기 주기 민원\"\"\""));
        assert!(prompt.contains("task_type"));
    }

    #[test]
    fn test_candidate_prompt_fields() {
        let case = Case {
            task: TaskCategory::ParkingViolation,
            facts: Facts {
                what: "굴착기 야간 주기".to_string(),
                location: "OO동 도로".to_string(),
                ..Facts::default()
            },
            keywords: vec!["건설기계".to_string(), "주기".to_string()],
            ..Case::default()
        };
        let prompt = candidate_prompt(&case);
        assert!(prompt.contains("- task_type: 주기위반"));
        assert!(prompt.contains("- where: OO동 도로"));
        assert!(prompt.contains("[\"건설기계\", \"주기\"]"));
        assert!(!prompt.contains("{when}"));
    }

    #[test]
    fn test_schemas_compile() {
        for schema in [intake_schema(), candidate_schema()] {
            assert!(jsonschema::options().build(&schema).is_ok());
        }
    }

    #[test]
    fn test_candidate_schema_accepts_loose_entries() {
        let validator = jsonschema::options().build(&candidate_schema()).unwrap();
        assert!(validator.is_valid(&json!({
            "candidates": [
                {"law_name": "도로교통법", "article_hint": 32, "confidence": "0.6"},
                {"law_name": "주차장법", "reason": null},
                "건축법",
                null
            ]
        })));
        assert!(!validator.is_valid(&json!({"candidates": "도로교통법"})));
        assert!(!validator.is_valid(&json!({"laws": []})));
    }

    #[test]
    fn test_intake_schema_accepts_null_fields() {
        let validator = jsonschema::options().build(&intake_schema()).unwrap();
        assert!(validator.is_valid(&json!({
            "task_type": null,
            "facts": {"who": "굴착기", "where": null, "when": null, "evidence": null},
            "request": null,
            "issues": ["주기위반", null]
        })));
        assert!(!validator.is_valid(&json!({"facts": "굴착기 주기"})));
        assert!(!validator.is_valid(&json!({"issues": []})));
    }
}
