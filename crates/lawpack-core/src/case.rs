//! Case construction: correction of generated cases and the deterministic fallback.

use std::path::Path;

use serde_json::Value;

use crate::text::{clean_list, clean_text, extract_keywords, sanitize, truncate_chars};
use crate::types::{AuthorityScope, Case, CaseRequest, Facts, InputQuality, TaskCategory};
use crate::CoreError;

/// Characters of raw input kept as `facts.what` in a fallback case.
const FALLBACK_WHAT_CHARS: usize = 160;

/// Keywords kept when the case keywords come from extraction.
const FALLBACK_KEYWORDS: usize = 4;

/// Keywords extracted from the raw input before truncation.
const EXTRACTED_KEYWORDS: usize = 10;

impl Case {
    /// Case built without any generation: category `other`, standard
    /// authority scope, raw input as `what`.
    pub fn fallback(raw_input: &str) -> Self {
        let facts = Facts {
            what: truncate_chars(&sanitize(raw_input), FALLBACK_WHAT_CHARS),
            ..Facts::default()
        };
        let input_quality = InputQuality::assess(&facts);

        Self {
            task: TaskCategory::Other,
            authority: AuthorityScope::default(),
            facts,
            request: CaseRequest::default(),
            issues: Vec::new(),
            keywords: fallback_keywords(raw_input),
            input_quality,
        }
    }

    /// Correct a generated case object.
    ///
    /// Missing or empty keyword lists are replaced with keywords extracted
    /// from `raw_input`; issues and keywords are cleaned; the input quality is
    /// recomputed from the facts. Never fails: unusable fields take defaults.
    pub fn from_generated(value: &Value, raw_input: &str) -> Self {
        let task = ["task_type", "task"]
            .iter()
            .find_map(|k| value.get(*k).and_then(Value::as_str))
            .map(TaskCategory::from_label)
            .unwrap_or_default();

        let authority = value
            .get("authority_scope")
            .filter(|v| v.is_object())
            .map(|scope| {
                let defaults = AuthorityScope::default();
                let my_role = clean_text(str_field(scope, "my_role"));
                let can_do = string_list(scope.get("can_do"));
                let cannot_do = string_list(scope.get("cannot_do"));
                AuthorityScope {
                    my_role: if my_role.is_empty() { defaults.my_role } else { my_role },
                    can_do: if can_do.is_empty() { defaults.can_do } else { can_do },
                    cannot_do: if cannot_do.is_empty() { defaults.cannot_do } else { cannot_do },
                }
            })
            .unwrap_or_default();

        let facts = value
            .get("facts")
            .filter(|v| v.is_object())
            .map(|f| Facts {
                who: clean_text(str_field(f, "who")),
                what: clean_text(str_field(f, "what")),
                location: clean_text(str_field(f, "where")),
                period: clean_text(str_field(f, "when")),
                evidence: string_list(f.get("evidence")),
            })
            .unwrap_or_default();

        let request = value
            .get("request")
            .map(|r| CaseRequest {
                user_wants: clean_text(str_field(r, "user_wants")),
                constraints: clean_text(str_field(r, "constraints")),
            })
            .unwrap_or_default();

        let mut keywords = string_list(value.get("keywords"));
        if keywords.is_empty() {
            keywords = fallback_keywords(raw_input);
        }

        let input_quality = InputQuality::assess(&facts);

        Self {
            task,
            authority,
            facts,
            request,
            issues: string_list(value.get("issues")),
            keywords,
            input_quality,
        }
    }

    /// Load a case from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, CoreError> {
        let case: Case = serde_json::from_str(json).map_err(|e| CoreError::Parse(e.to_string()))?;
        Ok(case.normalized())
    }

    /// Load a case from YAML.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CoreError> {
        let case: Case = serde_yaml::from_str(yaml).map_err(|e| CoreError::Parse(e.to_string()))?;
        Ok(case.normalized())
    }

    /// Load a case from a `.json`, `.yaml` or `.yml` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_yaml_str(&content),
        }
    }

    /// Clean list fields and recompute derived fields.
    fn normalized(mut self) -> Self {
        self.issues = clean_list(&self.issues);
        self.keywords = clean_list(&self.keywords);
        if self.keywords.is_empty() {
            self.keywords = fallback_keywords(&self.facts.what);
        }
        self.input_quality = InputQuality::assess(&self.facts);
        self
    }
}

fn fallback_keywords(raw_input: &str) -> Vec<String> {
    let mut keywords = extract_keywords(raw_input, EXTRACTED_KEYWORDS);
    keywords.truncate(FALLBACK_KEYWORDS);
    keywords
}

fn str_field<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or("")
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => clean_list(items.iter().filter_map(Value::as_str)),
        _ => Vec::new(),
    }
}
