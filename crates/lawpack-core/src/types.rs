//! Core data model shared by every stage of the candidate loop.

use serde::{Deserialize, Serialize};

use crate::text;

/// Administrative task category of a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TaskCategory {
    /// Construction machinery parked outside its registered location (주기위반)
    ParkingViolation,
    /// Abandoned vehicle (무단방치)
    Abandonment,
    /// Illegal stopping or parking (불법주정차)
    IllegalStop,
    /// General administrative disposition (행정처분)
    AdministrativeAction,
    /// Information disclosure request (정보공개)
    Disclosure,
    /// Anything the rule table does not know
    #[default]
    Other,
}

impl TaskCategory {
    /// All categories in declaration order.
    pub const ALL: [TaskCategory; 6] = [
        TaskCategory::ParkingViolation,
        TaskCategory::Abandonment,
        TaskCategory::IllegalStop,
        TaskCategory::AdministrativeAction,
        TaskCategory::Disclosure,
        TaskCategory::Other,
    ];

    /// Parse a category from either its kebab-case name or its Korean label.
    ///
    /// Unknown labels map to [`TaskCategory::Other`].
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(label) || c.label_ko() == label)
            .unwrap_or(TaskCategory::Other)
    }

    /// Stable kebab-case identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskCategory::ParkingViolation => "parking-violation",
            TaskCategory::Abandonment => "abandonment",
            TaskCategory::IllegalStop => "illegal-stop",
            TaskCategory::AdministrativeAction => "administrative-action",
            TaskCategory::Disclosure => "disclosure",
            TaskCategory::Other => "other",
        }
    }

    /// Korean label used in prompts and generated output.
    pub fn label_ko(&self) -> &'static str {
        match self {
            TaskCategory::ParkingViolation => "주기위반",
            TaskCategory::Abandonment => "무단방치",
            TaskCategory::IllegalStop => "불법주정차",
            TaskCategory::AdministrativeAction => "행정처분",
            TaskCategory::Disclosure => "정보공개",
            TaskCategory::Other => "기타",
        }
    }
}

impl std::fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the caseworker may and may not do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorityScope {
    #[serde(default)]
    pub my_role: String,

    #[serde(default)]
    pub can_do: Vec<String>,

    #[serde(default)]
    pub cannot_do: Vec<String>,
}

impl Default for AuthorityScope {
    fn default() -> Self {
        Self {
            my_role: "주기위반 단속 담당".to_string(),
            can_do: ["현장확인", "계도", "통지", "안내", "이관"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            cannot_do: ["형사수사", "강제집행", "압수수색", "구금"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Fact fields of a case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Facts {
    /// Subject (vehicle, machine, company, person)
    #[serde(default)]
    pub who: String,

    /// What happened, one or two sentences
    #[serde(default)]
    pub what: String,

    /// Location, empty when unknown
    #[serde(default, rename = "where")]
    pub location: String,

    /// Date or period, empty when unknown
    #[serde(default, rename = "when")]
    pub period: String,

    #[serde(default)]
    pub evidence: Vec<String>,
}

/// What the complainant asks for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseRequest {
    #[serde(default)]
    pub user_wants: String,

    #[serde(default)]
    pub constraints: String,
}

/// How complete the intake was.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputQuality {
    /// 40..=100
    pub score: u8,

    #[serde(default)]
    pub missing_fields: Vec<String>,
}

impl InputQuality {
    /// Score the facts: 20 points off per missing `where`/`when`, floor of 40.
    pub fn assess(facts: &Facts) -> Self {
        let mut missing_fields = Vec::new();
        if text::clean_text(&facts.location).is_empty() {
            missing_fields.push("where".to_string());
        }
        if text::clean_text(&facts.period).is_empty() {
            missing_fields.push("when".to_string());
        }
        let score = 100i32 - 20 * missing_fields.len() as i32;
        Self {
            score: score.max(40) as u8,
            missing_fields,
        }
    }
}

impl Default for InputQuality {
    fn default() -> Self {
        Self::assess(&Facts::default())
    }
}

/// A structured case. Produced once by intake and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Case {
    #[serde(default)]
    pub task: TaskCategory,

    #[serde(default)]
    pub authority: AuthorityScope,

    #[serde(default)]
    pub facts: Facts,

    #[serde(default)]
    pub request: CaseRequest,

    #[serde(default)]
    pub issues: Vec<String>,

    #[serde(default)]
    pub keywords: Vec<String>,

    #[serde(default)]
    pub input_quality: InputQuality,
}

/// Where a candidate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateOrigin {
    DomainRule,
    Generated,
    KeywordFallback,
}

/// A proposed statute, not yet verified against source text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub law_name: String,

    /// Article number hint (digits only)
    #[serde(default)]
    pub article_hint: Option<u32>,

    #[serde(default)]
    pub reason: String,

    /// 0.0 - 1.0
    pub confidence: f64,

    pub origin: CandidateOrigin,
}

impl Candidate {
    pub fn new(law_name: impl Into<String>, origin: CandidateOrigin) -> Self {
        Self {
            law_name: law_name.into(),
            article_hint: None,
            reason: String::new(),
            confidence: 0.0,
            origin,
        }
    }

    pub fn with_hint(mut self, article: u32) -> Self {
        self.article_hint = Some(article);
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    /// The hint as the corpus expects it.
    pub fn article_hint_str(&self) -> Option<String> {
        self.article_hint.map(|n| n.to_string())
    }
}

/// One corpus search match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatuteHit {
    pub name: String,

    /// Corpus identifier (law.go.kr MST)
    pub id: String,

    #[serde(default)]
    pub link: String,

    #[serde(default)]
    pub promulgation_date: String,
}

/// Entry of the sibling-article index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRef {
    pub number: String,
    pub title: String,
}

/// Which document layout the parser recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentShape {
    KoreanUnits,
    ServiceArticles,
    Generic,
    Unrecognized,
}

impl DocumentShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentShape::KoreanUnits => "korean_units",
            DocumentShape::ServiceArticles => "service_articles",
            DocumentShape::Generic => "generic",
            DocumentShape::Unrecognized => "unrecognized",
        }
    }
}

/// How the article inside a statute was chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArticleSelection {
    /// The hinted article number was found
    HintMatched,
    /// The hint matched nothing; the first article was used instead
    HintFallback { requested: String },
    /// No hint given; the first article was used
    FirstArticle,
    /// The document yielded no article at all
    NotFound,
}

/// Article content retrieved for one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticlePack {
    pub statute_name: String,
    pub statute_id: String,
    pub article_number: String,
    pub article_title: String,

    /// Cleaned article text. Empty means "no evidence".
    pub text: String,

    #[serde(default)]
    pub index: Vec<ArticleRef>,

    #[serde(default)]
    pub link: Option<String>,

    pub selection: ArticleSelection,
    pub shape: DocumentShape,
}

impl ArticlePack {
    /// A pack with no article, carrying only the identity of the statute.
    pub fn empty(statute_name: impl Into<String>, statute_id: impl Into<String>) -> Self {
        Self {
            statute_name: statute_name.into(),
            statute_id: statute_id.into(),
            article_number: String::new(),
            article_title: String::new(),
            text: String::new(),
            index: Vec::new(),
            link: None,
            selection: ArticleSelection::NotFound,
            shape: DocumentShape::Unrecognized,
        }
    }

    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// Whether the hinted article was not found and another was substituted.
    pub fn used_fallback(&self) -> bool {
        matches!(self.selection, ArticleSelection::HintFallback { .. })
    }

    /// Text with Han-script runs and corpus junk removed.
    pub fn display_text(&self) -> String {
        text::strip_for_display(&self.text)
    }
}

/// Per-component scores of a verification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// 0..=35
    pub relevance: u32,
    /// 0..=25
    pub scope_fit: u32,
    /// 0..=25
    pub article_match: u32,
    /// Penalty, 0..=15
    pub hallucination_risk: u32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u32 {
        self.relevance + self.scope_fit + self.article_match + (15 - self.hallucination_risk.min(15))
    }
}

/// Categorical confidence of a verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Confirmed,
    Weak,
    Fail,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Confirmed => "CONFIRMED",
            Verdict::Weak => "WEAK",
            Verdict::Fail => "FAIL",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scored judgment of one article against a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyResult {
    pub breakdown: ScoreBreakdown,

    /// 0..=100
    pub total: u32,

    pub verdict: Verdict,

    #[serde(default)]
    pub notes: Vec<String>,
}

impl VerifyResult {
    /// Score-0 FAIL used before any article was verified.
    pub fn no_evidence() -> Self {
        Self {
            breakdown: ScoreBreakdown::default(),
            total: 0,
            verdict: Verdict::Fail,
            notes: vec!["no evidence retrieved".to_string()],
        }
    }
}

/// An article, its verification, and the candidate that led to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LawPack {
    pub article: ArticlePack,
    pub verify: VerifyResult,

    /// `None` only for the no-evidence sentinel
    pub candidate: Option<Candidate>,
}

impl LawPack {
    /// The empty FAIL/score-0 result.
    pub fn no_evidence() -> Self {
        Self {
            article: ArticlePack::empty("", ""),
            verify: VerifyResult::no_evidence(),
            candidate: None,
        }
    }

    pub fn score(&self) -> u32 {
        self.verify.total
    }

    pub fn verdict(&self) -> Verdict {
        self.verify.verdict
    }

    pub fn is_no_evidence(&self) -> bool {
        self.candidate.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_category_labels() {
        assert_eq!(TaskCategory::from_label("주기위반"), TaskCategory::ParkingViolation);
        assert_eq!(TaskCategory::from_label("parking-violation"), TaskCategory::ParkingViolation);
        assert_eq!(TaskCategory::from_label(" 정보공개 "), TaskCategory::Disclosure);
        assert_eq!(TaskCategory::from_label("unheard-of"), TaskCategory::Other);
    }

    #[test]
    fn test_task_category_serde() {
        let json = serde_json::to_string(&TaskCategory::IllegalStop).unwrap();
        assert_eq!(json, "\"illegal-stop\"");
    }

    #[test]
    fn test_input_quality() {
        let mut facts = Facts::default();
        assert_eq!(InputQuality::assess(&facts).score, 60);

        facts.location = "OO동 123".to_string();
        let quality = InputQuality::assess(&facts);
        assert_eq!(quality.score, 80);
        assert_eq!(quality.missing_fields, vec!["when".to_string()]);

        facts.period = "2024-03".to_string();
        assert_eq!(InputQuality::assess(&facts).score, 100);
    }

    #[test]
    fn test_candidate_confidence_clamped() {
        let c = Candidate::new("도로교통법", CandidateOrigin::Generated).with_confidence(1.7);
        assert_eq!(c.confidence, 1.0);
    }

    #[test]
    fn test_breakdown_total() {
        let b = ScoreBreakdown {
            relevance: 35,
            scope_fit: 25,
            article_match: 25,
            hallucination_risk: 0,
        };
        assert_eq!(b.total(), 100);
    }

    #[test]
    fn test_no_evidence_sentinel() {
        let pack = LawPack::no_evidence();
        assert_eq!(pack.score(), 0);
        assert_eq!(pack.verdict(), Verdict::Fail);
        assert!(pack.is_no_evidence());
        assert!(!pack.article.has_text());
    }

    #[test]
    fn test_facts_field_names() {
        let facts: Facts =
            serde_json::from_str(r#"{"who":"굴착기","what":"장기 주기","where":"사유지","when":"3월"}"#)
                .unwrap();
        assert_eq!(facts.location, "사유지");
        assert_eq!(facts.period, "3월");
    }
}
