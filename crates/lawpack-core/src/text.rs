//! Text normalization for corpus documents and case input.
//!
//! Every function here is pure. [`normalize_text`] is idempotent, which the
//! corpus parser relies on when it re-normalizes text pulled from nested
//! paragraph fields.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Control characters (keeping \t \n), zero-width marks, BOM and the
    // private use area some corpus exports leak into article bodies.
    static ref INVISIBLE: Regex = Regex::new(
        r"[\x00-\x08\x0B\x0C\x0E-\x1F\x7F\x{200B}-\x{200F}\x{2060}\x{FEFF}\x{E000}-\x{F8FF}]"
    ).unwrap();

    static ref TAG: Regex = Regex::new(r"<[^<>]*>").unwrap();

    static ref NUMERIC_ENTITY: Regex = Regex::new(r"&#(x[0-9A-Fa-f]{1,6}|[0-9]{1,7});").unwrap();

    static ref INLINE_SPACE: Regex = Regex::new(r"[ \t\x{00A0}\x{3000}]+").unwrap();

    static ref SPACE_BEFORE_NEWLINE: Regex = Regex::new(r" \n").unwrap();

    static ref BLANK_LINES: Regex = Regex::new(r"\n{3,}").unwrap();

    static ref HAN_SCRIPT: Regex = Regex::new(r"[\x{3400}-\x{4DBF}\x{4E00}-\x{9FFF}]+").unwrap();

    static ref PIPE_JUNK: Regex = Regex::new(r"\|>+").unwrap();

    static ref SPACE_RUN: Regex = Regex::new(r" {2,}").unwrap();

    static ref NON_WORD: Regex = Regex::new(r"[^가-힣A-Za-z0-9\s]").unwrap();

    static ref WORD: Regex = Regex::new(r"[가-힣A-Za-z0-9]{2,14}").unwrap();

    // "33", "제33조", "33의2", "제33조의 2"
    static ref ARTICLE_NUMBER: Regex = Regex::new(r"([0-9]+)\s*조?\s*(?:의\s*([0-9]+))?").unwrap();

    static ref ARTICLE_MARKER: Regex = Regex::new(r"제\s*([0-9]+)\s*조(?:\s*의\s*([0-9]+))?").unwrap();
}

/// Words that carry no retrieval signal in complaint text.
const STOPWORDS: &[&str] = &[
    "그리고", "관련", "문의", "사항", "대하여", "대한", "처리", "요청", "작성", "안내", "검토",
    "불편", "민원", "신청", "발급", "제출", "가능", "여부", "조치", "확인", "통보", "회신", "결과",
    "사유", "해당", "이것", "저것",
];

/// Unify line endings, decode common HTML entities, drop invisible characters.
pub fn sanitize(input: &str) -> String {
    let text = input.replace("\r\n", "\n").replace('\r', "\n");
    let text = unescape_entities(&text);
    INVISIBLE.replace_all(&text, "").trim().to_string()
}

/// [`sanitize`] plus markup removal.
pub fn clean_text(input: &str) -> String {
    let text = sanitize(input);
    strip_tags(&text).trim().to_string()
}

/// Remove anything that looks like an HTML/XML tag.
pub fn strip_tags(input: &str) -> String {
    TAG.replace_all(input, "").into_owned()
}

/// Remove tags and decode entities, as search APIs return `<b>` highlighted titles.
pub fn strip_html_tags(input: &str) -> String {
    let text = strip_tags(input);
    unescape_entities(&text).trim().to_string()
}

/// Canonical form of article text.
///
/// Unifies line endings, strips invisible characters, collapses inline
/// whitespace, removes trailing spaces on lines and limits blank lines to one.
pub fn normalize_text(input: &str) -> String {
    let text = input.replace("\r\n", "\n").replace('\r', "\n");
    let text = INVISIBLE.replace_all(&text, "");
    let text = INLINE_SPACE.replace_all(&text, " ");
    let text = SPACE_BEFORE_NEWLINE.replace_all(&text, "\n");
    let text = BLANK_LINES.replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// Presentation variant: drop Han-script runs and corpus junk markers.
pub fn strip_for_display(input: &str) -> String {
    let text = normalize_text(input);
    let text = HAN_SCRIPT.replace_all(&text, "");
    let text = PIPE_JUNK.replace_all(&text, "");
    let text = text.replace(">>", " ");
    let text = SPACE_RUN.replace_all(&text, " ");
    text.trim().to_string()
}

/// Truncate to at most `max_chars` characters, never splitting a code point.
pub fn truncate_chars(input: &str, max_chars: usize) -> String {
    match input.char_indices().nth(max_chars) {
        Some((idx, _)) => input[..idx].to_string(),
        None => input.to_string(),
    }
}

/// Article number and branch number: `"제33조의2"` is `(33, Some(2))`.
pub type ArticleNumber = (u32, Option<u32>);

fn number_from(caps: &regex::Captures<'_>) -> Option<ArticleNumber> {
    let number = caps.get(1)?.as_str().parse().ok()?;
    let branch = match caps.get(2) {
        Some(m) => Some(m.as_str().parse().ok()?),
        None => None,
    };
    Some((number, branch))
}

/// First article number in `input`; `None` when it has no digits.
pub fn article_number(input: &str) -> Option<ArticleNumber> {
    ARTICLE_NUMBER.captures(input).and_then(|caps| number_from(&caps))
}

/// Whether `title` names article `target` as `제N조` (or `제N조의M`).
pub fn names_article(title: &str, target: ArticleNumber) -> bool {
    ARTICLE_MARKER
        .captures_iter(title)
        .any(|caps| number_from(&caps) == Some(target))
}

/// `"33"` or `"33의2"`.
pub fn format_article_number((number, branch): ArticleNumber) -> String {
    match branch {
        Some(branch) => format!("{}의{}", number, branch),
        None => number.to_string(),
    }
}

/// Extract up to `max_k` distinct keywords from Korean free text.
///
/// Tokens are 2-14 Hangul/Latin/digit characters; stopwords and pure
/// numbers are dropped; first-seen order is kept.
pub fn extract_keywords(input: &str, max_k: usize) -> Vec<String> {
    let text = sanitize(input);
    let text = NON_WORD.replace_all(&text, " ");

    let mut out: Vec<String> = Vec::new();
    for m in WORD.find_iter(&text) {
        if out.len() >= max_k {
            break;
        }
        let word = m.as_str();
        if STOPWORDS.contains(&word) || word.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        if !out.iter().any(|w| w == word) {
            out.push(word.to_string());
        }
    }
    out
}

/// Clean each entry and drop empties and duplicates, keeping order.
pub fn clean_list<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for item in items {
        let cleaned = clean_text(item.as_ref());
        if !cleaned.is_empty() && !out.contains(&cleaned) {
            out.push(cleaned);
        }
    }
    out
}

fn unescape_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }
    let decoded = NUMERIC_ENTITY.replace_all(input, |caps: &regex::Captures| {
        let raw = &caps[1];
        let code = match raw.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => raw.parse::<u32>().ok(),
        };
        code.and_then(char::from_u32)
            .map(|c| c.to_string())
            .unwrap_or_default()
    });
    decoded
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
