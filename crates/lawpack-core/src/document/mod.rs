//! Defensive parsing of statute documents into [`ArticlePack`]s.
//!
//! Documents arrive as decoded XML trees whose layout varies by endpoint and
//! statute. Parsing never fails: a document nothing can make sense of yields
//! a pack with empty text, which downstream treats as "no evidence".

mod search;
mod shapes;
pub mod value;

pub use search::normalize_search_results;
pub use shapes::{
    default_resolvers, resolve_document, GenericResolver, KoreanUnitsResolver, RawArticle,
    ResolvedDocument, ServiceArticlesResolver, ShapeResolver,
};

use serde_json::Value;

use crate::text::{
    article_number, format_article_number, names_article, normalize_text, strip_tags, truncate_chars, ArticleNumber,
};
use crate::types::{ArticlePack, ArticleRef, ArticleSelection};

/// Limits applied while extracting an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Maximum characters of article text kept
    pub text_cap: usize,

    /// Maximum entries in the sibling-article index
    pub index_limit: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            text_cap: 4000,
            index_limit: 120,
        }
    }
}

/// Extract one article from a statute document with the default resolvers.
///
/// `article_hint` is matched on its digits against article numbers, then as
/// `제{n}조` inside titles. A hint that matches nothing falls back to the first
/// article and the fallback is recorded in [`ArticlePack::selection`].
pub fn extract_article(
    doc: &Value,
    statute_id: &str,
    article_hint: Option<&str>,
    options: &ExtractOptions,
) -> ArticlePack {
    extract_article_with(doc, statute_id, article_hint, options, &default_resolvers())
}

/// [`extract_article`] with a caller-supplied resolver chain.
pub fn extract_article_with(
    doc: &Value,
    statute_id: &str,
    article_hint: Option<&str>,
    options: &ExtractOptions,
    resolvers: &[Box<dyn ShapeResolver>],
) -> ArticlePack {
    let Some(resolved) = resolve_document(doc, resolvers) else {
        tracing::warn!(statute_id, "No known document shape matched");
        return ArticlePack::empty("", statute_id);
    };

    let target = article_hint.and_then(article_number);
    let (chosen, selection) = select_article(&resolved.articles, target);

    let index = resolved
        .articles
        .iter()
        .take(options.index_limit)
        .filter_map(|a| {
            let title = display_title(a);
            (!title.is_empty()).then(|| ArticleRef {
                number: a.number.clone(),
                title,
            })
        })
        .collect();

    let mut pack = ArticlePack::empty(resolved.statute_name.clone(), statute_id);
    pack.index = index;
    pack.shape = resolved.shape;
    pack.selection = selection;

    if let Some(article) = chosen {
        pack.article_number = if article.number.is_empty() {
            target.map(format_article_number).unwrap_or_default()
        } else {
            article.number.clone()
        };
        pack.article_title = display_title(article);
        pack.text = clean_article_text(&article.text, options.text_cap);
    }

    pack
}

fn select_article<'a>(
    articles: &'a [RawArticle],
    target: Option<ArticleNumber>,
) -> (Option<&'a RawArticle>, ArticleSelection) {
    let Some(first) = articles.first() else {
        return (None, ArticleSelection::NotFound);
    };

    let Some(target) = target else {
        return (Some(first), ArticleSelection::FirstArticle);
    };

    let matched = articles
        .iter()
        .find(|a| article_number(&a.number) == Some(target) || names_article(&a.title, target));

    match matched {
        Some(article) => (Some(article), ArticleSelection::HintMatched),
        None => {
            let requested = format_article_number(target);
            tracing::debug!(hint = %requested, "Article hint matched nothing, using first article");
            (Some(first), ArticleSelection::HintFallback { requested })
        }
    }
}

fn display_title(article: &RawArticle) -> String {
    let title = normalize_text(&strip_tags(&article.title));
    if title.is_empty() && !article.number.is_empty() {
        format!("제{}조", article.number)
    } else {
        title
    }
}

fn clean_article_text(raw: &str, cap: usize) -> String {
    let text = normalize_text(&strip_tags(raw));
    truncate_chars(&text, cap).trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DocumentShape;
    use serde_json::json;

    fn service_doc() -> Value {
        json!({"Law": {
            "법령명한글": "건설기계관리법",
            "Article": [
                {"@조문번호": "1", "ArticleTitle": "목적", "ArticleContent": "제1조(목적) 이 법은..."},
                {"@조문번호": "33", "ArticleTitle": "", "ArticleContent": "제33조  건설기계의\u{200B} 주기"},
                {"@조문번호": "40", "ArticleTitle": "벌칙 제40조 관련", "ArticleContent": "벌칙 본문"}
            ]
        }})
    }

    #[test]
    fn test_hint_matches_number() {
        let pack = extract_article(&service_doc(), "000123", Some("33"), &ExtractOptions::default());
        assert_eq!(pack.selection, ArticleSelection::HintMatched);
        assert_eq!(pack.statute_name, "건설기계관리법");
        assert_eq!(pack.statute_id, "000123");
        assert_eq!(pack.article_number, "33");
        assert_eq!(pack.article_title, "제33조");
        assert_eq!(pack.text, "제33조 건설기계의 주기");
        assert_eq!(pack.shape, DocumentShape::ServiceArticles);
    }

    #[test]
    fn test_hint_reduced_to_digits() {
        let pack = extract_article(&service_doc(), "1", Some("제40조"), &ExtractOptions::default());
        assert_eq!(pack.article_number, "40");
    }

    #[test]
    fn test_branch_article_needs_branch_hint() {
        let doc = json!({"Law": {
            "법령명한글": "건설기계관리법",
            "Article": [
                {"@조문번호": "1", "ArticleTitle": "목적", "ArticleContent": "목적 본문"},
                {"@조문번호": "33의2", "ArticleTitle": "제33조의2(주기장 지정)", "ArticleContent": "주기장 본문"},
                {"@조문번호": "33", "ArticleTitle": "", "ArticleContent": "주기 본문"}
            ]
        }});

        let plain = extract_article(&doc, "1", Some("33"), &ExtractOptions::default());
        assert_eq!(plain.article_number, "33");
        assert_eq!(plain.text, "주기 본문");

        let branch = extract_article(&doc, "1", Some("제33조의2"), &ExtractOptions::default());
        assert_eq!(branch.article_number, "33의2");
        assert_eq!(branch.selection, ArticleSelection::HintMatched);

        let glued = extract_article(&doc, "1", Some("332"), &ExtractOptions::default());
        assert_eq!(glued.selection, ArticleSelection::HintFallback { requested: "332".to_string() });
        assert_eq!(glued.article_number, "1");
    }

    #[test]
    fn test_unmatched_hint_falls_back_to_first() {
        let pack = extract_article(&service_doc(), "1", Some("99"), &ExtractOptions::default());
        assert_eq!(
            pack.selection,
            ArticleSelection::HintFallback {
                requested: "99".to_string()
            }
        );
        assert!(pack.used_fallback());
        assert_eq!(pack.article_number, "1");
    }

    #[test]
    fn test_no_hint_uses_first_article() {
        let pack = extract_article(&service_doc(), "1", None, &ExtractOptions::default());
        assert_eq!(pack.selection, ArticleSelection::FirstArticle);
        assert_eq!(pack.article_title, "목적");
    }

    #[test]
    fn test_index_respects_limit() {
        let options = ExtractOptions {
            text_cap: 4000,
            index_limit: 2,
        };
        let pack = extract_article(&service_doc(), "1", None, &options);
        assert_eq!(pack.index.len(), 2);
        assert_eq!(pack.index[1].title, "제33조");
    }

    #[test]
    fn test_text_cap() {
        let long = "가".repeat(5000);
        let doc = json!({"Law": {"Article": {"@조문번호": "1", "ArticleContent": long}}});
        let options = ExtractOptions {
            text_cap: 100,
            index_limit: 120,
        };
        let pack = extract_article(&doc, "1", None, &options);
        assert_eq!(pack.text.chars().count(), 100);
    }

    #[test]
    fn test_unrecognized_keeps_identity() {
        let pack = extract_article(&json!({"html": "error page"}), "777", Some("3"), &ExtractOptions::default());
        assert_eq!(pack.statute_id, "777");
        assert_eq!(pack.selection, ArticleSelection::NotFound);
        assert_eq!(pack.shape, DocumentShape::Unrecognized);
        assert!(!pack.has_text());
    }
}
