//! Statute document shape resolvers.
//!
//! The corpus returns statutes in more than one layout depending on the
//! endpoint and the statute. Each layout gets a resolver; resolvers are tried
//! in order and the first one that yields an article wins. Support for a new
//! layout is a new [`ShapeResolver`], never a new branch in an existing one.

use serde_json::Value;

use super::value::{as_list, child, first_text};
use crate::types::DocumentShape;

/// Article as found in the document, before cleaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawArticle {
    pub number: String,
    pub title: String,
    pub text: String,
}

impl RawArticle {
    fn is_blank(&self) -> bool {
        self.number.is_empty() && self.title.is_empty() && self.text.is_empty()
    }
}

/// Output of a successful resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDocument {
    pub shape: DocumentShape,
    pub statute_name: String,
    pub articles: Vec<RawArticle>,
}

/// Recognizes one document layout.
pub trait ShapeResolver: Send + Sync {
    /// Shape this resolver recognizes.
    fn shape(&self) -> DocumentShape;

    /// Extract articles in document order.
    ///
    /// Returns `None` when the layout does not match or yields no article.
    fn resolve(&self, doc: &Value) -> Option<ResolvedDocument>;
}

/// `법령 / 조문 / 조문단위` layout of the Korean-keyed service export.
#[derive(Debug, Default, Clone, Copy)]
pub struct KoreanUnitsResolver;

impl KoreanUnitsResolver {
    fn unit_text(unit: &Value) -> String {
        let mut parts = vec![first_text(unit, &["조문내용"])];

        for paragraph in child(unit, "항").map(as_list).unwrap_or_default() {
            parts.push(first_text(paragraph, &["항내용"]));
            for item in child(paragraph, "호").map(as_list).unwrap_or_default() {
                parts.push(first_text(item, &["호내용"]));
                for sub in child(item, "목").map(as_list).unwrap_or_default() {
                    parts.push(first_text(sub, &["목내용"]));
                }
            }
        }

        join_parts(parts)
    }

    fn unit_number(unit: &Value) -> String {
        let number = first_text(unit, &["조문번호"]);
        let branch = first_text(unit, &["조문가지번호"]);
        if branch.is_empty() || number.is_empty() {
            number
        } else {
            format!("{}의{}", number, branch)
        }
    }
}

impl ShapeResolver for KoreanUnitsResolver {
    fn shape(&self) -> DocumentShape {
        DocumentShape::KoreanUnits
    }

    fn resolve(&self, doc: &Value) -> Option<ResolvedDocument> {
        let root = child(doc, "법령")?;
        let units = child(root, "조문").and_then(|n| child(n, "조문단위"))?;

        let articles: Vec<RawArticle> = as_list(units)
            .into_iter()
            .filter(|unit| unit.is_object())
            // chapter and section headings are units too
            .filter(|unit| first_text(unit, &["조문여부"]) != "전문")
            .map(|unit| RawArticle {
                number: Self::unit_number(unit),
                title: first_text(unit, &["조문제목"]),
                text: Self::unit_text(unit),
            })
            .filter(|a| !a.is_blank())
            .collect();

        if articles.is_empty() {
            return None;
        }

        let statute_name = child(root, "기본정보")
            .map(|info| first_text(info, &["법령명_한글", "법령명한글"]))
            .unwrap_or_default();

        Some(ResolvedDocument {
            shape: self.shape(),
            statute_name,
            articles,
        })
    }
}

/// `Law / Article` layout with attribute-numbered articles.
#[derive(Debug, Default, Clone, Copy)]
pub struct ServiceArticlesResolver;

impl ShapeResolver for ServiceArticlesResolver {
    fn shape(&self) -> DocumentShape {
        DocumentShape::ServiceArticles
    }

    fn resolve(&self, doc: &Value) -> Option<ResolvedDocument> {
        let root = child(doc, "Law").or_else(|| child(doc, "law"))?;
        let nodes = child(root, "Article")?;

        let articles: Vec<RawArticle> = as_list(nodes)
            .into_iter()
            .filter(|a| a.is_object())
            .map(|a| {
                let mut parts = vec![first_text(a, &["ArticleContent"])];
                for paragraph in child(a, "Paragraph").map(as_list).unwrap_or_default() {
                    parts.push(first_text(paragraph, &["ParagraphContent"]));
                }
                RawArticle {
                    number: first_text(a, &["@조문번호", "ArticleNumber"]),
                    title: first_text(a, &["ArticleTitle"]),
                    text: join_parts(parts),
                }
            })
            .filter(|a| !a.is_blank())
            .collect();

        if articles.is_empty() {
            return None;
        }

        Some(ResolvedDocument {
            shape: self.shape(),
            statute_name: first_text(root, &["법령명한글", "LawName", "법령명"]),
            articles,
        })
    }
}

/// Last-resort layout: probe common roots and article keys with field synonyms.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericResolver;

const GENERIC_ROOTS: &[&str] = &["법령", "Law", "law"];
const GENERIC_ARTICLE_KEYS: &[&str] = &["조문", "조문단위", "Article", "article"];

impl ShapeResolver for GenericResolver {
    fn shape(&self) -> DocumentShape {
        DocumentShape::Generic
    }

    fn resolve(&self, doc: &Value) -> Option<ResolvedDocument> {
        let roots = GENERIC_ROOTS
            .iter()
            .filter_map(|k| child(doc, k))
            .chain(std::iter::once(doc));

        for root in roots {
            if !root.is_object() {
                continue;
            }

            let articles: Vec<RawArticle> = GENERIC_ARTICLE_KEYS
                .iter()
                .filter_map(|k| child(root, k))
                .flat_map(as_list)
                .filter(|a| a.is_object())
                .map(|a| RawArticle {
                    number: first_text(a, &["조문번호", "ArticleNumber", "번호"]),
                    title: first_text(a, &["조문제목", "ArticleTitle", "제목"]),
                    text: first_text(a, &["조문내용", "ArticleContent", "내용"]),
                })
                .filter(|a| !a.is_blank())
                .collect();

            if !articles.is_empty() {
                return Some(ResolvedDocument {
                    shape: self.shape(),
                    statute_name: first_text(
                        root,
                        &["법령명한글", "법령명_한글", "LawName", "법령명"],
                    ),
                    articles,
                });
            }
        }

        None
    }
}

/// Resolvers in priority order.
pub fn default_resolvers() -> Vec<Box<dyn ShapeResolver>> {
    vec![
        Box::new(KoreanUnitsResolver),
        Box::new(ServiceArticlesResolver),
        Box::new(GenericResolver),
    ]
}

/// Run `resolvers` in order and return the first match.
pub fn resolve_document(
    doc: &Value,
    resolvers: &[Box<dyn ShapeResolver>],
) -> Option<ResolvedDocument> {
    resolvers.iter().find_map(|r| {
        let resolved = r.resolve(doc);
        if resolved.is_some() {
            tracing::debug!(shape = ?r.shape(), "Document shape recognized");
        }
        resolved
    })
}

fn join_parts(parts: Vec<String>) -> String {
    parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn korean_units_doc() -> Value {
        json!({
            "법령": {
                "기본정보": {"법령명_한글": "건설기계관리법"},
                "조문": {
                    "조문단위": [
                        {"조문번호": "1", "조문여부": "전문", "조문내용": "제1장 총칙"},
                        {
                            "조문번호": "1",
                            "조문여부": "조문",
                            "조문제목": "목적",
                            "조문내용": "제1조(목적) 이 법은 건설기계의 등록에 관한 사항을 정한다."
                        },
                        {
                            "조문번호": "33",
                            "조문여부": "조문",
                            "조문제목": "건설기계의 주기",
                            "조문내용": "제33조(주기)",
                            "항": [
                                {"항내용": "① 주기장에 주기하여야 한다.", "호": {"호내용": "1. 예외"}},
                                {"항내용": "② 위반 시 과태료를 부과한다."}
                            ]
                        }
                    ]
                }
            }
        })
    }

    #[test]
    fn test_korean_units_skips_headings() {
        let resolved = KoreanUnitsResolver.resolve(&korean_units_doc()).unwrap();
        assert_eq!(resolved.shape, DocumentShape::KoreanUnits);
        assert_eq!(resolved.statute_name, "건설기계관리법");
        assert_eq!(resolved.articles.len(), 2);
        assert_eq!(resolved.articles[0].title, "목적");
    }

    #[test]
    fn test_korean_units_joins_paragraphs() {
        let resolved = KoreanUnitsResolver.resolve(&korean_units_doc()).unwrap();
        assert_eq!(
            resolved.articles[1].text,
            "제33조(주기)\n① 주기장에 주기하여야 한다.\n1. 예외\n② 위반 시 과태료를 부과한다."
        );
    }

    #[test]
    fn test_korean_units_branch_number() {
        let doc = json!({"법령": {"조문": {"조문단위": {
            "조문번호": "33", "조문가지번호": "2", "조문내용": "제33조의2"
        }}}});
        let resolved = KoreanUnitsResolver.resolve(&doc).unwrap();
        assert_eq!(resolved.articles[0].number, "33의2");
    }

    #[test]
    fn test_service_articles() {
        let doc = json!({"Law": {
            "법령명한글": "도로교통법",
            "Article": [
                {"@조문번호": "32", "ArticleTitle": "정차 및 주차의 금지", "ArticleContent": "본문",
                 "Paragraph": [{"ParagraphContent": "1항"}, {"ParagraphContent": "2항"}]},
                {"@조문번호": "33", "ArticleTitle": "주차금지의 장소"}
            ]
        }});
        let resolved = ServiceArticlesResolver.resolve(&doc).unwrap();
        assert_eq!(resolved.statute_name, "도로교통법");
        assert_eq!(resolved.articles[0].number, "32");
        assert_eq!(resolved.articles[0].text, "본문\n1항\n2항");
        assert_eq!(resolved.articles[1].text, "");
    }

    #[test]
    fn test_generic_falls_back_to_document_root() {
        let doc = json!({"article": [{"번호": "5", "제목": "정의", "내용": "이 법에서..."}]});
        let resolved = GenericResolver.resolve(&doc).unwrap();
        assert_eq!(resolved.shape, DocumentShape::Generic);
        assert_eq!(resolved.articles[0].number, "5");
    }

    #[test]
    fn test_resolver_order() {
        let resolvers = default_resolvers();
        let resolved = resolve_document(&korean_units_doc(), &resolvers).unwrap();
        assert_eq!(resolved.shape, DocumentShape::KoreanUnits);

        let doc = json!({"law": {"Article": {"ArticleNumber": "1", "ArticleContent": "x"}}});
        let resolved = resolve_document(&doc, &resolvers).unwrap();
        assert_eq!(resolved.shape, DocumentShape::ServiceArticles);
    }

    #[test]
    fn test_unrecognized_document() {
        let resolvers = default_resolvers();
        assert!(resolve_document(&json!({"Error": "no data"}), &resolvers).is_none());
        assert!(resolve_document(&json!({"법령": {"조문": {}}}), &resolvers).is_none());
    }
}
