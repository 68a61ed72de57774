//! Statute search result normalization.

use serde_json::Value;

use super::value::{as_list, child, first_text};
use crate::text::clean_text;
use crate::types::StatuteHit;

/// Convert a decoded `LawSearch` document into ranked hits.
///
/// Entries without a name or identifier are dropped. Relative detail links
/// are resolved against `base_url`.
pub fn normalize_search_results(doc: &Value, base_url: &str) -> Vec<StatuteHit> {
    let Some(entries) = child(doc, "LawSearch").and_then(|root| child(root, "law")) else {
        return Vec::new();
    };

    as_list(entries)
        .into_iter()
        .filter(|e| e.is_object())
        .map(|e| StatuteHit {
            name: clean_text(&first_text(e, &["법령명한글", "lawNm", "법령명"])),
            id: clean_text(&first_text(e, &["법령일련번호", "MST", "mst"])),
            link: absolute_link(&clean_text(&first_text(e, &["법령상세링크", "link"])), base_url),
            promulgation_date: clean_text(&first_text(e, &["공포일자"])),
        })
        .filter(|hit| !hit.name.is_empty() && !hit.id.is_empty())
        .collect()
}

fn absolute_link(link: &str, base_url: &str) -> String {
    if link.starts_with('/') {
        format!("{}{}", base_url.trim_end_matches('/'), link)
    } else {
        link.to_string()
    }
}
