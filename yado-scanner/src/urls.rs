use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingTarget {
    pub prefecture_code: String,
    pub subregion_code: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageTarget {
    pub listing_url: String,
    /// 1-based.
    pub page_index: usize,
    pub url: String,
}

pub fn listing_url(base_url: &str, prefecture_code: &str, subregion_code: &str) -> String {
    format!(
        "{}/{}/LRG_{}/",
        base_url.trim_end_matches('/'),
        prefecture_code,
        subregion_code
    )
}

pub fn page_urls(listing_url: &str, page_count: usize) -> Vec<String> {
    (1..=page_count)
        .map(|i| format!("{}page{}.html", listing_url, i))
        .collect()
}

pub fn page_targets(listing_url: &str, page_count: usize) -> Vec<PageTarget> {
    page_urls(listing_url, page_count)
        .into_iter()
        .enumerate()
        .map(|(i, url)| PageTarget {
            listing_url: listing_url.to_string(),
            page_index: i + 1,
            url,
        })
        .collect()
}

/// Pages needed to show `result_count` results. Zero results, zero pages.
pub fn page_count(result_count: usize, page_size: usize) -> usize {
    result_count.div_ceil(page_size.max(1))
}

/// Resolve a scraped href against the site base.
pub fn resolve_link(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with("javascript:") || href.starts_with('#') {
        return None;
    }

    let base_url = Url::parse(base).ok()?;
    let mut resolved = base_url.join(href).ok()?;
    resolved.set_fragment(None);
    Some(resolved.to_string())
}
