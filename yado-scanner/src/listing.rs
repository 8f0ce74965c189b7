use crate::error::{Result, ScanError};
use crate::fetch::Fetcher;
use crate::markup::ListingMarkup;
use crate::urls::{page_count, page_targets, resolve_link};
use scraper::Html;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome of walking every page of one listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingWalk {
    pub listing_url: String,
    pub page_count: usize,
    /// Absolute detail URLs, in page order then document order. Not deduplicated.
    pub detail_urls: Vec<String>,
    pub failed_pages: Vec<String>,
}

pub struct ListingWalker<M> {
    fetcher: Arc<Fetcher>,
    markup: Arc<M>,
    base_url: String,
    page_size: usize,
}

impl<M: ListingMarkup> ListingWalker<M> {
    pub fn new(fetcher: Arc<Fetcher>, markup: Arc<M>, base_url: &str, page_size: usize) -> Self {
        Self {
            fetcher,
            markup,
            base_url: base_url.to_string(),
            page_size: page_size.max(1),
        }
    }

    /// Collects the detail links of every page of `listing_url`.
    ///
    /// Only a failure to fetch the listing itself is an error. A missing or
    /// unreadable result count means one page; a page that cannot be
    /// fetched is skipped.
    pub async fn walk(&self, listing_url: &str) -> Result<ListingWalk> {
        info!("Fetching response for listing URL: {}", listing_url);
        let listing = self.fetcher.fetch(listing_url).await?;

        let page_count = match self.page_count_of(listing_url, &listing.text) {
            Ok(pages) => pages,
            Err(e) => {
                warn!(
                    "Failed to determine the number of pages for URL {}: {}",
                    listing_url, e
                );
                1
            }
        };

        let mut walk = ListingWalk {
            listing_url: listing_url.to_string(),
            page_count,
            ..Default::default()
        };

        for page in page_targets(listing_url, page_count) {
            info!("Fetching page URL: {}", page.url);
            match self.fetcher.fetch(&page.url).await {
                Ok(fetched) => walk.detail_urls.extend(self.detail_urls_of(&fetched.text)),
                Err(e) => {
                    warn!(
                        "Skipping page {}/{} of {}: {}",
                        page.page_index, page_count, listing_url, e
                    );
                    walk.failed_pages.push(page.url);
                }
            }
        }

        info!(
            "Listing {} yielded {} detail URLs over {} pages",
            listing_url,
            walk.detail_urls.len(),
            page_count
        );
        Ok(walk)
    }

    fn page_count_of(&self, listing_url: &str, html: &str) -> Result<usize> {
        let doc = Html::parse_document(html);
        let raw = self
            .markup
            .result_count(&doc)
            .ok_or_else(|| ScanError::Extraction {
                url: listing_url.to_string(),
                field: "result count",
            })?;
        let count = parse_count(&raw).ok_or_else(|| ScanError::Parse {
            url: listing_url.to_string(),
            value: raw.clone(),
        })?;
        Ok(page_count(count, self.page_size))
    }

    fn detail_urls_of(&self, html: &str) -> Vec<String> {
        let doc = Html::parse_document(html);
        self.markup
            .detail_links(&doc)
            .iter()
            .filter_map(|href| resolve_link(&self.base_url, href))
            .collect()
    }
}

/// Reads a result count such as `61` or `1,234`.
pub fn parse_count(raw: &str) -> Option<usize> {
    raw.trim().replace(',', "").parse().ok()
}
