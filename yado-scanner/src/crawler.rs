use crate::config::SiteConfig;
use crate::detail::DetailExtractor;
use crate::error::{Result, ScanError};
use crate::fetch::Fetcher;
use crate::listing::ListingWalker;
use crate::markup::{JalanMarkup, SiteMarkup};
use crate::record::HotelRecord;
use crate::regions::{Region, extract_regions, listing_targets};
use crate::urls::ListingTarget;
use futures::stream::{self, StreamExt};
use scraper::Html;
use std::sync::Arc;
use tracing::{error, info, warn};
use url::Url;

pub type ProgressCallback = Arc<dyn Fn(CrawlEvent) + Send + Sync>;
pub type ResultCallback = Arc<dyn Fn(&HotelRecord) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlEvent {
    SeedsLoaded {
        regions: usize,
        prefectures: usize,
        listings: usize,
    },
    ListingStarted {
        url: String,
    },
    ListingResumed {
        url: String,
        records: usize,
    },
    ListingFinished {
        url: String,
        records: usize,
        failed_details: usize,
    },
    ListingFailed {
        url: String,
        error: String,
    },
    DetailFailed {
        url: String,
        error: String,
    },
}

/// Resume support, keyed by listing URL.
///
/// Implementations report their own storage failures; the crawl carries on
/// as if the listing had never been checkpointed.
pub trait ListingCheckpoint: Send + Sync {
    /// Records of a listing finished by an earlier run.
    fn completed(&self, listing_url: &str) -> Option<Vec<HotelRecord>>;
    fn complete(&self, listing_url: &str, records: &[HotelRecord]);
}

#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Listing order, then detail order within each listing.
    pub records: Vec<HotelRecord>,
    pub listings_total: usize,
    pub listings_resumed: usize,
    pub listings_failed: usize,
    pub details_failed: usize,
}

enum ListingOutcome {
    Crawled {
        records: Vec<HotelRecord>,
        failed_details: usize,
    },
    Resumed(Vec<HotelRecord>),
    Failed,
}

/// Region tree → listings → pages → details → map pages.
pub struct Crawler<M> {
    config: SiteConfig,
    fetcher: Arc<Fetcher>,
    markup: Arc<M>,
    progress_callback: Option<ProgressCallback>,
    result_callback: Option<ResultCallback>,
    checkpoint: Option<Arc<dyn ListingCheckpoint>>,
}

impl Crawler<JalanMarkup> {
    pub fn new(config: SiteConfig) -> Result<Self> {
        Self::with_markup(config, JalanMarkup::new())
    }
}

impl<M: SiteMarkup> Crawler<M> {
    pub fn with_markup(config: SiteConfig, markup: M) -> Result<Self> {
        Url::parse(&config.base_url)
            .map_err(|e| ScanError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        let fetcher = Fetcher::new(&config)?;
        Ok(Self {
            config,
            fetcher: Arc::new(fetcher),
            markup: Arc::new(markup),
            progress_callback: None,
            result_callback: None,
            checkpoint: None,
        })
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn with_result_callback(mut self, callback: ResultCallback) -> Self {
        self.result_callback = Some(callback);
        self
    }

    pub fn with_checkpoint(mut self, checkpoint: Arc<dyn ListingCheckpoint>) -> Self {
        self.checkpoint = Some(checkpoint);
        self
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    fn emit(&self, event: CrawlEvent) {
        if let Some(ref callback) = self.progress_callback {
            callback(event);
        }
    }

    fn publish(&self, record: &HotelRecord) {
        if let Some(ref callback) = self.result_callback {
            callback(record);
        }
    }

    /// Fetches and parses the region script. Failing here is fatal.
    pub async fn load_regions(&self) -> Result<Vec<Region>> {
        let url = self.config.regions_script_url();
        let script = self.fetcher.fetch(&url).await.map_err(|e| {
            error!("Failed to fetch subdivision data.");
            ScanError::Seed(format!("region script {}: {}", url, e))
        })?;

        let regions = extract_regions(&script.text);
        if regions.is_empty() {
            error!("No subdivision data available in {}", url);
            return Err(ScanError::Seed(format!("no region declarations in {}", url)));
        }

        info!("Loaded {} regions from {}", regions.len(), url);
        Ok(regions)
    }

    /// Fetches the base page and reads its prefecture selector. Failing
    /// to fetch is fatal.
    pub async fn load_prefecture_codes(&self) -> Result<Vec<String>> {
        let url = self.config.base_page_url();
        let page = self.fetcher.fetch(&url).await.map_err(|e| {
            error!("Failed to fetch base DOM.");
            ScanError::Seed(format!("base page {}: {}", url, e))
        })?;

        let codes = {
            let doc = Html::parse_document(&page.text);
            self.markup.prefecture_codes(&doc)
        };
        if codes.is_empty() {
            warn!("No prefecture codes found on {}", url);
        }
        Ok(codes)
    }

    /// Every listing to walk, in crawl order.
    pub async fn plan(&self) -> Result<Vec<ListingTarget>> {
        let regions = self.load_regions().await?;
        let prefecture_codes = self.load_prefecture_codes().await?;

        let targets = listing_targets(
            &prefecture_codes,
            &regions,
            self.config.region_match,
            &self.config.base_url,
        );

        self.emit(CrawlEvent::SeedsLoaded {
            regions: regions.len(),
            prefectures: prefecture_codes.len(),
            listings: targets.len(),
        });
        info!(
            "{} prefectures over {} regions produced {} listing URLs",
            prefecture_codes.len(),
            regions.len(),
            targets.len()
        );
        Ok(targets)
    }

    /// Runs the whole crawl.
    ///
    /// Only seed failures are returned as errors. Anything that goes wrong
    /// below a listing is logged and counted in the report.
    pub async fn crawl(&self) -> Result<CrawlReport> {
        let targets = self.plan().await?;

        let walker = ListingWalker::new(
            self.fetcher.clone(),
            self.markup.clone(),
            &self.config.base_url,
            self.config.page_size(),
        );
        let extractor =
            DetailExtractor::new(self.fetcher.clone(), self.markup.clone(), &self.config.base_url);

        let outcomes: Vec<ListingOutcome> = stream::iter(&targets)
            .map(|target| self.crawl_listing(&walker, &extractor, target))
            .buffered(self.config.concurrency())
            .collect()
            .await;

        let mut report = CrawlReport {
            listings_total: targets.len(),
            ..Default::default()
        };
        for outcome in outcomes {
            match outcome {
                ListingOutcome::Crawled {
                    records,
                    failed_details,
                } => {
                    report.details_failed += failed_details;
                    report.records.extend(records);
                }
                ListingOutcome::Resumed(records) => {
                    report.listings_resumed += 1;
                    report.records.extend(records);
                }
                ListingOutcome::Failed => report.listings_failed += 1,
            }
        }

        info!(
            "Crawl complete. {} records from {} listings ({} resumed, {} failed, {} details dropped)",
            report.records.len(),
            report.listings_total,
            report.listings_resumed,
            report.listings_failed,
            report.details_failed
        );
        Ok(report)
    }

    async fn crawl_listing(
        &self,
        walker: &ListingWalker<M>,
        extractor: &DetailExtractor<M>,
        target: &ListingTarget,
    ) -> ListingOutcome {
        if let Some(ref checkpoint) = self.checkpoint
            && let Some(records) = checkpoint.completed(&target.url)
        {
            info!("Resuming {} from checkpoint ({} records)", target.url, records.len());
            self.emit(CrawlEvent::ListingResumed {
                url: target.url.clone(),
                records: records.len(),
            });
            records.iter().for_each(|record| self.publish(record));
            return ListingOutcome::Resumed(records);
        }

        self.emit(CrawlEvent::ListingStarted {
            url: target.url.clone(),
        });

        let walk = match walker.walk(&target.url).await {
            Ok(walk) => walk,
            Err(e) => {
                error!("Skipping listing {}: {}", target.url, e);
                self.emit(CrawlEvent::ListingFailed {
                    url: target.url.clone(),
                    error: e.to_string(),
                });
                return ListingOutcome::Failed;
            }
        };

        let results: Vec<Result<HotelRecord>> = stream::iter(&walk.detail_urls)
            .map(|url| extractor.extract(url))
            .buffered(self.config.concurrency())
            .collect()
            .await;

        let mut records = Vec::with_capacity(results.len());
        let mut failed_details = 0;
        for (url, result) in walk.detail_urls.iter().zip(results) {
            match result {
                Ok(record) => {
                    self.publish(&record);
                    records.push(record);
                }
                Err(e) => {
                    error!("Failed to parse hotel data for URL {}: {}", url, e);
                    failed_details += 1;
                    self.emit(CrawlEvent::DetailFailed {
                        url: url.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        // Listings with skipped pages stay unchecked so a rerun retries them.
        if walk.failed_pages.is_empty()
            && let Some(ref checkpoint) = self.checkpoint
        {
            checkpoint.complete(&target.url, &records);
        }

        self.emit(CrawlEvent::ListingFinished {
            url: target.url.clone(),
            records: records.len(),
            failed_details,
        });
        ListingOutcome::Crawled {
            records,
            failed_details,
        }
    }
}
