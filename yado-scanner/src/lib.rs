pub mod config;
pub mod crawler;
pub mod detail;
pub mod error;
pub mod fetch;
pub mod listing;
pub mod markup;
pub mod proxy;
pub mod record;
pub mod regions;
pub mod urls;

pub use config::SiteConfig;
pub use crawler::{CrawlEvent, CrawlReport, Crawler, ListingCheckpoint};
pub use error::ScanError;
pub use fetch::Fetcher;
pub use markup::JalanMarkup;
pub use proxy::{ProxyConfig, ProxyRotation, RoundRobin};
pub use record::HotelRecord;
pub use regions::{Region, RegionMatch, Subregion};
