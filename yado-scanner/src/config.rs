use crate::proxy::ProxyConfig;
use crate::regions::RegionMatch;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://www.jalan.net/";
pub const DEFAULT_REGIONS_SCRIPT_PATH: &str = "js/quick/jalan_qs.js";
pub const DEFAULT_PAGE_SIZE: usize = 30;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Everything about the target site and how to reach it.
///
/// Every field has a default, so a config file only needs the keys it
/// overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub base_url: String,
    pub regions_script_path: String,
    /// Sent with every request, in order.
    pub headers: Vec<(String, String)>,
    pub proxies: Vec<ProxyConfig>,
    pub timeout_secs: u64,
    pub page_size: usize,
    pub region_match: RegionMatch,
    pub accept_invalid_certs: bool,
    pub concurrency: usize,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            regions_script_path: DEFAULT_REGIONS_SCRIPT_PATH.to_string(),
            headers: default_headers(),
            proxies: vec![ProxyConfig::direct()],
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            page_size: DEFAULT_PAGE_SIZE,
            region_match: RegionMatch::default(),
            accept_invalid_certs: true,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl SiteConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_proxies(mut self, proxies: Vec<ProxyConfig>) -> Self {
        self.proxies = proxies;
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_region_match(mut self, region_match: RegionMatch) -> Self {
        self.region_match = region_match;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The proxy pool, never empty.
    pub fn proxy_pool(&self) -> Vec<ProxyConfig> {
        if self.proxies.is_empty() {
            vec![ProxyConfig::direct()]
        } else {
            self.proxies.clone()
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size.max(1)
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency.max(1)
    }

    pub fn regions_script_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.regions_script_path.trim_start_matches('/')
        )
    }

    /// The base page carrying the prefecture selector.
    pub fn base_page_url(&self) -> String {
        format!("{}/", self.base_url.trim_end_matches('/'))
    }
}

/// A desktop Chrome navigation request.
pub fn default_headers() -> Vec<(String, String)> {
    [
        (
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7",
        ),
        ("Accept-Language", "en-US,en;q=0.9"),
        ("Cache-Control", "max-age=0"),
        ("Connection", "keep-alive"),
        ("Sec-Fetch-Dest", "document"),
        ("Sec-Fetch-Mode", "navigate"),
        ("Sec-Fetch-Site", "none"),
        ("Sec-Fetch-User", "?1"),
        ("Upgrade-Insecure-Requests", "1"),
        (
            "User-Agent",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/128.0.0.0 Safari/537.36",
        ),
        (
            "sec-ch-ua",
            "\"Chromium\";v=\"128\", \"Not;A=Brand\";v=\"24\", \"Google Chrome\";v=\"128\"",
        ),
        ("sec-ch-ua-mobile", "?0"),
        ("sec-ch-ua-platform", "\"Windows\""),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), value.to_string()))
    .collect()
}
