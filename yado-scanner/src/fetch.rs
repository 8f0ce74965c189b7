use crate::config::SiteConfig;
use crate::error::{Result, ScanError};
use crate::proxy::{ProxyConfig, ProxyRotation, RoundRobin};
use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Proxy};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, warn};

/// A successful response, with the body decoded into text.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub status: u16,
    pub body: Vec<u8>,
    pub text: String,
    /// WHATWG label of the encoding the body was decoded with.
    pub encoding: &'static str,
}

struct ProxyRoute {
    proxy: ProxyConfig,
    client: Client,
}

/// HTTP GET with round-robin proxy failover.
///
/// Each pool entry gets its own client. One call to [`Fetcher::fetch`] claims
/// its first slot from the rotation and walks the pool from there, so every
/// attempt of a call goes through a different entry even while other calls
/// share the cursor. It gives up with [`ScanError::Network`] once the pool is
/// exhausted.
pub struct Fetcher {
    routes: Vec<ProxyRoute>,
    rotation: Arc<dyn ProxyRotation>,
}

impl Fetcher {
    pub fn new(config: &SiteConfig) -> Result<Self> {
        Self::with_rotation(config, Arc::new(RoundRobin::new()))
    }

    pub fn with_rotation(config: &SiteConfig, rotation: Arc<dyn ProxyRotation>) -> Result<Self> {
        let headers = build_headers(&config.headers)?;

        let routes = config
            .proxy_pool()
            .into_iter()
            .map(|proxy| {
                let client = build_client(config, &headers, &proxy)?;
                Ok(ProxyRoute { proxy, client })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { routes, rotation })
    }

    pub fn pool_len(&self) -> usize {
        self.routes.len()
    }

    pub async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let attempts = self.routes.len();

        let start = self.rotation.next_proxy(attempts);

        for offset in 0..attempts {
            if offset > 0 {
                // Retries still advance the shared cursor.
                self.rotation.next_proxy(attempts);
            }
            let route = &self.routes[(start + offset) % attempts];
            debug!(
                "Fetching {} via {} (attempt {}/{})",
                url,
                route.proxy,
                offset + 1,
                attempts
            );

            match Self::attempt(&route.client, url).await {
                Ok(page) => return Ok(page),
                Err(e) => warn!("Proxy {} failed for {}: {}", route.proxy, url, e),
            }
        }

        error!("All proxies failed for URL: {}", url);
        Err(ScanError::Network {
            url: url.to_string(),
            attempts,
        })
    }

    async fn attempt(client: &Client, url: &str) -> Result<FetchedPage> {
        let start = Instant::now();
        let response = client.get(url).send().await?.error_for_status()?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        let (text, encoding) = decode_body(&body);
        debug!(
            "Fetched {} ({} bytes, {}) in {:?}",
            url,
            body.len(),
            encoding.name(),
            start.elapsed()
        );

        Ok(FetchedPage {
            url: url.to_string(),
            status,
            body,
            text,
            encoding: encoding.name(),
        })
    }
}

/// Decodes a response body by sniffing its encoding.
///
/// A byte order mark wins; otherwise the encoding is guessed statistically
/// from the bytes, ignoring whatever the server claimed in its headers.
pub fn decode_body(body: &[u8]) -> (String, &'static Encoding) {
    let mut detector = EncodingDetector::new();
    detector.feed(body, true);
    let guessed = detector.guess(None, true);

    let (text, actual, _) = guessed.decode(body);
    (text.into_owned(), actual)
}

fn build_headers(headers: &[(String, String)]) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| ScanError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| ScanError::InvalidHeader {
            name: name.clone(),
            reason: e.to_string(),
        })?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

fn build_client(config: &SiteConfig, headers: &HeaderMap, proxy: &ProxyConfig) -> Result<Client> {
    let timeout = config.timeout();
    let builder = Client::builder()
        .default_headers(headers.clone())
        .timeout(timeout)
        .connect_timeout(timeout)
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .pool_max_idle_per_host(50)
        .pool_idle_timeout(std::time::Duration::from_secs(90))
        .tcp_keepalive(std::time::Duration::from_secs(60))
        .redirect(reqwest::redirect::Policy::limited(5));

    let builder = match proxy.url() {
        Some(url) => builder.proxy(Proxy::all(url).map_err(|source| ScanError::InvalidProxy {
            proxy: url.to_string(),
            source,
        })?),
        None => builder.no_proxy(),
    };

    Ok(builder.build()?)
}
