use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("all {attempts} proxies failed for {url}")]
    Network { url: String, attempts: usize },

    #[error("missing {field} in {url}")]
    Extraction { url: String, field: &'static str },

    #[error("could not parse result count {value:?} from {url}")]
    Parse { url: String, value: String },

    #[error("seed fetch failed: {0}")]
    Seed(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("invalid proxy {proxy}: {source}")]
    InvalidProxy {
        proxy: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl ScanError {
    /// Seed failures abort the whole crawl; everything else is local to one unit.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ScanError::Seed(_))
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
