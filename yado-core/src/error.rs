use thiserror::Error;
use yado_scanner::ScanError;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("checkpoint store: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("CSV output: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON output: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// True when the crawl never got past its seed fetches.
    pub fn is_seed_failure(&self) -> bool {
        matches!(self, CoreError::Scan(e) if e.is_fatal())
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
