use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// One egress route. An empty URL means a direct connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProxyConfig {
    url: String,
}

impl ProxyConfig {
    pub fn direct() -> Self {
        Self::default()
    }

    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn is_direct(&self) -> bool {
        self.url.trim().is_empty()
    }

    pub fn url(&self) -> Option<&str> {
        if self.is_direct() {
            None
        } else {
            Some(self.url.trim())
        }
    }
}

impl fmt::Display for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.url() {
            Some(url) => write!(f, "{}", url),
            None => write!(f, "direct"),
        }
    }
}

/// Claims the next cursor position and returns its pool slot.
///
/// Implementations are shared by every concurrent fetch of one
/// [`Fetcher`](crate::fetch::Fetcher), so "next" has to stay well-defined
/// under contention.
pub trait ProxyRotation: Send + Sync {
    fn next_proxy(&self, pool_len: usize) -> usize;
}

/// Monotonic round-robin cursor. Never reset between fetches.
#[derive(Debug, Default)]
pub struct RoundRobin {
    cursor: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of proxies handed out so far.
    pub fn issued(&self) -> usize {
        self.cursor.load(Ordering::Relaxed)
    }
}

impl ProxyRotation for RoundRobin {
    fn next_proxy(&self, pool_len: usize) -> usize {
        if pool_len == 0 {
            return 0;
        }
        self.cursor.fetch_add(1, Ordering::Relaxed) % pool_len
    }
}
