// ── Session configuration ──

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use unlockly_api::TransportConfig;

/// Everything a [`crate::Session`] needs to come up.
///
/// The CLI layers file and environment sources into this; tests build it
/// directly with the defaults and override what they care about.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Base URL of the assistant backend.
    pub backend_url: Url,
    pub transport: TransportConfig,
    /// Cadence of the background health poll.
    pub health_poll_interval: Duration,
    /// How long notices stay visible.
    pub notice_ttl: Duration,
    /// Explicit recent-device file; `None` resolves the platform data
    /// directory (and falls back to in-memory when that fails too).
    pub recent_path: Option<PathBuf>,
    /// Drive downloads with the synthetic ticker instead of HTTP.
    /// Sandbox and demo use only.
    pub synthetic_transfers: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            // Matches the backend's default bind address.
            backend_url: Url::parse("http://127.0.0.1:5000")
                .unwrap_or_else(|_| unreachable!("static URL is valid")),
            transport: TransportConfig::default(),
            health_poll_interval: Duration::from_secs(30),
            notice_ttl: Duration::from_secs(5),
            recent_path: None,
            synthetic_transfers: false,
        }
    }
}

impl SessionConfig {
    pub fn with_backend_url(mut self, url: Url) -> Self {
        self.backend_url = url;
        self
    }

    pub fn with_recent_path(mut self, path: PathBuf) -> Self {
        self.recent_path = Some(path);
        self
    }

    pub fn with_synthetic_transfers(mut self, on: bool) -> Self {
        self.synthetic_transfers = on;
        self
    }
}
