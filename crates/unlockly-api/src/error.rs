use thiserror::Error;

/// Top-level error type for the `unlockly-api` crate.
///
/// Covers every failure mode at the gateway boundary: transport,
/// non-success HTTP statuses, backend-reported failures (`success: false`
/// in the envelope), and decoding. `unlockly-core` normalizes transport
/// and backend failures into a single user-facing notice, so both must be
/// distinguishable here but never escape as panics.
#[derive(Debug, Error)]
pub enum ApiError {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Non-2xx HTTP status from the backend.
    #[error("Backend returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    // ── Application ─────────────────────────────────────────────────
    /// The backend answered with `success: false`.
    #[error("Backend error: {message}")]
    Backend { message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl ApiError {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Http { status, .. } => matches!(status, 502 | 503 | 504),
            _ => false,
        }
    }

    /// Returns `true` if the backend reported the failure itself
    /// (as opposed to the request never completing).
    pub fn is_backend(&self) -> bool {
        matches!(self, Self::Backend { .. })
    }
}
