//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use unlockly_api::ApiError;
use unlockly_core::CoreError;

/// Exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the backend at {url}")]
    #[diagnostic(
        code(unlockly::connection_failed),
        help(
            "Check that the assistant backend is running and accessible.\n\
             URL: {url}\n\
             Try: unlockly health --backend {url}"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("TLS setup failed: {reason}")]
    #[diagnostic(
        code(unlockly::tls_error),
        help(
            "The backend may be using a self-signed certificate.\n\
             Use --insecure (-k) to accept it."
        )
    )]
    TlsError { reason: String },

    // ── Backend ──────────────────────────────────────────────────────

    #[error("The backend reported a failure: {message}")]
    #[diagnostic(code(unlockly::backend_error))]
    Backend { message: String },

    #[error("The backend answered HTTP {status}: {message}")]
    #[diagnostic(code(unlockly::http_error))]
    Http { status: u16, message: String },

    #[error("Could not decode the backend's response: {message}")]
    #[diagnostic(
        code(unlockly::protocol_error),
        help("The backend may be a different version than this CLI expects.")
    )]
    Protocol { message: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(unlockly::not_found),
        help("Run: unlockly {list_command} to see what's available")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(unlockly::validation))]
    Validation { field: String, reason: String },

    // ── Downloads ────────────────────────────────────────────────────

    #[error("Firmware transfer failed: {message}")]
    #[diagnostic(
        code(unlockly::transfer),
        help("Re-run the download; partial progress is not resumed.")
    )]
    Transfer { message: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Configuration file already exists")]
    #[diagnostic(
        code(unlockly::config_exists),
        help("Use --force to overwrite it.\nPath: {path}")
    )]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(unlockly::config))]
    Config(Box<figment::Error>),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Prompt failed: {0}")]
    #[diagnostic(
        code(unlockly::prompt),
        help("Pass the value as an argument when running non-interactively.")
    )]
    Prompt(#[from] dialoguer::Error),

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(unlockly::json))]
    Json(#[from] serde_json::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::TlsError { .. } => exit_code::CONNECTION,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Gateway(api) => api.into(),

            CoreError::Validation { field, reason } => CliError::Validation { field, reason },

            CoreError::Persistence(e) => CliError::Io(e),

            CoreError::Serialization(e) => CliError::Json(e),

            CoreError::Transfer { message } => CliError::Transfer { message },
        }
    }
}

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Transport(e) => {
                let url = e
                    .url()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "(unknown)".into());
                CliError::ConnectionFailed {
                    url,
                    source: e.into(),
                }
            }

            ApiError::InvalidUrl(e) => CliError::Validation {
                field: "backend".into(),
                reason: e.to_string(),
            },

            ApiError::Tls(reason) => CliError::TlsError { reason },

            ApiError::Http { status, message } => CliError::Http { status, message },

            ApiError::Backend { message } => CliError::Backend { message },

            ApiError::Deserialization { message, .. } => CliError::Protocol { message },
        }
    }
}
