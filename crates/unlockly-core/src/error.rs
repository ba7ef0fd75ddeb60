use thiserror::Error;

/// Top-level error type for the `unlockly-core` crate.
///
/// Gateway failures and backend-reported failures both arrive as
/// [`Gateway`](CoreError::Gateway) -- callers that surface them to the
/// user are expected to treat the two identically (one notice, not
/// fatal). Validation errors are raised before any gateway call is made.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Any failure at the gateway boundary (transport or backend-reported).
    #[error(transparent)]
    Gateway(#[from] unlockly_api::ApiError),

    /// Input rejected before any remote call was made.
    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Local persistence failed (recent-device store).
    #[error("Persistence error: {0}")]
    Persistence(#[from] std::io::Error),

    /// Persisted state could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Firmware transfer failed mid-stream.
    #[error("Transfer failed: {message}")]
    Transfer { message: String },
}

impl CoreError {
    /// The single user-facing message this error normalizes to.
    ///
    /// Transport and backend failures intentionally read the same way --
    /// the distinction matters for logs, not for the notice shown to the
    /// user.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}
