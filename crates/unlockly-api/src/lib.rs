//! Async client for the unlockly backend gateway.
//!
//! The backend speaks a single JSON envelope: every response carries a
//! `success` boolean, with either the payload fields as siblings (on
//! success) or an `error`/`message` string (on failure). This crate owns
//! the transport mechanics and envelope decoding so callers only ever see
//! typed payloads or an [`ApiError`]:
//!
//! - **[`GatewayClient`]** — one method per backend endpoint (detection,
//!   lock analysis, firmware lookup, agent management, health).
//! - **[`TransportConfig`]** — shared TLS/timeout settings for building
//!   the underlying `reqwest::Client`.
//! - **[`ApiError`]** — the full failure taxonomy: transport, HTTP status,
//!   backend-reported (`success: false`), and deserialization errors.
//!
//! The client holds no mutable state: calls are idempotent with respect to
//! everything local, which lets `unlockly-core` retry detection strategies
//! without coordination.

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::GatewayClient;
pub use error::ApiError;
pub use models::{
    ActivateAiResponse, AnalysisReport, AnalyzeLockRequest, AnalyzeLockResponse,
    CheckUpdatesResponse, DetectAnyResponse, DetectPhoneResponse, FirmwareRecord,
    FirmwareRequest, FindFirmwareRequest, FindFirmwareResponse, ForceDetectRequest,
    HealthReport, HisenseMethodsResponse, PhoneInfo, SelfHealOutcome,
    ToggleAgentResponse, UsbProbe,
};
pub use transport::{TlsMode, TransportConfig};
