// Gateway HTTP client
//
// Wraps `reqwest::Client` with backend-specific URL construction and
// envelope unwrapping. Every backend response is `{success: bool, ...}`:
// on success the payload fields sit next to the flag, on failure an
// `error` or `message` string does. Endpoint methods return unwrapped
// typed payloads -- the envelope is stripped before the caller sees it.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::ApiError;
use crate::models::{
    ActivateAiResponse, AnalyzeLockRequest, AnalyzeLockResponse, CheckUpdatesResponse,
    DetectAnyResponse, DetectPhoneResponse, FindFirmwareRequest, FindFirmwareResponse,
    FirmwareRequest, ForceDetectRequest, HealthReport, HisenseMethodsResponse, SelfHealOutcome,
    ToggleAgentResponse,
};
use crate::transport::TransportConfig;

/// Envelope probe: decoded first to decide between payload and error.
#[derive(serde::Deserialize)]
struct EnvelopeProbe {
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// HTTP client for the unlockly backend gateway.
///
/// Holds no mutable state -- calls are idempotent with respect to
/// everything local, so the detection retry loop can issue the same
/// request per strategy without coordination.
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: Url,
}

impl GatewayClient {
    /// Create a new gateway client from a `TransportConfig`.
    ///
    /// `base_url` should be the backend root (e.g. `http://localhost:5000`);
    /// the `/api/` prefix is appended per request.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, ApiError> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a gateway client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The underlying HTTP client (shared with the firmware transfer path).
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Run the primary phone detection pass.
    pub async fn detect_phone(&self) -> Result<DetectPhoneResponse, ApiError> {
        self.post("detect-phone", &serde_json::json!({})).await
    }

    /// Run universal detection (any connected device, any mode).
    pub async fn detect_any_phone(&self) -> Result<DetectAnyResponse, ApiError> {
        self.post("detect-any-phone", &serde_json::json!({})).await
    }

    /// Force detection of a specific USB device by vendor/product id.
    pub async fn force_detect_device(
        &self,
        req: &ForceDetectRequest,
    ) -> Result<DetectAnyResponse, ApiError> {
        self.post("force-detect-device", req).await
    }

    /// Analyze the lock situation for a phone model.
    pub async fn analyze_lock(
        &self,
        req: &AnalyzeLockRequest,
    ) -> Result<AnalyzeLockResponse, ApiError> {
        self.post("analyze-lock", req).await
    }

    /// Search the backend firmware index.
    pub async fn find_firmware(
        &self,
        req: &FindFirmwareRequest,
    ) -> Result<FindFirmwareResponse, ApiError> {
        self.post("find-firmware", req).await
    }

    /// Fetch Hisense-specific unlock method descriptors for a model.
    pub async fn hisense_methods(&self, model: &str) -> Result<HisenseMethodsResponse, ApiError> {
        self.get(&format!("hisense-methods/{model}")).await
    }

    /// Activate all backend AI agents.
    pub async fn activate_ai(&self) -> Result<ActivateAiResponse, ApiError> {
        self.post("activate-ai", &serde_json::json!({})).await
    }

    /// Trigger a backend self-heal pass.
    pub async fn self_heal(&self) -> Result<SelfHealOutcome, ApiError> {
        self.post("self-heal", &serde_json::json!({})).await
    }

    /// Fetch the backend health report.
    pub async fn health_status(&self) -> Result<HealthReport, ApiError> {
        self.get("health-status").await
    }

    /// Toggle a single named agent.
    pub async fn toggle_agent(&self, name: &str) -> Result<ToggleAgentResponse, ApiError> {
        self.post(&format!("toggle-agent/{name}"), &serde_json::json!({}))
            .await
    }

    /// Submit a firmware request for a model the index doesn't cover.
    pub async fn request_firmware(&self, req: &FirmwareRequest) -> Result<(), ApiError> {
        // Response carries no payload beyond the envelope.
        let _: serde_json::Value = self.post("request-firmware", req).await?;
        Ok(())
    }

    /// List available component updates.
    pub async fn check_updates(&self) -> Result<CheckUpdatesResponse, ApiError> {
        self.get("check-updates").await
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Build a full URL for an API path: `{base}/api/{path}`.
    fn api_url(&self, path: &str) -> Result<Url, ApiError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/api/{path}"))?)
    }

    /// Send a GET request and unwrap the envelope.
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.api_url(path)?;
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(ApiError::Transport)?;
        Self::parse_envelope(resp).await
    }

    /// Send a POST request with JSON body and unwrap the envelope.
    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<T, ApiError> {
        let url = self.api_url(path)?;
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(ApiError::Transport)?;
        Self::parse_envelope(resp).await
    }

    /// Decode the `{success, ...}` envelope, returning the payload fields
    /// on success or an `ApiError::Backend` when `success` is false.
    async fn parse_envelope<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Http {
                status: status.as_u16(),
                message: preview(&body).to_owned(),
            });
        }

        let body = resp.text().await.map_err(ApiError::Transport)?;

        let probe: EnvelopeProbe = serde_json::from_str(&body).map_err(|e| {
            let preview = preview(&body);
            ApiError::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })?;

        if !probe.success {
            return Err(ApiError::Backend {
                message: probe
                    .error
                    .or(probe.message)
                    .unwrap_or_else(|| "operation failed".to_owned()),
            });
        }

        // Payload fields are siblings of the flag: re-parse the same body.
        serde_json::from_str(&body).map_err(|e| {
            let preview = preview(&body);
            ApiError::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    }
}

/// Maximum length of the body excerpt carried in error messages.
const PREVIEW_LEN: usize = 200;

/// Leading slice of `body` for error messages, backed off to a char
/// boundary so multibyte content never splits mid-character.
fn preview(body: &str) -> &str {
    if body.len() <= PREVIEW_LEN {
        return body;
    }
    let mut end = PREVIEW_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
