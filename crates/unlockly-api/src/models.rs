// ── Wire types for the gateway API ──
//
// Request/response payloads for every backend endpoint. Responses are the
// sibling fields of the `success` flag in the envelope; the flag itself is
// stripped by `GatewayClient` before these are deserialized.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Identified phone as reported by the backend's detection pipeline.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PhoneInfo {
    pub brand: String,
    pub model: String,
    #[serde(default)]
    pub model_number: Option<String>,
    #[serde(default)]
    pub android_version: Option<String>,
    #[serde(default)]
    pub supported_locks: Vec<String>,
    #[serde(default)]
    pub detection_confidence: f64,
    #[serde(default)]
    pub detection_method: Option<String>,
}

/// Raw USB-level probe data accompanying a detection result.
///
/// The backend reports whatever the probe saw; most fields are absent for
/// devices in emergency modes.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UsbProbe {
    #[serde(default)]
    pub vendor_id: Option<String>,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
}

/// `POST /api/detect-phone` response.
#[derive(Debug, Clone, Deserialize)]
pub struct DetectPhoneResponse {
    pub phone: PhoneInfo,
    #[serde(default)]
    pub detection_method: Option<String>,
}

/// `POST /api/detect-any-phone` and `force-detect-device` response.
#[derive(Debug, Clone, Deserialize)]
pub struct DetectAnyResponse {
    #[serde(default)]
    pub detection: UsbProbe,
    pub identification: PhoneInfo,
    #[serde(default)]
    pub combined_confidence: Option<f64>,
}

/// `POST /api/force-detect-device` request body.
#[derive(Debug, Clone, Serialize)]
pub struct ForceDetectRequest {
    pub vendor_id: String,
    pub product_id: String,
}

/// `POST /api/analyze-lock` request body.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeLockRequest {
    pub phone_model: String,
    pub lock_type: String,
}

/// Lock analysis produced by the backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalysisReport {
    pub detected_lock_type: String,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub success_rate: Option<f64>,
    #[serde(default)]
    pub estimated_time: Option<String>,
    #[serde(default)]
    pub methods: Vec<String>,
    #[serde(default)]
    pub risks: Vec<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
}

/// `POST /api/analyze-lock` response.
///
/// `ai_recommendation` is an opaque pass-through string -- the reasoning
/// happens (or doesn't) on the backend side, never locally.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeLockResponse {
    pub analysis: AnalysisReport,
    #[serde(default)]
    pub ai_recommendation: Option<String>,
}

/// `POST /api/find-firmware` request body.
#[derive(Debug, Clone, Serialize)]
pub struct FindFirmwareRequest {
    pub phone_model: String,
    #[serde(default)]
    pub region: String,
}

/// Firmware build as listed by the backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FirmwareRecord {
    pub version: String,
    #[serde(default)]
    pub android_version: Option<String>,
    #[serde(default)]
    pub build_date: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    pub download_url: String,
    #[serde(default)]
    pub file_size: Option<String>,
    #[serde(default)]
    pub checksum: Option<String>,
}

/// `POST /api/find-firmware` response.
#[derive(Debug, Clone, Deserialize)]
pub struct FindFirmwareResponse {
    #[serde(default)]
    pub firmware_list: Vec<FirmwareRecord>,
    #[serde(default)]
    pub ai_recommendation: Option<String>,
}

/// `POST /api/request-firmware` request body.
#[derive(Debug, Clone, Serialize)]
pub struct FirmwareRequest {
    pub brand: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_number: Option<String>,
    pub region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// `POST /api/activate-ai` response: agent name -> reported status string.
#[derive(Debug, Clone, Deserialize)]
pub struct ActivateAiResponse {
    #[serde(default)]
    pub agents: HashMap<String, String>,
}

/// `POST /api/self-heal` response.
#[derive(Debug, Clone, Deserialize)]
pub struct SelfHealOutcome {
    pub health_status: String,
}

/// `GET /api/health-status` response.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthReport {
    pub overall_health: String,
    #[serde(default)]
    pub issues: Vec<String>,
}

/// `POST /api/toggle-agent/{name}` response.
#[derive(Debug, Clone, Deserialize)]
pub struct ToggleAgentResponse {
    pub status: String,
    #[serde(default)]
    pub all_agents: HashMap<String, String>,
}

/// `GET /api/hisense-methods/{model}` response.
///
/// The backend returns loosely-shaped method descriptors here; they are
/// displayed, not interpreted, so they stay as raw JSON values.
#[derive(Debug, Clone, Deserialize)]
pub struct HisenseMethodsResponse {
    #[serde(default)]
    pub data: Vec<serde_json::Value>,
}

/// `GET /api/check-updates` response.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckUpdatesResponse {
    #[serde(default)]
    pub updates: Vec<serde_json::Value>,
}
