// ── Detection orchestrator ──
//
// Drives one detection attempt at a time against the gateway and
// reconciles the result into the session store. All gateway failures
// are normalized into notices; nothing here is fatal.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use unlockly_api::{ApiError, ForceDetectRequest, GatewayClient, UsbProbe};

use crate::catalog::Catalog;
use crate::error::CoreError;
use crate::model::{ConfidenceBand, DetectionMethod, Device, LockKind};
use crate::notify::Notifier;
use crate::store::SessionStore;

/// Confidence assigned to manually selected devices.
const MANUAL_CONFIDENCE: f64 = 0.5;

/// Where the orchestrator currently is in its attempt lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionPhase {
    Idle,
    Detecting,
    Succeeded,
    /// Terminal for the attempt; surfaces show fallback help until the
    /// user starts a new one.
    Failed,
}

/// One named detection technique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum DetectionStrategy {
    Adb,
    Fastboot,
    UsbRaw,
    EmergencyModes,
}

impl DetectionStrategy {
    /// Retry order for the fix-recognition flow.
    pub const FIX_ORDER: [Self; 4] = [Self::Adb, Self::Fastboot, Self::UsbRaw, Self::EmergencyModes];
}

/// A successful detection, as handed back to the caller. The store is
/// already updated by the time this exists.
#[derive(Debug, Clone)]
pub struct DetectionOutcome {
    pub device: Arc<Device>,
    pub strategy: DetectionStrategy,
    /// Raw USB probe data, when the strategy produced any.
    pub probe: Option<UsbProbe>,
}

/// Runs detection strategies and reconciles results into the store.
///
/// At most one attempt is in flight: starting another while the phase
/// is Detecting is a no-op. Manual selection bypasses the attempt
/// lifecycle entirely.
pub struct DetectionOrchestrator {
    client: Arc<GatewayClient>,
    store: Arc<SessionStore>,
    catalog: Arc<Catalog>,
    notifier: Notifier,
    phase: watch::Sender<DetectionPhase>,
}

impl DetectionOrchestrator {
    pub fn new(
        client: Arc<GatewayClient>,
        store: Arc<SessionStore>,
        catalog: Arc<Catalog>,
        notifier: Notifier,
    ) -> Self {
        let (phase, _) = watch::channel(DetectionPhase::Idle);
        Self {
            client,
            store,
            catalog,
            notifier,
            phase,
        }
    }

    pub fn phase(&self) -> DetectionPhase {
        *self.phase.borrow()
    }

    pub fn subscribe_phase(&self) -> watch::Receiver<DetectionPhase> {
        self.phase.subscribe()
    }

    /// Standard detection over the backend's adb pipeline.
    pub async fn detect(&self) -> Option<DetectionOutcome> {
        self.attempt(&[DetectionStrategy::Adb]).await
    }

    /// Universal detection: raw USB probe plus identification.
    pub async fn detect_any(&self) -> Option<DetectionOutcome> {
        self.attempt(&[DetectionStrategy::UsbRaw]).await
    }

    /// The fix-recognition flow: every strategy in order, stopping at the
    /// first success. Exhausting the list leaves the attempt Failed.
    pub async fn fix_recognition(&self) -> Option<DetectionOutcome> {
        self.attempt(&DetectionStrategy::FIX_ORDER).await
    }

    /// Manual brand+model selection.
    ///
    /// Validated locally and never calls the gateway. The resulting
    /// device carries a fixed confidence of 0.5 and the manual method;
    /// catalog data fills in locks and versions when the model is known.
    pub fn manual_select(
        &self,
        brand: &str,
        model: &str,
        model_number: Option<&str>,
    ) -> Result<Arc<Device>, CoreError> {
        let brand = brand.trim();
        let model = model.trim();
        if brand.is_empty() {
            let err = CoreError::Validation {
                field: "brand".to_owned(),
                reason: "brand must not be empty".to_owned(),
            };
            self.notifier.error(err.user_message());
            return Err(err);
        }
        if model.is_empty() {
            let err = CoreError::Validation {
                field: "model".to_owned(),
                reason: "model must not be empty".to_owned(),
            };
            self.notifier.error(err.user_message());
            return Err(err);
        }

        let entry = self.catalog.lookup(brand, model);
        let supported_locks: Vec<LockKind> = entry
            .map(|e| {
                let mut kinds: Vec<LockKind> =
                    e.unlock_methods.iter().map(|m| m.lock_kind).collect();
                kinds.dedup();
                kinds
            })
            .unwrap_or_default();

        let device = Device {
            brand: brand.to_owned(),
            model: model.to_owned(),
            model_number: model_number
                .map(str::to_owned)
                .or_else(|| entry.and_then(|e| e.model_number.clone())),
            os_version: entry.and_then(|e| e.os_version.clone()),
            supported_locks,
            confidence: MANUAL_CONFIDENCE,
            method: DetectionMethod::Manual,
            detected_at: chrono::Utc::now(),
        };

        let device = self.store.set_current_device(device);
        self.notifier
            .success(format!("Selected {} {} manually", device.brand, device.model));
        Ok(device)
    }

    // ── Attempt lifecycle ────────────────────────────────────────────

    /// Run the given strategies in order until one succeeds.
    async fn attempt(&self, strategies: &[DetectionStrategy]) -> Option<DetectionOutcome> {
        if !self.try_begin() {
            debug!("detection already in progress, ignoring");
            return None;
        }

        let mut last_error: Option<CoreError> = None;
        for &strategy in strategies {
            debug!(strategy = %strategy, "trying detection strategy");
            match self.run_strategy(strategy).await {
                Ok((device, probe)) => {
                    let device = self.store.set_current_device(device);
                    self.phase.send_modify(|p| *p = DetectionPhase::Succeeded);
                    info!(
                        brand = %device.brand,
                        model = %device.model,
                        strategy = %strategy,
                        confidence = device.confidence,
                        "device detected"
                    );
                    self.notify_detected(&device);
                    return Some(DetectionOutcome {
                        device,
                        strategy,
                        probe,
                    });
                }
                Err(e) => {
                    warn!(strategy = %strategy, error = %e, "detection strategy failed");
                    last_error = Some(e);
                }
            }
        }

        self.phase.send_modify(|p| *p = DetectionPhase::Failed);
        let detail = last_error
            .map(|e| e.user_message())
            .unwrap_or_else(|| "no strategy produced a device".to_owned());
        self.notifier
            .error(format!("Device detection failed: {detail}"));
        None
    }

    /// Atomically move to Detecting unless an attempt is already active.
    fn try_begin(&self) -> bool {
        self.phase.send_if_modified(|phase| {
            if *phase == DetectionPhase::Detecting {
                false
            } else {
                *phase = DetectionPhase::Detecting;
                true
            }
        })
    }

    async fn run_strategy(
        &self,
        strategy: DetectionStrategy,
    ) -> Result<(Device, Option<UsbProbe>), CoreError> {
        match strategy {
            // detect-phone runs the backend's adb and fastboot probes;
            // the reported detection_method says which one hit.
            DetectionStrategy::Adb | DetectionStrategy::Fastboot => {
                let resp = self.client.detect_phone().await?;
                let mut info = resp.phone;
                if info.detection_method.is_none() {
                    info.detection_method = resp.detection_method;
                }
                let device = Device::from_identification(info, None, &strategy.to_string());
                Ok((device, None))
            }
            DetectionStrategy::UsbRaw => {
                let resp = self.client.detect_any_phone().await?;
                let device = Device::from_identification(
                    resp.identification,
                    resp.combined_confidence,
                    &strategy.to_string(),
                );
                Ok((device, Some(resp.detection)))
            }
            DetectionStrategy::EmergencyModes => self.probe_emergency_modes().await,
        }
    }

    /// Force-detect against each known emergency USB mode in turn.
    async fn probe_emergency_modes(&self) -> Result<(Device, Option<UsbProbe>), CoreError> {
        let mut last: Option<ApiError> = None;
        for mode in self.catalog.emergency_modes() {
            debug!(mode = %mode.name, "probing emergency mode");
            let req = ForceDetectRequest {
                vendor_id: mode.vendor_id.clone(),
                product_id: mode.product_id.clone(),
            };
            match self.client.force_detect_device(&req).await {
                Ok(resp) => {
                    let device = Device::from_identification(
                        resp.identification,
                        resp.combined_confidence,
                        &DetectionStrategy::EmergencyModes.to_string(),
                    );
                    return Ok((device, Some(resp.detection)));
                }
                Err(e) => last = Some(e),
            }
        }
        Err(last.map(CoreError::from).unwrap_or_else(|| CoreError::Transfer {
            message: "no emergency modes to probe".to_owned(),
        }))
    }

    fn notify_detected(&self, device: &Device) {
        let message = format!("Detected {} {}", device.brand, device.model);
        match device.confidence_band() {
            ConfidenceBand::High | ConfidenceBand::Medium => {
                self.notifier.success(message);
            }
            ConfidenceBand::Low => {
                self.notifier.warning(format!(
                    "{message} (low confidence, verify the model before unlocking)"
                ));
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::notify::NoticeKind;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn orchestrator(server: &MockServer) -> DetectionOrchestrator {
        let client = GatewayClient::with_client(
            reqwest::Client::new(),
            server.uri().parse().unwrap(),
        );
        DetectionOrchestrator::new(
            Arc::new(client),
            Arc::new(SessionStore::new()),
            Arc::new(Catalog::new()),
            Notifier::new(),
        )
    }

    fn phone_body(brand: &str, model: &str, confidence: f64) -> serde_json::Value {
        json!({
            "success": true,
            "phone": {
                "brand": brand,
                "model": model,
                "detection_confidence": confidence,
                "supported_locks": ["frp", "screen_lock"],
            },
            "detection_method": "adb",
        })
    }

    #[tokio::test]
    async fn successful_detect_updates_store_and_phase() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/detect-phone"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(phone_body("Samsung", "Galaxy S21", 0.92)),
            )
            .mount(&server)
            .await;

        let orch = orchestrator(&server).await;
        let outcome = orch.detect().await.unwrap();

        assert_eq!(outcome.device.brand, "Samsung");
        assert_eq!(outcome.strategy, DetectionStrategy::Adb);
        assert_eq!(outcome.device.confidence_band(), ConfidenceBand::High);
        assert_eq!(orch.phase(), DetectionPhase::Succeeded);

        let current = orch.store.current_device().unwrap();
        assert_eq!(current.model, "Galaxy S21");
        assert_eq!(orch.store.recent_devices().len(), 1);
    }

    #[tokio::test]
    async fn detect_while_detecting_is_a_no_op() {
        let server = MockServer::start().await;
        // No mocks mounted: a second attempt issuing a request would 404
        // into a Failed phase, which the assertions below would catch.
        let orch = orchestrator(&server).await;

        assert!(orch.try_begin());
        assert_eq!(orch.phase(), DetectionPhase::Detecting);

        assert!(orch.detect().await.is_none());
        assert_eq!(orch.phase(), DetectionPhase::Detecting);
        assert!(orch.store.current_device().is_none());
    }

    #[tokio::test]
    async fn fix_recognition_stops_at_first_working_strategy() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/detect-phone"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "error": "no adb device",
            })))
            .expect(2) // adb, then fastboot
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/detect-any-phone"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "detection": {"vendor_id": "05c6", "product_id": "9008", "mode": "edl"},
                "identification": {
                    "brand": "Xiaomi",
                    "model": "Redmi Note 10",
                    "detection_confidence": 0.7,
                },
                "combined_confidence": 0.65,
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/force-detect-device"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(0) // never reached
            .mount(&server)
            .await;

        let orch = orchestrator(&server).await;
        let outcome = orch.fix_recognition().await.unwrap();

        assert_eq!(outcome.strategy, DetectionStrategy::UsbRaw);
        assert_eq!(outcome.device.confidence, 0.65);
        assert_eq!(outcome.probe.unwrap().vendor_id.as_deref(), Some("05c6"));
        assert_eq!(orch.phase(), DetectionPhase::Succeeded);
    }

    #[tokio::test]
    async fn fix_recognition_exhaustion_leaves_failed() {
        let server = MockServer::start().await;
        let failure = ResponseTemplate::new(200)
            .set_body_json(json!({"success": false, "error": "nothing on the bus"}));
        Mock::given(method("POST"))
            .and(path("/api/detect-phone"))
            .respond_with(failure.clone())
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/detect-any-phone"))
            .respond_with(failure.clone())
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/force-detect-device"))
            .respond_with(failure)
            .expect(5) // one probe per known emergency mode
            .mount(&server)
            .await;

        let notifier = Notifier::new();
        let client = GatewayClient::with_client(
            reqwest::Client::new(),
            server.uri().parse().unwrap(),
        );
        let orch = DetectionOrchestrator::new(
            Arc::new(client),
            Arc::new(SessionStore::new()),
            Arc::new(Catalog::new()),
            notifier.clone(),
        );

        assert!(orch.fix_recognition().await.is_none());
        assert_eq!(orch.phase(), DetectionPhase::Failed);
        assert!(orch.store.current_device().is_none());
        assert!(
            notifier
                .snapshot()
                .iter()
                .any(|n| n.kind == NoticeKind::Error && n.message.contains("detection failed"))
        );
    }

    #[tokio::test]
    async fn new_attempt_allowed_after_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/detect-phone"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "error": "no device",
            })))
            .expect(2)
            .mount(&server)
            .await;

        let orch = orchestrator(&server).await;
        assert!(orch.detect().await.is_none());
        assert_eq!(orch.phase(), DetectionPhase::Failed);

        // Failed is terminal for the attempt, not for the orchestrator.
        assert!(orch.detect().await.is_none());
    }

    #[tokio::test]
    async fn manual_select_builds_half_confidence_device() {
        let server = MockServer::start().await;
        let orch = orchestrator(&server).await;

        let device = orch
            .manual_select("hisense", "Infinity H30", None)
            .unwrap();

        assert_eq!(device.confidence, 0.5);
        assert_eq!(device.method, DetectionMethod::Manual);
        assert_eq!(device.confidence_band(), ConfidenceBand::Low);
        // Catalog fills in what the user didn't type.
        assert_eq!(device.model_number.as_deref(), Some("HLTE202E"));
        assert!(!device.supported_locks.is_empty());
        assert_eq!(orch.store.current_device().unwrap().brand, "hisense");
    }

    #[tokio::test]
    async fn manual_select_rejects_blank_fields() {
        let server = MockServer::start().await;
        let orch = orchestrator(&server).await;

        let err = orch.manual_select("  ", "Infinity H30", None).unwrap_err();
        assert!(matches!(err, CoreError::Validation { ref field, .. } if field == "brand"));

        let err = orch.manual_select("Hisense", "", None).unwrap_err();
        assert!(matches!(err, CoreError::Validation { ref field, .. } if field == "model"));
        assert!(orch.store.current_device().is_none());
    }

    #[tokio::test]
    async fn manual_select_bypasses_the_attempt_guard() {
        let server = MockServer::start().await;
        let orch = orchestrator(&server).await;

        assert!(orch.try_begin());
        let device = orch.manual_select("Samsung", "Galaxy A12", None).unwrap();
        assert_eq!(device.method, DetectionMethod::Manual);
        // Manual selection does not touch the attempt phase.
        assert_eq!(orch.phase(), DetectionPhase::Detecting);
    }
}
