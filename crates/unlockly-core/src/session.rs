// ── Session facade ──
//
// The composition root's single handle on the whole client session.
// Owns the gateway client, the store, the orchestrator, the download
// queue, and the background health poll. Never a global; tests build
// isolated sessions against mock backends.

use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use unlockly_api::{
    AnalyzeLockRequest, AnalyzeLockResponse, ApiError, CheckUpdatesResponse, FindFirmwareRequest,
    FindFirmwareResponse, FirmwareRecord, FirmwareRequest, GatewayClient, HisenseMethodsResponse,
};

use crate::catalog::Catalog;
use crate::config::SessionConfig;
use crate::detection::DetectionOrchestrator;
use crate::downloads::{DownloadManager, HttpTransfer, SyntheticTransfer, TransferBackend};
use crate::error::CoreError;
use crate::model::{Device, HealthSnapshot, HealthState, LockKind};
use crate::notify::Notifier;
use crate::recent::RecentStore;
use crate::store::SessionStore;

/// Live client session against one backend.
///
/// Cheaply cloneable; every clone shares the same state. Dropping the
/// last clone does not stop background tasks -- call [`Session::shutdown`]
/// for an orderly stop.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    client: Arc<GatewayClient>,
    store: Arc<SessionStore>,
    catalog: Arc<Catalog>,
    notifier: Notifier,
    detection: DetectionOrchestrator,
    downloads: DownloadManager,
    shutdown: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Session {
    /// Build a session and start its background health poll.
    ///
    /// Must run inside a tokio runtime.
    pub fn new(config: SessionConfig) -> Result<Self, CoreError> {
        let client = Arc::new(GatewayClient::new(
            config.backend_url.clone(),
            &config.transport,
        )?);

        let recent_store = config
            .recent_path
            .clone()
            .map(RecentStore::at)
            .or_else(RecentStore::open_default);
        let store = Arc::new(match recent_store {
            Some(recent) => SessionStore::with_recent_store(recent),
            None => SessionStore::new(),
        });

        let catalog = Arc::new(Catalog::new());
        let notifier = Notifier::with_ttl(config.notice_ttl);

        let backend: Arc<dyn TransferBackend> = if config.synthetic_transfers {
            Arc::new(SyntheticTransfer::default())
        } else {
            Arc::new(HttpTransfer::new(client.http().clone()))
        };
        let downloads = DownloadManager::new(backend, notifier.clone());

        let detection = DetectionOrchestrator::new(
            Arc::clone(&client),
            Arc::clone(&store),
            Arc::clone(&catalog),
            notifier.clone(),
        );

        let session = Self {
            inner: Arc::new(SessionInner {
                client,
                store,
                catalog,
                notifier,
                detection,
                downloads,
                shutdown: CancellationToken::new(),
                tasks: Mutex::new(Vec::new()),
            }),
        };

        session.spawn_health_poll(config.health_poll_interval);
        Ok(session)
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn store(&self) -> &SessionStore {
        &self.inner.store
    }

    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    pub fn notifier(&self) -> &Notifier {
        &self.inner.notifier
    }

    pub fn detection(&self) -> &DetectionOrchestrator {
        &self.inner.detection
    }

    pub fn downloads(&self) -> &DownloadManager {
        &self.inner.downloads
    }

    pub fn client(&self) -> &GatewayClient {
        &self.inner.client
    }

    // ── Lock analysis ────────────────────────────────────────────────

    /// Analyze a lock for the given model, defaulting to the current
    /// device's model.
    pub async fn analyze_lock(
        &self,
        model: Option<&str>,
        lock: LockKind,
    ) -> Result<AnalyzeLockResponse, CoreError> {
        let phone_model = match model {
            Some(m) => m.to_owned(),
            None => self.require_device()?.model.clone(),
        };
        let req = AnalyzeLockRequest {
            phone_model,
            lock_type: lock.to_string(),
        };
        self.report(self.inner.client.analyze_lock(&req).await)
    }

    // ── Firmware ─────────────────────────────────────────────────────

    /// Search the backend firmware index, defaulting to the current
    /// device's model.
    pub async fn find_firmware(
        &self,
        model: Option<&str>,
        region: &str,
    ) -> Result<FindFirmwareResponse, CoreError> {
        let phone_model = match model {
            Some(m) => m.to_owned(),
            None => self.require_device()?.model.clone(),
        };
        let req = FindFirmwareRequest {
            phone_model,
            region: region.to_owned(),
        };
        self.report(self.inner.client.find_firmware(&req).await)
    }

    /// Queue a firmware download. Returns `false` when the version is
    /// already downloading.
    pub fn download_firmware(&self, record: &FirmwareRecord) -> bool {
        self.inner
            .downloads
            .enqueue(record.download_url.clone(), record.version.clone())
    }

    /// Submit a firmware request for a model the index doesn't cover.
    pub async fn request_firmware(&self, req: &FirmwareRequest) -> Result<(), CoreError> {
        let outcome = self.report(self.inner.client.request_firmware(req).await);
        if outcome.is_ok() {
            self.inner.notifier.success(format!(
                "Firmware request for {} {} submitted",
                req.brand, req.model
            ));
        }
        outcome
    }

    /// Hisense-specific unlock descriptors for a model.
    pub async fn hisense_methods(
        &self,
        model: &str,
    ) -> Result<HisenseMethodsResponse, CoreError> {
        self.report(self.inner.client.hisense_methods(model).await)
    }

    // ── Agents & health ──────────────────────────────────────────────

    /// Activate all backend agents and reconcile the reported grid.
    pub async fn activate_agents(&self) -> Result<(), CoreError> {
        let resp = self.report(self.inner.client.activate_ai().await)?;
        self.inner.store.apply_agent_statuses(&resp.agents);
        self.inner
            .notifier
            .success(format!("{} agents activated", resp.agents.len()));
        Ok(())
    }

    /// Toggle one agent by name and reconcile the reported grid.
    pub async fn toggle_agent(&self, name: &str) -> Result<(), CoreError> {
        let resp = self.report(self.inner.client.toggle_agent(name).await)?;
        self.inner.store.apply_agent_statuses(&resp.all_agents);
        self.inner
            .notifier
            .info(format!("Agent {name} is now {}", resp.status));
        Ok(())
    }

    /// Trigger a backend self-heal pass and record the resulting health.
    pub async fn self_heal(&self) -> Result<HealthSnapshot, CoreError> {
        let outcome = self.report(self.inner.client.self_heal().await)?;
        let snapshot = HealthSnapshot::new(
            HealthState::parse_lenient(&outcome.health_status),
            Vec::new(),
        );
        self.inner.store.set_health(snapshot.clone());
        self.inner
            .notifier
            .success(format!("Self-heal finished: {}", outcome.health_status));
        Ok(snapshot)
    }

    /// Fetch the backend health report immediately (the poll does the
    /// same thing on its own schedule).
    pub async fn refresh_health(&self) -> Result<HealthSnapshot, CoreError> {
        let snapshot = self.inner.fetch_health().await?;
        Ok(snapshot)
    }

    /// List available component updates.
    pub async fn check_updates(&self) -> Result<CheckUpdatesResponse, CoreError> {
        self.report(self.inner.client.check_updates().await)
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Stop background tasks and wait for in-flight downloads.
    pub async fn shutdown(&self) {
        self.inner.shutdown.cancel();
        let handles: Vec<JoinHandle<()>> = match self.inner.tasks.lock() {
            Ok(mut tasks) => tasks.drain(..).collect(),
            Err(_) => Vec::new(),
        };
        for handle in handles {
            let _ = handle.await;
        }
        self.inner.downloads.join_all().await;
        debug!("session shut down");
    }

    // ── Internals ────────────────────────────────────────────────────

    fn require_device(&self) -> Result<Arc<Device>, CoreError> {
        self.inner.store.current_device().ok_or_else(|| {
            let err = CoreError::Validation {
                field: "device".to_owned(),
                reason: "no device detected or selected".to_owned(),
            };
            self.inner.notifier.error(err.user_message());
            err
        })
    }

    /// Normalize a gateway result: failures become an error notice, the
    /// value passes through untouched.
    fn report<T>(&self, result: Result<T, ApiError>) -> Result<T, CoreError> {
        result.map_err(|e| {
            let err = CoreError::from(e);
            self.inner.notifier.error(err.user_message());
            err
        })
    }

    fn spawn_health_poll(&self, interval: std::time::Duration) {
        let inner = Arc::clone(&self.inner);
        let token = self.inner.shutdown.child_token();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    () = token.cancelled() => break,
                    _ = ticker.tick() => {
                        match inner.fetch_health().await {
                            // An unhealthy report triggers one self-heal
                            // attempt per poll; failures wait for the next.
                            Ok(snapshot) if snapshot.state == HealthState::Unhealthy => {
                                inner.try_self_heal().await;
                            }
                            Ok(_) => {}
                            Err(e) => warn!(error = %e, "health poll failed"),
                        }
                    }
                }
            }
        });
        if let Ok(mut tasks) = self.inner.tasks.lock() {
            tasks.push(handle);
        }
    }
}

impl SessionInner {
    /// One self-heal attempt, driven by the poll after an unhealthy
    /// report. A failed attempt only logs; the next poll retries.
    async fn try_self_heal(&self) {
        debug!("backend unhealthy, attempting self-heal");
        match self.client.self_heal().await {
            Ok(outcome) => {
                let state = HealthState::parse_lenient(&outcome.health_status);
                self.store
                    .set_health(HealthSnapshot::new(state, Vec::new()));
                self.notifier.warning(format!(
                    "Backend was unhealthy; self-heal finished: {}",
                    outcome.health_status
                ));
            }
            Err(e) => warn!(error = %e, "self-heal attempt failed"),
        }
    }

    /// Pull the backend health report into the store. An unreachable
    /// backend is itself a health fact, not an error notice.
    async fn fetch_health(&self) -> Result<HealthSnapshot, CoreError> {
        match self.client.health_status().await {
            Ok(report) => {
                let snapshot = HealthSnapshot::new(
                    HealthState::parse_lenient(&report.overall_health),
                    report.issues,
                );
                self.store.set_health(snapshot.clone());
                Ok(snapshot)
            }
            Err(e) => {
                let snapshot = HealthSnapshot::new(
                    HealthState::Unhealthy,
                    vec![format!("backend unreachable: {e}")],
                );
                self.store.set_health(snapshot);
                Err(CoreError::from(e))
            }
        }
    }
}
