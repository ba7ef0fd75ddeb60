// ── Download queue manager ──
//
// Tracks concurrent firmware transfers. Each enqueued item gets its own
// tokio task -- items progress independently, with no global lock and no
// ordering guarantee between them. List mutations go through `DashMap`
// plus a rebuilt watch snapshot, so every tick leaves the queue
// consistent for subscribers.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dashmap::DashMap;
use futures_util::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::DownloadItem;
use crate::notify::Notifier;

/// Progress callback handed to a transfer backend.
///
/// Reports are clamped and made monotone by the item itself; backends
/// may report whatever the wire tells them.
pub struct ProgressSink {
    report: Box<dyn Fn(u8) + Send + Sync>,
}

impl ProgressSink {
    pub fn report(&self, pct: u8) {
        (self.report)(pct);
    }
}

pub type TransferFuture = Pin<Box<dyn Future<Output = Result<(), CoreError>> + Send>>;

/// The actual byte-moving side of a download.
///
/// Real transfers stream over HTTP and report byte-count progress; the
/// synthetic backend stands in where no real backend exists (sandbox,
/// tests). The queue manager neither knows nor cares which it drives.
pub trait TransferBackend: Send + Sync + 'static {
    fn transfer(&self, url: String, progress: ProgressSink) -> TransferFuture;
}

// ── HTTP backend ────────────────────────────────────────────────────

/// Streams the firmware over HTTP, reporting progress from received
/// byte counts against `Content-Length` (no reports when the server
/// doesn't send one; the final 100 always lands).
pub struct HttpTransfer {
    http: reqwest::Client,
}

impl HttpTransfer {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl TransferBackend for HttpTransfer {
    fn transfer(&self, url: String, progress: ProgressSink) -> TransferFuture {
        let http = self.http.clone();
        Box::pin(async move {
            let resp = http
                .get(&url)
                .send()
                .await
                .and_then(reqwest::Response::error_for_status)
                .map_err(|e| CoreError::Transfer {
                    message: e.to_string(),
                })?;

            let total = resp.content_length().filter(|t| *t > 0);
            let mut stream = resp.bytes_stream();
            let mut received: u64 = 0;

            while let Some(chunk) = stream.next().await {
                let chunk = chunk.map_err(|e| CoreError::Transfer {
                    message: e.to_string(),
                })?;
                received += chunk.len() as u64;
                if let Some(total) = total {
                    let pct = (received.saturating_mul(100) / total).min(100);
                    progress.report(u8::try_from(pct).unwrap_or(100));
                }
            }

            progress.report(100);
            Ok(())
        })
    }
}

// ── Synthetic backend ───────────────────────────────────────────────

/// Advances progress by a bounded random increment per tick until 100.
///
/// Used only when explicitly configured (sandbox mode, tests) -- never
/// the default for real transfers.
pub struct SyntheticTransfer {
    tick: Duration,
}

impl SyntheticTransfer {
    pub fn new(tick: Duration) -> Self {
        Self { tick }
    }
}

impl Default for SyntheticTransfer {
    fn default() -> Self {
        Self::new(Duration::from_millis(400))
    }
}

impl TransferBackend for SyntheticTransfer {
    fn transfer(&self, _url: String, progress: ProgressSink) -> TransferFuture {
        let tick = self.tick;
        Box::pin(async move {
            let mut pct: u8 = 0;
            while pct < 100 {
                tokio::time::sleep(tick).await;
                let step: u8 = rand::Rng::gen_range(&mut rand::thread_rng(), 5..=20);
                pct = pct.saturating_add(step).min(100);
                progress.report(pct);
            }
            Ok(())
        })
    }
}

// ── Manager ─────────────────────────────────────────────────────────

/// Tracks every transfer of the session. Items are keyed by firmware
/// version and retained until the session ends -- no pruning.
#[derive(Clone)]
pub struct DownloadManager {
    inner: Arc<ManagerInner>,
}

struct ManagerInner {
    items: DashMap<String, DownloadItem>,
    snapshot: watch::Sender<Arc<Vec<DownloadItem>>>,
    backend: Arc<dyn TransferBackend>,
    notifier: Notifier,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl DownloadManager {
    pub fn new(backend: Arc<dyn TransferBackend>, notifier: Notifier) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            inner: Arc::new(ManagerInner {
                items: DashMap::new(),
                snapshot,
                backend,
                notifier,
                tasks: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Enqueue a firmware transfer.
    ///
    /// The item starts Queued, moves to Downloading immediately, and a
    /// dedicated task drives it to a terminal state. Returns `false`
    /// (with a warning notice) when the version already has a live item.
    pub fn enqueue(&self, url: impl Into<String>, version: impl Into<String>) -> bool {
        let url = url.into();
        let version = version.into();

        if let Some(existing) = self.inner.items.get(&version) {
            if !existing.status.is_terminal() {
                drop(existing);
                self.inner
                    .notifier
                    .warning(format!("{version} is already downloading"));
                return false;
            }
        }

        self.inner
            .items
            .insert(version.clone(), DownloadItem::queued(version.clone(), url.clone()));
        if let Some(mut item) = self.inner.items.get_mut(&version) {
            item.begin();
        }
        self.inner.rebuild_snapshot();
        debug!(version = %version, "download started");

        let inner = Arc::clone(&self.inner);
        let task_version = version.clone();
        let handle = tokio::spawn(async move {
            let sink_inner = Arc::clone(&inner);
            let sink_version = task_version.clone();
            let sink = ProgressSink {
                report: Box::new(move |pct| sink_inner.set_progress(&sink_version, pct)),
            };

            match inner.backend.transfer(url, sink).await {
                Ok(()) => {
                    inner.finish(&task_version, None);
                    inner
                        .notifier
                        .success(format!("Firmware {task_version} downloaded"));
                }
                Err(e) => {
                    let message = e.user_message();
                    warn!(version = %task_version, error = %message, "download failed");
                    inner.finish(&task_version, Some(message.clone()));
                    inner
                        .notifier
                        .error(format!("Download of {task_version} failed: {message}"));
                }
            }
        });
        if let Ok(mut tasks) = self.inner.tasks.lock() {
            tasks.push(handle);
        }

        true
    }

    /// Snapshot of one item by version.
    pub fn lookup(&self, version: &str) -> Option<DownloadItem> {
        self.inner.items.get(version).map(|r| r.value().clone())
    }

    /// Snapshot of the whole queue, ordered by start time.
    pub fn snapshot(&self) -> Arc<Vec<DownloadItem>> {
        self.inner.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<DownloadItem>>> {
        self.inner.snapshot.subscribe()
    }

    /// Await every transfer task spawned so far. Used on shutdown and by
    /// tests that need the queue drained.
    pub async fn join_all(&self) {
        let handles: Vec<JoinHandle<()>> = match self.inner.tasks.lock() {
            Ok(mut tasks) => tasks.drain(..).collect(),
            Err(_) => Vec::new(),
        };
        for handle in handles {
            let _ = handle.await;
        }
    }
}

impl ManagerInner {
    fn set_progress(&self, version: &str, pct: u8) {
        if let Some(mut item) = self.items.get_mut(version) {
            item.advance_to(pct);
        }
        self.rebuild_snapshot();
    }

    fn finish(&self, version: &str, error: Option<String>) {
        if let Some(mut item) = self.items.get_mut(version) {
            match error {
                None => item.complete(),
                Some(message) => item.fail(message),
            }
        }
        self.rebuild_snapshot();
    }

    fn rebuild_snapshot(&self) {
        let mut items: Vec<DownloadItem> = self.items.iter().map(|r| r.value().clone()).collect();
        items.sort_by(|a, b| {
            a.started_at
                .cmp(&b.started_at)
                .then_with(|| a.version.cmp(&b.version))
        });
        self.snapshot.send_modify(|snap| *snap = Arc::new(items));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::DownloadStatus;

    /// Backend that fails after one progress report.
    struct FailingTransfer;

    impl TransferBackend for FailingTransfer {
        fn transfer(&self, _url: String, progress: ProgressSink) -> TransferFuture {
            Box::pin(async move {
                progress.report(30);
                Err(CoreError::Transfer {
                    message: "connection reset".into(),
                })
            })
        }
    }

    /// Backend that reports out-of-order progress values.
    struct JitteryTransfer;

    impl TransferBackend for JitteryTransfer {
        fn transfer(&self, _url: String, progress: ProgressSink) -> TransferFuture {
            Box::pin(async move {
                progress.report(40);
                progress.report(20); // must not regress
                progress.report(90);
                Ok(())
            })
        }
    }

    fn manager(backend: impl TransferBackend) -> DownloadManager {
        DownloadManager::new(Arc::new(backend), Notifier::new())
    }

    #[tokio::test(start_paused = true)]
    async fn two_items_download_independently() {
        let mgr = manager(SyntheticTransfer::new(Duration::from_millis(100)));

        assert!(mgr.enqueue("https://fw/1.zip", "v1.0"));
        assert!(mgr.enqueue("https://fw/2.zip", "v2.0"));

        // Both items are live immediately, neither blocked by the other.
        assert_eq!(mgr.lookup("v1.0").unwrap().status, DownloadStatus::Downloading);
        assert_eq!(mgr.lookup("v2.0").unwrap().status, DownloadStatus::Downloading);

        mgr.join_all().await;

        let v1 = mgr.lookup("v1.0").unwrap();
        let v2 = mgr.lookup("v2.0").unwrap();
        assert_eq!(v1.status, DownloadStatus::Completed);
        assert_eq!(v2.status, DownloadStatus::Completed);
        assert_eq!(v1.progress, 100);
        assert_eq!(v2.progress, 100);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_transfer_attaches_error_and_notice() {
        let notifier = Notifier::new();
        let mgr = DownloadManager::new(Arc::new(FailingTransfer), notifier.clone());

        mgr.enqueue("https://fw/1.zip", "v1.0");
        mgr.join_all().await;

        let item = mgr.lookup("v1.0").unwrap();
        assert_eq!(item.status, DownloadStatus::Failed);
        assert!(item.error.as_deref().unwrap().contains("connection reset"));

        let notices = notifier.snapshot();
        assert!(
            notices
                .iter()
                .any(|n| n.kind == crate::notify::NoticeKind::Error
                    && n.message.contains("connection reset"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn progress_never_regresses() {
        let mgr = manager(JitteryTransfer);
        mgr.enqueue("https://fw/1.zip", "v1.0");
        mgr.join_all().await;

        let item = mgr.lookup("v1.0").unwrap();
        // Completion forces 100 regardless of the last report.
        assert_eq!(item.progress, 100);
        assert_eq!(item.status, DownloadStatus::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_live_version_is_rejected() {
        let mgr = manager(SyntheticTransfer::new(Duration::from_millis(100)));

        assert!(mgr.enqueue("https://fw/1.zip", "v1.0"));
        assert!(!mgr.enqueue("https://fw/1.zip", "v1.0"));

        mgr.join_all().await;

        // After the first finishes, re-enqueueing is allowed again.
        assert!(mgr.enqueue("https://fw/1.zip", "v1.0"));
        mgr.join_all().await;
    }

    #[tokio::test(start_paused = true)]
    async fn snapshot_orders_by_start_time() {
        let mgr = manager(SyntheticTransfer::new(Duration::from_millis(100)));
        mgr.enqueue("https://fw/1.zip", "v1.0");
        tokio::time::sleep(Duration::from_millis(10)).await;
        mgr.enqueue("https://fw/2.zip", "v2.0");

        let snap = mgr.snapshot();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap[0].version, "v1.0");
        assert_eq!(snap[1].version, "v2.0");

        mgr.join_all().await;
    }
}
