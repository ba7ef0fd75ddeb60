// ── Notification service ──
//
// Transient, typed user-facing notices. Enqueuing is infallible;
// each notice expires on its own timer. Surfaces subscribe to the
// watch snapshot and re-render on change.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;

/// Default time a notice stays visible.
const DEFAULT_TTL: Duration = Duration::from_secs(5);

/// Notice severity, mirrored by the UI surfaces' styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
    Warning,
    Info,
}

/// A single visible notice.
#[derive(Debug, Clone, Serialize)]
pub struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
    pub title: Option<String>,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

/// Queues notices and schedules their removal.
///
/// Cheaply cloneable; every clone shares the same queue. Multiple
/// notices coexist, oldest first -- no deduplication, by design.
#[derive(Clone)]
pub struct Notifier {
    inner: Arc<NotifierInner>,
}

struct NotifierInner {
    notices: watch::Sender<Arc<Vec<Notice>>>,
    next_id: AtomicU64,
    ttl: Duration,
}

impl Notifier {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    /// Override the expiry delay (tests use a short or paused-clock TTL).
    pub fn with_ttl(ttl: Duration) -> Self {
        let (notices, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            inner: Arc::new(NotifierInner {
                notices,
                next_id: AtomicU64::new(1),
                ttl,
            }),
        }
    }

    /// Enqueue a notice and schedule its removal. Must be called from
    /// within a tokio runtime (the expiry timer is a spawned task).
    pub fn notify(
        &self,
        kind: NoticeKind,
        title: Option<String>,
        message: impl Into<String>,
    ) -> u64 {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let notice = Notice {
            id,
            kind,
            title,
            message: message.into(),
            raised_at: Utc::now(),
        };

        self.inner.notices.send_modify(|snap| {
            let mut list = (**snap).clone();
            list.push(notice);
            *snap = Arc::new(list);
        });

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(inner.ttl).await;
            inner.notices.send_modify(|snap| {
                let mut list = (**snap).clone();
                list.retain(|n| n.id != id);
                *snap = Arc::new(list);
            });
        });

        id
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.notify(NoticeKind::Success, None, message)
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.notify(NoticeKind::Error, None, message)
    }

    pub fn warning(&self, message: impl Into<String>) -> u64 {
        self.notify(NoticeKind::Warning, None, message)
    }

    pub fn info(&self, message: impl Into<String>) -> u64 {
        self.notify(NoticeKind::Info, None, message)
    }

    pub fn snapshot(&self) -> Arc<Vec<Notice>> {
        self.inner.notices.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Notice>>> {
        self.inner.notices.subscribe()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}
