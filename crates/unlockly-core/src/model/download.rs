// ── Download queue domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of a download. Transitions are one-directional:
/// Queued → Downloading → {Completed | Failed}, terminal states sticky.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadStatus {
    Queued,
    Downloading,
    Completed,
    Failed,
}

impl DownloadStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Queued => f.write_str("queued"),
            Self::Downloading => f.write_str("downloading"),
            Self::Completed => f.write_str("completed"),
            Self::Failed => f.write_str("failed"),
        }
    }
}

/// A single tracked firmware transfer.
///
/// Mutations go through the methods below so the status machine and the
/// progress monotonicity invariant hold no matter how task interleavings
/// land.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadItem {
    /// Firmware version identifier -- also the queue key.
    pub version: String,
    pub url: String,
    pub status: DownloadStatus,
    /// 0–100, non-decreasing while `Downloading`.
    pub progress: u8,
    pub error: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl DownloadItem {
    pub(crate) fn queued(version: String, url: String) -> Self {
        Self {
            version,
            url,
            status: DownloadStatus::Queued,
            progress: 0,
            error: None,
            started_at: None,
            finished_at: None,
        }
    }

    /// Queued → Downloading. No-op from any other state.
    pub(crate) fn begin(&mut self) {
        if self.status == DownloadStatus::Queued {
            self.status = DownloadStatus::Downloading;
            self.started_at = Some(Utc::now());
        }
    }

    /// Raise progress while downloading. Decreases are ignored, values
    /// above 100 clamp, and terminal items never move.
    pub(crate) fn advance_to(&mut self, pct: u8) {
        if self.status == DownloadStatus::Downloading {
            self.progress = self.progress.max(pct.min(100));
        }
    }

    /// Downloading → Completed. Terminal states are sticky.
    pub(crate) fn complete(&mut self) {
        if self.status == DownloadStatus::Downloading {
            self.status = DownloadStatus::Completed;
            self.progress = 100;
            self.finished_at = Some(Utc::now());
        }
    }

    /// Queued/Downloading → Failed with an attached message.
    pub(crate) fn fail(&mut self, message: String) {
        if !self.status.is_terminal() {
            self.status = DownloadStatus::Failed;
            self.error = Some(message);
            self.finished_at = Some(Utc::now());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_transitions_are_one_directional() {
        let mut item = DownloadItem::queued("v1.0".into(), "https://x/fw.zip".into());
        assert_eq!(item.status, DownloadStatus::Queued);

        item.begin();
        assert_eq!(item.status, DownloadStatus::Downloading);
        assert!(item.started_at.is_some());

        item.complete();
        assert_eq!(item.status, DownloadStatus::Completed);

        // Terminal is sticky: fail/begin/advance all ignored.
        item.fail("late error".into());
        assert_eq!(item.status, DownloadStatus::Completed);
        assert!(item.error.is_none());
        item.advance_to(10);
        assert_eq!(item.progress, 100);
    }

    #[test]
    fn progress_is_monotone_and_clamped() {
        let mut item = DownloadItem::queued("v1.0".into(), "https://x/fw.zip".into());
        item.begin();

        item.advance_to(30);
        item.advance_to(10); // ignored
        assert_eq!(item.progress, 30);

        item.advance_to(150); // clamped
        assert_eq!(item.progress, 100);
    }

    #[test]
    fn progress_ignored_while_queued() {
        let mut item = DownloadItem::queued("v1.0".into(), "https://x/fw.zip".into());
        item.advance_to(50);
        assert_eq!(item.progress, 0);
    }

    #[test]
    fn failure_attaches_message() {
        let mut item = DownloadItem::queued("v1.0".into(), "https://x/fw.zip".into());
        item.begin();
        item.fail("connection reset".into());
        assert_eq!(item.status, DownloadStatus::Failed);
        assert_eq!(item.error.as_deref(), Some("connection reset"));
        assert!(item.finished_at.is_some());

        item.complete(); // ignored
        assert_eq!(item.status, DownloadStatus::Failed);
    }
}
