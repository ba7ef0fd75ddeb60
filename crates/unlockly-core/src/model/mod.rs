//! Canonical domain types shared across the session components.

pub mod device;
pub mod download;
pub mod health;

pub use device::{ConfidenceBand, DetectionMethod, Device, LockKind, RecentDevice};
pub use download::{DownloadItem, DownloadStatus};
pub use health::{AgentState, HealthSnapshot, HealthState};
