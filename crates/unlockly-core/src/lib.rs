//! Session state and business logic between `unlockly-api` and UI consumers.
//!
//! This crate owns the shared mutable session of the unlock assistant: the
//! current device, agent states, health, notices, the download queue, and
//! the detection flow that mutates them. Everything is reactive in the
//! same way the rest of the workspace consumes data -- `watch` channels
//! publishing `Arc` snapshots -- so any number of UI surfaces can follow a
//! slice of state without polling:
//!
//! - **[`Session`]** — Central facade owned by the composition root.
//!   Builds the gateway client, loads persisted recent devices, and spawns
//!   the periodic health poll. Never a global: tests construct isolated
//!   sessions.
//!
//! - **[`SessionStore`]** — Single source of truth for the current
//!   [`Device`], the agent grid, health, and the capped recent-device
//!   list. Setters are synchronous and total; each publishes a fresh
//!   snapshot to subscribers.
//!
//! - **[`DownloadManager`]** — Concurrent firmware transfers, one
//!   independent task per item, with monotone progress and one-directional
//!   status transitions. Real transfers stream bytes over HTTP; a
//!   synthetic ticker stands in for sandbox and test configurations.
//!
//! - **[`DetectionOrchestrator`]** — The per-attempt detection state
//!   machine with its re-entrancy guard, the ordered strategy retry flow,
//!   and the manual-selection path.
//!
//! - **[`Catalog`]** — Static brand/model/unlock-method/firmware tables,
//!   queried synchronously by everything else.

pub mod catalog;
pub mod config;
pub mod detection;
pub mod downloads;
pub mod error;
pub mod model;
pub mod notify;
pub mod recent;
pub mod session;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use catalog::{Catalog, CatalogEntry, DataLoss, EmergencyMode, FirmwareBuild, UnlockMethod};
pub use config::SessionConfig;
pub use detection::{DetectionOrchestrator, DetectionOutcome, DetectionPhase, DetectionStrategy};
pub use downloads::{DownloadManager, HttpTransfer, SyntheticTransfer, TransferBackend};
pub use error::CoreError;
pub use notify::{Notice, NoticeKind, Notifier};
pub use recent::RecentStore;
pub use session::Session;
pub use store::SessionStore;

pub use model::{
    AgentState, ConfidenceBand, DetectionMethod, Device, DownloadItem, DownloadStatus,
    HealthSnapshot, HealthState, LockKind, RecentDevice,
};
