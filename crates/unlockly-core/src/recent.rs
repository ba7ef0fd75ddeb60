// ── Recent-device persistence ──
//
// The capped recent list survives restarts as a small JSON file in the
// platform data directory. Loading tolerates a missing or corrupt file;
// saving is best-effort (the caller logs, never fails a state mutation).

use std::path::PathBuf;

use directories::ProjectDirs;
use tracing::warn;

use crate::error::CoreError;
use crate::model::RecentDevice;

const RECENT_FILE: &str = "recent_devices.json";

/// File-backed storage for the recent-device list.
#[derive(Debug, Clone)]
pub struct RecentStore {
    path: PathBuf,
}

impl RecentStore {
    /// Store at an explicit path (tests, sandbox).
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store at the platform data directory, if one can be resolved.
    pub fn open_default() -> Option<Self> {
        let dirs = ProjectDirs::from("io", "unlockly", "unlockly")?;
        Some(Self {
            path: dirs.data_dir().join(RECENT_FILE),
        })
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Load the persisted list. A missing file is an empty list; a
    /// corrupt file is logged and treated the same way.
    pub fn load(&self) -> Vec<RecentDevice> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "recent-device file unreadable");
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(list) => list,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "recent-device file corrupt, ignoring");
                Vec::new()
            }
        }
    }

    /// Write the list, creating parent directories as needed.
    pub fn save(&self, list: &[RecentDevice]) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(list)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{DetectionMethod, Device};
    use chrono::Utc;

    fn entry(model: &str) -> RecentDevice {
        RecentDevice {
            device: Device {
                brand: "Hisense".into(),
                model: model.into(),
                model_number: Some("HLTE230E".into()),
                os_version: Some("10".into()),
                supported_locks: vec![],
                confidence: 0.5,
                method: DetectionMethod::Manual,
                detected_at: Utc::now(),
            },
            seen_at: Utc::now(),
        }
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecentStore::at(dir.path().join("nope.json"));
        assert!(store.load().is_empty());
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recent_devices.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = RecentStore::at(path);
        assert!(store.load().is_empty());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecentStore::at(dir.path().join("deep/recent_devices.json"));

        store
            .save(&[entry("Infinity H40 Lite"), entry("Infinity H30")])
            .unwrap();

        let loaded = store.load();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].device.model, "Infinity H40 Lite");
        assert_eq!(loaded[1].device.method, DetectionMethod::Manual);
    }
}
