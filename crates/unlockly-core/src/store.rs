// ── Session state store ──
//
// Single source of truth for the shared session: current device, agent
// grid, health, and the recent-device list. Push-based change
// notification via `watch` channels; every setter publishes a fresh
// `Arc` snapshot so subscribers re-render without polling.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;
use tracing::warn;

use crate::model::{AgentState, Device, HealthSnapshot, RecentDevice};
use crate::recent::RecentStore;

/// Maximum entries kept in the recent-device list.
const RECENT_CAP: usize = 5;

/// Reactive storage for the session's shared mutable state.
///
/// All setters are synchronous and total -- no error paths, no locks
/// beyond the watch channels' own. At most one device is current at a
/// time; replacing it updates the recent list and the device slice in a
/// single call, so no subscriber can observe the new device without the
/// recent list already reflecting it.
pub struct SessionStore {
    current_device: watch::Sender<Option<Arc<Device>>>,
    agents: watch::Sender<Arc<BTreeMap<String, AgentState>>>,
    health: watch::Sender<Arc<HealthSnapshot>>,
    recents: watch::Sender<Arc<Vec<RecentDevice>>>,
    /// Best-effort persistence for the recent list; `None` keeps the
    /// store purely in-memory (tests, sandbox).
    recent_store: Option<RecentStore>,
}

impl SessionStore {
    /// Create an empty, in-memory store.
    pub fn new() -> Self {
        let (current_device, _) = watch::channel(None);
        let (agents, _) = watch::channel(Arc::new(BTreeMap::new()));
        let (health, _) = watch::channel(Arc::new(HealthSnapshot::default()));
        let (recents, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            current_device,
            agents,
            health,
            recents,
            recent_store: None,
        }
    }

    /// Create a store backed by a recent-device file. The persisted list
    /// seeds the in-memory slice (already capped and ordered on disk, but
    /// re-capped here in case the file was edited).
    pub fn with_recent_store(recent_store: RecentStore) -> Self {
        let store = Self::new();
        let mut loaded = recent_store.load();
        loaded.truncate(RECENT_CAP);
        store.recents.send_modify(|r| *r = Arc::new(loaded));
        Self {
            recent_store: Some(recent_store),
            ..store
        }
    }

    // ── Current device ───────────────────────────────────────────────

    /// Replace the current device wholesale.
    ///
    /// Also pushes the device onto the recent list, before the device
    /// slice updates, so both surfaces are consistent by the time any
    /// subscriber wakes.
    pub fn set_current_device(&self, device: Device) -> Arc<Device> {
        self.push_recent(device.clone());
        let device = Arc::new(device);
        let published = Arc::clone(&device);
        self.current_device.send_modify(|d| *d = Some(published));
        device
    }

    /// Clear the current device (e.g. on disconnect).
    pub fn clear_current_device(&self) {
        self.current_device.send_modify(|d| *d = None);
    }

    pub fn current_device(&self) -> Option<Arc<Device>> {
        self.current_device.borrow().clone()
    }

    pub fn subscribe_current_device(&self) -> watch::Receiver<Option<Arc<Device>>> {
        self.current_device.subscribe()
    }

    // ── Agent grid ───────────────────────────────────────────────────

    /// Set one agent's state, publishing a rebuilt snapshot.
    pub fn set_agent_state(&self, name: &str, state: AgentState) {
        self.agents.send_modify(|snap| {
            let mut map = (**snap).clone();
            map.insert(name.to_owned(), state);
            *snap = Arc::new(map);
        });
    }

    /// Apply a bulk agent-status map as reported by the backend.
    pub fn apply_agent_statuses(&self, statuses: &HashMap<String, String>) {
        self.agents.send_modify(|snap| {
            let mut map = (**snap).clone();
            for (name, status) in statuses {
                map.insert(name.clone(), AgentState::parse_lenient(status));
            }
            *snap = Arc::new(map);
        });
    }

    pub fn agents(&self) -> Arc<BTreeMap<String, AgentState>> {
        self.agents.borrow().clone()
    }

    pub fn subscribe_agents(&self) -> watch::Receiver<Arc<BTreeMap<String, AgentState>>> {
        self.agents.subscribe()
    }

    // ── Health ───────────────────────────────────────────────────────

    pub fn set_health(&self, snapshot: HealthSnapshot) {
        self.health.send_modify(|h| *h = Arc::new(snapshot));
    }

    pub fn health(&self) -> Arc<HealthSnapshot> {
        self.health.borrow().clone()
    }

    pub fn subscribe_health(&self) -> watch::Receiver<Arc<HealthSnapshot>> {
        self.health.subscribe()
    }

    // ── Recent devices ───────────────────────────────────────────────

    /// Prepend a device to the recent list.
    ///
    /// Dedup by (brand, model): an existing equal entry is removed first,
    /// then the new entry goes to the front, then the list truncates to
    /// five. Persisted best-effort when a backing store exists.
    pub fn push_recent(&self, device: Device) {
        self.recents.send_modify(|snap| {
            let mut list: Vec<RecentDevice> = snap
                .iter()
                .filter(|r| !r.device.same_identity(&device))
                .cloned()
                .collect();
            list.insert(
                0,
                RecentDevice {
                    device,
                    seen_at: Utc::now(),
                },
            );
            list.truncate(RECENT_CAP);
            *snap = Arc::new(list);
        });

        if let Some(ref store) = self.recent_store {
            if let Err(e) = store.save(&self.recents.borrow()) {
                warn!(error = %e, "recent-device persistence failed (non-fatal)");
            }
        }
    }

    pub fn recent_devices(&self) -> Arc<Vec<RecentDevice>> {
        self.recents.borrow().clone()
    }

    pub fn subscribe_recent_devices(&self) -> watch::Receiver<Arc<Vec<RecentDevice>>> {
        self.recents.subscribe()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
