// ── Agent and health domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Activation state of a named backend agent (e.g. `phone_detection`).
///
/// The agent's internal behavior is external to this core -- only the
/// state is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentState {
    Inactive,
    Active,
    Error,
}

impl AgentState {
    /// Map a backend status string leniently; anything unrecognized
    /// counts as inactive.
    pub fn parse_lenient(s: &str) -> Self {
        match s {
            "active" | "running" | "healthy" => Self::Active,
            "error" | "failed" | "unhealthy" => Self::Error,
            _ => Self::Inactive,
        }
    }
}

impl std::fmt::Display for AgentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inactive => f.write_str("inactive"),
            Self::Active => f.write_str("active"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// Overall backend health classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    #[default]
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthState {
    pub fn parse_lenient(s: &str) -> Self {
        match s {
            "degraded" => Self::Degraded,
            "unhealthy" | "critical" => Self::Unhealthy,
            _ => Self::Healthy,
        }
    }
}

impl std::fmt::Display for HealthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Healthy => f.write_str("healthy"),
            Self::Degraded => f.write_str("degraded"),
            Self::Unhealthy => f.write_str("unhealthy"),
        }
    }
}

/// Point-in-time health report held by the session store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub state: HealthState,
    pub issues: Vec<String>,
    pub checked_at: Option<DateTime<Utc>>,
}

impl HealthSnapshot {
    pub fn new(state: HealthState, issues: Vec<String>) -> Self {
        Self {
            state,
            issues,
            checked_at: Some(Utc::now()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_state_parses_leniently() {
        assert_eq!(AgentState::parse_lenient("active"), AgentState::Active);
        assert_eq!(AgentState::parse_lenient("error"), AgentState::Error);
        assert_eq!(AgentState::parse_lenient("paused"), AgentState::Inactive);
        assert_eq!(AgentState::parse_lenient(""), AgentState::Inactive);
    }

    #[test]
    fn health_state_parses_leniently() {
        assert_eq!(HealthState::parse_lenient("healthy"), HealthState::Healthy);
        assert_eq!(HealthState::parse_lenient("degraded"), HealthState::Degraded);
        assert_eq!(HealthState::parse_lenient("unhealthy"), HealthState::Unhealthy);
        // Unknown leans healthy rather than alarming on a new backend string.
        assert_eq!(HealthState::parse_lenient("ok"), HealthState::Healthy);
    }
}
