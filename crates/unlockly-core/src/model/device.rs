// ── Device domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use unlockly_api::PhoneInfo;

/// Category of device restriction the catalog and backend associate
/// with a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[non_exhaustive]
pub enum LockKind {
    Frp,
    Bootloader,
    ScreenLock,
    GoogleAccount,
    Carrier,
    Other,
}

impl LockKind {
    /// Parse a backend lock string, mapping anything unknown to `Other`.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or(Self::Other)
    }
}

/// How the current device was identified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DetectionMethod {
    /// An automatic detection strategy, named by the backend
    /// (e.g. `"adb"`, `"fastboot"`, `"usb_raw"`).
    Automatic(String),
    /// The user picked brand and model by hand.
    Manual,
}

impl From<String> for DetectionMethod {
    fn from(s: String) -> Self {
        if s == "manual" {
            Self::Manual
        } else {
            Self::Automatic(s)
        }
    }
}

impl From<DetectionMethod> for String {
    fn from(m: DetectionMethod) -> Self {
        match m {
            DetectionMethod::Automatic(s) => s,
            DetectionMethod::Manual => "manual".to_owned(),
        }
    }
}

impl std::fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Automatic(s) => f.write_str(s),
            Self::Manual => f.write_str("manual"),
        }
    }
}

/// Severity class derived from a detection confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
}

impl ConfidenceBand {
    /// Classify a 0.0–1.0 confidence score.
    ///
    /// Boundaries: >= 0.80 high, 0.60–0.79 medium, below 0.60 low.
    pub fn classify(confidence: f64) -> Self {
        if confidence >= 0.80 {
            Self::High
        } else if confidence >= 0.60 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

impl std::fmt::Display for ConfidenceBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => f.write_str("high"),
            Self::Medium => f.write_str("medium"),
            Self::Low => f.write_str("low"),
        }
    }
}

/// The canonical device identity record.
///
/// Immutable once constructed -- each new detection replaces the session's
/// current device wholesale rather than patching fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub brand: String,
    pub model: String,
    pub model_number: Option<String>,
    pub os_version: Option<String>,
    pub supported_locks: Vec<LockKind>,
    /// 0.0–1.0 certainty of the identification.
    pub confidence: f64,
    pub method: DetectionMethod,
    pub detected_at: DateTime<Utc>,
}

impl Device {
    pub fn confidence_band(&self) -> ConfidenceBand {
        ConfidenceBand::classify(self.confidence)
    }

    /// Identity used for recent-list deduplication: (brand, model),
    /// case-insensitive.
    pub fn same_identity(&self, other: &Self) -> bool {
        self.brand.eq_ignore_ascii_case(&other.brand)
            && self.model.eq_ignore_ascii_case(&other.model)
    }

    /// Build a device from a backend identification result.
    ///
    /// `confidence_override` carries the combined confidence when the
    /// universal detector reports one; `strategy` names the detection
    /// strategy that produced the hit.
    pub fn from_identification(
        info: PhoneInfo,
        confidence_override: Option<f64>,
        strategy: &str,
    ) -> Self {
        let confidence = confidence_override.unwrap_or(info.detection_confidence);
        let method = info
            .detection_method
            .clone()
            .unwrap_or_else(|| strategy.to_owned());
        Self {
            brand: info.brand,
            model: info.model,
            model_number: info.model_number,
            os_version: info.android_version,
            supported_locks: info
                .supported_locks
                .iter()
                .map(|s| LockKind::parse_lenient(s))
                .collect(),
            confidence: confidence.clamp(0.0, 1.0),
            method: DetectionMethod::from(method),
            detected_at: Utc::now(),
        }
    }
}

/// A device the session has seen, with the time it was last current.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentDevice {
    pub device: Device,
    pub seen_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_bands_at_spec_points() {
        assert_eq!(ConfidenceBand::classify(0.95), ConfidenceBand::High);
        assert_eq!(ConfidenceBand::classify(0.75), ConfidenceBand::Medium);
        assert_eq!(ConfidenceBand::classify(0.40), ConfidenceBand::Low);
    }

    #[test]
    fn confidence_band_boundaries() {
        assert_eq!(ConfidenceBand::classify(0.80), ConfidenceBand::High);
        assert_eq!(ConfidenceBand::classify(0.79), ConfidenceBand::Medium);
        assert_eq!(ConfidenceBand::classify(0.60), ConfidenceBand::Medium);
        assert_eq!(ConfidenceBand::classify(0.59), ConfidenceBand::Low);
    }

    #[test]
    fn lock_kind_parses_backend_strings() {
        assert_eq!(LockKind::parse_lenient("frp"), LockKind::Frp);
        assert_eq!(LockKind::parse_lenient("screen_lock"), LockKind::ScreenLock);
        assert_eq!(LockKind::parse_lenient("mystery_lock"), LockKind::Other);
    }

    #[test]
    fn detection_method_round_trips_through_string() {
        assert_eq!(DetectionMethod::from("manual".to_owned()), DetectionMethod::Manual);
        assert_eq!(
            DetectionMethod::from("fastboot".to_owned()),
            DetectionMethod::Automatic("fastboot".into())
        );
        assert_eq!(String::from(DetectionMethod::Manual), "manual");
    }

    #[test]
    fn identity_comparison_ignores_case() {
        let a = Device {
            brand: "Hisense".into(),
            model: "Infinity H30".into(),
            model_number: None,
            os_version: None,
            supported_locks: vec![],
            confidence: 0.5,
            method: DetectionMethod::Manual,
            detected_at: Utc::now(),
        };
        let mut b = a.clone();
        b.brand = "hisense".into();
        b.model = "INFINITY H30".into();
        assert!(a.same_identity(&b));
    }
}
