// ── Static device catalog ──
//
// Read-only brand/model → unlock-method/firmware associations, plus the
// emergency-mode USB id table the detection retry flow probes. Pure,
// synchronous, total: unknown brands and models yield empty results,
// never errors.

use serde::Serialize;

use crate::model::LockKind;

/// What happens to user data when an unlock method is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataLoss {
    None,
    Partial,
    Complete,
}

impl std::fmt::Display for DataLoss {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::Partial => f.write_str("partial"),
            Self::Complete => f.write_str("complete"),
        }
    }
}

/// One known unlock technique for a catalog model.
#[derive(Debug, Clone, Serialize)]
pub struct UnlockMethod {
    pub name: String,
    pub lock_kind: LockKind,
    /// 0.0–1.0 historical success rate.
    pub success_rate: f64,
    pub data_loss: DataLoss,
    pub tools: Vec<String>,
}

/// A firmware build known for a catalog model.
#[derive(Debug, Clone, Serialize)]
pub struct FirmwareBuild {
    pub version: String,
    pub android_version: String,
    pub build_date: String,
    pub region: String,
    pub download_url: String,
    pub file_size: String,
    pub checksum: String,
}

/// One brand/model association in the catalog.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    pub brand: String,
    /// Marketing name (e.g. "Infinity H40 Lite").
    pub model: String,
    /// Internal model number (e.g. "HLTE230E").
    pub model_number: Option<String>,
    pub chipset: Option<String>,
    pub os_version: Option<String>,
    pub unlock_methods: Vec<UnlockMethod>,
    pub firmware: Vec<FirmwareBuild>,
}

/// A known emergency/download USB mode the forced-detection path probes.
#[derive(Debug, Clone, Serialize)]
pub struct EmergencyMode {
    pub name: String,
    pub vendor_id: String,
    pub product_id: String,
}

/// The static catalog. Built once at startup, never mutated.
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    emergency_modes: Vec<EmergencyMode>,
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            entries: seed_entries(),
            emergency_modes: seed_emergency_modes(),
        }
    }

    /// All known brands, in catalog order, deduplicated.
    pub fn brands(&self) -> Vec<&str> {
        let mut brands: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !brands
                .iter()
                .any(|b| b.eq_ignore_ascii_case(&entry.brand))
            {
                brands.push(&entry.brand);
            }
        }
        brands
    }

    /// Model names for a brand, in catalog order. Empty for unknown brands.
    pub fn models_for(&self, brand: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.brand.eq_ignore_ascii_case(brand))
            .map(|e| e.model.as_str())
            .collect()
    }

    /// Find an entry by brand plus marketing name or model number,
    /// case-insensitive.
    pub fn lookup(&self, brand: &str, model: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| {
            e.brand.eq_ignore_ascii_case(brand)
                && (e.model.eq_ignore_ascii_case(model)
                    || e.model_number
                        .as_deref()
                        .is_some_and(|n| n.eq_ignore_ascii_case(model)))
        })
    }

    /// Unlock methods for a brand/model. Empty when none are defined.
    pub fn unlock_methods_for(&self, brand: &str, model: &str) -> &[UnlockMethod] {
        self.lookup(brand, model)
            .map_or(&[], |e| e.unlock_methods.as_slice())
    }

    /// Firmware builds for a model (any brand), optionally filtered by
    /// region (case-insensitive). Empty when unknown.
    pub fn firmware_for(&self, model: &str, region: Option<&str>) -> Vec<&FirmwareBuild> {
        self.entries
            .iter()
            .filter(|e| {
                e.model.eq_ignore_ascii_case(model)
                    || e.model_number
                        .as_deref()
                        .is_some_and(|n| n.eq_ignore_ascii_case(model))
            })
            .flat_map(|e| e.firmware.iter())
            .filter(|fw| region.is_none_or(|r| fw.region.eq_ignore_ascii_case(r)))
            .collect()
    }

    /// Emergency-mode USB ids probed by the detection retry flow.
    pub fn emergency_modes(&self) -> &[EmergencyMode] {
        &self.emergency_modes
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

// ── Seed data ───────────────────────────────────────────────────────

fn method(
    name: &str,
    lock_kind: LockKind,
    success_rate: f64,
    data_loss: DataLoss,
    tools: &[&str],
) -> UnlockMethod {
    UnlockMethod {
        name: name.to_owned(),
        lock_kind,
        success_rate,
        data_loss,
        tools: tools.iter().map(|t| (*t).to_owned()).collect(),
    }
}

#[allow(clippy::too_many_lines)]
fn seed_entries() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry {
            brand: "Hisense".into(),
            model: "Infinity H40 Lite".into(),
            model_number: Some("HLTE230E".into()),
            chipset: Some("unisoc_sc9863a".into()),
            os_version: Some("10".into()),
            unlock_methods: vec![
                method(
                    "combination_file",
                    LockKind::Frp,
                    0.85,
                    DataLoss::Complete,
                    &["Hisense_Tool_v2.3", "Octoplus"],
                ),
                method(
                    "firmware_flash",
                    LockKind::ScreenLock,
                    0.95,
                    DataLoss::Complete,
                    &["Hisense_Tool_v2.3", "Odin"],
                ),
                method(
                    "combination_flash",
                    LockKind::GoogleAccount,
                    0.90,
                    DataLoss::Complete,
                    &["Hisense_Tool_v2.3"],
                ),
            ],
            firmware: vec![
                FirmwareBuild {
                    version: "HLTE230E_10_001".into(),
                    android_version: "10".into(),
                    build_date: "2023-05-15".into(),
                    region: "Global".into(),
                    download_url: "https://firmware.hisense.com/HLTE230E_10_001.zip".into(),
                    file_size: "2.1GB".into(),
                    checksum: "a1b2c3d4e5f6".into(),
                },
                FirmwareBuild {
                    version: "HLTE230E_10_002".into(),
                    android_version: "10".into(),
                    build_date: "2023-08-20".into(),
                    region: "Europe".into(),
                    download_url: "https://firmware.hisense.com/HLTE230E_10_002.zip".into(),
                    file_size: "2.1GB".into(),
                    checksum: "b2c3d4e5f6a1".into(),
                },
            ],
        },
        CatalogEntry {
            brand: "Hisense".into(),
            model: "Infinity H30".into(),
            model_number: Some("HLTE202E".into()),
            chipset: Some("mt6762".into()),
            os_version: Some("10".into()),
            unlock_methods: vec![
                method(
                    "combination_file",
                    LockKind::Frp,
                    0.80,
                    DataLoss::Complete,
                    &["Hisense_Tool_v2.3"],
                ),
                method(
                    "recovery_wipe",
                    LockKind::ScreenLock,
                    0.90,
                    DataLoss::Complete,
                    &["Hisense_Tool_v2.3"],
                ),
            ],
            firmware: vec![FirmwareBuild {
                version: "HLTE202E_10_004".into(),
                android_version: "10".into(),
                build_date: "2022-11-02".into(),
                region: "Global".into(),
                download_url: "https://firmware.hisense.com/HLTE202E_10_004.zip".into(),
                file_size: "1.8GB".into(),
                checksum: "c3d4e5f6a1b2".into(),
            }],
        },
        CatalogEntry {
            brand: "Samsung".into(),
            model: "Galaxy S21".into(),
            model_number: Some("SM-G991B".into()),
            chipset: Some("exynos_2100".into()),
            os_version: Some("12".into()),
            unlock_methods: vec![
                method(
                    "combination_file",
                    LockKind::Frp,
                    0.75,
                    DataLoss::Complete,
                    &["Odin", "SamFw_Tool"],
                ),
                method(
                    "firmware_flash",
                    LockKind::ScreenLock,
                    0.90,
                    DataLoss::Complete,
                    &["Odin"],
                ),
            ],
            firmware: vec![FirmwareBuild {
                version: "G991BXXU5CVGB".into(),
                android_version: "12".into(),
                build_date: "2022-07-18".into(),
                region: "Global".into(),
                download_url: "https://fw.samsungmobile.example/G991BXXU5CVGB.zip".into(),
                file_size: "6.4GB".into(),
                checksum: "d4e5f6a1b2c3".into(),
            }],
        },
        CatalogEntry {
            brand: "Samsung".into(),
            model: "Galaxy A12".into(),
            model_number: Some("SM-A125F".into()),
            chipset: Some("mt6765".into()),
            os_version: Some("11".into()),
            unlock_methods: vec![method(
                "combination_file",
                LockKind::Frp,
                0.85,
                DataLoss::Complete,
                &["Odin", "SamFw_Tool"],
            )],
            firmware: vec![],
        },
        CatalogEntry {
            brand: "Xiaomi".into(),
            model: "Redmi Note 10".into(),
            model_number: Some("M2101K7AI".into()),
            chipset: Some("sd678".into()),
            os_version: Some("11".into()),
            unlock_methods: vec![
                method(
                    "mi_unlock",
                    LockKind::Bootloader,
                    0.99,
                    DataLoss::Complete,
                    &["Mi_Unlock_Tool"],
                ),
                method(
                    "edl_flash",
                    LockKind::Frp,
                    0.80,
                    DataLoss::Complete,
                    &["MiFlash", "EDL_Auth"],
                ),
            ],
            firmware: vec![],
        },
    ]
}

/// Emergency/download modes by USB id, probed in this order.
fn seed_emergency_modes() -> Vec<EmergencyMode> {
    [
        ("Qualcomm EDL", "05c6", "9008"),
        ("Mediatek Preloader", "0e8d", "2000"),
        ("Samsung Download", "04e8", "685d"),
        ("Spreadtrum/Unisoc", "1782", "4d00"),
        ("Xiaomi EDL", "1d4d", "0002"),
    ]
    .into_iter()
    .map(|(name, vendor_id, product_id)| EmergencyMode {
        name: name.to_owned(),
        vendor_id: vendor_id.to_owned(),
        product_id: product_id.to_owned(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn models_for_known_brand_is_ordered() {
        let catalog = Catalog::new();
        let models = catalog.models_for("hisense");
        assert_eq!(models, vec!["Infinity H40 Lite", "Infinity H30"]);
    }

    #[test]
    fn unknown_brand_yields_empty_not_error() {
        let catalog = Catalog::new();
        assert!(catalog.models_for("Nokia").is_empty());
        assert!(catalog.unlock_methods_for("Nokia", "3310").is_empty());
        assert!(catalog.firmware_for("TA-1032", None).is_empty());
    }

    #[test]
    fn lookup_matches_model_number_too() {
        let catalog = Catalog::new();
        let by_name = catalog.lookup("Hisense", "Infinity H40 Lite");
        let by_number = catalog.lookup("hisense", "hlte230e");
        assert!(by_name.is_some());
        assert_eq!(
            by_name.map(|e| &e.model_number),
            by_number.map(|e| &e.model_number)
        );
    }

    #[test]
    fn unlock_methods_carry_rates_and_tools() {
        let catalog = Catalog::new();
        let methods = catalog.unlock_methods_for("Hisense", "HLTE230E");
        assert_eq!(methods.len(), 3);

        let frp = methods
            .iter()
            .find(|m| m.lock_kind == LockKind::Frp)
            .expect("frp method");
        assert!((frp.success_rate - 0.85).abs() < f64::EPSILON);
        assert_eq!(frp.data_loss, DataLoss::Complete);
        assert!(frp.tools.contains(&"Octoplus".to_owned()));
    }

    #[test]
    fn firmware_region_filter() {
        let catalog = Catalog::new();
        assert_eq!(catalog.firmware_for("HLTE230E", None).len(), 2);

        let europe = catalog.firmware_for("HLTE230E", Some("europe"));
        assert_eq!(europe.len(), 1);
        assert_eq!(europe[0].version, "HLTE230E_10_002");
    }

    #[test]
    fn emergency_modes_probe_order() {
        let catalog = Catalog::new();
        let modes = catalog.emergency_modes();
        assert_eq!(modes.len(), 5);
        assert_eq!(modes[0].vendor_id, "05c6");
        assert_eq!(modes[0].product_id, "9008");
    }
}
