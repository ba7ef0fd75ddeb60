//! CLI-owned configuration: TOML file, environment, and translation to
//! `unlockly_core::SessionConfig`.
//!
//! Core never sees these types -- it receives a pre-built `SessionConfig`.

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

use unlockly_api::{TlsMode, TransportConfig};
use unlockly_core::SessionConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── TOML config structs ──────────────────────────────────────────────

/// CLI-owned TOML configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Backend base URL.
    pub backend: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Override the recent-device file location.
    pub recent_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Simulate firmware transfers instead of downloading.
    #[serde(default)]
    pub synthetic: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
            synthetic: false,
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

// ── Config file path ─────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "unlockly", "unlockly")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .unwrap_or_else(|| {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        })
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("unlockly");
    p
}

// ── Config loading ───────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, CliError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(config_path()))
        .merge(Env::prefixed("UNLOCKLY_CONFIG_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── SessionConfig resolution ─────────────────────────────────────────

/// Translate the TOML config + global flags into a `SessionConfig`.
///
/// CLI flag overrides take priority over file values. This is the single
/// boundary where CLI config types cross into core types.
pub fn resolve_session_config(
    config: &Config,
    global: &GlobalOpts,
) -> Result<SessionConfig, CliError> {
    // 1. Backend URL (flag > env > file > built-in default)
    let url_str = global
        .backend
        .as_deref()
        .or(config.backend.as_deref())
        .unwrap_or("http://127.0.0.1:5000");
    let backend_url: Url = url_str.parse().map_err(|_| CliError::Validation {
        field: "backend".into(),
        reason: format!("invalid URL: {url_str}"),
    })?;

    // 2. TLS
    let tls = if global.insecure || config.defaults.insecure {
        TlsMode::DangerAcceptInvalid
    } else {
        TlsMode::System
    };

    // 3. Transfers
    let synthetic = global.synthetic || config.defaults.synthetic;

    let mut session = SessionConfig::default()
        .with_backend_url(backend_url)
        .with_synthetic_transfers(synthetic);
    session.transport = TransportConfig {
        tls,
        timeout: Duration::from_secs(global.timeout),
    };
    if let Some(path) = global.recent_file.clone().or_else(|| config.recent_file.clone()) {
        session = session.with_recent_path(path);
    }

    Ok(session)
}

/// Render a starter config file.
pub fn starter_config(backend: &str) -> String {
    format!(
        "# unlockly configuration\n\
         backend = \"{backend}\"\n\
         \n\
         [defaults]\n\
         output = \"table\"\n\
         color = \"auto\"\n\
         insecure = false\n\
         timeout = 30\n\
         synthetic = false\n"
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["unlockly"];
        argv.extend_from_slice(args);
        argv.push("recent");
        crate::cli::Cli::parse_from(argv).global
    }

    #[test]
    fn flag_overrides_file_backend() {
        let config = Config {
            backend: Some("http://file:5000".into()),
            ..Config::default()
        };
        let session =
            resolve_session_config(&config, &global(&["--backend", "http://flag:5000"])).unwrap();
        assert_eq!(session.backend_url.as_str(), "http://flag:5000/");
    }

    #[test]
    fn defaults_apply_without_file_or_flags() {
        let session = resolve_session_config(&Config::default(), &global(&[])).unwrap();
        assert_eq!(session.backend_url.as_str(), "http://127.0.0.1:5000/");
        assert!(!session.synthetic_transfers);
        assert_eq!(session.transport.timeout, Duration::from_secs(30));
    }

    #[test]
    fn invalid_backend_url_is_a_usage_error() {
        let err =
            resolve_session_config(&Config::default(), &global(&["--backend", "not a url"]))
                .unwrap_err();
        assert!(matches!(err, CliError::Validation { ref field, .. } if field == "backend"));
    }

    #[test]
    fn starter_config_parses_back() {
        let rendered = starter_config("http://127.0.0.1:5000");
        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.backend.as_deref(), Some("http://127.0.0.1:5000"));
        assert!(!parsed.defaults.synthetic);
    }
}
