//! Output formatting: table, JSON, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use unlockly_core::{AgentState, ConfidenceBand, DownloadStatus, HealthState};

use crate::cli::{ColorMode, OutputFormat};

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Confidence band, styled for terminal display.
pub fn band_label(band: ConfidenceBand, color: bool) -> String {
    if !color {
        return band.to_string();
    }
    match band {
        ConfidenceBand::High => band.to_string().green().to_string(),
        ConfidenceBand::Medium => band.to_string().yellow().to_string(),
        ConfidenceBand::Low => band.to_string().red().to_string(),
    }
}

/// Download status, styled for terminal display.
pub fn status_label(status: DownloadStatus, color: bool) -> String {
    if !color {
        return status.to_string();
    }
    match status {
        DownloadStatus::Completed => status.to_string().green().to_string(),
        DownloadStatus::Failed => status.to_string().red().to_string(),
        DownloadStatus::Downloading => status.to_string().cyan().to_string(),
        DownloadStatus::Queued => status.to_string().dimmed().to_string(),
    }
}

/// Agent state, styled for terminal display.
pub fn agent_label(state: AgentState, color: bool) -> String {
    if !color {
        return state.to_string();
    }
    match state {
        AgentState::Active => state.to_string().green().to_string(),
        AgentState::Error => state.to_string().red().to_string(),
        AgentState::Inactive => state.to_string().dimmed().to_string(),
    }
}

/// Health state, styled for terminal display.
pub fn health_label(state: HealthState, color: bool) -> String {
    if !color {
        return state.to_string();
    }
    match state {
        HealthState::Healthy => state.to_string().green().to_string(),
        HealthState::Degraded => state.to_string().yellow().to_string(),
        HealthState::Unhealthy => state.to_string().red().to_string(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive to build a pretty table
/// - `json` / `json-compact`: serializes the original data via serde
/// - `plain`: calls `id_fn` on each item to emit one identifier per line
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses a custom `detail_fn` that returns a pre-formatted
/// string, since single-item detail views don't use `Tabled` derive.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Plain => id_fn(data),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> String {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.unwrap_or_else(|e| format!("{{\"error\": \"serialization failed: {e}\"}}"))
}
