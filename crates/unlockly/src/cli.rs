//! Clap derive structures for the `unlockly` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// unlockly -- CLI client for the phone unlock assistant
#[derive(Debug, Parser)]
#[command(
    name = "unlockly",
    version,
    about = "Detect, analyze, and unlock phones from the command line",
    long_about = "A CLI client for the unlockly assistant backend.\n\n\
        Detects connected phones, analyzes their locks, searches firmware,\n\
        and manages the backend's agents -- all against a running backend.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend base URL (overrides the config file)
    #[arg(long, short = 'b', env = "UNLOCKLY_BACKEND", global = true)]
    pub backend: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "UNLOCKLY_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "UNLOCKLY_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "UNLOCKLY_TIMEOUT", default_value = "30", global = true)]
    pub timeout: u64,

    /// Simulate firmware transfers instead of downloading (sandbox)
    #[arg(long, env = "UNLOCKLY_SYNTHETIC", global = true)]
    pub synthetic: bool,

    /// Override the recent-device file location
    #[arg(long, env = "UNLOCKLY_RECENT_FILE", global = true, hide = true)]
    pub recent_file: Option<PathBuf>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Detect a connected phone
    #[command(alias = "det")]
    Detect(DetectArgs),

    /// Select a device manually by brand and model
    #[command(alias = "sel")]
    Select(SelectArgs),

    /// Analyze a lock for the current (or a named) device
    Analyze(AnalyzeArgs),

    /// Search, download, and request firmware
    #[command(alias = "fw")]
    Firmware(FirmwareArgs),

    /// Manage the backend's agents
    Agents(AgentsArgs),

    /// Backend health and self-healing
    Health(HealthArgs),

    /// Browse the built-in device catalog
    #[command(alias = "cat")]
    Catalog(CatalogArgs),

    /// Show recently seen devices
    Recent,

    /// Check for component updates
    Updates,

    /// Manage CLI configuration
    Config(ConfigArgs),
}

// ── Detect ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DetectArgs {
    #[command(subcommand)]
    pub command: Option<DetectCommand>,
}

#[derive(Debug, Subcommand)]
pub enum DetectCommand {
    /// Standard detection (default)
    Phone,
    /// Universal detection: any connected device in any mode
    Any,
    /// Retry every strategy in order until one succeeds
    Fix,
}

// ── Select ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SelectArgs {
    /// Device brand (prompted when omitted)
    pub brand: Option<String>,

    /// Device model (prompted when omitted)
    pub model: Option<String>,

    /// Internal model number override
    #[arg(long)]
    pub model_number: Option<String>,
}

// ── Analyze ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Lock kind to analyze (frp, bootloader, screen_lock, google_account, carrier)
    pub lock: String,

    /// Phone model (defaults to the current device)
    #[arg(long, short = 'm')]
    pub model: Option<String>,
}

// ── Firmware ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct FirmwareArgs {
    #[command(subcommand)]
    pub command: FirmwareCommand,
}

#[derive(Debug, Subcommand)]
pub enum FirmwareCommand {
    /// Search the backend firmware index
    Find {
        /// Phone model (defaults to the current device)
        #[arg(long, short = 'm')]
        model: Option<String>,

        /// Firmware region
        #[arg(long, default_value = "global")]
        region: String,
    },

    /// Download a firmware build and watch its progress
    Download {
        /// Firmware version label
        // The arg id must not collide with the propagated --version flag.
        #[arg(id = "fw_version", value_name = "VERSION")]
        version: String,

        /// Direct download URL
        #[arg(long)]
        url: String,

        /// Return immediately instead of watching progress
        #[arg(long)]
        no_wait: bool,
    },

    /// Show the session's download queue
    Status,

    /// Ask the maintainers to index firmware for a model
    Request {
        /// Device brand
        brand: String,

        /// Device model
        model: String,

        /// Internal model number
        #[arg(long)]
        model_number: Option<String>,

        /// Firmware region
        #[arg(long, default_value = "global")]
        region: String,

        /// Free-form notes for the maintainers
        #[arg(long)]
        notes: Option<String>,
    },
}

// ── Agents ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AgentsArgs {
    #[command(subcommand)]
    pub command: AgentsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AgentsCommand {
    /// Show the agent grid as last reported
    List,
    /// Activate all backend agents
    Activate,
    /// Toggle one agent by name
    Toggle {
        /// Agent name (e.g. phone_detection)
        name: String,
    },
}

// ── Health ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct HealthArgs {
    #[command(subcommand)]
    pub command: Option<HealthCommand>,
}

#[derive(Debug, Subcommand)]
pub enum HealthCommand {
    /// Fetch and show the current backend health (default)
    Show,
    /// Trigger a backend self-heal pass
    Heal,
}

// ── Catalog ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub command: CatalogCommand,
}

#[derive(Debug, Subcommand)]
pub enum CatalogCommand {
    /// List known brands
    Brands,
    /// List known models for a brand
    Models {
        /// Brand name
        brand: String,
    },
    /// Show unlock methods for a model
    Methods {
        /// Brand name
        brand: String,
        /// Model name or model number
        model: String,
    },
    /// Show firmware builds known for a model
    Firmware {
        /// Model name or model number
        model: String,
        /// Filter by region
        #[arg(long)]
        region: Option<String>,
    },
    /// List known emergency USB modes
    Emergency,
    /// Fetch Hisense-specific unlock descriptors from the backend
    Hisense {
        /// Model name or model number
        model: String,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path
    Path,
    /// Show the resolved configuration
    Show,
    /// Write a starter config file
    Init {
        /// Backend base URL to record
        #[arg(long, default_value = "http://127.0.0.1:5000")]
        backend: String,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
