//! Clap derive structures for the `meshwatch` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Also compiled by `build.rs`, so nothing here may reach outside clap.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// meshwatch -- watch a home mesh Wi-Fi network from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "meshwatch",
    version,
    about = "Monitor mesh Wi-Fi networks from the command line",
    long_about = "Polls a mesh network controller for connected devices and access points,\n\
        detects what changed between polls, keeps an event log, and answers\n\
        short spoken-style questions about the network.",
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
    /// Account profile to use
    #[arg(long, short = 'p', env = "MESHWATCH_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Controller API host (overrides profile)
    #[arg(long, env = "MESHWATCH_API_HOST", global = true)]
    pub api_host: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "MESHWATCH_OUTPUT",
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

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "MESHWATCH_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "MESHWATCH_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Directory for the baseline snapshot and event log
    #[arg(long, env = "MESHWATCH_STATE_DIR", global = true)]
    pub state_dir: Option<PathBuf>,

    /// Also write logs to this file
    #[arg(long, env = "MESHWATCH_LOG_FILE", global = true)]
    pub log_file: Option<PathBuf>,
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
    /// YAML
    Yaml,
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
    /// Show a per-network overview
    #[command(alias = "st")]
    Status,

    /// List connected devices
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// List access points and their load
    #[command(alias = "ap")]
    Aps(ApsArgs),

    /// Run one poll cycle against the saved baseline
    Poll,

    /// Poll continuously and print events as they are detected
    Watch(WatchArgs),

    /// Inspect and maintain the event log
    #[command(alias = "ev")]
    Events(EventsArgs),

    /// Ask a spoken-style question about the network
    Ask(AskArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DEVICES / APS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DevicesArgs {
    /// Only this network (id or name)
    #[arg(long, short = 'n')]
    pub network: Option<String>,

    /// Only this category (phones, laptops, tablets, smart-home, gaming,
    /// streaming, other)
    #[arg(long, short = 'c')]
    pub category: Option<String>,
}

#[derive(Debug, Args)]
pub struct ApsArgs {
    /// Only this network (id or name)
    #[arg(long, short = 'n')]
    pub network: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  WATCH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Time between polls (e.g. "30s", "5m"); defaults to the profile's
    #[arg(long, short = 'i', value_parser = humantime::parse_duration)]
    pub interval: Option<Duration>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  EVENTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct EventsArgs {
    #[command(subcommand)]
    pub command: EventsCommand,
}

#[derive(Debug, Subcommand)]
pub enum EventsCommand {
    /// List recent events, newest first
    #[command(alias = "ls")]
    List {
        /// Max results
        #[arg(long, short = 'l', default_value = "50")]
        limit: usize,

        /// How far back to look (e.g. "24h", "7d")
        #[arg(long, default_value = "24h", value_parser = humantime::parse_duration)]
        within: Duration,

        /// Only this event type (e.g. device_connected)
        #[arg(long, short = 't')]
        kind: Option<String>,

        /// Only this network id
        #[arg(long, short = 'n')]
        network: Option<String>,
    },

    /// Count events by type
    Summary {
        /// How far back to look (e.g. "24h", "7d")
        #[arg(long, default_value = "24h", value_parser = humantime::parse_duration)]
        within: Duration,
    },

    /// Delete events older than the retention period
    Purge {
        /// Override the retention period (e.g. "30d")
        #[arg(long, value_parser = humantime::parse_duration)]
        older_than: Option<Duration>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ASK
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AskArgs {
    /// What to ask: launch, device-count, network-status, device-types,
    /// ap-performance, recent-events, help, stop
    #[arg(default_value = "launch")]
    pub intent: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Print the config file location
    Path,

    /// Store a network token in the system keyring
    SetToken {
        /// Network id
        network: String,

        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
