//! Clap derive structures for the `labfleet` CLI.
//!
//! Defines the command tree, global flags, and shared types. Only depends
//! on clap and clap_complete so `build.rs` can include it for man pages.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// labfleet -- provision emulated router fleets
#[derive(Debug, Parser)]
#[command(
    name = "labfleet",
    version,
    about = "Provision and reconcile emulated router fleets",
    long_about = "Builds a fleet of emulated routers on a network-emulation controller:\n\
        creates each router from a template, cables it to its access switch and\n\
        pushes its startup configuration. Re-running converges without duplicates.",
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
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "LABFLEET_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Controller API root, e.g. http://10.0.0.5:3080/v2
    #[arg(long, short = 'c', global = true)]
    pub controller: Option<String>,

    /// Project UUID (overrides config)
    #[arg(long, short = 'p', global = true)]
    pub project: Option<String>,

    /// Output format [default: `defaults.output` from config, else table]
    #[arg(long, short = 'o', global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: `defaults.color` from config, else auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
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
    /// Create missing routers, cable them to their switches and configure them
    Build,

    /// Start every stopped node
    Start(StartArgs),

    /// Stop every node in the project
    Stop,

    /// Delete every node cabled to an access-switch port
    #[command(alias = "sweep")]
    DeleteRouters,

    /// Render and push configuration to routers that already exist
    PushConfigs,

    /// Write Ansible and/or Nornir inventories for the fleet
    #[command(alias = "inv")]
    Inventory(InventoryArgs),

    /// Render a dhcpd.conf with one fixed lease per router
    Dhcp(DhcpArgs),

    /// List the project's nodes
    #[command(alias = "n")]
    Nodes,

    /// List the project's links
    #[command(alias = "l")]
    Links,

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Command arguments ────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct StartArgs {
    /// Use the controller's bulk start call instead of a staggered start
    #[arg(long, conflicts_with_all = ["pool", "max_jitter"])]
    pub bulk: bool,

    /// Concurrent start calls (overrides provision.stagger_pool_size)
    #[arg(long)]
    pub pool: Option<usize>,

    /// Upper bound of the pause after each start, in seconds
    #[arg(long)]
    pub max_jitter: Option<u64>,
}

#[derive(Debug, Args)]
pub struct InventoryArgs {
    /// Directory for the Ansible inventory
    #[arg(long)]
    pub ansible_dir: Option<PathBuf>,

    /// Directory for the Nornir inventory
    #[arg(long)]
    pub nornir_dir: Option<PathBuf>,

    /// Attach a large synthetic variable list to every host
    #[arg(long)]
    pub stress: bool,
}

#[derive(Debug, Args)]
pub struct DhcpArgs {
    /// Write to this file instead of stdout
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Print the config file path
    Path,
    /// Interactive configuration wizard
    Init,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
