//! Clap derive structures for the `heytech` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// heytech -- drive a Heytech shutter controller from the shell
#[derive(Debug, Parser)]
#[command(
    name = "heytech",
    version,
    about = "Control Heytech shutter and climate controllers from the command line",
    long_about = "Talks to a Heytech controller over its LAN line protocol (TCP port 1002).\n\n\
        Reads shutter positions, climate data and the logbook, moves shutters,\n\
        activates scenarios and syncs the device clock.",
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
    /// Device profile to use
    #[arg(long, short = 'p', env = "HEYTECH_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Controller host name or IP address (overrides profile)
    #[arg(long, short = 'H', env = "HEYTECH_HOST", global = true)]
    pub host: Option<String>,

    /// Controller TCP port (overrides profile)
    #[arg(long, env = "HEYTECH_PORT", global = true)]
    pub port: Option<u16>,

    /// Device PIN, sent before every command when set
    #[arg(long, env = "HEYTECH_PIN", global = true, hide_env_values = true)]
    pub pin: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "HEYTECH_OUTPUT",
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

    /// Seconds to wait for the device to answer [default: 10]
    #[arg(long, env = "HEYTECH_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
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
    /// Query everything the device knows and list what was found
    Discover,

    /// List, read and move shutters
    #[command(alias = "sh", alias = "s")]
    Shutters(ShuttersArgs),

    /// Read the weather station (brightness, temperatures, wind, rain)
    Climate,

    /// Show whether the device automation is switched on
    Automation,

    /// List and activate scenarios
    #[command(alias = "sc")]
    Scenarios(ScenariosArgs),

    /// List and move shutter groups
    #[command(alias = "g")]
    Groups(GroupsArgs),

    /// Read or clear the device logbook
    #[command(alias = "log")]
    Logbook(LogbookArgs),

    /// Show per-channel automation parameters
    Params(ParamsArgs),

    /// Device information and maintenance
    #[command(alias = "dev")]
    Device(DeviceArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shutters ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ShuttersArgs {
    #[command(subcommand)]
    pub command: ShuttersCommand,
}

#[derive(Debug, Subcommand)]
pub enum ShuttersCommand {
    /// Discover named shutters with their current position
    #[command(alias = "ls")]
    List,

    /// Read the current position of every channel
    #[command(alias = "pos")]
    Positions,

    /// Move one or more shutters
    Move {
        /// open, close, stop, a position 0-100 or a raw device verb
        action: String,

        /// Channel numbers (1-based)
        #[arg(required = true, num_args = 1..)]
        channels: Vec<u16>,
    },
}

// ── Scenarios ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ScenariosArgs {
    #[command(subcommand)]
    pub command: ScenariosCommand,
}

#[derive(Debug, Subcommand)]
pub enum ScenariosCommand {
    /// List named scenarios
    #[command(alias = "ls")]
    List,

    /// Activate a scenario by number
    Activate {
        /// Scenario number
        number: u16,
    },
}

// ── Groups ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GroupsArgs {
    #[command(subcommand)]
    pub command: GroupsCommand,
}

#[derive(Debug, Subcommand)]
pub enum GroupsCommand {
    /// List groups and their member channels
    #[command(alias = "ls")]
    List,

    /// Move every shutter of a group
    Move {
        /// Group number
        number: u16,

        /// open, close, stop or a position 0-100
        action: String,
    },
}

// ── Logbook ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LogbookArgs {
    #[command(subcommand)]
    pub command: LogbookCommand,
}

#[derive(Debug, Subcommand)]
pub enum LogbookCommand {
    /// Show logbook entries, oldest first
    Show {
        /// Maximum number of entries to read
        #[arg(long, short = 'n', default_value = "50")]
        max: u32,
    },

    /// Erase all logbook entries on the device
    Clear {
        /// Skip the safety check
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

// ── Automation parameters ────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ParamsArgs {
    /// Parameter table to show
    pub kind: ParamsKind,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ParamsKind {
    /// Slat tilt settings
    Jalousie,
    /// Sun shading thresholds
    Shading,
    /// Wind protection thresholds
    Wind,
    /// Rain protection settings
    Rain,
}

// ── Device ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DeviceArgs {
    #[command(subcommand)]
    pub command: DeviceCommand,
}

#[derive(Debug, Subcommand)]
pub enum DeviceCommand {
    /// Show model, firmware and channel count
    Info,

    /// Open a connection and send the test query
    Test,

    /// Set the device clock to the local time
    SyncTime,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display current resolved configuration
    Show,

    /// Print the config file location
    Path,

    /// Set a configuration value on the active profile
    Set {
        /// Config key (host, port, pin, pin_env, idle_timeout)
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
