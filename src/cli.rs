use clap::{Parser, Subcommand};
use clap_complete::Shell;

use crate::catalog::ProductFilter;

#[derive(Parser)]
#[command(name = "macup")]
#[command(version)]
#[command(about = "Manage macOS software updates - catalogs, settings, installs", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Manage automatic update settings
    #[command(subcommand)]
    Settings(SettingsCommand),

    /// List available updates and full installers
    #[command(subcommand)]
    List(ListCommand),

    /// Install an update by label as a background operation
    Install(InstallArgs),

    /// Start a full OS install from a downloaded installer
    OsInstall(OsInstallArgs),

    /// Download a full OS installer into /Applications
    Download(DownloadArgs),

    /// Run health checks on this host
    Doctor,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Settings
// ============================================================================

#[derive(Subcommand)]
pub enum SettingsCommand {
    /// Converge automatic update settings to the given values
    Apply(SettingsApplyArgs),

    /// Show the current SoftwareUpdate preference state
    Show,
}

#[derive(Parser)]
pub struct SettingsApplyArgs {
    /// Automatically check for updates
    #[arg(long, value_name = "BOOL")]
    pub auto_check: Option<bool>,

    /// Automatically download available updates
    #[arg(long, value_name = "BOOL")]
    pub auto_download: Option<bool>,

    /// Automatically install macOS updates
    #[arg(long, value_name = "BOOL")]
    pub install_macos_updates: Option<bool>,

    /// Automatically install system data files
    #[arg(long, value_name = "BOOL")]
    pub config_data: Option<bool>,

    /// Automatically install critical security updates
    #[arg(long, value_name = "BOOL")]
    pub critical_updates: Option<bool>,

    /// Automatically update App Store apps
    #[arg(long, value_name = "BOOL")]
    pub app_updates: Option<bool>,

    /// Report what would change without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

// ============================================================================
// Listings
// ============================================================================

#[derive(Subcommand)]
pub enum ListCommand {
    /// List available software updates
    Updates {
        /// Only show updates for one product family
        #[arg(short, long, value_enum, default_value_t = ProductFilter::All)]
        product: ProductFilter,

        /// Regex the version must match from its start
        #[arg(long, value_name = "REGEX")]
        version_pattern: Option<String>,

        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },

    /// List available full OS installers
    Installers {
        /// Keep only the newest installer per major version
        #[arg(short, long)]
        latest_only: bool,

        /// Regex the version must match from its start
        #[arg(long, value_name = "REGEX")]
        version_pattern: Option<String>,

        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },
}

// ============================================================================
// Install operations
// ============================================================================

#[derive(Parser)]
pub struct InstallArgs {
    /// Update label exactly as shown by `macup list updates`
    pub label: String,

    /// Local administrator accepting the license
    #[arg(short, long)]
    pub user: String,

    /// Seconds between log polls
    #[arg(long, default_value_t = 3, value_name = "SECS")]
    pub poll_interval: u64,

    /// Seconds to wait for download progress before giving up
    #[arg(long, default_value_t = 30, value_name = "SECS")]
    pub confirm_timeout: u64,
}

#[derive(Parser)]
pub struct OsInstallArgs {
    /// Target macOS major version (13, 14 or 15)
    pub version: u64,

    /// Local administrator accepting the license
    #[arg(short, long)]
    pub user: String,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Seconds between log polls
    #[arg(long, default_value_t = 3, value_name = "SECS")]
    pub poll_interval: u64,

    /// Seconds to wait for preparation progress before giving up
    #[arg(long, default_value_t = 30, value_name = "SECS")]
    pub confirm_timeout: u64,
}

#[derive(Parser)]
pub struct DownloadArgs {
    /// Full version to fetch (e.g. "14.7.2")
    pub version: String,
}
