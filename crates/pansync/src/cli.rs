//! Clap derive structures for the `pansync` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! This module must stay self-contained (clap + clap_complete only): the
//! build script includes it directly to generate man pages.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// pansync -- idempotent configuration sync for PAN-OS firewalls
#[derive(Debug, Parser)]
#[command(
    name = "pansync",
    version,
    about = "Reconcile PAN-OS firewall configuration from the command line",
    long_about = "Drives a firewall's XML configuration API toward a declared state.\n\n\
        Every command probes the device first and mutates only what is\n\
        missing, so re-running with the same arguments is always safe.\n\
        Changes are committed automatically unless --no-commit is given.",
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
    /// Device hostname or URL (bare hosts get https://)
    #[arg(long, short = 'd', env = "PANSYNC_DEVICE", global = true)]
    pub device: Option<String>,

    /// Username for keygen authentication [default: admin]
    #[arg(long, env = "PANSYNC_USERNAME", global = true)]
    pub username: Option<String>,

    /// Password for keygen authentication (prompted when absent)
    #[arg(long, env = "PANSYNC_PASSWORD", global = true, hide_env = true)]
    pub password: Option<String>,

    /// Pre-generated API key (skips the keygen round trip)
    #[arg(long, env = "PANSYNC_API_KEY", global = true, hide_env = true)]
    pub api_key: Option<String>,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "PANSYNC_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds [default: 30]
    #[arg(long, env = "PANSYNC_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "PANSYNC_OUTPUT",
        default_value = "text",
        global = true
    )]
    pub output: OutputFormat,

    /// Leave changes in the candidate configuration without committing
    #[arg(long, global = true)]
    pub no_commit: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// One-line outcome (default, interactive)
    Text,
    /// Pretty-printed JSON (scripting)
    Json,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage layer3 ethernet interfaces
    #[command(alias = "if")]
    Interface(InterfaceArgs),

    /// Manage virtual routers and their static routes
    Vr(VrArgs),

    /// Manage interface management profiles
    #[command(alias = "prof")]
    Profile(ProfileArgs),

    /// Commit the candidate configuration and wait for the job
    Commit,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  INTERFACE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct InterfaceArgs {
    #[command(subcommand)]
    pub command: InterfaceCommand,
}

#[derive(Debug, Subcommand)]
pub enum InterfaceCommand {
    /// Create a layer3 interface and join it to a zone and virtual router
    Add {
        /// Interface name (e.g., ethernet1/3)
        name: String,

        /// Addressing mode
        #[arg(long, default_value = "dhcp", value_enum)]
        mode: InterfaceMode,

        /// Interface address in CIDR form (static mode only)
        #[arg(long)]
        address: Option<String>,

        /// Security zone to join
        #[arg(long, required = true)]
        zone: String,

        /// Virtual router to join
        #[arg(long, default_value = "default")]
        vr: String,

        /// Install the default route learned via DHCP
        #[arg(long)]
        default_route: bool,
    },

    /// Show the interface's configuration subtree
    Show {
        /// Interface name
        name: String,
    },
}

#[derive(Debug, Clone, ValueEnum)]
pub enum InterfaceMode {
    /// Address via DHCP client
    Dhcp,
    /// Static address (requires --address)
    Static,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  VIRTUAL ROUTER
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct VrArgs {
    #[command(subcommand)]
    pub command: VrCommand,
}

#[derive(Debug, Subcommand)]
pub enum VrCommand {
    /// Create a virtual router
    Add {
        /// Virtual router name
        name: String,
    },

    /// Delete a virtual router
    Del {
        /// Virtual router name
        name: String,
    },

    /// Add a static route to an existing virtual router
    RouteAdd {
        /// Virtual router the route belongs to
        vr: String,

        /// Route entry name
        name: String,

        /// Destination prefix in CIDR form
        #[arg(long, required = true)]
        destination: String,

        /// Next hop value (IP address, or virtual router name for next-vr)
        #[arg(long, required = true)]
        next_hop: String,

        /// Next hop kind
        #[arg(long, default_value = "ip", value_enum)]
        next_hop_type: NextHopType,
    },

    /// Show the virtual router's configuration subtree
    Show {
        /// Virtual router name
        name: String,
    },
}

#[derive(Debug, Clone, ValueEnum)]
pub enum NextHopType {
    /// Forward to an IP address
    Ip,
    /// Forward into another virtual router
    NextVr,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  MANAGEMENT PROFILE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: ProfileCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Create an interface management profile (ping is permitted by default)
    Add {
        /// Profile name
        name: String,

        /// Permit HTTP management access
        #[arg(long)]
        http: bool,

        /// Permit HTTPS management access
        #[arg(long)]
        https: bool,

        /// Permit HTTP OCSP
        #[arg(long)]
        http_ocsp: bool,

        /// Permit SSH management access
        #[arg(long)]
        ssh: bool,

        /// Permit SNMP
        #[arg(long)]
        snmp: bool,

        /// Permit the User-ID service
        #[arg(long)]
        userid_service: bool,

        /// Permit the User-ID syslog listener over SSL
        #[arg(long)]
        userid_syslog_listener_ssl: bool,

        /// Permit the User-ID syslog listener over UDP
        #[arg(long)]
        userid_syslog_listener_udp: bool,

        /// Drop the default ping permission
        #[arg(long)]
        no_ping: bool,

        /// Permit response pages
        #[arg(long)]
        response_pages: bool,

        /// Permit telnet (plaintext; prefer SSH)
        #[arg(long)]
        telnet: bool,

        /// Permitted source address (repeatable; empty means any)
        #[arg(long = "permit", value_name = "CIDR")]
        permit: Vec<String>,
    },

    /// Delete an interface management profile
    Del {
        /// Profile name
        name: String,
    },

    /// Show the profile's configuration subtree
    Show {
        /// Profile name
        name: String,
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
