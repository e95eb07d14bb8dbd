use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "wirestate")]
#[command(version)]
#[command(about = "Reconcile network-device resources against a desired state", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Device snapshot file (simulated device state)
    #[arg(long, global = true, env = "WIRESTATE_DEVICE")]
    pub device: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Reconcile one resource: plan, confirm, apply
    Apply(ApplyArgs),

    /// Show the observed state of one resource
    Show(ShowArgs),

    /// List resource kinds and their attribute schemas
    Kinds,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser)]
pub struct ApplyArgs {
    /// Resource kind (interface, vlan, switchport, vxlan, ipinterface)
    #[arg(short, long, required_unless_present = "file")]
    pub kind: Option<String>,

    /// Resource identity (interface name, VLAN id)
    #[arg(short, long, required_unless_present = "file")]
    pub id: Option<String>,

    /// Desired attribute value as name=value (repeatable)
    #[arg(short, long = "set", value_name = "NAME=VALUE")]
    pub set: Vec<String>,

    /// Desired attribute with no preference (NULL) (repeatable)
    #[arg(long, value_name = "NAME")]
    pub unset: Vec<String>,

    /// Desired state is absent: delete (or reset a permanent resource)
    #[arg(long)]
    pub absent: bool,

    /// Read the desired state from a TOML/JSON spec file instead of flags
    #[arg(short, long, conflicts_with_all = ["kind", "id", "set", "unset", "absent"])]
    pub file: Option<PathBuf>,

    /// Treat NULL desired values as "reset to device default"
    #[arg(long)]
    pub null_as_default: bool,

    /// Compute and report the plan without mutating the device
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser)]
pub struct ShowArgs {
    /// Resource kind
    #[arg(short, long)]
    pub kind: String,

    /// Resource identity
    #[arg(short, long)]
    pub id: String,

    /// Machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}
