use clap::{ArgGroup, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "driftscan")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Read Terraform baselines and imported cloud state for drift detection", long_about = None)]
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
    /// Read the last-deployed resources from one state file
    Baseline(BaselineArgs),

    /// Merge every terraform.tfstate under a directory (imported state)
    Imported(ImportedArgs),

    /// Import deployed resources from a cloud account with terraformer
    Import(ImportArgs),

    /// Show the effective configuration
    Config,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Baseline
// ============================================================================

#[derive(Parser)]
pub struct BaselineArgs {
    /// Path to the state file
    pub path: PathBuf,

    /// Print {"resources": [...]} as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// Imported
// ============================================================================

#[derive(Parser)]
pub struct ImportedArgs {
    /// Root directory to scan
    pub root: PathBuf,

    /// Print {"resources": {...}, "diagnostics": [...]} as JSON
    #[arg(long)]
    pub json: bool,

    /// Stop scanning after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Read every module of legacy state files, not just the first
    #[arg(long)]
    pub all_modules: bool,
}

// ============================================================================
// Import
// ============================================================================

#[derive(Parser)]
#[command(group(ArgGroup::new("scope").required(true).args(["resources", "all"])))]
pub struct ImportArgs {
    /// Cloud provider (defaults to the configured cloud)
    #[arg(long)]
    pub cloud: Option<String>,

    /// Comma-separated resource filter (e.g., ec2,s3,sg)
    #[arg(short, long)]
    pub resources: Option<String>,

    /// Import every resource type
    #[arg(long)]
    pub all: bool,

    /// Comma-separated regions (defaults to the configured regions)
    #[arg(long)]
    pub regions: Option<String>,

    /// Directory for the generated state files
    #[arg(short, long)]
    pub output: PathBuf,

    /// Print {"status", "stdout", "stderr"} as JSON
    #[arg(long)]
    pub json: bool,
}
