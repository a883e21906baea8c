//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// Berth - converges an IDE build project to resolved packages
#[derive(Parser)]
#[command(name = "berth")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Bring the project in line with the resolved targets
    Install(InstallArgs),

    /// Show the targets of the project with their dependencies and links
    Graph(GraphArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct InstallArgs {
    /// Reconcile without writing the project, support files or sandbox state
    #[arg(long)]
    pub dry_run: bool,

    /// Print the install report as JSON
    #[arg(long)]
    pub json: bool,

    /// Path to Berth.toml
    #[arg(long, env = "BERTH_MANIFEST_PATH")]
    pub manifest_path: Option<PathBuf>,
}

#[derive(Args)]
pub struct GraphArgs {
    /// Path to Berth.toml
    #[arg(long, env = "BERTH_MANIFEST_PATH")]
    pub manifest_path: Option<PathBuf>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
