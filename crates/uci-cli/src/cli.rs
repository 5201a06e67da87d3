use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "uci",
    about = "Diff, patch and render UCI configuration trees",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// TOML file with logging and codec settings
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compute the delta between two tree exports
    Diff(DiffArgs),
    /// Apply a delta to a tree export
    Apply(PatchArgs),
    /// Revert a delta from a tree export
    Revert(PatchArgs),
    /// Print a tree export as UCI text
    Render(TreeArgs),
    /// Print the normalized JSON export of a tree
    Export(TreeArgs),
}

#[derive(Args)]
pub struct DiffArgs {
    pub old: PathBuf,
    pub new: PathBuf,
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct PatchArgs {
    pub tree: PathBuf,
    pub delta: PathBuf,
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct TreeArgs {
    pub tree: PathBuf,
}
