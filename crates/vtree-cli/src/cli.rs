use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "vtree",
    about = "Reconcile JSON virtual trees against an in-memory host",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Reconciler configuration (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build a virtual tree from scratch and print the host markup
    Render(RenderArgs),
    /// Render OLD, reconcile NEW against it, and print the mutations
    Diff(DiffArgs),
}

#[derive(Args)]
pub struct RenderArgs {
    pub tree: PathBuf,
}

#[derive(Args)]
pub struct DiffArgs {
    pub old: PathBuf,
    pub new: PathBuf,
    /// Only print the mutation journal
    #[arg(long)]
    pub no_markup: bool,
}
