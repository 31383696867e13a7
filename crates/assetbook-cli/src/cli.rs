use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "assetbook", about = "assetbook: subscriber asset ledger", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// World-state file (created on first write)
    #[arg(long, global = true, default_value = "assetbook-state.json")]
    pub state: PathBuf,

    /// Contract configuration (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Reject creates over existing assets and debits below zero
    #[arg(long, global = true, conflicts_with = "config")]
    pub strict: bool,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Invoke a contract operation with ordered string arguments
    Invoke(InvokeArgs),
    /// List operations and their arguments
    Operations,
    /// List keys that currently hold an asset
    Keys,
}

#[derive(Args)]
pub struct InvokeArgs {
    /// Operation name, e.g. CreateAsset
    pub operation: String,
    /// Arguments in declaration order
    #[arg(allow_hyphen_values = true)]
    pub args: Vec<String>,
}
