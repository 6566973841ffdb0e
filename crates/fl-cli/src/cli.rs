use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "feedledger",
    about = "FeedLedger: a post feed over content-addressed storage",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Print the current snapshot pointer
    Pointer(ConfigArg),
    /// List post records
    Posts(PostsArgs),
}

#[derive(Args)]
pub struct ConfigArg {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct ServeArgs {
    #[command(flatten)]
    pub config: ConfigArg,
    /// Overrides `bind_addr` from the configuration.
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}

#[derive(Args)]
pub struct PostsArgs {
    #[command(flatten)]
    pub config: ConfigArg,
    /// Only posts by this author.
    #[arg(long)]
    pub author: Option<String>,
}
