//! CLI argument parsing with clap

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Armory - install and maintain extension artifacts from platform releases
#[derive(Parser, Debug)]
#[command(name = "armory")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install, upgrade, and prune extensions
    Install(InstallArgs),

    /// List extensions available in the catalog
    List(ListArgs),
}

#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Extensions to install, as NAME or NAME@VERSION
    pub extensions: Vec<String>,

    /// Request document sources: file path, `-` for stdin, or http(s) URL
    #[arg(long = "from", value_name = "SOURCE")]
    pub from: Vec<String>,

    /// Extension directory (defaults to ./extensions)
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Refresh installed extensions to their newest versions
    #[arg(short, long)]
    pub upgrade: bool,

    /// Remove installed extensions that are not requested
    #[arg(short, long)]
    pub prune: bool,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Pick extensions from the catalog interactively
    #[arg(short, long)]
    pub interactive: bool,

    #[command(flatten)]
    pub catalog: CatalogArgs,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Also list the available versions of each extension
    #[arg(long)]
    pub versions: bool,

    #[command(flatten)]
    pub catalog: CatalogArgs,
}

/// Options shared by every command that reads the remote catalog
#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Organization that publishes the extensions
    #[arg(long, default_value = "Keyfactor")]
    pub org: String,

    /// Bearer token for the hosting platform
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

impl CatalogArgs {
    /// Build a catalog client from these options
    pub fn catalog(&self) -> armory_extensions::GithubCatalog {
        armory_extensions::GithubCatalog::new(&self.org).with_token(self.token.clone())
    }
}
