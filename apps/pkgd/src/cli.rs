//! Command line interface definition

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// pkgd - single-activity package installation manager
#[derive(Parser)]
#[command(name = "pkgd")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Single-activity package installation manager")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH", env = "PKGD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Toolchain verbosity (overrides the config file)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub verbosity: Option<u8>,

    /// Skip package signature checks
    #[arg(long, global = true)]
    pub no_signature_check: bool,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Install a package, refreshing the repository first
    #[command(alias = "i")]
    Install {
        /// Package name
        name: String,

        /// Exact version to install
        #[arg(long, value_name = "VERSION")]
        version: Option<String>,

        /// Target architecture
        #[arg(long, value_name = "ARCH")]
        arch: Option<String>,

        /// Only download the package into the cache
        #[arg(long)]
        download_only: bool,

        /// Do not install dependencies
        #[arg(long)]
        no_deps: bool,

        /// Force a full repository refresh before installing
        #[arg(long)]
        update_first: bool,
    },

    /// Force a full refresh of the repository metadata
    #[command(alias = "update")]
    Sync,

    /// Print the toolchain configuration that would be written
    RenderConfig,
}

impl Commands {
    /// Name used in reports and logs
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Install {
                download_only: true,
                ..
            } => "download",
            Commands::Install { .. } => "install",
            Commands::Sync => "sync",
            Commands::RenderConfig => "render-config",
        }
    }
}
