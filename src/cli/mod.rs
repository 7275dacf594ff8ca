//! Command-line interface for fconf
//!
//! Provides the main CLI structure using clap with subcommands for:
//! - `serve`: Configuration web server
//! - `show`: Print a configuration file as JSON
//! - `apply`: Rewrite a configuration file from JSON
//! - `bundle`: Check the web interface bundler configuration

mod apply;
mod bundle;
mod serve;
mod show;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

pub use apply::ApplyCommand;
pub use bundle::{BundleAction, BundleCommand};
pub use serve::{ServeCommand, ServeOptions};
pub use show::ShowCommand;

/// fconf - edit Asterisk configuration files through a web interface
#[derive(Parser, Debug)]
#[command(name = "fconf")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the server configuration file
    #[arg(short, long, global = true, env = "FCONF_CONFIG", default_value = "conf/fconf.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the configuration web server
    Serve(ServeCommand),

    /// Print a configuration file as JSON
    Show(ShowCommand),

    /// Rewrite a configuration file from JSON
    Apply(ApplyCommand),

    /// Inspect the bundler configuration of the web interface
    Bundle(BundleCommand),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<()> {
        match &self.command {
            Commands::Serve(cmd) => {
                print_banner();
                cmd.execute(&self.config).await
            }
            Commands::Show(cmd) => cmd.execute(),
            Commands::Apply(cmd) => cmd.execute(),
            Commands::Bundle(cmd) => cmd.execute(),
        }
    }
}

/// Print the fconf banner
fn print_banner() {
    eprintln!(
        "\n{} {} {}\n",
        "☎".cyan(),
        "fconf".bold().cyan(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
}
