//! Server command implementation

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tempfile::TempDir;
use tracing::info;

use crate::config::Config;
use crate::server::Server;
use crate::utils::copy_files;

/// Start the configuration web server
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Port to listen on (overrides the config file)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Host to bind to (overrides the config file)
    #[arg(long)]
    pub host: Option<String>,

    /// Serve a temporary copy of the sample configuration files
    #[arg(long)]
    pub dev: bool,

    /// Directory holding the sample configuration files used with --dev
    #[arg(long, default_value = "sample")]
    pub sample: PathBuf,
}

impl ServeCommand {
    pub async fn execute(&self, config_path: &str) -> Result<()> {
        info!("Loading configuration from {}", config_path);
        let mut config = Config::load(config_path)?;

        let options = ServeOptions {
            host: self.host.clone().unwrap_or_else(|| config.host.clone()),
            port: self.port.unwrap_or(config.port),
            dev: self.dev,
        };

        // Kept alive for the lifetime of the server
        let sandbox = if self.dev {
            Some(create_sandbox(&self.sample, &mut config)?)
        } else {
            None
        };

        eprintln!(
            "{} Starting server at {}\n",
            "→".blue(),
            format!("http://{}:{}", options.host, options.port).cyan().underline()
        );

        if self.dev {
            eprintln!(
                "  {} Development mode {}",
                "•".dimmed(),
                "enabled".green()
            );
        }

        eprintln!(
            "  {} Press {} to stop\n",
            "•".dimmed(),
            "Ctrl+C".yellow()
        );

        let server = Server::new(Arc::new(config), options);
        server.start().await?;

        if let Some(dir) = sandbox {
            remove_sandbox(dir)?;
        }

        Ok(())
    }
}

/// Server options
#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub host: String,
    pub port: u16,
    pub dev: bool,
}

/// Copy the sample files into a fresh temporary directory and point the
/// configuration directory at it
fn create_sandbox(sample: &Path, config: &mut Config) -> Result<TempDir> {
    let dir = tempfile::Builder::new()
        .prefix("fconf")
        .tempdir()
        .context("Failed to create temporary directory")?;
    let copied = copy_files(sample, dir.path())?;
    info!(
        "Copied {} sample file(s) from {} to {}",
        copied,
        sample.display(),
        dir.path().display()
    );
    config.asterisk_config_dir = dir.path().to_path_buf();
    Ok(dir)
}

fn remove_sandbox(dir: TempDir) -> Result<()> {
    info!("Removing {}", dir.path().display());
    dir.close().context("Failed to remove temporary directory")
}
