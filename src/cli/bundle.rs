//! Bundle command implementation

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use tracing::info;

use crate::config::BundleConfig;

/// Inspect the bundler configuration of the web interface
#[derive(Args, Debug)]
pub struct BundleCommand {
    #[command(subcommand)]
    pub action: BundleAction,
}

#[derive(Subcommand, Debug)]
pub enum BundleAction {
    /// Validate the bundler configuration
    Check {
        /// Bundler configuration file
        #[arg(default_value = "bundle.toml")]
        path: PathBuf,
    },

    /// Resolve a module specifier and report the loader applied to it
    Resolve {
        /// Module specifier, e.g. `components/App`
        specifier: String,

        /// Bundler configuration file
        #[arg(long, default_value = "bundle.toml")]
        path: PathBuf,
    },
}

impl BundleCommand {
    pub fn execute(&self) -> Result<()> {
        match &self.action {
            BundleAction::Check { path } => check(path),
            BundleAction::Resolve { specifier, path } => resolve(path, specifier),
        }
    }
}

fn check(path: &Path) -> Result<()> {
    info!("Checking bundler configuration {}", path.display());
    let config = BundleConfig::load(path)?;

    eprintln!(
        "{} {} ({} variant)",
        "→".blue(),
        path.display().to_string().cyan(),
        config.variant()
    );
    eprintln!(
        "  {} entry  {}",
        "•".dimmed(),
        config.entry_path().display()
    );
    eprintln!(
        "  {} output {}",
        "•".dimmed(),
        config.output_file().display()
    );
    for root in config.resolve_roots() {
        eprintln!("  {} root   {}", "•".dimmed(), root.display());
    }
    for rule in config.loaders() {
        eprintln!(
            "  {} loader {} for /{}/ in {}",
            "•".dimmed(),
            rule.loader.cyan(),
            rule.test,
            rule.include.display()
        );
    }

    let violations = config.validate();
    if violations.is_empty() {
        eprintln!("\n{} Configuration is valid\n", "✓".green().bold());
        return Ok(());
    }

    eprintln!();
    for violation in &violations {
        eprintln!("  {} {}", "✗".red(), violation);
    }
    eprintln!();
    anyhow::bail!("{} violation(s) found in {}", violations.len(), path.display())
}

fn resolve(path: &Path, specifier: &str) -> Result<()> {
    let config = BundleConfig::load(path)?;
    let Some(resolved) = config.resolve_module(specifier) else {
        anyhow::bail!("Cannot resolve '{}'", specifier);
    };

    println!("{}", resolved.display());
    match config.loader_for(&resolved) {
        Some(loader) => eprintln!("  {} loader {}", "•".dimmed(), loader.cyan()),
        None => eprintln!("  {} no loader", "•".dimmed()),
    }
    Ok(())
}
