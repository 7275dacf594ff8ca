//! Apply command implementation

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tracing::info;

use crate::ast::Document;
use crate::device::{DeviceConfig, ModemConfig, CONFIG_EXTENSION};

/// Rewrite a configuration file from JSON
#[derive(Args, Debug)]
pub struct ApplyCommand {
    /// Configuration file to rewrite, it must already exist
    pub file: PathBuf,

    /// JSON document to apply, `-` reads standard input
    pub json: String,
}

impl ApplyCommand {
    pub fn execute(&self) -> Result<()> {
        if self.file.extension().and_then(|e| e.to_str()) != Some(CONFIG_EXTENSION) {
            anyhow::bail!(
                "{} is not a .{} file",
                self.file.display(),
                CONFIG_EXTENSION
            );
        }
        let name = self
            .file
            .file_stem()
            .and_then(|s| s.to_str())
            .context("Configuration file name is not valid UTF-8")?;
        let dir = self
            .file
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let src = if self.json == "-" {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read standard input")?;
            buf
        } else {
            fs::read(&self.json).with_context(|| format!("Failed to read {}", self.json))?
        };

        let mut config = ModemConfig::with_document(dir, name, Document::new());
        config
            .load_json(src.as_slice())
            .context("Failed to load JSON document")?;
        config
            .save()
            .with_context(|| format!("Failed to write {}", self.file.display()))?;

        info!("Applied {} to {}", self.json, self.file.display());
        eprintln!(
            "{} Wrote {} (previous version in {})",
            "✓".green(),
            self.file.display().to_string().cyan(),
            config.backup_path().display().to_string().dimmed()
        );
        Ok(())
    }
}
