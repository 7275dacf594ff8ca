//! Show command implementation

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::parser;

/// Print a configuration file as JSON
#[derive(Args, Debug)]
pub struct ShowCommand {
    /// Configuration file to read
    pub file: PathBuf,

    /// Only print this section
    #[arg(short, long)]
    pub section: Option<String>,

    /// Only print the value of this key (in `main` unless --section is given)
    #[arg(short, long)]
    pub key: Option<String>,

    /// Pretty print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

impl ShowCommand {
    pub fn execute(&self) -> Result<()> {
        let src = fs::read_to_string(&self.file)
            .with_context(|| format!("Failed to read {}", self.file.display()))?;
        let doc = parser::parse_str(&src)
            .with_context(|| format!("Failed to parse {}", self.file.display()))?;

        if let Some(key) = &self.key {
            let section = doc.section(self.section.as_deref().unwrap_or("main"))?;
            println!("{}", section.get(key)?);
            return Ok(());
        }

        let mut value = doc.to_json();
        if let Some(name) = &self.section {
            doc.section(name)?;
            value = value[name.as_str()].take();
        }

        let out = if self.pretty {
            serde_json::to_string_pretty(&value)?
        } else {
            serde_json::to_string(&value)?
        };
        println!("{}", out);
        Ok(())
    }
}
