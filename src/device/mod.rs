//! Device configuration files and modem discovery
//!
//! A [`DeviceConfig`] binds a parsed configuration document to a file in the
//! Asterisk configuration directory so it can be edited through JSON and
//! written back.

mod manager;

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::ast::{self, Document};
use crate::error::{Error, Result};
use crate::parser;

pub use manager::{tty_number, Device, DeviceManager};

/// Extension of the configuration files managed by fconf
pub const CONFIG_EXTENSION: &str = "conf";

/// A configuration file that can be exchanged as JSON
pub trait DeviceConfig {
    /// Name of the configuration, without extension
    fn name(&self) -> &str;

    /// Replace the in-memory document with the JSON read from `src`
    fn load_json<R: Read>(&mut self, src: R) -> Result<()>;

    /// Write the in-memory document as JSON
    fn to_json<W: Write>(&self, dst: W) -> Result<()>;

    /// Persist the in-memory document
    fn save(&self) -> Result<()>;
}

/// A GSM modem (chan_dongle) configuration file
#[derive(Debug, Clone)]
pub struct ModemConfig {
    name: String,
    dir: PathBuf,
    document: Document,
}

impl ModemConfig {
    /// Parse `<dir>/<name>.conf`
    pub fn open(dir: impl Into<PathBuf>, name: &str) -> Result<Self> {
        let dir = dir.into();
        let path = config_path(&dir, name);
        debug!("Opening configuration {}", path.display());
        let src = fs::read_to_string(&path)?;
        let document = parser::parse_str(&src)?;
        Ok(Self {
            name: name.to_string(),
            dir,
            document,
        })
    }

    /// Wrap an existing document without touching the filesystem
    pub fn with_document(dir: impl Into<PathBuf>, name: &str, document: Document) -> Self {
        Self {
            name: name.to_string(),
            dir: dir.into(),
            document,
        }
    }

    pub fn path(&self) -> PathBuf {
        config_path(&self.dir, &self.name)
    }

    pub fn backup_path(&self) -> PathBuf {
        self.dir
            .join(format!("{}.{}.bak", self.name, CONFIG_EXTENSION))
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }
}

impl DeviceConfig for ModemConfig {
    fn name(&self) -> &str {
        &self.name
    }

    fn load_json<R: Read>(&mut self, mut src: R) -> Result<()> {
        let mut buf = Vec::new();
        src.read_to_end(&mut buf)?;
        self.document = Document::from_json(&buf)?;
        Ok(())
    }

    fn to_json<W: Write>(&self, dst: W) -> Result<()> {
        self.document.write_json(dst)
    }

    /// Rewrite the existing file in place, keeping its permissions. The
    /// previous content is kept next to it with a `.bak` suffix.
    fn save(&self) -> Result<()> {
        let path = self.path();
        let previous = fs::read(&path)?;
        fs::write(self.backup_path(), previous)?;

        let file = fs::OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&path)?;
        ast::write_to(std::io::BufWriter::new(file), &self.document)?;

        info!("Saved configuration {}", path.display());
        Ok(())
    }
}

/// Path of the configuration file `name` inside `dir`
pub fn config_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.{}", name, CONFIG_EXTENSION))
}

/// Configuration names map to a single file inside the configuration
/// directory, so separators and parent references are refused.
pub fn validate_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && !name.contains(['/', '\\'])
        && name != "."
        && !name.contains("..");
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidName(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind;

    const SAMPLE: &str = include_str!("../../sample/dongle.conf");

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("dongle.conf"), SAMPLE).unwrap();
        dir
    }

    #[test]
    fn test_open_and_to_json() {
        let dir = fixture();
        let modem = ModemConfig::open(dir.path(), "dongle").unwrap();
        assert_eq!(modem.name(), "dongle");

        let mut buf = Vec::new();
        modem.to_json(&mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["general"]["interval"], "15");
        assert_eq!(value["dongle0"]["audio"], "/dev/ttyUSB1");
    }

    #[test]
    fn test_load_json_and_save() {
        let dir = fixture();
        let mut modem = ModemConfig::open(dir.path(), "dongle").unwrap();
        modem
            .load_json(&br#"{"general":{"interval":"30"},"dongle0":{"audio":"/dev/ttyUSB4"}}"#[..])
            .unwrap();
        modem.save().unwrap();

        let saved = ModemConfig::open(dir.path(), "dongle").unwrap();
        let doc = saved.document();
        assert_eq!(doc.section("general").unwrap().get("interval").unwrap(), "30");
        assert_eq!(doc.section("dongle0").unwrap().get("audio").unwrap(), "/dev/ttyUSB4");
        assert!(doc.section("defaults").is_err());

        let backup = fs::read_to_string(modem.backup_path()).unwrap();
        assert_eq!(backup, SAMPLE);
    }

    #[test]
    fn test_save_requires_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let modem = ModemConfig::with_document(dir.path(), "missing", Document::new());
        match modem.save() {
            Err(Error::Io(e)) => assert_eq!(e.kind(), ErrorKind::NotFound),
            other => panic!("expected not found, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("dongle").is_ok());
        assert!(validate_name("sip_custom").is_ok());
        for bad in ["", ".", "..", "../passwd", "a/b", "a\\b"] {
            assert!(validate_name(bad).is_err(), "{bad:?} should be refused");
        }
    }
}
