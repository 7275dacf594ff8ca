//! Serial modem discovery

use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};

static TRAILING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)$").expect("valid trailing number pattern"));

/// Prefix of the USB serial devices exposed by GSM dongles
const TTY_PREFIX: &str = "ttyUSB";

/// A serial port exposed by a modem
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Device {
    pub name: String,
    pub path: PathBuf,
    pub number: u32,
}

/// Parse the trailing number of a device path, `/dev/ttyUSB3` gives 3
pub fn tty_number(path: &str) -> Result<u32> {
    TRAILING_NUMBER
        .captures(path)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .ok_or_else(|| Error::InvalidDevicePath(path.to_string()))
}

/// Lists the modem serial ports present under a device directory
#[derive(Debug, Clone)]
pub struct DeviceManager {
    dev_dir: PathBuf,
}

impl Default for DeviceManager {
    fn default() -> Self {
        Self::new("/dev")
    }
}

impl DeviceManager {
    pub fn new(dev_dir: impl Into<PathBuf>) -> Self {
        Self {
            dev_dir: dev_dir.into(),
        }
    }

    pub fn dev_dir(&self) -> &Path {
        &self.dev_dir
    }

    /// Scan the device directory, sorted by port number
    pub fn scan(&self) -> Result<Vec<Device>> {
        let mut devices = Vec::new();
        for entry in fs::read_dir(&self.dev_dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with(TTY_PREFIX) {
                continue;
            }
            match tty_number(&name) {
                Ok(number) => devices.push(Device {
                    path: entry.path(),
                    name,
                    number,
                }),
                Err(_) => debug!("Skipping device without port number: {}", name),
            }
        }
        devices.sort_by_key(|d| d.number);
        Ok(devices)
    }
}
