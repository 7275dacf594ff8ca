//! Configuration handling for fconf
//!
//! Parses the server configuration file (`conf/fconf.toml`, or a JSON file
//! with the same fields) and the bundler configuration record checked by
//! `fconf bundle check`.

mod bundle;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub use bundle::*;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Directory served under `/static/`
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,

    /// Directory holding the `index.html` home page
    #[serde(default = "default_templates_dir")]
    pub templates_dir: PathBuf,

    /// Directory holding the Asterisk `.conf` files
    #[serde(default = "default_asterisk_config_dir")]
    pub asterisk_config_dir: PathBuf,

    /// Root directory (computed from config file location)
    #[serde(skip)]
    pub root: PathBuf,
}

fn default_port() -> u16 {
    8080
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

fn default_templates_dir() -> PathBuf {
    PathBuf::from("templates")
}

fn default_asterisk_config_dir() -> PathBuf {
    PathBuf::from("/etc/asterisk")
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    /// Load configuration from a file path. Files ending in `.json` are read
    /// as JSON, anything else as TOML.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let canonical_path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };

        let content = fs::read_to_string(&canonical_path)
            .with_context(|| format!("Failed to read config file: {}", canonical_path.display()))?;

        let mut config: Config = if is_json(&canonical_path) {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", canonical_path.display()))?
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse {}", canonical_path.display()))?
        };

        // Set root directory to the directory containing the config file
        config.root = canonical_path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        config.validate()?;

        Ok(config)
    }

    /// Create a default configuration rooted at the current directory
    pub fn default_config() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            static_dir: default_static_dir(),
            templates_dir: default_templates_dir(),
            asterisk_config_dir: default_asterisk_config_dir(),
            root: PathBuf::from("."),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("port must be greater than zero");
        }
        if self.host.trim().is_empty() {
            anyhow::bail!("host must not be empty");
        }
        Ok(())
    }

    /// Absolute directory of the static assets
    pub fn static_dir(&self) -> PathBuf {
        self.root.join(&self.static_dir)
    }

    /// Absolute directory of the templates
    pub fn templates_dir(&self) -> PathBuf {
        self.root.join(&self.templates_dir)
    }

    /// Absolute directory of the Asterisk configuration files
    pub fn asterisk_config_dir(&self) -> PathBuf {
        self.root.join(&self.asterisk_config_dir)
    }

    /// Address to bind the server to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_toml_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fconf.toml");
        fs::write(&path, "port = 9000\nasterisk_config_dir = \"asterisk\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.root, dir.path());
        assert_eq!(config.asterisk_config_dir(), dir.path().join("asterisk"));
        assert_eq!(config.static_dir(), dir.path().join("static"));
        assert_eq!(config.bind_addr(), "0.0.0.0:9000");
    }

    #[test]
    fn test_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"port": 8081, "host": "127.0.0.1", "static_dir": "static", "templates_dir": "templates", "asterisk_config_dir": "/etc/asterisk"}"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.port, 8081);
        assert_eq!(config.asterisk_config_dir(), PathBuf::from("/etc/asterisk"));
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(dir.path().join("missing.toml")).is_err());

        let path = dir.path().join("bad.toml");
        fs::write(&path, "port = 0\n").unwrap();
        assert!(Config::load(&path).is_err());
    }
}
