//! Bundler configuration record
//!
//! Describes how the web interface's JavaScript bundle is produced: one entry
//! file, one output file, and, in the extended variant, extra module roots and
//! loader rules. fconf does not bundle anything itself; it checks the record
//! is well formed and answers the lookups a bundler would make.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::utils::{append_extension, is_subpath};

/// Extensions probed when resolving a module specifier
const MODULE_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx", "mjs", "cjs", "json"];

/// Bundler configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleConfig {
    /// Root source file of the dependency graph
    pub entry: String,

    /// Where the bundle is written
    pub output: BundleOutput,

    /// Additional module roots
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolve: Option<ResolveConfig>,

    /// Loader rules
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<ModuleConfig>,

    /// Directory relative paths are resolved against
    #[serde(skip)]
    pub root: PathBuf,
}

/// Output location of the bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleOutput {
    /// Absolute output directory
    pub path: String,

    /// Bundle file name
    pub filename: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveConfig {
    /// Searched in order after the project root
    #[serde(default)]
    pub root: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleConfig {
    /// Applied in order, first match wins
    #[serde(default)]
    pub loaders: Vec<LoaderRule>,
}

/// Maps matching source files to an external transform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderRule {
    /// Regular expression matched against the file name
    pub test: String,

    /// Directory the rule is limited to
    pub include: PathBuf,

    /// Name of the transform
    pub loader: String,
}

/// Shape of a bundler configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleVariant {
    /// Entry and output only
    Basic,
    /// Also carries resolve roots and/or loader rules
    Extended,
}

impl fmt::Display for BundleVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BundleVariant::Basic => write!(f, "basic"),
            BundleVariant::Extended => write!(f, "extended"),
        }
    }
}

/// A structural property the configuration fails
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Dotted path of the offending field, e.g. `module.loaders[0].test`
    pub field: String,
    pub message: String,
}

impl Violation {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl BundleConfig {
    /// Load from a TOML file, or JSON when the extension is `.json`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let canonical_path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };

        let content = fs::read_to_string(&canonical_path).with_context(|| {
            format!("Failed to read bundle config: {}", canonical_path.display())
        })?;

        let root = canonical_path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        if canonical_path.extension().and_then(|e| e.to_str()) == Some("json") {
            Self::from_json_str(&content, root)
        } else {
            Self::from_toml_str(&content, root)
        }
        .with_context(|| format!("Failed to parse {}", canonical_path.display()))
    }

    pub fn from_toml_str(src: &str, root: impl Into<PathBuf>) -> Result<Self> {
        let mut config: BundleConfig = toml::from_str(src)?;
        config.root = root.into();
        Ok(config)
    }

    pub fn from_json_str(src: &str, root: impl Into<PathBuf>) -> Result<Self> {
        let mut config: BundleConfig = serde_json::from_str(src)?;
        config.root = root.into();
        Ok(config)
    }

    pub fn variant(&self) -> BundleVariant {
        if self.resolve.is_some() || self.module.is_some() {
            BundleVariant::Extended
        } else {
            BundleVariant::Basic
        }
    }

    pub fn resolve_roots(&self) -> &[PathBuf] {
        self.resolve.as_ref().map(|r| r.root.as_slice()).unwrap_or_default()
    }

    pub fn loaders(&self) -> &[LoaderRule] {
        self.module.as_ref().map(|m| m.loaders.as_slice()).unwrap_or_default()
    }

    /// Absolute path of the entry file
    pub fn entry_path(&self) -> PathBuf {
        self.root.join(&self.entry)
    }

    /// `output.path` joined with `output.filename`
    pub fn output_file(&self) -> PathBuf {
        Path::new(&self.output.path).join(&self.output.filename)
    }

    /// Check every structural property, returning the ones that fail
    pub fn validate(&self) -> Vec<Violation> {
        let mut violations = Vec::new();

        if self.entry.trim().is_empty() {
            violations.push(Violation::new("entry", "must not be empty"));
        } else if !self.entry_path().is_file() {
            violations.push(Violation::new(
                "entry",
                format!("file does not exist: {}", self.entry_path().display()),
            ));
        }

        if !Path::new(&self.output.path).is_absolute() {
            violations.push(Violation::new(
                "output.path",
                format!("must be an absolute path, got {:?}", self.output.path),
            ));
        }

        if self.output.filename.trim().is_empty() {
            violations.push(Violation::new("output.filename", "must not be empty"));
        }

        for (i, dir) in self.resolve_roots().iter().enumerate() {
            let full = self.root.join(dir);
            if !full.is_dir() {
                violations.push(Violation::new(
                    format!("resolve.root[{}]", i),
                    format!("directory does not exist: {}", full.display()),
                ));
            }
        }

        for (i, rule) in self.loaders().iter().enumerate() {
            if let Err(e) = Regex::new(&rule.test) {
                violations.push(Violation::new(
                    format!("module.loaders[{}].test", i),
                    format!("invalid pattern: {}", e),
                ));
            }
            let include = self.root.join(&rule.include);
            if !include.exists() {
                violations.push(Violation::new(
                    format!("module.loaders[{}].include", i),
                    format!("path does not exist: {}", include.display()),
                ));
            }
            if rule.loader.trim().is_empty() {
                violations.push(Violation::new(
                    format!("module.loaders[{}].loader", i),
                    "must not be empty",
                ));
            }
        }

        violations
    }

    /// Resolve a module specifier against the project root and then each
    /// resolve root, in order
    pub fn resolve_module(&self, specifier: &str) -> Option<PathBuf> {
        let bases = std::iter::once(self.root.clone())
            .chain(self.resolve_roots().iter().map(|r| self.root.join(r)));

        for base in bases {
            let target = base.join(specifier);
            if target.is_file() {
                return Some(target);
            }
            for ext in MODULE_EXTENSIONS {
                let with_ext = append_extension(&target, ext);
                if with_ext.is_file() {
                    return Some(with_ext);
                }
            }
            if target.is_dir() {
                for ext in MODULE_EXTENSIONS {
                    let index = target.join(format!("index.{}", ext));
                    if index.is_file() {
                        return Some(index);
                    }
                }
            }
        }
        None
    }

    /// Name of the first loader whose pattern matches the file name and whose
    /// include directory contains `path`
    pub fn loader_for(&self, path: &Path) -> Option<&str> {
        let file_name = path.file_name()?.to_str()?;
        self.loaders()
            .iter()
            .find(|rule| {
                let matches = Regex::new(&rule.test)
                    .map(|re| re.is_match(file_name))
                    .unwrap_or(false);
                matches && is_subpath(path, &self.root.join(&rule.include))
            })
            .map(|rule| rule.loader.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC: &str = r#"
entry = "static/app/index.jsx"

[output]
path = "/srv/fconf/static/public"
filename = "bundle.js"
"#;

    const EXTENDED: &str = r#"
entry = "static/app/index.jsx"

[output]
path = "/srv/fconf/static/public"
filename = "bundle.js"

[resolve]
root = ["static/app", "static/vendor"]

[[module.loaders]]
test = '\.jsx?$'
include = "static/app"
loader = "babel"

[[module.loaders]]
test = '\.css$'
include = "static"
loader = "css"
"#;

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let app = dir.path().join("static/app");
        fs::create_dir_all(app.join("components")).unwrap();
        fs::create_dir_all(dir.path().join("static/vendor")).unwrap();
        fs::write(app.join("index.jsx"), "").unwrap();
        fs::write(app.join("components/index.jsx"), "").unwrap();
        fs::write(app.join("config.json"), "{}").unwrap();
        fs::write(dir.path().join("static/vendor/react.js"), "").unwrap();
        dir
    }

    #[test]
    fn test_variants_share_base_shape() {
        let basic = BundleConfig::from_toml_str(BASIC, "/p").unwrap();
        let extended = BundleConfig::from_toml_str(EXTENDED, "/p").unwrap();

        assert_eq!(basic.variant(), BundleVariant::Basic);
        assert_eq!(extended.variant(), BundleVariant::Extended);
        assert!(basic.resolve.is_none() && basic.module.is_none());
        assert_eq!(basic.entry, extended.entry);
        assert_eq!(basic.output, extended.output);
        assert_eq!(
            extended.output_file(),
            PathBuf::from("/srv/fconf/static/public/bundle.js")
        );
    }

    #[test]
    fn test_order_is_preserved() {
        let config = BundleConfig::from_toml_str(EXTENDED, "/p").unwrap();
        let loaders: Vec<&str> = config.loaders().iter().map(|l| l.loader.as_str()).collect();
        assert_eq!(loaders, vec!["babel", "css"]);
        assert_eq!(
            config.resolve_roots(),
            &[PathBuf::from("static/app"), PathBuf::from("static/vendor")]
        );
    }

    #[test]
    fn test_validate_ok() {
        let dir = project();
        let config = BundleConfig::from_toml_str(EXTENDED, dir.path()).unwrap();
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_validate_reports_every_violation() {
        let dir = project();
        let src = r#"
entry = "static/app/missing.jsx"

[output]
path = "static/public"
filename = ""

[resolve]
root = ["nowhere"]

[[module.loaders]]
test = '(unclosed'
include = "static/none"
loader = ""
"#;
        let config = BundleConfig::from_toml_str(src, dir.path()).unwrap();
        let fields: Vec<String> = config.validate().into_iter().map(|v| v.field).collect();
        assert_eq!(
            fields,
            vec![
                "entry",
                "output.path",
                "output.filename",
                "resolve.root[0]",
                "module.loaders[0].test",
                "module.loaders[0].include",
                "module.loaders[0].loader",
            ]
        );
    }

    #[test]
    fn test_resolve_module() {
        let dir = project();
        let config = BundleConfig::from_toml_str(EXTENDED, dir.path()).unwrap();
        let app = dir.path().join("static/app");

        assert_eq!(config.resolve_module("components"), Some(app.join("components/index.jsx")));
        assert_eq!(config.resolve_module("config"), Some(app.join("config.json")));
        assert_eq!(
            config.resolve_module("react"),
            Some(dir.path().join("static/vendor/react.js"))
        );
        assert_eq!(
            config.resolve_module("static/app/index.jsx"),
            Some(app.join("index.jsx"))
        );
        assert_eq!(config.resolve_module("lodash"), None);
    }

    #[test]
    fn test_loader_for() {
        let dir = project();
        let config = BundleConfig::from_toml_str(EXTENDED, dir.path()).unwrap();
        let app = dir.path().join("static/app");

        assert_eq!(config.loader_for(&app.join("index.jsx")), Some("babel"));
        assert_eq!(
            config.loader_for(&dir.path().join("static/vendor/react.js")),
            None
        );
        fs::write(app.join("style.css"), "").unwrap();
        assert_eq!(config.loader_for(&app.join("style.css")), Some("css"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = project();
        let path = dir.path().join("bundle.toml");
        fs::write(&path, BASIC).unwrap();
        let config = BundleConfig::load(&path).unwrap();
        assert_eq!(config.root, dir.path());
        assert!(config.entry_path().is_file());

        let json = dir.path().join("bundle.json");
        fs::write(
            &json,
            r#"{"entry": "static/app/index.jsx", "output": {"path": "/out", "filename": "bundle.js"}}"#,
        )
        .unwrap();
        assert_eq!(BundleConfig::load(&json).unwrap().variant(), BundleVariant::Basic);
    }
}
