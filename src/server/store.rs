//! Cache of parsed configuration documents

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::debug;

use crate::ast::Document;
use crate::device::{self, ModemConfig, CONFIG_EXTENSION};
use crate::error::Result;
use crate::utils::list_files_with_extension;

/// Parsed configuration files of one directory, keyed by name
pub struct ConfigStore {
    dir: PathBuf,
    cache: DashMap<String, Arc<Document>>,
    /// Held shared while a file is read into the cache, exclusive while one
    /// is rewritten
    file_lock: RwLock<()>,
}

impl ConfigStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cache: DashMap::new(),
            file_lock: RwLock::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Parsed document for `name`, read from disk on a cache miss
    pub fn load(&self, name: &str) -> Result<Arc<Document>> {
        device::validate_name(name)?;
        if let Some(doc) = self.cache.get(name) {
            return Ok(doc.clone());
        }

        let _guard = self.file_lock.read();
        if let Some(doc) = self.cache.get(name) {
            return Ok(doc.clone());
        }
        let doc = Arc::new(ModemConfig::open(&self.dir, name)?.into_document());
        self.cache.insert(name.to_string(), doc.clone());
        Ok(doc)
    }

    /// Write `document` over the existing file `name`
    pub fn store(&self, name: &str, document: Document) -> Result<Arc<Document>> {
        device::validate_name(name)?;
        let _guard = self.file_lock.write();

        let config = ModemConfig::with_document(&self.dir, name, document);
        device::DeviceConfig::save(&config)?;

        let doc = Arc::new(config.into_document());
        self.cache.insert(name.to_string(), doc.clone());
        Ok(doc)
    }

    pub fn invalidate(&self, name: &str) {
        if self.cache.remove(name).is_some() {
            debug!("Invalidated cached configuration {}", name);
        }
    }

    /// Invalidate the entry backed by `path`, if it is a configuration file
    pub fn invalidate_path(&self, path: &Path) {
        if path.extension().and_then(|e| e.to_str()) != Some(CONFIG_EXTENSION) {
            return;
        }
        if let Some(name) = path.file_stem().and_then(|s| s.to_str()) {
            self.invalidate(name);
        }
    }

    pub fn is_cached(&self, name: &str) -> bool {
        self.cache.contains_key(name)
    }

    /// Names of the configuration files in the directory
    pub fn list(&self) -> anyhow::Result<Vec<String>> {
        list_files_with_extension(&self.dir, CONFIG_EXTENSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::parser;
    use std::fs;

    #[test]
    fn test_load_caches_until_invalidated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dongle.conf");
        fs::write(&path, "[general]\ninterval=15\n").unwrap();

        let store = ConfigStore::new(dir.path());
        let first = store.load("dongle").unwrap();
        assert!(store.is_cached("dongle"));

        fs::write(&path, "[general]\ninterval=30\n").unwrap();
        let cached = store.load("dongle").unwrap();
        assert!(Arc::ptr_eq(&first, &cached));

        store.invalidate_path(&path);
        let fresh = store.load("dongle").unwrap();
        assert_eq!(fresh.section("general").unwrap().get("interval").unwrap(), "30");
    }

    #[test]
    fn test_store_writes_and_caches() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("dongle.conf"), "a=1\n").unwrap();

        let store = ConfigStore::new(dir.path());
        let doc = Document::from_json(br#"{"main":{"a":"2"}}"#).unwrap();
        store.store("dongle", doc).unwrap();

        assert!(store.is_cached("dongle"));
        assert_eq!(fs::read_to_string(dir.path().join("dongle.conf")).unwrap(), "a=2\n");
        assert_eq!(store.list().unwrap(), vec!["dongle"]);
    }

    #[test]
    fn test_reads_never_see_partial_writes() {
        let dir = tempfile::tempdir().unwrap();
        let mut src = String::new();
        for i in 0..400 {
            src.push_str(&format!("[dongle{i}]\naudio=/dev/ttyUSB{i}\n\n"));
        }
        fs::write(dir.path().join("dongle.conf"), &src).unwrap();
        let full = parser::parse_str(&src).unwrap();

        let store = Arc::new(ConfigStore::new(dir.path()));
        let writer = {
            let store = store.clone();
            let full = full.clone();
            std::thread::spawn(move || {
                for _ in 0..100 {
                    store.store("dongle", full.clone()).unwrap();
                }
            })
        };

        let mut partial = 0;
        while !writer.is_finished() {
            store.invalidate("dongle");
            let doc = store.load("dongle").unwrap();
            if doc.sections.len() != full.sections.len() {
                partial += 1;
            }
        }
        writer.join().unwrap();

        assert_eq!(partial, 0);
        assert_eq!(store.load("dongle").unwrap().sections.len(), 401);
    }

    #[test]
    fn test_rejects_bad_names() {
        let store = ConfigStore::new("/etc/asterisk");
        assert!(matches!(store.load("../passwd"), Err(Error::InvalidName(_))));
        assert!(matches!(
            store.store("a/b", Document::new()),
            Err(Error::InvalidName(_))
        ));
    }
}
