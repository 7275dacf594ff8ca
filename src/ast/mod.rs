//! Document model for parsed configuration files
//!
//! A configuration file is a list of sections (namespaces) holding key/value
//! entries. Entries that appear before the first section header are collected
//! into an implicit section named [`MAIN_SECTION`], which always comes first.

mod json;
mod printer;

use crate::error::{Error, Result};

pub use printer::{print, write_to};

/// Name of the implicit section holding entries outside any header
pub const MAIN_SECTION: &str = "main";

/// A parsed configuration file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub sections: Vec<Section>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document holding only an empty `main` section
    pub fn new() -> Self {
        Self {
            sections: vec![Section::new(MAIN_SECTION, 0)],
        }
    }

    /// Returns the section named `name`
    pub fn section(&self, name: &str) -> Result<&Section> {
        self.sections
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| Error::SectionNotFound(name.to_string()))
    }

    pub fn section_mut(&mut self, name: &str) -> Result<&mut Section> {
        self.sections
            .iter_mut()
            .find(|s| s.name == name)
            .ok_or_else(|| Error::SectionNotFound(name.to_string()))
    }

    /// The implicit `main` section
    pub fn main(&self) -> &Section {
        // `main` is created by every constructor and never removed
        &self.sections[0]
    }

    /// Add a section, keeping `main` in front
    pub fn push_section(&mut self, section: Section) {
        if section.name == MAIN_SECTION {
            self.sections[0].entries.extend(section.entries);
        } else {
            self.sections.push(section);
        }
    }

    /// Names of all sections in document order
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.sections.iter().all(|s| s.entries.is_empty()) && self.sections.len() == 1
    }
}

/// A named namespace of configuration entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    /// Line of the section header, 0 for `main`
    pub line: usize,
    /// Declared with `(!)`
    pub template: bool,
    /// Templates this section inherits from, `[name](a,b)`
    pub inherits: Vec<String>,
    pub entries: Vec<Entry>,
}

impl Section {
    pub fn new(name: impl Into<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            line,
            template: false,
            inherits: Vec::new(),
            entries: Vec::new(),
        }
    }

    /// Returns the value of `key`. The last definition wins when a key is
    /// repeated.
    pub fn get(&self, key: &str) -> Result<&str> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.key == key)
            .map(|e| e.value.as_str())
            .ok_or_else(|| Error::KeyNotFound(key.to_string()))
    }

    /// All values of `key` in definition order
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |e| e.key == key)
            .map(|e| e.value.as_str())
    }

    /// Replace the last definition of `key`, or append a new entry
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.entries.iter_mut().rev().find(|e| e.key == key) {
            Some(entry) => entry.value = value,
            None => self.entries.push(Entry::new(key, value, 0)),
        }
    }
}

/// A single `key=value` (or `key => value`) definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: String,
    pub value: String,
    pub line: usize,
    /// Defined with `=>`
    pub object: bool,
}

impl Entry {
    pub fn new(key: impl Into<String>, value: impl Into<String>, line: usize) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            line,
            object: false,
        }
    }

    pub fn object(key: impl Into<String>, value: impl Into<String>, line: usize) -> Self {
        Self {
            object: true,
            ..Self::new(key, value, line)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        let mut doc = Document::new();
        doc.sections[0].entries.push(Entry::new("interval", "15", 1));
        let mut sec = Section::new("dongle0", 3);
        sec.entries.push(Entry::new("audio", "/dev/ttyUSB1", 4));
        sec.entries.push(Entry::new("audio", "/dev/ttyUSB2", 5));
        doc.push_section(sec);
        doc
    }

    #[test]
    fn test_section_lookup() {
        let doc = sample();
        assert_eq!(doc.section("main").unwrap().get("interval").unwrap(), "15");
        assert!(matches!(doc.section("missing"), Err(Error::SectionNotFound(_))));
        assert!(matches!(
            doc.main().get("missing"),
            Err(Error::KeyNotFound(_))
        ));
    }

    #[test]
    fn test_repeated_key_last_wins() {
        let doc = sample();
        let sec = doc.section("dongle0").unwrap();
        assert_eq!(sec.get("audio").unwrap(), "/dev/ttyUSB2");
        assert_eq!(
            sec.get_all("audio").collect::<Vec<_>>(),
            vec!["/dev/ttyUSB1", "/dev/ttyUSB2"]
        );
    }

    #[test]
    fn test_set_replaces_or_appends() {
        let mut doc = sample();
        let sec = doc.section_mut("dongle0").unwrap();
        sec.set("audio", "/dev/ttyUSB3");
        sec.set("imei", "123");
        assert_eq!(sec.entries.len(), 3);
        assert_eq!(sec.entries[0].value, "/dev/ttyUSB1");
        assert_eq!(sec.get("audio").unwrap(), "/dev/ttyUSB3");
        assert_eq!(sec.get("imei").unwrap(), "123");
    }

    #[test]
    fn test_push_main_merges() {
        let mut doc = Document::new();
        let mut main = Section::new(MAIN_SECTION, 0);
        main.entries.push(Entry::new("a", "1", 1));
        doc.push_section(main);
        assert_eq!(doc.sections.len(), 1);
        assert_eq!(doc.main().get("a").unwrap(), "1");
        assert!(!doc.is_empty());
        assert!(Document::new().is_empty());
    }
}
