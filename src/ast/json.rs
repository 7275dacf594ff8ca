//! JSON conversion
//!
//! The JSON form is an object of objects: `{"section": {"key": "value"}}`.
//! Section and key order is preserved (serde_json `preserve_order`). Template
//! flags and `=>` markers are not part of the JSON form.

use std::io::Write;

use serde_json::{Map, Value};

use super::{Document, Entry, Section, MAIN_SECTION};
use crate::error::{Error, Result};

impl Document {
    /// Convert the document into its JSON form
    pub fn to_json(&self) -> Value {
        let mut root = Map::new();
        for section in &self.sections {
            let mut values = Map::new();
            for entry in &section.entries {
                values.insert(entry.key.clone(), Value::String(entry.value.clone()));
            }
            root.insert(section.name.clone(), Value::Object(values));
        }
        Value::Object(root)
    }

    /// Write the JSON form of the document to `dst`
    pub fn write_json<W: Write>(&self, dst: W) -> Result<()> {
        serde_json::to_writer(dst, &self.to_json())?;
        Ok(())
    }

    /// Load a document from its JSON form
    pub fn from_json(src: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(src)?;
        Self::from_json_value(value)
    }

    pub fn from_json_value(value: Value) -> Result<Self> {
        let Value::Object(root) = value else {
            return Err(Error::InvalidJson(
                "top level value must be an object".to_string(),
            ));
        };

        let mut doc = Document::new();
        for (name, body) in root {
            check_section_name(&name)?;
            let mut section = Section::new(name, 0);
            if let Value::Object(values) = body {
                for (key, value) in values {
                    let value = scalar_text(value);
                    check_entry(&section.name, &key, &value)?;
                    section.entries.push(Entry::new(key, value, 0));
                }
            }
            if section.name == MAIN_SECTION {
                doc.sections[0] = section;
            } else {
                doc.sections.push(section);
            }
        }
        Ok(doc)
    }
}

/// Names and values must read back unchanged once printed. A value may hold
/// `;` since the printer escapes it.
fn check_section_name(name: &str) -> Result<()> {
    if name.is_empty() || name.trim() != name || name.contains(['[', ']', ';']) || has_control(name)
    {
        return Err(Error::InvalidJson(format!("invalid section name {name:?}")));
    }
    Ok(())
}

fn check_entry(section: &str, key: &str, value: &str) -> Result<()> {
    let bad_key = key.is_empty()
        || key.trim() != key
        || key.starts_with(['#', '(', ')', '!', ','])
        || key.contains(['=', '[', ']', ';'])
        || has_control(key);
    if bad_key {
        return Err(Error::InvalidJson(format!(
            "invalid key {key:?} in section {section}"
        )));
    }
    if value.trim() != value || has_control(value) {
        return Err(Error::InvalidJson(format!(
            "invalid value for {section}.{key}: {value:?}"
        )));
    }
    Ok(())
}

/// Tabs are allowed inside values, other control characters break lines or
/// fail to scan
fn has_control(text: &str) -> bool {
    text.chars().any(|c| c.is_control() && c != '\t')
}

fn scalar_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
