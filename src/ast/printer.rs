//! Render a document back to configuration text

use std::io::{self, Write};

use super::{Document, Section, MAIN_SECTION};

/// Render `doc` as configuration text
pub fn print(doc: &Document) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail
    let _ = write_to(&mut buf, doc);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Write `doc` as configuration text to `dst`
pub fn write_to<W: Write>(mut dst: W, doc: &Document) -> io::Result<()> {
    let mut first = true;
    for section in &doc.sections {
        if section.name == MAIN_SECTION {
            if section.entries.is_empty() {
                continue;
            }
        } else {
            if !first {
                writeln!(dst)?;
            }
            write_header(&mut dst, section)?;
        }
        for entry in &section.entries {
            let (key, value) = (escape(&entry.key), escape(&entry.value));
            if entry.object {
                writeln!(dst, "{} => {}", key, value)?;
            } else if value.starts_with('>') {
                // `key=>` would read back as an object entry
                writeln!(dst, "{}= {}", key, value)?;
            } else {
                writeln!(dst, "{}={}", key, value)?;
            }
        }
        first = false;
    }
    dst.flush()
}

/// A bare `;` would start a comment when the file is read back
fn escape(value: &str) -> String {
    value.replace(';', "\\;")
}

fn write_header<W: Write>(dst: &mut W, section: &Section) -> io::Result<()> {
    write!(dst, "[{}]", section.name)?;
    if section.template {
        let mut flags = vec!["!".to_string()];
        flags.extend(section.inherits.iter().cloned());
        write!(dst, "({})", flags.join(","))?;
    } else if !section.inherits.is_empty() {
        write!(dst, "({})", section.inherits.join(","))?;
    }
    writeln!(dst)
}
