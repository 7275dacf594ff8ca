//! Parser for Asterisk style configuration files
//!
//! The format is line oriented:
//!
//! ```text
//! ; comment
//! key=value               ; goes to the implicit `main` section
//! [section]
//! key = value with spaces
//! exten => s,1,Answer()
//! [template](!)
//! [derived](template)
//! ```
//!
//! A section runs until the next header. A literal `;` is written `\;`.

use std::io::Read;

use tracing::trace;

use crate::ast::{Document, Entry, Section};
use crate::error::{Error, Result};
use crate::scanner::{Scanner, Token, TokenKind};

/// Parser over the scanned tokens of a configuration source
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Scan `src` and return a parser for it. Comments are dropped here,
    /// whitespace is kept so values retain their inner spacing.
    pub fn new(src: &str) -> Result<Self> {
        let tokens = Scanner::new(src)
            .tokenize()?
            .into_iter()
            .filter(|t| t.kind != TokenKind::Comment)
            .collect::<Vec<_>>();
        trace!("scanned {} tokens", tokens.len());
        Ok(Self { tokens, pos: 0 })
    }

    /// Parse the input into a [`Document`]
    pub fn parse(&mut self) -> Result<Document> {
        let mut doc = Document::new();
        let mut current: Option<Section> = None;

        loop {
            self.skip_blanks();
            let Some(tok) = self.peek() else { break };

            match tok.kind {
                TokenKind::NewLine => {
                    self.pos += 1;
                }
                TokenKind::LBrace => {
                    let section = self.parse_header()?;
                    if let Some(done) = current.replace(section) {
                        doc.push_section(done);
                    }
                }
                TokenKind::Ident | TokenKind::Text => {
                    let entry = self.parse_entry()?;
                    match current.as_mut() {
                        Some(section) => section.entries.push(entry),
                        None => doc.sections[0].entries.push(entry),
                    }
                }
                TokenKind::Assign | TokenKind::Arrow => {
                    return Err(Error::EmptyKey { line: tok.line });
                }
                _ => {
                    return Err(Error::UnexpectedToken {
                        text: tok.text.clone(),
                        line: tok.line,
                    });
                }
            }
        }

        if let Some(done) = current {
            doc.push_section(done);
        }
        Ok(doc)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn skip_blanks(&mut self) {
        while matches!(self.peek(), Some(t) if t.kind == TokenKind::Whitespace) {
            self.pos += 1;
        }
    }

    /// `[name]` optionally followed by `(!)` or `(a,b)`
    fn parse_header(&mut self) -> Result<Section> {
        let line = match self.next() {
            Some(tok) => tok.line,
            None => return Err(Error::UnterminatedSection { line: 0 }),
        };

        let mut name = String::new();
        loop {
            match self.next() {
                Some(tok) if tok.kind == TokenKind::RBrace => break,
                Some(tok) if tok.kind == TokenKind::NewLine => {
                    return Err(Error::UnterminatedSection { line });
                }
                Some(tok) if tok.kind == TokenKind::LBrace => {
                    return Err(Error::UnexpectedToken {
                        text: tok.text.clone(),
                        line,
                    });
                }
                Some(tok) => name.push_str(&tok.text),
                None => return Err(Error::UnterminatedSection { line }),
            }
        }

        let name = name.trim();
        if name.is_empty() {
            return Err(Error::EmptySectionName { line });
        }
        let mut section = Section::new(name, line);

        self.skip_blanks();
        if matches!(self.peek(), Some(t) if t.kind == TokenKind::LParen) {
            self.pos += 1;
            self.parse_header_flags(&mut section)?;
        }

        self.skip_blanks();
        match self.next() {
            None => {}
            Some(tok) if tok.kind == TokenKind::NewLine => {}
            Some(tok) => {
                return Err(Error::UnexpectedToken {
                    text: tok.text.clone(),
                    line,
                });
            }
        }

        trace!("section {} at line {}", section.name, line);
        Ok(section)
    }

    fn parse_header_flags(&mut self, section: &mut Section) -> Result<()> {
        let line = section.line;
        let mut flags = Vec::new();
        let mut item = String::new();
        loop {
            match self.next() {
                Some(tok) if tok.kind == TokenKind::RParen => break,
                Some(tok) if tok.kind == TokenKind::Comma => flags.push(std::mem::take(&mut item)),
                Some(tok) if tok.kind == TokenKind::NewLine => {
                    return Err(Error::UnexpectedToken {
                        text: "(".to_string(),
                        line,
                    });
                }
                Some(tok) => item.push_str(&tok.text),
                None => {
                    return Err(Error::UnexpectedToken {
                        text: "(".to_string(),
                        line,
                    });
                }
            }
        }
        flags.push(item);

        for flag in flags {
            match flag.trim() {
                "" => {}
                "!" => section.template = true,
                name => section.inherits.push(name.to_string()),
            }
        }
        Ok(())
    }

    /// `key=value` or `key => value`, up to the end of the line
    fn parse_entry(&mut self) -> Result<Entry> {
        let line = self.peek().map(|t| t.line).unwrap_or_default();

        let mut key = String::new();
        let object = loop {
            match self.peek() {
                Some(tok) if tok.kind == TokenKind::Assign => break false,
                Some(tok) if tok.kind == TokenKind::Arrow => break true,
                Some(tok) if tok.kind != TokenKind::NewLine => {
                    key.push_str(&tok.text);
                    self.pos += 1;
                }
                _ => {
                    return Err(Error::MissingAssign {
                        key: key.trim().to_string(),
                        line,
                    });
                }
            }
        };
        self.pos += 1;

        let mut value = String::new();
        while let Some(tok) = self.peek() {
            if tok.kind == TokenKind::NewLine {
                break;
            }
            value.push_str(&tok.text);
            self.pos += 1;
        }

        let key = unescape(key.trim());
        let value = unescape(value.trim());
        Ok(if object {
            Entry::object(key, value, line)
        } else {
            Entry::new(key, value, line)
        })
    }
}

/// `\;` stands for a literal semicolon
fn unescape(text: &str) -> String {
    text.replace("\\;", ";")
}

/// Parse a configuration source held in memory
pub fn parse_str(src: &str) -> Result<Document> {
    Parser::new(src)?.parse()
}

/// Read and parse a configuration source
pub fn parse_reader<R: Read>(mut src: R) -> Result<Document> {
    let mut buf = String::new();
    src.read_to_string(&mut buf)?;
    parse_str(&buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::print;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = include_str!("../../sample/dongle.conf");

    #[test]
    fn test_parse_sample() {
        let doc = parse_str(SAMPLE).unwrap();

        let general = doc.section("general").unwrap();
        assert_eq!(general.get("interval").unwrap(), "15");

        let defaults = doc.section("defaults").unwrap();
        for (key, value) in [("group", "0"), ("language", "en"), ("rxgain", "-5")] {
            assert_eq!(defaults.get(key).unwrap(), value, "key {key}");
        }

        let dongle = doc.section("dongle0").unwrap();
        assert_eq!(dongle.get("audio").unwrap(), "/dev/ttyUSB1");
        assert_eq!(dongle.get("data").unwrap(), "/dev/ttyUSB2");
    }

    #[test]
    fn test_main_section_first() {
        let doc = parse_str("[a]\nx=1\n").unwrap();
        assert_eq!(doc.section_names().collect::<Vec<_>>(), vec!["main", "a"]);

        let doc = parse_str("top=1\n[a]\nx=1\n").unwrap();
        assert_eq!(doc.main().get("top").unwrap(), "1");
        assert!(doc.section("a").unwrap().get("top").is_err());
    }

    #[test]
    fn test_section_spans_blank_lines() {
        let doc = parse_str("[a]\nx=1\n\n\n\ny=2\n[b]\nz=3").unwrap();
        let a = doc.section("a").unwrap();
        assert_eq!(a.get("y").unwrap(), "2");
        assert!(doc.main().entries.is_empty());
        assert_eq!(doc.section("b").unwrap().get("z").unwrap(), "3");
    }

    #[test]
    fn test_values_keep_inner_spacing() {
        let doc = parse_str("callerid = \"Farm Radio\" <100>   ; trailing\n").unwrap();
        let entry = &doc.main().entries[0];
        assert_eq!(entry.key, "callerid");
        assert_eq!(entry.value, "\"Farm Radio\" <100>");
        assert_eq!(entry.line, 1);
    }

    #[test]
    fn test_object_and_templates() {
        let src = "[base](!)\ncontext=default\n[dongle0](base, other)\nexten => s,1,Dial(SIP/100)\n";
        let doc = parse_str(src).unwrap();

        let base = doc.section("base").unwrap();
        assert!(base.template);
        assert!(base.inherits.is_empty());

        let dongle = doc.section("dongle0").unwrap();
        assert!(!dongle.template);
        assert_eq!(dongle.inherits, vec!["base", "other"]);
        assert!(dongle.entries[0].object);
        assert_eq!(dongle.get("exten").unwrap(), "s,1,Dial(SIP/100)");
    }

    #[test]
    fn test_escaped_semicolon() {
        let doc = parse_str("[a]\ndial=SIP/100\\;tag ; comment\n").unwrap();
        assert_eq!(doc.section("a").unwrap().get("dial").unwrap(), "SIP/100;tag");
    }

    #[test]
    fn test_empty_value() {
        let doc = parse_str("[a]\nimei=\n").unwrap();
        assert_eq!(doc.section("a").unwrap().get("imei").unwrap(), "");
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            parse_str("[general\nx=1"),
            Err(Error::UnterminatedSection { line: 1 })
        ));
        assert!(matches!(
            parse_str("[ ]\n"),
            Err(Error::EmptySectionName { line: 1 })
        ));
        assert!(matches!(
            parse_str("[a]\nlonely\n"),
            Err(Error::MissingAssign { line: 2, .. })
        ));
        assert!(matches!(
            parse_str("=value\n"),
            Err(Error::EmptyKey { line: 1 })
        ));
        assert!(matches!(
            parse_str("] x\n"),
            Err(Error::UnexpectedToken { line: 1, .. })
        ));
        assert!(matches!(
            parse_str("[a] junk\n"),
            Err(Error::UnexpectedToken { line: 1, .. })
        ));
    }

    #[test]
    fn test_reprint_is_stable() {
        let doc = parse_str(SAMPLE).unwrap();
        let printed = print(&doc);
        let reparsed = parse_str(&printed).unwrap();
        assert_eq!(print(&reparsed), printed);
        assert_eq!(reparsed.to_json(), doc.to_json());
    }

    #[test]
    fn test_parse_reader() {
        let doc = parse_reader("a=1\n".as_bytes()).unwrap();
        assert_eq!(doc.main().get("a").unwrap(), "1");
    }
}
