//! Lexical scanner for Asterisk style configuration files
//!
//! The scanner works on UTF-8 text and keeps every byte of the input in some
//! token, including whitespace and comments, so callers can decide what to
//! drop. Newlines are reported separately from other whitespace because the
//! configuration format is line oriented.

mod token;

use crate::error::{Error, Result};

pub use token::{Token, TokenKind};

/// Scanner over a configuration source
pub struct Scanner {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    /// Nothing but blanks seen on the current line so far
    at_line_start: bool,
}

impl Scanner {
    /// Create a new scanner for `src`
    pub fn new(src: &str) -> Self {
        Self {
            chars: src.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            at_line_start: true,
        }
    }

    /// Scan the next token, returning `None` at the end of the input
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        let Some(ch) = self.peek() else {
            return Ok(None);
        };

        let tok = match ch {
            c if is_ident(c) => self.scan_run(TokenKind::Ident, is_ident),
            ';' => self.scan_comment(),
            '#' if self.at_line_start => self.scan_comment(),
            ' ' | '\t' => self.scan_run(TokenKind::Whitespace, |c| c == ' ' || c == '\t'),
            '\n' | '\r' => self.scan_newline(),
            '=' => {
                if self.peek_at(1) == Some('>') {
                    self.scan_fixed(TokenKind::Arrow, 2)
                } else {
                    self.scan_fixed(TokenKind::Assign, 1)
                }
            }
            '[' => self.scan_fixed(TokenKind::LBrace, 1),
            ']' => self.scan_fixed(TokenKind::RBrace, 1),
            '(' => self.scan_fixed(TokenKind::LParen, 1),
            ')' => self.scan_fixed(TokenKind::RParen, 1),
            '!' => self.scan_fixed(TokenKind::Exclam, 1),
            ',' => self.scan_fixed(TokenKind::Comma, 1),
            c if c.is_control() => {
                let err = Error::UnexpectedChar {
                    ch: c,
                    line: self.line,
                    column: self.column,
                };
                // Scanning stops at the first error
                self.pos = self.chars.len();
                return Err(err);
            }
            _ => self.scan_text(),
        };

        match tok.kind {
            TokenKind::NewLine => self.at_line_start = true,
            TokenKind::Whitespace => {}
            _ => self.at_line_start = false,
        }

        Ok(Some(tok))
    }

    /// Scan the whole input into a vector of tokens
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        while let Some(tok) = self.next_token()? {
            tokens.push(tok);
        }
        Ok(tokens)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn starts_with(&self, pat: &str) -> bool {
        pat.chars()
            .enumerate()
            .all(|(i, c)| self.peek_at(i) == Some(c))
    }

    /// Consume one character that is not a line break
    fn bump(&mut self, buf: &mut String) {
        if let Some(ch) = self.peek() {
            buf.push(ch);
            self.pos += 1;
            self.column += 1;
        }
    }

    fn scan_fixed(&mut self, kind: TokenKind, len: usize) -> Token {
        let (line, column) = (self.line, self.column);
        let mut text = String::with_capacity(len);
        for _ in 0..len {
            self.bump(&mut text);
        }
        Token::new(kind, text, line, column)
    }

    fn scan_run(&mut self, kind: TokenKind, accept: impl Fn(char) -> bool) -> Token {
        let (line, column) = (self.line, self.column);
        let mut text = String::new();
        while let Some(ch) = self.peek() {
            if !accept(ch) {
                break;
            }
            self.bump(&mut text);
        }
        Token::new(kind, text, line, column)
    }

    /// Text runs keep `\;` together so an escaped semicolon does not start
    /// a comment
    fn scan_text(&mut self) -> Token {
        let (line, column) = (self.line, self.column);
        let mut text = String::new();
        while let Some(ch) = self.peek() {
            if ch == '\\' && self.peek_at(1) == Some(';') {
                self.bump(&mut text);
                self.bump(&mut text);
            } else if is_text(ch) {
                self.bump(&mut text);
            } else {
                break;
            }
        }
        Token::new(TokenKind::Text, text, line, column)
    }

    /// `\r\n` is folded into a single newline token
    fn scan_newline(&mut self) -> Token {
        let (line, column) = (self.line, self.column);
        let text = if self.starts_with("\r\n") {
            self.pos += 2;
            "\r\n".to_string()
        } else {
            let ch = self.chars[self.pos];
            self.pos += 1;
            ch.to_string()
        };
        self.line += 1;
        self.column = 1;
        Token::new(TokenKind::NewLine, text, line, column)
    }

    /// Line comments stop before the line break. Block comments (`;-- ... --;`)
    /// run to their terminator, or to the end of input when unterminated.
    /// `;---` and longer dash runs are plain line comments.
    fn scan_comment(&mut self) -> Token {
        let (line, column) = (self.line, self.column);
        let mut text = String::new();

        if !(self.starts_with(";--") && self.peek_at(3) != Some('-')) {
            while let Some(ch) = self.peek() {
                if ch == '\n' || ch == '\r' {
                    break;
                }
                self.bump(&mut text);
            }
            return Token::new(TokenKind::Comment, text, line, column);
        }

        for _ in 0..3 {
            self.bump(&mut text);
        }
        while let Some(ch) = self.peek() {
            if self.starts_with("--;") {
                for _ in 0..3 {
                    self.bump(&mut text);
                }
                break;
            }
            if ch == '\n' || ch == '\r' {
                let len = if self.starts_with("\r\n") { 2 } else { 1 };
                text.extend(&self.chars[self.pos..self.pos + len]);
                self.pos += len;
                self.line += 1;
                self.column = 1;
            } else {
                self.bump(&mut text);
            }
        }
        Token::new(TokenKind::Comment, text, line, column)
    }
}

impl Iterator for Scanner {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

/// Identifier characters: letters, digits and `_ - + . / : @ *`
pub fn is_ident(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '_' | '-' | '+' | '.' | '/' | ':' | '@' | '*')
}

fn is_special(ch: char) -> bool {
    matches!(
        ch,
        ';' | '=' | '[' | ']' | '(' | ')' | '!' | ',' | ' ' | '\t' | '\n' | '\r'
    )
}

fn is_text(ch: char) -> bool {
    !is_ident(ch) && !is_special(ch) && !ch.is_control()
}
