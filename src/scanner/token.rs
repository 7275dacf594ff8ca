//! Token definitions

/// Kind of token returned by the [`Scanner`](super::Scanner)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `; ...` line comment or `;-- ... --;` block comment
    Comment,
    /// Run of spaces and tabs
    Whitespace,
    /// `\n`, `\r\n` or a lone `\r`
    NewLine,
    /// Run of identifier characters
    Ident,
    /// Run of any other printable characters
    Text,
    /// `=`
    Assign,
    /// `=>`
    Arrow,
    /// `[`
    LBrace,
    /// `]`
    RBrace,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `!`
    Exclam,
    /// `,`
    Comma,
}

/// A chunk of scanned source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// 1-based line number
    pub line: usize,
    /// 1-based column of the first character
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            column,
        }
    }
}
