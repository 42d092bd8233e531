//! Token types for the bot scripting language.

use crate::span::Span;

/// A token from lexical analysis.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    /// The type and value of this token.
    pub kind: TokenKind,
    /// Source location of this token.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns true if this token ends a statement.
    #[must_use]
    pub const fn ends_statement(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Separator | TokenKind::RBrace | TokenKind::Eof
        )
    }
}

/// Token types.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    /// A whitespace-delimited word, raw text (may contain `$var` references).
    Word(String),
    /// A `"quoted"` string with escapes processed.
    Str(String),
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// Newline or `;`
    Separator,
    /// End of input.
    Eof,
    /// Lexical error.
    Error(String),
}

impl TokenKind {
    /// Short description for error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Word(w) => format!("'{w}'"),
            Self::Str(s) => format!("\"{s}\""),
            Self::LBrace => "'{'".to_string(),
            Self::RBrace => "'}'".to_string(),
            Self::Separator => "end of statement".to_string(),
            Self::Eof => "end of input".to_string(),
            Self::Error(e) => e.clone(),
        }
    }
}
