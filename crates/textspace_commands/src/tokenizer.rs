//! Input tokenization.
//!
//! Splits a raw input line into whitespace-delimited tokens. Quoted strings
//! are kept as single tokens with their inner whitespace intact.

/// A token from player input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputToken {
    /// A bare word, case preserved.
    Word(String),
    /// A quoted string (quotes removed).
    Quoted(String),
}

impl InputToken {
    /// Returns the token text.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Word(s) | Self::Quoted(s) => s,
        }
    }

    /// Consumes the token and returns its text.
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Word(s) | Self::Quoted(s) => s,
        }
    }
}

/// Tokenizes player input.
pub struct InputTokenizer;

impl InputTokenizer {
    /// Tokenizes a raw input string.
    ///
    /// An unterminated quote runs to the end of the line.
    #[must_use]
    pub fn tokenize(input: &str) -> Vec<InputToken> {
        let mut tokens = Vec::new();
        let mut chars = input.chars().peekable();
        let mut current = String::new();

        while let Some(ch) = chars.next() {
            match ch {
                '"' => {
                    if !current.is_empty() {
                        tokens.push(InputToken::Word(std::mem::take(&mut current)));
                    }
                    let mut quoted = String::new();
                    for c in chars.by_ref() {
                        if c == '"' {
                            break;
                        }
                        quoted.push(c);
                    }
                    tokens.push(InputToken::Quoted(quoted));
                }
                c if c.is_whitespace() => {
                    if !current.is_empty() {
                        tokens.push(InputToken::Word(std::mem::take(&mut current)));
                    }
                }
                c => current.push(c),
            }
        }

        if !current.is_empty() {
            tokens.push(InputToken::Word(current));
        }
        tokens
    }

    /// Tokenizes and returns just the token texts.
    #[must_use]
    pub fn words(input: &str) -> Vec<String> {
        Self::tokenize(input)
            .into_iter()
            .map(InputToken::into_text)
            .collect()
    }
}
