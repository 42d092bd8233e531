//! Parser for the bot scripting language.
//!
//! One instruction per statement; statements end at a newline, a `;`, or a
//! closing brace. Block forms (`repeat`, `function`) nest until their
//! matching `}`. Functions must be defined before the first `call` that
//! names them, though a body may call its own function.

use std::collections::HashSet;

use textspace_foundation::{Error, Result};

use crate::ast::{Block, Instruction, Program, Term, Text, is_ident};
use crate::lexer::Lexer;
use crate::span::Span;
use crate::token::{Token, TokenKind};

/// Deepest statement nesting accepted, counting `repeat` and `function`
/// blocks and the consequent of an `if`.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Parses a whole script.
///
/// # Errors
/// Returns a `Syntax` error carrying the line and column of the first problem.
pub fn parse(source: &str) -> Result<Program> {
    Parser::new(source).parse_program()
}

/// Parser for script source.
pub struct Parser<'src> {
    /// The lexer providing tokens.
    lexer: Lexer<'src>,
    /// Current token (lookahead).
    current: Token,
    /// Functions defined so far.
    defined: HashSet<String>,
    /// Statements currently being parsed, outermost included.
    depth: usize,
}

impl<'src> Parser<'src> {
    /// Creates a new parser for the given source.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token();
        Self {
            lexer,
            current,
            defined: HashSet::new(),
            depth: 0,
        }
    }

    /// Parses every statement up to end of input.
    ///
    /// # Errors
    /// Returns a `Syntax` error on the first malformed statement.
    pub fn parse_program(&mut self) -> Result<Program> {
        let body = self.parse_statements(None)?;
        Ok(Program::new(body))
    }

    // =========================================================================
    // Statements
    // =========================================================================

    /// Parses statements until end of input, or until the `}` closing the
    /// block opened at `open`.
    fn parse_statements(&mut self, open: Option<Span>) -> Result<Vec<Instruction>> {
        let mut instructions = Vec::new();
        loop {
            self.skip_separators();
            match self.current.kind {
                TokenKind::Eof => {
                    if let Some(open) = open {
                        return Err(Error::syntax(
                            open.line,
                            open.column,
                            "unterminated block: missing '}'",
                        ));
                    }
                    break;
                }
                TokenKind::RBrace => {
                    if open.is_none() {
                        return Err(self.error("unexpected '}'"));
                    }
                    self.advance();
                    break;
                }
                _ => {
                    instructions.push(self.parse_statement()?);
                    self.expect_statement_end()?;
                }
            }
        }
        Ok(instructions)
    }

    fn parse_statement(&mut self) -> Result<Instruction> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.error("blocks nested too deeply"));
        }
        self.depth += 1;
        let result = self.parse_instruction();
        self.depth -= 1;
        result
    }

    fn parse_instruction(&mut self) -> Result<Instruction> {
        let keyword = match &self.current.kind {
            TokenKind::Word(w) => w.to_ascii_lowercase(),
            TokenKind::Error(msg) => return Err(self.error(msg.clone())),
            other => {
                return Err(self.error(format!(
                    "expected an instruction, found {}",
                    other.describe()
                )));
            }
        };
        let keyword_span = self.current.span;
        self.advance();

        match keyword.as_str() {
            "say" => Ok(Instruction::Say(self.parse_text("say")?)),
            "broadcast" => Ok(Instruction::Broadcast(self.parse_text("broadcast")?)),
            "random_say" => self.parse_random_say(),
            "wait" => self.parse_wait(),
            "set" => self.parse_set(),
            "if" => self.parse_if(),
            "move" => Ok(Instruction::Move(self.parse_term("move needs a room")?)),
            "give" => {
                let (item, target) = self.parse_item_transfer("give")?;
                Ok(Instruction::Give { item, target })
            }
            "take" => {
                let (item, target) = self.parse_item_transfer("take")?;
                Ok(Instruction::Take { item, target })
            }
            "repeat" => self.parse_repeat(),
            "function" => self.parse_function(),
            "call" => self.parse_call(),
            _ => Err(Error::syntax(
                keyword_span.line,
                keyword_span.column,
                format!("unknown instruction '{keyword}'"),
            )),
        }
    }

    fn parse_random_say(&mut self) -> Result<Instruction> {
        let mut alternatives = Vec::new();
        let mut current: Vec<Term> = Vec::new();

        while !self.current.ends_statement() {
            match &self.current.kind {
                TokenKind::Str(s) => current.push(Term::literal(s.clone())),
                TokenKind::Word(w) => {
                    let mut pieces = w.split('|');
                    if let Some(first) = pieces.next().filter(|p| !p.is_empty()) {
                        current.push(Term::parse_word(first));
                    }
                    for piece in pieces {
                        alternatives.push(Text::from(std::mem::take(&mut current)));
                        if !piece.is_empty() {
                            current.push(Term::parse_word(piece));
                        }
                    }
                }
                other => {
                    return Err(self.error(format!("unexpected {}", other.describe())));
                }
            }
            self.advance();
        }
        alternatives.push(Text::from(current));
        alternatives.retain(|alt| !alt.is_empty());

        if alternatives.is_empty() {
            return Err(self.error("random_say needs at least one message"));
        }
        Ok(Instruction::RandomSay(alternatives))
    }

    fn parse_wait(&mut self) -> Result<Instruction> {
        const USAGE: &str = "wait expects a non-negative number of seconds";
        let seconds = match &self.current.kind {
            TokenKind::Word(w) => w.parse::<f64>().ok(),
            _ => None,
        }
        .filter(|s| s.is_finite() && *s >= 0.0)
        .ok_or_else(|| self.error(USAGE))?;
        self.advance();
        Ok(Instruction::Wait(seconds))
    }

    fn parse_set(&mut self) -> Result<Instruction> {
        let name = self.parse_name("set needs a variable name")?;
        let value = self.parse_text("set")?;
        Ok(Instruction::SetVar { name, value })
    }

    fn parse_if(&mut self) -> Result<Instruction> {
        const USAGE: &str =
            "malformed conditional: expected 'if <var> equals <value> then <instruction>'";

        let var = match &self.current.kind {
            TokenKind::Word(w) => {
                let name = w.strip_prefix('$').unwrap_or(w);
                if is_ident(name) {
                    name.to_string()
                } else {
                    return Err(self.error(USAGE));
                }
            }
            _ => return Err(self.error(USAGE)),
        };
        self.advance();
        self.expect_word("equals", USAGE)?;
        let value = self.parse_term(USAGE)?;
        self.expect_word("then", USAGE)?;

        if self.current.ends_statement() {
            return Err(self.error(USAGE));
        }
        if matches!(&self.current.kind, TokenKind::Word(w) if w.eq_ignore_ascii_case("function")) {
            return Err(self.error("a function cannot be defined inside a conditional"));
        }
        let then = self.parse_statement()?;
        Ok(Instruction::If {
            var,
            value,
            then: Box::new(then),
        })
    }

    fn parse_item_transfer(&mut self, keyword: &str) -> Result<(Term, Term)> {
        let usage = format!("{keyword} expects an item and a user");
        let item = self.parse_term(&usage)?;
        let target = self.parse_term(&usage)?;
        Ok((item, target))
    }

    fn parse_repeat(&mut self) -> Result<Instruction> {
        const USAGE: &str = "repeat expects a count and a block";
        let count = match &self.current.kind {
            TokenKind::Word(w) => w.parse::<u32>().ok(),
            _ => None,
        }
        .ok_or_else(|| self.error(USAGE))?;
        self.advance();
        let body = self.parse_block(USAGE)?;
        Ok(Instruction::Repeat { count, body })
    }

    fn parse_function(&mut self) -> Result<Instruction> {
        let name = self.parse_name("function needs a name")?;
        self.defined.insert(name.clone());
        let body = self.parse_block("function expects a block")?;
        Ok(Instruction::FunctionDef { name, body })
    }

    fn parse_call(&mut self) -> Result<Instruction> {
        let span = self.current.span;
        let name = self.parse_name("call needs a function name")?;
        if !self.defined.contains(&name) {
            return Err(Error::syntax(
                span.line,
                span.column,
                format!("call to undefined function '{name}'"),
            ));
        }
        Ok(Instruction::Call(name))
    }

    // =========================================================================
    // Pieces
    // =========================================================================

    fn parse_block(&mut self, usage: &str) -> Result<Block> {
        if self.current.kind != TokenKind::LBrace {
            return Err(self.error(usage));
        }
        let open = self.current.span;
        self.advance();
        let body = self.parse_statements(Some(open))?;
        Ok(body.into())
    }

    /// Remaining words of the statement.
    fn parse_text(&mut self, keyword: &str) -> Result<Text> {
        let mut terms = Vec::new();
        while !self.current.ends_statement() {
            match &self.current.kind {
                TokenKind::Word(w) => terms.push(Term::parse_word(w)),
                TokenKind::Str(s) => terms.push(Term::literal(s.clone())),
                TokenKind::Error(msg) => return Err(self.error(msg.clone())),
                other => {
                    return Err(self.error(format!("unexpected {}", other.describe())));
                }
            }
            self.advance();
        }
        if terms.is_empty() {
            return Err(self.error(format!("{keyword} needs a message")));
        }
        Ok(Text { terms })
    }

    fn parse_term(&mut self, usage: &str) -> Result<Term> {
        let term = match &self.current.kind {
            TokenKind::Word(w) => Term::parse_word(w),
            TokenKind::Str(s) => Term::literal(s.clone()),
            _ => return Err(self.error(usage)),
        };
        self.advance();
        Ok(term)
    }

    fn parse_name(&mut self, usage: &str) -> Result<String> {
        match &self.current.kind {
            TokenKind::Word(w) if is_ident(w) => {
                let name = w.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.error(usage)),
        }
    }

    fn expect_word(&mut self, word: &str, usage: &str) -> Result<()> {
        match &self.current.kind {
            TokenKind::Word(w) if w.eq_ignore_ascii_case(word) => {
                self.advance();
                Ok(())
            }
            _ => Err(self.error(usage)),
        }
    }

    fn expect_statement_end(&mut self) -> Result<()> {
        match self.current.kind {
            TokenKind::Separator => {
                self.advance();
                Ok(())
            }
            TokenKind::RBrace | TokenKind::Eof => Ok(()),
            ref other => Err(self.error(format!(
                "expected end of statement, found {}",
                other.describe()
            ))),
        }
    }

    // =========================================================================
    // Token helpers
    // =========================================================================

    fn advance(&mut self) {
        self.current = self.lexer.next_token();
    }

    fn skip_separators(&mut self) {
        while self.current.kind == TokenKind::Separator {
            self.advance();
        }
    }

    fn error(&self, message: impl Into<String>) -> Error {
        let span = self.current.span;
        Error::syntax(span.line, span.column, message)
    }
}
