//! Instruction tree for the bot scripting language.
//!
//! A parsed script is a [`Program`]: a block of [`Instruction`]s, where
//! `repeat` and `function` own nested blocks. Blocks are reference-counted
//! slices so interpreter frames and function tables share them without
//! copying.

use std::fmt;
use std::sync::Arc;

/// A shared sequence of instructions.
pub type Block = Arc<[Instruction]>;

/// Piece of a [`Term`]: literal text or a variable reference.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Fragment {
    /// Literal text.
    Lit(String),
    /// `$name`, resolved at execution time.
    Var(String),
}

/// One whitespace-free word of script text, possibly interpolating variables.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Term {
    /// The fragments, concatenated when evaluated.
    pub fragments: Vec<Fragment>,
}

impl Term {
    /// A term holding only literal text.
    #[must_use]
    pub fn literal(text: impl Into<String>) -> Self {
        Self {
            fragments: vec![Fragment::Lit(text.into())],
        }
    }

    /// A term referencing a single variable.
    #[must_use]
    pub fn var(name: impl Into<String>) -> Self {
        Self {
            fragments: vec![Fragment::Var(name.into())],
        }
    }

    /// Parses `$name` references out of a raw word.
    ///
    /// A `$` not followed by a letter or `_` is literal.
    #[must_use]
    pub fn parse_word(raw: &str) -> Self {
        let mut fragments = Vec::new();
        let mut lit = String::new();
        let mut chars = raw.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek().is_some_and(|&n| is_ident_start(n)) {
                if !lit.is_empty() {
                    fragments.push(Fragment::Lit(std::mem::take(&mut lit)));
                }
                let mut name = String::new();
                while let Some(&n) = chars.peek() {
                    if is_ident_char(n) {
                        name.push(n);
                        chars.next();
                    } else {
                        break;
                    }
                }
                fragments.push(Fragment::Var(name));
            } else {
                lit.push(c);
            }
        }
        if !lit.is_empty() || fragments.is_empty() {
            fragments.push(Fragment::Lit(lit));
        }
        Self { fragments }
    }

    /// Returns the literal text if the term has no variable references.
    #[must_use]
    pub fn as_literal(&self) -> Option<String> {
        self.fragments
            .iter()
            .map(|f| match f {
                Fragment::Lit(s) => Some(s.as_str()),
                Fragment::Var(_) => None,
            })
            .collect()
    }

    /// Returns the variable names this term reads.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.fragments.iter().filter_map(|f| match f {
            Fragment::Var(name) => Some(name.as_str()),
            Fragment::Lit(_) => None,
        })
    }
}

/// Free text: terms joined by single spaces when evaluated.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Text {
    /// The words of the text.
    pub terms: Vec<Term>,
}

impl Text {
    /// Builds literal text by splitting on whitespace.
    #[must_use]
    pub fn literal(text: &str) -> Self {
        Self {
            terms: text.split_whitespace().map(Term::literal).collect(),
        }
    }

    /// Returns true if the text has no words.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl From<Vec<Term>> for Text {
    fn from(terms: Vec<Term>) -> Self {
        Self { terms }
    }
}

/// A single script instruction.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Instruction {
    /// `say <text>`: speak in the bot's current room.
    Say(Text),
    /// `broadcast <text>`: message every connected user.
    Broadcast(Text),
    /// `random_say a|b|c`: say one alternative chosen at run time.
    RandomSay(Vec<Text>),
    /// `wait <seconds>`: suspend the instance.
    Wait(f64),
    /// `set <name> <text>`
    SetVar {
        /// Variable name.
        name: String,
        /// New value.
        value: Text,
    },
    /// `if <var> equals <value> then <instruction>`
    If {
        /// Variable to compare.
        var: String,
        /// Value it must equal.
        value: Term,
        /// Consequent.
        then: Box<Instruction>,
    },
    /// `move <room>`
    Move(Term),
    /// `give <item> <user>`: from the bot to a user.
    Give {
        /// Item id.
        item: Term,
        /// Receiving user.
        target: Term,
    },
    /// `take <item> <user>`: from a user to the bot.
    Take {
        /// Item id.
        item: Term,
        /// User giving up the item.
        target: Term,
    },
    /// `repeat <n> { ... }`
    Repeat {
        /// Iterations.
        count: u32,
        /// Body.
        body: Block,
    },
    /// `function <name> { ... }`
    FunctionDef {
        /// Function name.
        name: String,
        /// Body.
        body: Block,
    },
    /// `call <name>`
    Call(String),
}

impl Instruction {
    /// The keyword that introduces this instruction.
    #[must_use]
    pub const fn keyword(&self) -> &'static str {
        match self {
            Self::Say(_) => "say",
            Self::Broadcast(_) => "broadcast",
            Self::RandomSay(_) => "random_say",
            Self::Wait(_) => "wait",
            Self::SetVar { .. } => "set",
            Self::If { .. } => "if",
            Self::Move(_) => "move",
            Self::Give { .. } => "give",
            Self::Take { .. } => "take",
            Self::Repeat { .. } => "repeat",
            Self::FunctionDef { .. } => "function",
            Self::Call(_) => "call",
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::pretty::render_instruction(self))
    }
}

/// A parsed script.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Program {
    /// Top-level instructions.
    pub body: Block,
}

impl Program {
    /// Wraps a list of instructions.
    #[must_use]
    pub fn new(body: Vec<Instruction>) -> Self {
        Self { body: body.into() }
    }

    /// Number of top-level instructions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Returns true if there are no instructions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Names of every function defined anywhere in the program.
    #[must_use]
    pub fn function_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        collect_functions(&self.body, &mut names);
        names
    }
}

fn collect_functions<'a>(block: &'a [Instruction], names: &mut Vec<&'a str>) {
    for instr in block {
        match instr {
            Instruction::FunctionDef { name, body } => {
                names.push(name);
                collect_functions(body, names);
            }
            Instruction::Repeat { body, .. } => collect_functions(body, names),
            _ => {}
        }
    }
}

/// Returns true if `c` may start an identifier.
#[must_use]
pub fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

/// Returns true if `c` may continue an identifier.
#[must_use]
pub fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Returns true if `s` is a valid identifier.
#[must_use]
pub fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(is_ident_start) && chars.all(is_ident_char)
}
