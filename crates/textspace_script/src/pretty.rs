//! Pretty-printer for parsed scripts.
//!
//! Renders a [`Program`] back to source that parses to an equal program.
//! Layout is normalised: one statement per line, blocks indented.
//!
//! ```
//! use textspace_script::{parse, pretty::render};
//!
//! let program = parse("repeat 2 { say hi; wait 1 }").unwrap();
//! assert_eq!(render(&program), "repeat 2 {\n  say hi\n  wait 1\n}\n");
//! ```

use std::fmt::Write;

use crate::ast::{Fragment, Instruction, Program, Term, Text};

const INDENT: &str = "  ";

/// Renders a whole program.
#[must_use]
pub fn render(program: &Program) -> String {
    let mut out = String::new();
    render_block(&program.body, 0, &mut out);
    out
}

/// Renders a single instruction without a trailing newline.
#[must_use]
pub fn render_instruction(instr: &Instruction) -> String {
    let mut out = String::new();
    render_into(instr, 0, &mut out);
    out
}

fn render_block(block: &[Instruction], depth: usize, out: &mut String) {
    for instr in block {
        out.push_str(&INDENT.repeat(depth));
        render_into(instr, depth, out);
        out.push('\n');
    }
}

fn render_into(instr: &Instruction, depth: usize, out: &mut String) {
    out.push_str(instr.keyword());
    match instr {
        Instruction::Say(text) | Instruction::Broadcast(text) => {
            out.push(' ');
            out.push_str(&render_text(text, false));
        }
        Instruction::RandomSay(alternatives) => {
            let rendered: Vec<String> = alternatives
                .iter()
                .map(|alt| render_text(alt, true))
                .collect();
            out.push(' ');
            out.push_str(&rendered.join(" | "));
        }
        Instruction::Wait(seconds) => {
            let _ = write!(out, " {seconds}");
        }
        Instruction::SetVar { name, value } => {
            let _ = write!(out, " {name} {}", render_text(value, false));
        }
        Instruction::If { var, value, then } => {
            let _ = write!(out, " {var} equals {} then ", render_term(value, false));
            render_into(then, depth, out);
        }
        Instruction::Move(room) => {
            out.push(' ');
            out.push_str(&render_term(room, false));
        }
        Instruction::Give { item, target } | Instruction::Take { item, target } => {
            let _ = write!(
                out,
                " {} {}",
                render_term(item, false),
                render_term(target, false)
            );
        }
        Instruction::Repeat { count, body } => {
            let _ = write!(out, " {count}");
            render_braced(body, depth, out);
        }
        Instruction::FunctionDef { name, body } => {
            let _ = write!(out, " {name}");
            render_braced(body, depth, out);
        }
        Instruction::Call(name) => {
            out.push(' ');
            out.push_str(name);
        }
    }
}

fn render_braced(body: &[Instruction], depth: usize, out: &mut String) {
    if body.is_empty() {
        out.push_str(" {}");
        return;
    }
    out.push_str(" {\n");
    render_block(body, depth + 1, out);
    out.push_str(&INDENT.repeat(depth));
    out.push('}');
}

fn render_text(text: &Text, in_alternatives: bool) -> String {
    text.terms
        .iter()
        .map(|term| render_term(term, in_alternatives))
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_term(term: &Term, in_alternatives: bool) -> String {
    if let Some(literal) = term.as_literal() {
        if needs_quotes(&literal, in_alternatives) {
            return quote(&literal);
        }
        return literal;
    }
    term.fragments
        .iter()
        .map(|f| match f {
            Fragment::Lit(s) => s.clone(),
            Fragment::Var(name) => format!("${name}"),
        })
        .collect()
}

fn needs_quotes(literal: &str, in_alternatives: bool) -> bool {
    literal.is_empty()
        || literal.starts_with('#')
        || literal
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | ';' | '{' | '}' | '$' | '\\'))
        || (in_alternatives && literal.contains('|'))
}

fn quote(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len() + 2);
    out.push('"');
    for c in literal.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
