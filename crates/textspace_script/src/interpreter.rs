//! Script interpreter.
//!
//! An [`Instance`] is one running execution of a parsed program. It keeps an
//! explicit frame stack instead of recursing on the Rust stack, so it can
//! stop at any instruction boundary and resume later:
//!
//! ```text
//! ┌──────────────────────┐
//! │ Call { greet }       │  ← top: executing
//! ├──────────────────────┤
//! │ Repeat { remaining } │
//! ├──────────────────────┤
//! │ Block (top level)    │
//! └──────────────────────┘
//! ```
//!
//! A *turn* runs instructions until one of:
//! - `wait`: the instance suspends for a duration
//! - `call`: the instance yields so others get a turn
//! - the per-turn instruction budget runs out: the instance yields
//! - the program finishes or fails
//!
//! A `call` that is the last instruction of its enclosing frames replaces
//! those frames instead of stacking on them, so a function that ends by
//! calling itself runs in constant depth.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use rand::{Rng, RngCore};
use textspace_foundation::{Error, ErrorContext, RuntimeError};
use tracing::{trace, warn};

use crate::ast::{Block, Fragment, Instruction, Program, Term, Text};
use crate::host::{HostError, ScriptHost};

/// Variable bindings of an instance.
pub type Bindings = im::HashMap<String, String>;

// =============================================================================
// Limits
// =============================================================================

/// Execution limits applied to every instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Limits {
    /// Maximum number of nested function calls.
    pub max_call_depth: usize,
    /// Instructions an instance may run before it must yield.
    pub max_instructions_per_turn: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_call_depth: 64,
            max_instructions_per_turn: 1000,
        }
    }
}

impl Limits {
    /// Sets the call depth bound.
    #[must_use]
    pub const fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    /// Sets the per-turn instruction budget.
    #[must_use]
    pub const fn with_max_instructions_per_turn(mut self, budget: usize) -> Self {
        self.max_instructions_per_turn = budget;
        self
    }
}

// =============================================================================
// TurnOutcome
// =============================================================================

/// How a turn ended.
#[derive(Clone, Debug, PartialEq)]
pub enum TurnOutcome {
    /// Ready to run again as soon as others have had a turn.
    Yielded,
    /// Sleeping; ready again after the duration.
    Suspended(Duration),
    /// No instructions left.
    Finished,
    /// A runtime error ended the instance.
    Failed(Error),
}

// =============================================================================
// Instance
// =============================================================================

#[derive(Clone, Debug)]
enum FrameKind {
    Block,
    Repeat { remaining: u32 },
    Call { function: String },
}

#[derive(Clone, Debug)]
struct Frame {
    block: Block,
    pc: usize,
    kind: FrameKind,
}

impl Frame {
    fn is_exhausted(&self) -> bool {
        self.pc >= self.block.len()
            && !matches!(self.kind, FrameKind::Repeat { remaining } if remaining > 1)
    }
}

enum Flow {
    Continue,
    Yield,
    Suspend(Duration),
}

/// One running execution of a script.
#[derive(Debug)]
pub struct Instance {
    script: String,
    bot: String,
    variables: Bindings,
    functions: HashMap<String, Block>,
    frames: Vec<Frame>,
    call_depth: usize,
}

impl Instance {
    /// Creates an instance positioned at the first instruction.
    ///
    /// `bindings` seeds the variables; `bot` is always bound to the owner.
    #[must_use]
    pub fn new(
        script: impl Into<String>,
        bot: impl Into<String>,
        program: &Program,
        bindings: Bindings,
    ) -> Self {
        let bot = bot.into();
        let mut variables = bindings;
        variables.insert("bot".to_string(), bot.clone());

        let frames = if program.is_empty() {
            Vec::new()
        } else {
            vec![Frame {
                block: Arc::clone(&program.body),
                pc: 0,
                kind: FrameKind::Block,
            }]
        };

        Self {
            script: script.into(),
            bot,
            variables,
            functions: HashMap::new(),
            frames,
            call_depth: 0,
        }
    }

    /// Name of the script being run.
    #[must_use]
    pub fn script(&self) -> &str {
        &self.script
    }

    /// The bot this instance acts for.
    #[must_use]
    pub fn bot(&self) -> &str {
        &self.bot
    }

    /// Reads a variable.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    /// Current number of active function calls.
    #[must_use]
    pub fn call_depth(&self) -> usize {
        self.call_depth
    }

    /// Returns true once there is nothing left to run.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.frames.is_empty()
    }

    /// Runs one turn.
    pub fn run_turn(
        &mut self,
        host: &mut dyn ScriptHost,
        rng: &mut dyn RngCore,
        limits: &Limits,
    ) -> TurnOutcome {
        let mut executed = 0usize;
        loop {
            let Some(frame) = self.frames.last_mut() else {
                return TurnOutcome::Finished;
            };

            if frame.pc >= frame.block.len() {
                if let FrameKind::Repeat { remaining } = &mut frame.kind {
                    if *remaining > 1 {
                        *remaining -= 1;
                        frame.pc = 0;
                        continue;
                    }
                }
                self.pop_frame();
                continue;
            }

            if executed >= limits.max_instructions_per_turn {
                trace!(script = %self.script, bot = %self.bot, executed, "turn budget spent");
                return TurnOutcome::Yielded;
            }

            let block = Arc::clone(&frame.block);
            let pc = frame.pc;
            frame.pc += 1;
            executed += 1;

            match self.execute(&block[pc], host, rng, limits) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Yield) => return TurnOutcome::Yielded,
                Ok(Flow::Suspend(duration)) => return TurnOutcome::Suspended(duration),
                Err(err) => return TurnOutcome::Failed(self.fail(err)),
            }
        }
    }

    // =========================================================================
    // Execution
    // =========================================================================

    fn execute(
        &mut self,
        instr: &Instruction,
        host: &mut dyn ScriptHost,
        rng: &mut dyn RngCore,
        limits: &Limits,
    ) -> Result<Flow, RuntimeError> {
        match instr {
            Instruction::Say(text) => {
                let message = self.eval_text(text)?;
                self.say(host, &message);
            }
            Instruction::Broadcast(text) => {
                let message = self.eval_text(text)?;
                let result = host.broadcast(&self.bot, &message);
                self.check_callback("broadcast", result);
            }
            Instruction::RandomSay(alternatives) => {
                if !alternatives.is_empty() {
                    let choice = rng.gen_range(0..alternatives.len());
                    let message = self.eval_text(&alternatives[choice])?;
                    self.say(host, &message);
                }
            }
            Instruction::Wait(seconds) => {
                let duration = Duration::try_from_secs_f64(*seconds).map_err(|_| {
                    RuntimeError::InvalidArgument(format!("invalid wait duration: {seconds}"))
                })?;
                return Ok(Flow::Suspend(duration));
            }
            Instruction::SetVar { name, value } => {
                let value = self.eval_text(value)?;
                self.variables.insert(name.clone(), value);
            }
            Instruction::If { var, value, then } => {
                let actual = self.lookup(var)?.to_string();
                let expected = self.eval_term(value)?;
                if actual == expected {
                    return self.execute(then, host, rng, limits);
                }
            }
            Instruction::Move(room) => {
                let room = self.eval_term(room)?;
                let result = host.move_bot(&self.bot, &room);
                self.check_callback("move", result);
            }
            Instruction::Give { item, target } => {
                let item = self.eval_term(item)?;
                let target = self.eval_term(target)?;
                let result = host.give_item(&item, &self.bot, &target);
                self.check_callback("give", result);
            }
            Instruction::Take { item, target } => {
                let item = self.eval_term(item)?;
                let target = self.eval_term(target)?;
                let result = host.take_item(&item, &target, &self.bot);
                self.check_callback("take", result);
            }
            Instruction::Repeat { count, body } => {
                if *count > 0 && !body.is_empty() {
                    self.frames.push(Frame {
                        block: Arc::clone(body),
                        pc: 0,
                        kind: FrameKind::Repeat { remaining: *count },
                    });
                }
            }
            Instruction::FunctionDef { name, body } => {
                self.functions.insert(name.clone(), Arc::clone(body));
            }
            Instruction::Call(name) => {
                let body = self
                    .functions
                    .get(name)
                    .cloned()
                    .ok_or_else(|| RuntimeError::UndefinedFunction(name.clone()))?;

                while self.frames.last().is_some_and(Frame::is_exhausted) {
                    self.pop_frame();
                }
                if self.call_depth >= limits.max_call_depth {
                    return Err(RuntimeError::StackOverflow {
                        limit: limits.max_call_depth,
                    });
                }
                if !body.is_empty() {
                    self.frames.push(Frame {
                        block: body,
                        pc: 0,
                        kind: FrameKind::Call {
                            function: name.clone(),
                        },
                    });
                    self.call_depth += 1;
                }
                return Ok(Flow::Yield);
            }
        }
        Ok(Flow::Continue)
    }

    fn say(&self, host: &mut dyn ScriptHost, message: &str) {
        // Location is re-read every time; the bot may have been moved.
        let result = match host.bot_room(&self.bot) {
            Some(room) => host.say(&room, &self.bot, message),
            None => Err(HostError::UnknownBot(self.bot.clone())),
        };
        self.check_callback("say", result);
    }

    fn check_callback(&self, action: &str, result: Result<(), HostError>) {
        if let Err(err) = result {
            warn!(
                script = %self.script,
                bot = %self.bot,
                action,
                error = %err,
                "callback failed; instruction skipped"
            );
        }
    }

    fn pop_frame(&mut self) {
        if let Some(Frame {
            kind: FrameKind::Call { .. },
            ..
        }) = self.frames.pop()
        {
            self.call_depth -= 1;
        }
    }

    /// Ends the instance, attaching the active call chain to the error.
    fn fail(&mut self, err: RuntimeError) -> Error {
        let context = self
            .frames
            .iter()
            .rev()
            .filter_map(|f| match &f.kind {
                FrameKind::Call { function } => Some(function.as_str()),
                _ => None,
            })
            .fold(ErrorContext::new().with_source(&self.script), |ctx, f| {
                ctx.with_frame(f)
            });
        self.frames.clear();
        self.call_depth = 0;
        Error::runtime(err).with_context(context)
    }

    // =========================================================================
    // Evaluation
    // =========================================================================

    fn lookup(&self, name: &str) -> Result<&str, RuntimeError> {
        self.variables
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| RuntimeError::UndefinedVariable(name.to_string()))
    }

    fn eval_term(&self, term: &Term) -> Result<String, RuntimeError> {
        let mut out = String::new();
        for fragment in &term.fragments {
            match fragment {
                Fragment::Lit(s) => out.push_str(s),
                Fragment::Var(name) => out.push_str(self.lookup(name)?),
            }
        }
        Ok(out)
    }

    fn eval_text(&self, text: &Text) -> Result<String, RuntimeError> {
        let words = text
            .terms
            .iter()
            .map(|t| self.eval_term(t))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(words.join(" "))
    }
}
