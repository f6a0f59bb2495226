//! Whole‑pipeline driver: scan → parse → resolve → interpret.
//!
//! A [`Session`] keeps one interpreter alive across runs (the REPL feeds it a
//! line at a time) and keeps expression ids unique across those runs, since
//! the interpreter's distance table outlives any single program.

use std::io::{Stdout, Write};

use log::{debug, info};

use crate::error::LucaError;
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::resolve;
use crate::scanner::scan;

/// Exit code for lexical, syntax and resolution errors.
pub const EXIT_STATIC_ERROR: i32 = 65;

/// Exit code for runtime errors.
pub const EXIT_RUNTIME_ERROR: i32 = 70;

#[derive(Debug)]
pub enum RunOutcome {
    Ok,

    /// Lex, parse or resolve errors; nothing was executed.
    StaticErrors(Vec<LucaError>),

    /// Execution stopped at the first runtime error.
    RuntimeError(LucaError),
}

impl RunOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::Ok => 0,
            RunOutcome::StaticErrors(_) => EXIT_STATIC_ERROR,
            RunOutcome::RuntimeError(_) => EXIT_RUNTIME_ERROR,
        }
    }

    /// Every diagnostic this run produced, in report order.
    pub fn errors(&self) -> Vec<&LucaError> {
        match self {
            RunOutcome::Ok => Vec::new(),
            RunOutcome::StaticErrors(errors) => errors.iter().collect(),
            RunOutcome::RuntimeError(error) => vec![error],
        }
    }
}

pub struct Session<W: Write = Stdout> {
    interpreter: Interpreter<W>,
    next_id: usize,
}

impl Session<Stdout> {
    pub fn new() -> Self {
        Self::with_interpreter(Interpreter::new())
    }
}

impl Default for Session<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Session<W> {
    pub fn with_output(out: W) -> Self {
        Self::with_interpreter(Interpreter::with_output(out))
    }

    fn with_interpreter(interpreter: Interpreter<W>) -> Self {
        Self {
            interpreter,
            next_id: 0,
        }
    }

    pub fn interpreter(&self) -> &Interpreter<W> {
        &self.interpreter
    }

    pub fn into_output(self) -> W {
        self.interpreter.into_output()
    }

    /// Runs `source` through every phase.  Static errors from scanning and
    /// parsing are reported together; resolution only runs on a clean parse.
    pub fn run(&mut self, source: &str) -> RunOutcome {
        info!("Running {} bytes of source", source.len());

        let (tokens, mut errors) = scan(source);

        let mut parser = Parser::with_first_id(&tokens, self.next_id);
        let (program, parse_errors) = parser.parse();
        self.next_id = parser.next_id();
        errors.extend(parse_errors);

        if !errors.is_empty() {
            debug!("{} static errors before resolution", errors.len());
            return RunOutcome::StaticErrors(errors);
        }

        let (distances, resolve_errors) = resolve(&program);

        if !resolve_errors.is_empty() {
            return RunOutcome::StaticErrors(resolve_errors);
        }

        match self.interpreter.interpret(&program, distances) {
            Ok(()) => RunOutcome::Ok,
            Err(e) => RunOutcome::RuntimeError(e),
        }
    }
}
